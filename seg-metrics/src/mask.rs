//! 二值掩膜.

use crate::consts::BINARIZE_THRESHOLD;
use crate::error::{EvalResult, MetricError};
use ndarray::{Array, ArrayBase, ArrayD, ArrayViewD, Axis, Data, Dimension};
use num::ToPrimitive;

/// 二维或三维二值掩膜. `true` 代表前景.
///
/// 构造时保证: 维度为 2 或 3, 没有长度为 0 的轴.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    data: ArrayD<bool>,
}

/// 前景体素的轴对齐包围盒, 两端均为闭区间.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    min: Vec<usize>,
    max: Vec<usize>,
}

impl BoundingBox {
    /// 每个轴上的最小下标.
    #[inline]
    pub fn min(&self) -> &[usize] {
        &self.min
    }

    /// 每个轴上的最大下标 (含).
    #[inline]
    pub fn max(&self) -> &[usize] {
        &self.max
    }

    /// 每个轴上包围盒的长度.
    pub fn extent(&self) -> Vec<usize> {
        self.min
            .iter()
            .zip(self.max.iter())
            .map(|(lo, hi)| hi - lo + 1)
            .collect()
    }

    /// 同时包住两个包围盒的最小包围盒.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.iter().zip(&other.min).map(|(a, b)| *a.min(b)).collect(),
            max: self.max.iter().zip(&other.max).map(|(a, b)| *a.max(b)).collect(),
        }
    }
}

impl BinaryMask {
    /// 由布尔数组直接创建.
    pub fn from_bools<D: Dimension>(data: Array<bool, D>) -> EvalResult<Self> {
        let data = data.into_dyn();
        match data.ndim() {
            2 | 3 => {}
            n => return Err(MetricError::UnsupportedDimension(n)),
        }
        if let Some(axis) = data.shape().iter().position(|&len| len == 0) {
            return Err(MetricError::EmptyAxis(axis));
        }
        Ok(Self { data })
    }

    /// 将数值数组二值化后创建. 大于 [`BINARIZE_THRESHOLD`] 的元素为前景,
    /// 无法表示为 `f64` 的元素 (以及 `NaN`) 为背景.
    pub fn from_values<S, D>(values: &ArrayBase<S, D>) -> EvalResult<Self>
    where
        S: Data,
        S::Elem: ToPrimitive,
        D: Dimension,
    {
        Self::from_bools(values.map(|v| v.to_f64().is_some_and(|v| v > BINARIZE_THRESHOLD)))
    }

    /// 形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 维度.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// 体素总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 前景体素数.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// 是否没有任何前景体素.
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// 只读视图.
    #[inline]
    pub fn view(&self) -> ArrayViewD<'_, bool> {
        self.data.view()
    }

    /// 取出内部数组.
    pub fn into_inner(self) -> ArrayD<bool> {
        self.data
    }

    /// 前景包围盒. 没有前景时返回 `None`.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut min = Vec::with_capacity(self.ndim());
        let mut max = Vec::with_capacity(self.ndim());
        for (axis, &len) in self.shape().iter().enumerate() {
            let occupied = |i: &usize| self.data.index_axis(Axis(axis), *i).iter().any(|&v| v);
            min.push((0..len).find(occupied)?);
            max.push((0..len).rev().find(occupied)?);
        }
        Some(BoundingBox { min, max })
    }
}

/// 两个掩膜前景的联合包围盒. 均为空时返回 `None`.
pub(crate) fn union_bounding_box(a: &BinaryMask, b: &BinaryMask) -> Option<BoundingBox> {
    match (a.bounding_box(), b.bounding_box()) {
        (Some(x), Some(y)) => Some(x.union(&y)),
        (x, y) => x.or(y),
    }
}

/// 检查预测掩膜与真值掩膜形状一致.
pub(crate) fn check_same_shape(prediction: &BinaryMask, truth: &BinaryMask) -> EvalResult<()> {
    if prediction.shape() == truth.shape() {
        Ok(())
    } else {
        Err(MetricError::ShapeMismatch {
            prediction: prediction.shape().to_vec(),
            truth: truth.shape().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array2, Array3, Array4, Ix2};

    #[test]
    fn test_binarize() {
        let m = BinaryMask::from_values(&arr2(&[[0.0, 0.5, 0.51], [1.0, f64::NAN, -3.0]])).unwrap();
        assert_eq!(
            m.view().into_dimensionality::<Ix2>().unwrap(),
            arr2(&[[false, false, true], [true, false, false]])
        );
        let m = BinaryMask::from_values(&arr2(&[[0u8, 1], [2, 0]])).unwrap();
        assert_eq!(m.count(), 2);
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn test_invalid_shapes() {
        assert_eq!(
            BinaryMask::from_bools(arr1(&[true, false])),
            Err(MetricError::UnsupportedDimension(1))
        );
        assert_eq!(
            BinaryMask::from_bools(Array4::from_elem((1, 1, 1, 1), true)),
            Err(MetricError::UnsupportedDimension(4))
        );
        assert_eq!(
            BinaryMask::from_bools(Array3::from_elem((2, 0, 2), true)),
            Err(MetricError::EmptyAxis(1))
        );
    }

    #[test]
    fn test_bounding_box() {
        let mut a = Array3::from_elem((5, 6, 7), false);
        a[[1, 4, 2]] = true;
        a[[3, 2, 6]] = true;
        let m = BinaryMask::from_bools(a).unwrap();
        let bb = m.bounding_box().unwrap();
        assert_eq!(bb.min(), &[1, 2, 2]);
        assert_eq!(bb.max(), &[3, 4, 6]);
        assert_eq!(bb.extent(), vec![3, 3, 5]);

        let empty = BinaryMask::from_bools(Array3::from_elem((5, 6, 7), false)).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.bounding_box(), None);
        assert_eq!(union_bounding_box(&m, &empty), Some(bb.clone()));
        assert_eq!(union_bounding_box(&empty, &empty), None);

        let mut b = Array3::from_elem((5, 6, 7), false);
        b[[0, 5, 3]] = true;
        let other = BinaryMask::from_bools(b).unwrap();
        let u = union_bounding_box(&m, &other).unwrap();
        assert_eq!(u.min(), &[0, 2, 2]);
        assert_eq!(u.max(), &[3, 5, 6]);
    }

    #[test]
    fn test_shape_check() {
        let a = BinaryMask::from_bools(Array2::from_elem((2, 3), true)).unwrap();
        let b = BinaryMask::from_bools(Array2::from_elem((3, 2), true)).unwrap();
        assert!(check_same_shape(&a, &a).is_ok());
        assert_eq!(
            check_same_shape(&a, &b),
            Err(MetricError::ShapeMismatch {
                prediction: vec![2, 3],
                truth: vec![3, 2]
            })
        );
        assert!(!a.is_empty());
        assert_eq!(a.ndim(), 2);
    }
}
