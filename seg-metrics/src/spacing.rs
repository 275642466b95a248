//! 体素间距.

use crate::error::{EvalResult, MetricError};

/// 每个轴上相邻体素中心的物理距离 (单位通常为 mm).
///
/// 构造时保证: 维度为 2 或 3, 每个分量都是有限正数.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct Spacing(Vec<f64>);

impl Spacing {
    /// 校验并创建体素间距.
    pub fn new<V: Into<Vec<f64>>>(values: V) -> EvalResult<Self> {
        let values = values.into();
        if !(2..=3).contains(&values.len()) {
            return Err(MetricError::UnsupportedDimension(values.len()));
        }
        if let Some((axis, &v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(MetricError::InvalidSpacing(axis, v));
        }
        Ok(Self(values))
    }

    /// 各向同性的单位间距.
    pub fn isotropic(ndim: usize) -> EvalResult<Self> {
        Self::new(vec![1.0; ndim])
    }

    /// 维度.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// 各分量.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// 单个体素的体积 (二维时为面积).
    #[inline]
    pub fn voxel_volume(&self) -> f64 {
        self.0.iter().product()
    }

    /// 每个分量乘以 `factor`.
    pub fn scaled(&self, factor: f64) -> EvalResult<Self> {
        Self::new(self.0.iter().map(|s| s * factor).collect::<Vec<_>>())
    }

    /// 检查与掩膜维度是否一致.
    pub fn check_ndim(&self, ndim: usize) -> EvalResult<()> {
        if self.ndim() == ndim {
            Ok(())
        } else {
            Err(MetricError::SpacingLength {
                expected: ndim,
                actual: self.ndim(),
            })
        }
    }
}

impl TryFrom<Vec<f64>> for Spacing {
    type Error = MetricError;

    fn try_from(values: Vec<f64>) -> EvalResult<Self> {
        Self::new(values)
    }
}

impl TryFrom<&[f64]> for Spacing {
    type Error = MetricError;

    fn try_from(values: &[f64]) -> EvalResult<Self> {
        Self::new(values)
    }
}

impl From<Spacing> for Vec<f64> {
    fn from(spacing: Spacing) -> Self {
        spacing.0
    }
}
