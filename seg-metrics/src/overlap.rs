//! 重叠统计.
//!
//! 所有比值在分母为 0 时统一取 `0.0`.

use crate::error::EvalResult;
use crate::mask::{self, BinaryMask};
use ndarray::Zip;

/// 混淆矩阵. 以真值为参照.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionMatrix {
    true_positive: u64,
    false_positive: u64,
    false_negative: u64,
    true_negative: u64,
}

#[inline]
fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ConfusionMatrix {
    /// 一次遍历统计两个掩膜的混淆矩阵. 形状必须一致.
    pub fn from_masks(prediction: &BinaryMask, truth: &BinaryMask) -> EvalResult<Self> {
        mask::check_same_shape(prediction, truth)?;
        // 下标: (预测 << 1) | 真值
        let mut counts = [0u64; 4];
        Zip::from(prediction.view())
            .and(truth.view())
            .for_each(|&p, &t| counts[(usize::from(p) << 1) | usize::from(t)] += 1);
        let [true_negative, false_negative, false_positive, true_positive] = counts;
        Ok(Self {
            true_positive,
            false_positive,
            false_negative,
            true_negative,
        })
    }

    /// TP.
    #[inline]
    pub fn true_positive(&self) -> u64 {
        self.true_positive
    }

    /// FP.
    #[inline]
    pub fn false_positive(&self) -> u64 {
        self.false_positive
    }

    /// FN.
    #[inline]
    pub fn false_negative(&self) -> u64 {
        self.false_negative
    }

    /// TN.
    #[inline]
    pub fn true_negative(&self) -> u64 {
        self.true_negative
    }

    /// 预测前景体素数 `|P|`.
    #[inline]
    pub fn predicted_count(&self) -> u64 {
        self.true_positive + self.false_positive
    }

    /// 真值前景体素数 `|T|`.
    #[inline]
    pub fn truth_count(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    /// 体素总数.
    #[inline]
    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    /// Dice 系数 `2TP / (|P| + |T|)`.
    pub fn dice(&self) -> f64 {
        ratio(2 * self.true_positive, self.predicted_count() + self.truth_count())
    }

    /// Jaccard 指数 `TP / (TP + FP + FN)`.
    pub fn jaccard(&self) -> f64 {
        ratio(
            self.true_positive,
            self.true_positive + self.false_positive + self.false_negative,
        )
    }

    /// 敏感度 (召回率) `TP / (TP + FN)`.
    pub fn sensitivity(&self) -> f64 {
        ratio(self.true_positive, self.truth_count())
    }

    /// 特异度 `TN / (TN + FP)`.
    pub fn specificity(&self) -> f64 {
        ratio(self.true_negative, self.true_negative + self.false_positive)
    }

    /// 精确率 `TP / (TP + FP)`.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.predicted_count())
    }

    /// 准确率 `(TP + TN) / N`.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    fn masks(p: [[u8; 4]; 2], t: [[u8; 4]; 2]) -> ConfusionMatrix {
        let p = BinaryMask::from_values(&arr2(&p)).unwrap();
        let t = BinaryMask::from_values(&arr2(&t)).unwrap();
        ConfusionMatrix::from_masks(&p, &t).unwrap()
    }

    #[test]
    fn test_counts() {
        let m = masks([[1, 1, 0, 0], [1, 0, 0, 0]], [[1, 0, 1, 0], [1, 0, 0, 0]]);
        assert_eq!(m.true_positive(), 2);
        assert_eq!(m.false_positive(), 1);
        assert_eq!(m.false_negative(), 1);
        assert_eq!(m.true_negative(), 4);
        assert_eq!(m.total(), 8);
        assert!(f64_eq(m.dice(), 4.0 / 6.0));
        assert!(f64_eq(m.jaccard(), 0.5));
        assert!(f64_eq(m.sensitivity(), 2.0 / 3.0));
        assert!(f64_eq(m.specificity(), 0.8));
        assert!(f64_eq(m.precision(), 2.0 / 3.0));
        assert!(f64_eq(m.accuracy(), 0.75));
    }

    #[test]
    fn test_zero_denominators() {
        let m = masks([[0; 4]; 2], [[0; 4]; 2]);
        assert_eq!(m.dice(), 0.0);
        assert_eq!(m.jaccard(), 0.0);
        assert_eq!(m.sensitivity(), 0.0);
        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.specificity(), 1.0);
        assert_eq!(m.accuracy(), 1.0);

        let m = masks([[1; 4]; 2], [[1; 4]; 2]);
        assert_eq!(m.dice(), 1.0);
        assert_eq!(m.specificity(), 0.0);

        assert_eq!(ConfusionMatrix::default().accuracy(), 0.0);
    }

    #[test]
    fn test_disjoint() {
        let m = masks([[1, 1, 0, 0], [0, 0, 0, 0]], [[0, 0, 1, 1], [0, 0, 0, 0]]);
        assert_eq!(m.dice(), 0.0);
        assert_eq!(m.jaccard(), 0.0);
        assert_eq!(m.sensitivity(), 0.0);
        assert_eq!(m.precision(), 0.0);
        assert!(f64_eq(m.specificity(), 4.0 / 6.0));
        assert!(f64_eq(m.accuracy(), 0.5));
    }
}
