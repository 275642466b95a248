//! 体积统计. 单位为 mL (mm³ × 10⁻³).

use crate::consts::MM3_PER_ML;
use crate::error::EvalResult;
use crate::mask::{self, BinaryMask};
use crate::Spacing;

/// 前景体素数对应的体积.
#[inline]
pub fn volume_ml(count: u64, spacing: &Spacing) -> f64 {
    count as f64 * spacing.voxel_volume() / MM3_PER_ML
}

/// 预测与真值的体积.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeStats {
    true_volume: f64,
    predicted_volume: f64,
}

impl VolumeStats {
    /// 由前景体素数直接计算.
    pub fn from_counts(predicted: u64, truth: u64, spacing: &Spacing) -> Self {
        Self {
            true_volume: volume_ml(truth, spacing),
            predicted_volume: volume_ml(predicted, spacing),
        }
    }

    /// 统计两个掩膜的体积. 形状与间距维度必须一致.
    pub fn from_masks(
        prediction: &BinaryMask,
        truth: &BinaryMask,
        spacing: &Spacing,
    ) -> EvalResult<Self> {
        mask::check_same_shape(prediction, truth)?;
        spacing.check_ndim(prediction.ndim())?;
        Ok(Self::from_counts(
            prediction.count() as u64,
            truth.count() as u64,
            spacing,
        ))
    }

    /// 真值体积.
    #[inline]
    pub fn true_volume(&self) -> f64 {
        self.true_volume
    }

    /// 预测体积.
    #[inline]
    pub fn predicted_volume(&self) -> f64 {
        self.predicted_volume
    }

    /// 预测体积减去真值体积.
    #[inline]
    pub fn volume_difference(&self) -> f64 {
        self.predicted_volume - self.true_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricError;
    use ndarray::Array3;

    #[test]
    fn test_volumes() {
        let spacing = Spacing::new([0.5, 2.0, 4.0]).unwrap();
        assert_eq!(volume_ml(250, &spacing), 1.0);

        let v = VolumeStats::from_counts(2143641, 1912319, &Spacing::isotropic(3).unwrap());
        assert!((v.predicted_volume() - 2143.641).abs() < 1e-9);
        assert!((v.true_volume() - 1912.319).abs() < 1e-9);
        assert!((v.volume_difference() - 231.322).abs() < 1e-9);
    }

    #[test]
    fn test_from_masks() {
        let mut p = Array3::from_elem((4, 5, 6), false);
        p.slice_mut(ndarray::s![0..2, .., 1..3]).fill(true);
        let t = Array3::from_elem((4, 5, 6), false);
        let p = BinaryMask::from_bools(p).unwrap();
        let t = BinaryMask::from_bools(t).unwrap();
        let spacing = Spacing::new([1.0, 2.0, 5.0]).unwrap();
        let v = VolumeStats::from_masks(&p, &t, &spacing).unwrap();
        assert_eq!(v.predicted_volume(), 0.2);
        assert_eq!(v.true_volume(), 0.0);
        assert_eq!(v.volume_difference(), 0.2);
        assert!(matches!(
            VolumeStats::from_masks(&p, &t, &Spacing::isotropic(2).unwrap()),
            Err(MetricError::SpacingLength { .. })
        ));
    }
}
