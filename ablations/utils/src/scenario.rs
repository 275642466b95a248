//! 球体体模场景目录.
//!
//! 体数据大小为 256³. "大球" 半径 80, 中心 (128, 128, 128);
//! "偏移球" 半径 77, 中心 (132, 132, 132); "远球" 半径 40, 中心 (50, 50, 50).

use seg_metrics::prelude::*;

/// 体数据形状.
pub const SHAPE: Idx3d = (256, 256, 256);

/// 一次比较所需的全部输入.
pub struct Scenario {
    /// 场景名.
    pub name: &'static str,

    /// 预测掩膜.
    pub prediction: BinaryMask,

    /// 真值掩膜.
    pub truth: BinaryMask,

    /// 体素间距.
    pub spacing: Spacing,

    /// 评估选项.
    pub options: MetricsOptions,
}

impl Scenario {
    /// 运行一次评估.
    #[inline]
    pub fn evaluate(&self) -> EvalResult<MetricsResult> {
        evaluate(&self.prediction, &self.truth, &self.spacing, &self.options)
    }
}

/// 构建全部场景.
pub fn catalogue() -> EvalResult<Vec<Scenario>> {
    use ndarray::{s, Axis};

    let large = place_ball(SHAPE, (128, 128, 128), 80);
    let shifted = place_ball(SHAPE, (132, 132, 132), 77);
    let far = place_ball(SHAPE, (50, 50, 50), 40);
    let defaults = MetricsOptions::default();

    Ok(vec![
        Scenario {
            name: "basic",
            prediction: BinaryMask::from_bools(large.clone())?,
            truth: BinaryMask::from_bools(shifted.clone())?,
            spacing: Spacing::isotropic(3)?,
            options: defaults,
        },
        Scenario {
            name: "directed-p99",
            prediction: BinaryMask::from_bools(large.clone())?,
            truth: BinaryMask::from_bools(shifted.clone())?,
            spacing: Spacing::isotropic(3)?,
            options: defaults.with_percentile(99.0).with_symmetric(false),
        },
        Scenario {
            name: "anisotropic",
            prediction: BinaryMask::from_bools(large.slice(s![.., .., ..;2]).to_owned())?,
            truth: BinaryMask::from_bools(shifted.slice(s![.., .., ..;2]).to_owned())?,
            spacing: Spacing::new([1.0, 1.0, 2.0])?,
            options: defaults,
        },
        Scenario {
            name: "planar",
            prediction: BinaryMask::from_bools(large.index_axis(Axis(2), 128).to_owned())?,
            truth: BinaryMask::from_bools(shifted.index_axis(Axis(2), 128).to_owned())?,
            spacing: Spacing::isotropic(2)?,
            options: defaults,
        },
        Scenario {
            name: "disjoint",
            prediction: BinaryMask::from_bools(large)?,
            truth: BinaryMask::from_bools(far)?,
            spacing: Spacing::isotropic(3)?,
            options: defaults,
        },
    ])
}
