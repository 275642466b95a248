#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 计算二维/三维二值分割结果的一组评估指标:
//! 重叠统计, 表面距离统计与体积统计.
//!
//! 该 crate 只提供 `safe` 接口. 所有计算都是纯函数, 不做任何 I/O.
//!
//! # 注意
//!
//! 1. 掩膜只支持二维与三维. 非布尔输入按 `value > 0.5` 二值化.
//! 2. 重叠比值在分母为 0 时统一取 `0`; 表面距离在缺少边界时返回错误, 而不是 `0`.
//! 3. 体积单位为 mL, 即 `体素数 × 体素体积 (mm³) / 1000`.
//!
//! # 功能
//!
//! ### 表面距离 ✅
//!
//! 角点格上的边界提取 (marching cubes / marching squares 面积表),
//! 精确欧氏距离变换, 鲁棒 Hausdorff 距离与平均表面距离.
//! 各向异性体素间距在每个轴上分别处理.
//!
//! 实现位于 `seg-metrics/src/surface`.
//!
//! ### 重叠统计 ✅
//!
//! Dice, Jaccard, 敏感度, 特异度, 精确率, 准确率.
//!
//! 实现位于 `seg-metrics/src/overlap.rs`.
//!
//! ### 体积统计 ✅
//!
//! 实现位于 `seg-metrics/src/volume.rs`.
//!
//! ### 指标汇总 ✅
//!
//! 一次比较只计算一次表面距离, 结果是不可变的记录, 可以按键名取值或输出两列表格.
//!
//! 实现位于 `seg-metrics/src/metrics.rs`.
//!
//! ### 合成体模 ✅
//!
//! 离散球体与圆盘, 用于测试与消融实验.
//!
//! # 示例
//!
//! ```
//! use seg_metrics::prelude::*;
//!
//! let a = BinaryMask::from_bools(place_ball((32, 32, 32), (15, 15, 15), 8)).unwrap();
//! let b = BinaryMask::from_bools(place_ball((32, 32, 32), (16, 16, 16), 8)).unwrap();
//! let spacing = Spacing::isotropic(3).unwrap();
//!
//! let result = evaluate(&a, &b, &spacing, &MetricsOptions::default()).unwrap();
//! assert!(result.dice() > 0.7);
//! println!("{result}");
//! ```

/// 二维索引.
pub type Idx2d = (usize, usize);

/// 三维索引.
pub type Idx3d = (usize, usize, usize);

mod error;
mod mask;
mod spacing;

pub use error::{ErrorKind, EvalResult, MaskRole, MetricError};
pub use mask::{BinaryMask, BoundingBox};
pub use spacing::Spacing;

pub mod consts;
pub mod metrics;
pub mod overlap;
pub mod phantom;
pub mod prelude;
pub mod surface;
pub mod volume;

pub use metrics::{evaluate, evaluate_values, MetricsOptions, MetricsResult, Score, SurfaceDistance};
pub use overlap::ConfusionMatrix;
pub use volume::VolumeStats;
