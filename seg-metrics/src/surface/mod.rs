//! 表面距离计算.
//!
//! 表面点取在角点格上 (体素之间, 每个轴偏移半个体素). 一个角点的 `2^N` 个相邻体素
//! 既不全是前景也不全是背景时, 该角点为边界点, 并按邻域编码查表得到其代表的表面元面积.
//! 对于掩膜 A 的每个边界点, 通过另一掩膜 B 边界点的精确距离变换得到它到 B 表面的最近距离.
//!
//! 所有计算都限制在两个掩膜前景的联合包围盒内, 四周各补一层背景.
//!
//! # 示例
//!
//! ```
//! use ndarray::Array3;
//! use seg_metrics::surface::{compute_surface_distances, robust_hausdorff};
//! use seg_metrics::{BinaryMask, Spacing};
//!
//! let mut a = Array3::from_elem((6, 3, 3), false);
//! let mut b = a.clone();
//! a[[1, 1, 1]] = true;
//! b[[4, 1, 1]] = true;
//! let a = BinaryMask::from_bools(a).unwrap();
//! let b = BinaryMask::from_bools(b).unwrap();
//!
//! let set = compute_surface_distances(&a, &b, &Spacing::isotropic(3).unwrap()).unwrap();
//! assert_eq!(robust_hausdorff(&set, 100.0).unwrap(), 3.0);
//! ```

mod border;
mod edt;
mod lookup;

use crate::error::{EvalResult, MaskRole, MetricError};
use crate::mask::{self, BinaryMask, BoundingBox};
use crate::Spacing;
use itertools::Itertools;
use log::{debug, trace};
use lookup::SurfelTable;
use ndarray::{ArrayD, Zip};
use ordered_float::OrderedFloat;

/// 表面元: 一个边界角点所代表的一小片表面.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surfel {
    /// 到另一掩膜表面的最近距离. 另一掩膜没有表面时为 `f64::INFINITY`.
    pub distance: f64,

    /// 面积 (二维时为长度).
    pub area: f64,
}

/// 距离的方向.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// 预测表面上的点到真值表面.
    PredictionToTruth,

    /// 真值表面上的点到预测表面.
    TruthToPrediction,
}

impl Direction {
    /// 起点所在的掩膜.
    #[inline]
    pub fn source(self) -> MaskRole {
        match self {
            Self::PredictionToTruth => MaskRole::Prediction,
            Self::TruthToPrediction => MaskRole::Truth,
        }
    }

    /// 终点所在的掩膜.
    #[inline]
    pub fn target(self) -> MaskRole {
        match self {
            Self::PredictionToTruth => MaskRole::Truth,
            Self::TruthToPrediction => MaskRole::Prediction,
        }
    }
}

/// 单一方向上的表面距离, 按距离升序排列.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectedDistances {
    direction: Direction,
    surfels: Vec<Surfel>,
    target_has_surface: bool,
}

impl DirectedDistances {
    fn new(direction: Direction, mut surfels: Vec<Surfel>, target_has_surface: bool) -> Self {
        surfels.sort_by_key(|s| OrderedFloat(s.distance));
        Self {
            direction,
            surfels,
            target_has_surface,
        }
    }

    /// 方向.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// 所有表面元, 按距离升序.
    #[inline]
    pub fn surfels(&self) -> &[Surfel] {
        &self.surfels
    }

    /// 所有距离, 升序.
    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.surfels.iter().map(|s| s.distance)
    }

    /// 表面元个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.surfels.len()
    }

    /// 起点掩膜是否没有表面.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfels.is_empty()
    }

    /// 起点掩膜的表面总面积.
    pub fn total_area(&self) -> f64 {
        self.surfels.iter().map(|s| s.area).sum()
    }

    /// 两端的表面是否都存在, 即距离是否有定义.
    #[inline]
    pub fn is_defined(&self) -> bool {
        !self.is_empty() && self.target_has_surface
    }

    fn ensure_defined(&self) -> EvalResult<()> {
        if self.is_empty() {
            Err(MetricError::NoSurface(self.direction.source()))
        } else if !self.target_has_surface {
            Err(MetricError::NoSurface(self.direction.target()))
        } else {
            Ok(())
        }
    }

    /// 按面积加权的百分位距离: 使加权累计比例不小于 `percentile / 100` 的最小距离.
    pub fn percentile(&self, percentile: f64) -> EvalResult<f64> {
        check_percentile(percentile)?;
        self.ensure_defined()?;
        weighted_percentile(&self.surfels, self.total_area(), percentile)
            .ok_or(MetricError::NoSurface(self.direction.source()))
    }

    /// 按面积加权的平均距离.
    pub fn mean(&self) -> EvalResult<f64> {
        self.ensure_defined()?;
        let weighted: f64 = self.surfels.iter().map(|s| s.distance * s.area).sum();
        Ok(weighted / self.total_area())
    }

    /// 最大距离.
    pub fn max(&self) -> EvalResult<f64> {
        self.ensure_defined()?;
        self.surfels
            .last()
            .map(|s| s.distance)
            .ok_or(MetricError::NoSurface(self.direction.source()))
    }
}

/// 两个方向上的表面距离.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceDistanceSet {
    prediction_to_truth: DirectedDistances,
    truth_to_prediction: DirectedDistances,
}

impl SurfaceDistanceSet {
    fn empty() -> Self {
        Self {
            prediction_to_truth: DirectedDistances::new(Direction::PredictionToTruth, vec![], false),
            truth_to_prediction: DirectedDistances::new(Direction::TruthToPrediction, vec![], false),
        }
    }

    /// 指定方向的距离.
    pub fn get(&self, direction: Direction) -> &DirectedDistances {
        match direction {
            Direction::PredictionToTruth => &self.prediction_to_truth,
            Direction::TruthToPrediction => &self.truth_to_prediction,
        }
    }

    /// 预测到真值.
    #[inline]
    pub fn prediction_to_truth(&self) -> &DirectedDistances {
        &self.prediction_to_truth
    }

    /// 真值到预测.
    #[inline]
    pub fn truth_to_prediction(&self) -> &DirectedDistances {
        &self.truth_to_prediction
    }

    /// 该掩膜是否有表面.
    pub fn has_surface(&self, role: MaskRole) -> bool {
        match role {
            MaskRole::Prediction => !self.prediction_to_truth.is_empty(),
            MaskRole::Truth => !self.truth_to_prediction.is_empty(),
        }
    }

    /// 两个掩膜都有表面时返回 `Ok`, 否则指出 (第一个) 缺少表面的掩膜.
    pub fn ensure_surfaces(&self) -> EvalResult<()> {
        self.prediction_to_truth.ensure_defined()?;
        self.truth_to_prediction.ensure_defined()
    }
}

/// 计算两个方向上的表面距离.
///
/// `prediction` 与 `truth` 形状必须一致, `spacing` 的维度必须与掩膜一致.
/// 某个掩膜没有前景时不会报错: 它出发的方向为空, 指向它的方向距离无定义,
/// 交给后续的统计量报告 [`MetricError::NoSurface`].
pub fn compute_surface_distances(
    prediction: &BinaryMask,
    truth: &BinaryMask,
    spacing: &Spacing,
) -> EvalResult<SurfaceDistanceSet> {
    mask::check_same_shape(prediction, truth)?;
    spacing.check_ndim(prediction.ndim())?;

    let Some(bbox) = mask::union_bounding_box(prediction, truth) else {
        debug!("Both masks are empty, no surface to measure");
        return Ok(SurfaceDistanceSet::empty());
    };
    trace!("Cropping to {:?} ..= {:?}", bbox.min(), bbox.max());

    let table = SurfelTable::new(spacing);
    let (pred, gt) = join(
        || Boundary::extract(prediction, &bbox, spacing, &table),
        || Boundary::extract(truth, &bbox, spacing, &table),
    );

    let set = SurfaceDistanceSet {
        prediction_to_truth: pred.distances_to(&gt, Direction::PredictionToTruth, &table),
        truth_to_prediction: gt.distances_to(&pred, Direction::TruthToPrediction, &table),
    };
    debug!(
        "Surfels: prediction {}, truth {}",
        set.prediction_to_truth.len(),
        set.truth_to_prediction.len()
    );
    Ok(set)
}

/// 鲁棒 Hausdorff 距离: 分别在两个方向上取加权百分位距离, 返回较大者.
///
/// `percentile` 为 100 时即 Hausdorff 距离.
pub fn robust_hausdorff(distances: &SurfaceDistanceSet, percentile: f64) -> EvalResult<f64> {
    check_percentile(percentile)?;
    let a = distances.prediction_to_truth.percentile(percentile)?;
    let b = distances.truth_to_prediction.percentile(percentile)?;
    Ok(a.max(b))
}

/// 把两个方向的距离合并为同一个加权分布后取百分位.
///
/// 不大于 [`robust_hausdorff`], 在 `percentile` 为 100 时两者相等.
pub fn pooled_robust_hausdorff(
    distances: &SurfaceDistanceSet,
    percentile: f64,
) -> EvalResult<f64> {
    check_percentile(percentile)?;
    distances.ensure_surfaces()?;
    let (a, b) = (&distances.prediction_to_truth, &distances.truth_to_prediction);
    let merged = a
        .surfels
        .iter()
        .merge_by(b.surfels.iter(), |x, y| x.distance <= y.distance);
    weighted_percentile(merged, a.total_area() + b.total_area(), percentile)
        .ok_or(MetricError::NoSurface(MaskRole::Prediction))
}

/// 两个方向上按面积加权的平均表面距离, 依次为 "预测到真值" 与 "真值到预测".
pub fn average_surface_distance(distances: &SurfaceDistanceSet) -> EvalResult<(f64, f64)> {
    Ok((
        distances.prediction_to_truth.mean()?,
        distances.truth_to_prediction.mean()?,
    ))
}

/// 对称平均表面距离: 两个方向平均值的算术平均.
pub fn symmetric_surface_distance(distances: &SurfaceDistanceSet) -> EvalResult<f64> {
    let (a, b) = average_surface_distance(distances)?;
    Ok((a + b) / 2.0)
}

/// 检查百分位位于 `(0, 100]`.
pub(crate) fn check_percentile(percentile: f64) -> EvalResult<()> {
    if percentile > 0.0 && percentile <= 100.0 {
        Ok(())
    } else {
        Err(MetricError::PercentileOutOfRange(percentile))
    }
}

/// `surfels` 必须按距离升序. 为空时返回 `None`.
fn weighted_percentile<'a, I>(surfels: I, total_area: f64, percentile: f64) -> Option<f64>
where
    I: IntoIterator<Item = &'a Surfel>,
{
    let threshold = percentile / 100.0;
    let mut cumulative = 0.0;
    let mut last = None;
    for s in surfels {
        cumulative += s.area;
        last = Some(s.distance);
        if cumulative / total_area >= threshold {
            break;
        }
    }
    last
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        #[inline]
        fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
        where
            A: FnOnce() -> RA + Send,
            B: FnOnce() -> RB + Send,
            RA: Send,
            RB: Send,
        {
            rayon::join(a, b)
        }
    } else {
        #[inline]
        fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
        where
            A: FnOnce() -> RA,
            B: FnOnce() -> RB,
        {
            (a(), b())
        }
    }
}

/// 单个掩膜在角点格上的边界.
struct Boundary {
    codes: ArrayD<u8>,
    // 到边界的平方距离, 没有边界时为 `None`
    sq_distance: Option<ArrayD<f64>>,
}

impl Boundary {
    fn extract(
        mask: &BinaryMask,
        bbox: &BoundingBox,
        spacing: &Spacing,
        table: &SurfelTable,
    ) -> Self {
        let codes = border::neighbour_codes(mask, bbox);
        let sq_distance =
            edt::squared_distance_transform(&border::border_map(&codes, table), spacing.as_slice());
        Self { codes, sq_distance }
    }

    fn distances_to(
        &self,
        other: &Self,
        direction: Direction,
        table: &SurfelTable,
    ) -> DirectedDistances {
        let mut surfels = Vec::new();
        match &other.sq_distance {
            Some(sq) => Zip::from(&self.codes).and(sq).for_each(|&code, &d2| {
                if table.is_border(code) {
                    surfels.push(Surfel {
                        distance: d2.sqrt(),
                        area: table.area(code),
                    });
                }
            }),
            None => surfels.extend(
                self.codes
                    .iter()
                    .filter(|&&code| table.is_border(code))
                    .map(|&code| Surfel {
                        distance: f64::INFINITY,
                        area: table.area(code),
                    }),
            ),
        }
        DirectedDistances::new(direction, surfels, other.sq_distance.is_some())
    }
}
