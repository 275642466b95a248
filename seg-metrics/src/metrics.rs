//! 指标汇总.
//!
//! [`evaluate`] 对一组 (预测, 真值, 体素间距) 只计算一次表面距离,
//! 并与重叠统计和体积统计合并为不可变的 [`MetricsResult`].
//!
//! 缺少边界时表面距离类指标无定义, 但重叠与体积指标仍然给出.

use crate::consts::DEFAULT_PERCENTILE;
use crate::error::EvalResult;
use crate::overlap::ConfusionMatrix;
use crate::surface;
use crate::volume::VolumeStats;
use crate::{BinaryMask, Spacing};
use log::debug;
use ndarray::{ArrayBase, Data, Dimension};
use num::ToPrimitive;
use std::fmt;

/// 指标键名, 按输出顺序排列.
pub const METRIC_KEYS: [&str; 11] = [
    "dice",
    "jaccard",
    "sensitivity",
    "specificity",
    "precision",
    "accuracy",
    "mean_surface_distance",
    "hausdorff_distance",
    "volume_difference",
    "true_volume",
    "predicted_volume",
];

/// 表格中的指标名称, 与 [`METRIC_KEYS`] 一一对应.
pub const METRIC_NAMES: [&str; 11] = [
    "Dice",
    "Jaccard",
    "Sensitivity",
    "Specificity",
    "Precision",
    "Accuracy",
    "Mean Surface Distance",
    "Hausdorff Distance",
    "Volume Difference",
    "True Volume",
    "Predicted Volume",
];

/// 评估选项.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsOptions {
    /// 鲁棒 Hausdorff 距离的百分位, 位于 `(0, 100]`.
    pub percentile: f64,

    /// 平均表面距离是否取两个方向的平均值. 否则分别给出两个方向的值.
    pub symmetric: bool,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
            symmetric: true,
        }
    }
}

impl MetricsOptions {
    /// 设置百分位.
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    /// 设置是否输出对称平均表面距离.
    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    /// 检查选项是否合法.
    pub fn validate(&self) -> EvalResult<()> {
        surface::check_percentile(self.percentile)
    }
}

/// 平均表面距离.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceDistance {
    /// 两个方向平均值的算术平均.
    Symmetric(f64),

    /// "预测到真值" 与 "真值到预测" 两个方向的平均值.
    Directed(f64, f64),
}

impl SurfaceDistance {
    /// 对称值. 对于 `Directed` 取两者的算术平均.
    pub fn symmetric(&self) -> f64 {
        match *self {
            Self::Symmetric(v) => v,
            Self::Directed(a, b) => (a + b) / 2.0,
        }
    }
}

/// 单项指标的值.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Score {
    /// 单个数值.
    Scalar(f64),

    /// 一对数值, 例如两个方向的平均表面距离.
    Pair(f64, f64),

    /// 无定义, 例如某个掩膜没有边界时的表面距离.
    Undefined,
}

impl Score {
    /// 单个数值. `Pair` 与 `Undefined` 返回 `None`.
    pub fn as_scalar(&self) -> Option<f64> {
        match *self {
            Self::Scalar(v) => Some(v),
            Self::Pair(..) | Self::Undefined => None,
        }
    }

    /// 是否有定义.
    #[inline]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }
}

impl<T: Into<Score>> From<EvalResult<T>> for Score {
    fn from(r: EvalResult<T>) -> Self {
        r.map_or(Self::Undefined, Into::into)
    }
}

impl From<f64> for Score {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<SurfaceDistance> for Score {
    fn from(d: SurfaceDistance) -> Self {
        match d {
            SurfaceDistance::Symmetric(v) => Self::Scalar(v),
            SurfaceDistance::Directed(a, b) => Self::Pair(a, b),
        }
    }
}

/// 默认保留 4 位小数, 可通过 `{:.N}` 指定.
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(4);
        match *self {
            Self::Scalar(v) => write!(f, "{v:.prec$}"),
            Self::Pair(a, b) => write!(f, "({a:.prec$}, {b:.prec$})"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

/// 一次比较的全部指标. 创建后不可修改.
///
/// 表面距离类指标以 [`EvalResult`] 保存, 缺少边界时为 [`MetricError::NoSurface`](crate::MetricError::NoSurface).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsResult {
    confusion: ConfusionMatrix,
    volumes: VolumeStats,
    mean_surface_distance: EvalResult<SurfaceDistance>,
    hausdorff_distance: EvalResult<f64>,
    percentile: f64,
}

impl MetricsResult {
    /// Dice 系数.
    #[inline]
    pub fn dice(&self) -> f64 {
        self.confusion.dice()
    }

    /// Jaccard 指数.
    #[inline]
    pub fn jaccard(&self) -> f64 {
        self.confusion.jaccard()
    }

    /// 敏感度.
    #[inline]
    pub fn sensitivity(&self) -> f64 {
        self.confusion.sensitivity()
    }

    /// 特异度.
    #[inline]
    pub fn specificity(&self) -> f64 {
        self.confusion.specificity()
    }

    /// 精确率.
    #[inline]
    pub fn precision(&self) -> f64 {
        self.confusion.precision()
    }

    /// 准确率.
    #[inline]
    pub fn accuracy(&self) -> f64 {
        self.confusion.accuracy()
    }

    /// 平均表面距离. 任一掩膜没有边界时返回 [`MetricError::NoSurface`](crate::MetricError::NoSurface).
    #[inline]
    pub fn mean_surface_distance(&self) -> EvalResult<SurfaceDistance> {
        self.mean_surface_distance.clone()
    }

    /// 在 [`Self::percentile`] 处的鲁棒 Hausdorff 距离.
    /// 任一掩膜没有边界时返回 [`MetricError::NoSurface`](crate::MetricError::NoSurface).
    #[inline]
    pub fn hausdorff_distance(&self) -> EvalResult<f64> {
        self.hausdorff_distance.clone()
    }

    /// 所有指标是否都有定义.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.mean_surface_distance.is_ok() && self.hausdorff_distance.is_ok()
    }

    /// 计算 Hausdorff 距离时使用的百分位.
    #[inline]
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// 预测体积减去真值体积 (mL).
    #[inline]
    pub fn volume_difference(&self) -> f64 {
        self.volumes.volume_difference()
    }

    /// 真值体积 (mL).
    #[inline]
    pub fn true_volume(&self) -> f64 {
        self.volumes.true_volume()
    }

    /// 预测体积 (mL).
    #[inline]
    pub fn predicted_volume(&self) -> f64 {
        self.volumes.predicted_volume()
    }

    /// 混淆矩阵.
    #[inline]
    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    fn scores(&self) -> [Score; 11] {
        [
            Score::Scalar(self.dice()),
            Score::Scalar(self.jaccard()),
            Score::Scalar(self.sensitivity()),
            Score::Scalar(self.specificity()),
            Score::Scalar(self.precision()),
            Score::Scalar(self.accuracy()),
            self.mean_surface_distance().into(),
            self.hausdorff_distance().into(),
            Score::Scalar(self.volume_difference()),
            Score::Scalar(self.true_volume()),
            Score::Scalar(self.predicted_volume()),
        ]
    }

    /// 以 [`METRIC_KEYS`] 为键的有序映射.
    pub fn entries(&self) -> Vec<(&'static str, Score)> {
        METRIC_KEYS.into_iter().zip(self.scores()).collect()
    }

    /// 按键名取值.
    pub fn get(&self, key: &str) -> Option<Score> {
        METRIC_KEYS
            .iter()
            .position(|&k| k == key)
            .map(|i| self.scores()[i])
    }

    /// 两列表格的行, 第一列为 [`METRIC_NAMES`].
    pub fn rows(&self) -> Vec<(&'static str, Score)> {
        METRIC_NAMES.into_iter().zip(self.scores()).collect()
    }
}

/// 输出 `Metric | Score` 两列表格.
impl fmt::Display for MetricsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const W: usize = 22;
        write!(f, "{:<W$}| Score", "Metric")?;
        for (name, score) in self.rows() {
            write!(f, "\n{name:<W$}| {score}")?;
        }
        Ok(())
    }
}

/// 计算全部指标.
///
/// 输入不合法时立即返回错误. 任一掩膜没有前景时仍然返回结果,
/// 其中表面距离类指标为 [`MetricError::NoSurface`](crate::MetricError::NoSurface), 重叠比值按 0/0 取 0.
pub fn evaluate(
    prediction: &BinaryMask,
    truth: &BinaryMask,
    spacing: &Spacing,
    options: &MetricsOptions,
) -> EvalResult<MetricsResult> {
    options.validate()?;
    let confusion = ConfusionMatrix::from_masks(prediction, truth)?;
    spacing.check_ndim(prediction.ndim())?;

    let distances = surface::compute_surface_distances(prediction, truth, spacing)?;
    let hausdorff_distance = surface::robust_hausdorff(&distances, options.percentile);
    let mean_surface_distance = if options.symmetric {
        surface::symmetric_surface_distance(&distances).map(SurfaceDistance::Symmetric)
    } else {
        surface::average_surface_distance(&distances).map(|(a, b)| SurfaceDistance::Directed(a, b))
    };
    let volumes = VolumeStats::from_counts(
        confusion.predicted_count(),
        confusion.truth_count(),
        spacing,
    );

    debug!(
        "Evaluated {:?}: dice {:.4}, hd{} {}",
        prediction.shape(),
        confusion.dice(),
        options.percentile,
        Score::from(hausdorff_distance.clone())
    );
    Ok(MetricsResult {
        confusion,
        volumes,
        mean_surface_distance,
        hausdorff_distance,
        percentile: options.percentile,
    })
}

/// 先按 `value > 0.5` 二值化数值数组, 再调用 [`evaluate`].
pub fn evaluate_values<S1, S2, D1, D2>(
    prediction: &ArrayBase<S1, D1>,
    truth: &ArrayBase<S2, D2>,
    spacing: &Spacing,
    options: &MetricsOptions,
) -> EvalResult<MetricsResult>
where
    S1: Data,
    S1::Elem: ToPrimitive,
    S2: Data,
    S2::Elem: ToPrimitive,
    D1: Dimension,
    D2: Dimension,
{
    let prediction = BinaryMask::from_values(prediction)?;
    let truth = BinaryMask::from_values(truth)?;
    evaluate(&prediction, &truth, spacing, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MaskRole, MetricError};
    use ndarray::{Array2, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    fn two_voxels() -> (BinaryMask, BinaryMask) {
        let mut a = Array3::from_elem((6, 3, 3), false);
        let mut b = a.clone();
        a[[1, 1, 1]] = true;
        b[[4, 1, 1]] = true;
        (
            BinaryMask::from_bools(a).unwrap(),
            BinaryMask::from_bools(b).unwrap(),
        )
    }

    #[test]
    fn test_options() {
        let o = MetricsOptions::default();
        assert_eq!(o.percentile, 95.0);
        assert!(o.symmetric);
        assert!(o.validate().is_ok());
        let o = o.with_percentile(99.0).with_symmetric(false);
        assert_eq!(o.percentile, 99.0);
        assert!(!o.symmetric);
        assert_eq!(
            o.with_percentile(0.0).validate(),
            Err(MetricError::PercentileOutOfRange(0.0))
        );
        assert!(o.with_percentile(100.0).validate().is_ok());
        assert!(o.with_percentile(101.0).validate().is_err());
    }

    #[test]
    fn test_evaluate() {
        let (a, b) = two_voxels();
        let spacing = Spacing::new([2.0, 1.0, 1.0]).unwrap();
        let r = evaluate(&a, &b, &spacing, &MetricsOptions::default()).unwrap();
        assert_eq!(r.dice(), 0.0);
        assert_eq!(r.jaccard(), 0.0);
        assert_eq!(r.sensitivity(), 0.0);
        assert_eq!(r.precision(), 0.0);
        assert!(f64_eq(r.specificity(), 52.0 / 53.0));
        assert!(f64_eq(r.accuracy(), 52.0 / 54.0));
        assert_eq!(r.hausdorff_distance(), Ok(6.0));
        assert_eq!(r.percentile(), 95.0);
        assert!(r.is_complete());
        assert!(matches!(r.mean_surface_distance(), Ok(SurfaceDistance::Symmetric(v)) if f64_eq(v, 5.0)));
        assert!(f64_eq(r.true_volume(), 0.002));
        assert!(f64_eq(r.predicted_volume(), 0.002));
        assert_eq!(r.volume_difference(), 0.0);
        assert_eq!(r.confusion().false_positive(), 1);

        let r = evaluate(
            &a,
            &b,
            &spacing,
            &MetricsOptions::default().with_symmetric(false),
        )
        .unwrap();
        let msd = r.mean_surface_distance().unwrap();
        match msd {
            SurfaceDistance::Directed(x, y) => {
                assert!(f64_eq(x, 5.0));
                assert!(f64_eq(y, 5.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(f64_eq(msd.symmetric(), 5.0));
    }

    #[test]
    fn test_entries_and_rows() {
        let (a, b) = two_voxels();
        let r = evaluate(&a, &b, &Spacing::isotropic(3).unwrap(), &MetricsOptions::default())
            .unwrap();
        let keys: Vec<_> = r.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, METRIC_KEYS.to_vec());
        assert_eq!(r.get("hausdorff_distance"), Some(Score::Scalar(3.0)));
        assert_eq!(r.get("dice").and_then(|s| s.as_scalar()), Some(0.0));
        assert_eq!(r.get("Dice"), None);
        assert_eq!(r.rows()[6].0, "Mean Surface Distance");

        let table = r.to_string();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines[0].starts_with("Metric"));
        assert!(lines[0].ends_with("| Score"));
        assert!(lines[8].starts_with("Hausdorff Distance"));
        assert!(lines[8].ends_with("| 3.0000"));

        assert_eq!(Score::Pair(1.0, 2.5).to_string(), "(1.0000, 2.5000)");
        assert_eq!(format!("{:.1}", Score::Scalar(1.23456)), "1.2");
        assert_eq!(Score::Pair(1.0, 2.0).as_scalar(), None);
        assert_eq!(Score::Undefined.to_string(), "undefined");
        assert_eq!(Score::Undefined.as_scalar(), None);
        assert!(!Score::Undefined.is_defined());
        assert_eq!(Score::from(Ok::<f64, MetricError>(2.0)), Score::Scalar(2.0));
        assert_eq!(
            Score::from(Err::<f64, _>(MetricError::NoSurface(MaskRole::Truth))),
            Score::Undefined
        );
    }

    #[test]
    fn test_empty_prediction() {
        let empty = BinaryMask::from_bools(Array3::from_elem((8, 8, 8), false)).unwrap();
        let mut t = Array3::from_elem((8, 8, 8), false);
        t[[3, 4, 5]] = true;
        let truth = BinaryMask::from_bools(t).unwrap();
        let spacing = Spacing::isotropic(3).unwrap();

        let r = evaluate(&empty, &truth, &spacing, &MetricsOptions::default()).unwrap();
        assert_eq!(r.dice(), 0.0);
        assert_eq!(r.jaccard(), 0.0);
        assert_eq!(r.sensitivity(), 0.0);
        assert_eq!(r.precision(), 0.0);
        assert_eq!(r.specificity(), 1.0);
        assert!(f64_eq(r.accuracy(), 511.0 / 512.0));
        assert!(f64_eq(r.true_volume(), 0.001));
        assert_eq!(r.predicted_volume(), 0.0);
        assert!(f64_eq(r.volume_difference(), -0.001));

        let hd = r.hausdorff_distance().unwrap_err();
        assert_eq!(hd.kind(), crate::ErrorKind::UndefinedMetric);
        assert_eq!(hd, MetricError::NoSurface(MaskRole::Prediction));
        assert_eq!(
            r.mean_surface_distance(),
            Err(MetricError::NoSurface(MaskRole::Prediction))
        );
        assert!(!r.is_complete());

        assert_eq!(r.get("hausdorff_distance"), Some(Score::Undefined));
        assert_eq!(r.get("mean_surface_distance"), Some(Score::Undefined));
        assert_eq!(r.get("dice"), Some(Score::Scalar(0.0)));
        let table = r.to_string();
        assert!(table.lines().nth(8).is_some_and(|l| l.ends_with("| undefined")));

        let r = evaluate(&truth, &empty, &spacing, &MetricsOptions::default().with_symmetric(false))
            .unwrap();
        assert_eq!(r.sensitivity(), 0.0);
        assert_eq!(r.precision(), 0.0);
        assert_eq!(r.hausdorff_distance(), Err(MetricError::NoSurface(MaskRole::Truth)));
        assert_eq!(r.mean_surface_distance(), Err(MetricError::NoSurface(MaskRole::Truth)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_keeps_undefined_metrics() {
        let (a, _) = two_voxels();
        let empty = BinaryMask::from_bools(Array3::from_elem((6, 3, 3), false)).unwrap();
        let r = evaluate(&a, &empty, &Spacing::isotropic(3).unwrap(), &MetricsOptions::default())
            .unwrap();
        let bytes = bincode::serialize(&r).unwrap();
        let back: MetricsResult = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, r);
        assert_eq!(back.hausdorff_distance(), Err(MetricError::NoSurface(MaskRole::Truth)));
    }

    #[test]
    fn test_errors() {
        let (a, _) = two_voxels();
        let empty = BinaryMask::from_bools(Array3::from_elem((6, 3, 3), false)).unwrap();
        let spacing = Spacing::isotropic(3).unwrap();
        let options = MetricsOptions::default();
        let r = evaluate(&empty, &empty, &spacing, &options).unwrap();
        assert_eq!(r.dice(), 0.0);
        assert_eq!(r.specificity(), 1.0);
        assert_eq!(r.accuracy(), 1.0);
        assert_eq!(
            r.hausdorff_distance(),
            Err(MetricError::NoSurface(MaskRole::Prediction))
        );
        assert!(matches!(
            evaluate(&a, &empty, &spacing, &options.with_percentile(0.0)),
            Err(MetricError::PercentileOutOfRange(_))
        ));
        assert_eq!(
            evaluate(&a, &a, &spacing, &options.with_percentile(f64::NAN))
                .map_err(|e| e.kind()),
            Err(crate::ErrorKind::InvalidArgument)
        );
        let flat = BinaryMask::from_bools(Array2::from_elem((6, 3), true)).unwrap();
        assert!(matches!(
            evaluate(&a, &flat, &spacing, &options),
            Err(MetricError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            evaluate(&a, &a, &Spacing::isotropic(2).unwrap(), &options),
            Err(MetricError::SpacingLength { .. })
        ));
    }

    #[test]
    fn test_evaluate_values() {
        let mut p = Array2::<f32>::zeros((5, 5));
        let mut t = Array2::<i32>::zeros((5, 5));
        p.slice_mut(ndarray::s![1..3, 1..3]).fill(0.9);
        p[[3, 3]] = 0.5;
        t.slice_mut(ndarray::s![1..3, 1..3]).fill(1);
        let r = evaluate_values(&p, &t, &Spacing::isotropic(2).unwrap(), &MetricsOptions::default())
            .unwrap();
        assert_eq!(r.dice(), 1.0);
        assert_eq!(r.hausdorff_distance(), Ok(0.0));
        assert!(f64_eq(r.true_volume(), 0.004));
    }
}
