//! 运行时错误.

use std::fmt;

/// 参与评估的掩膜角色.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaskRole {
    /// 预测 (待评估) 掩膜.
    Prediction,

    /// 真值掩膜.
    Truth,
}

impl fmt::Display for MaskRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prediction => f.write_str("prediction"),
            Self::Truth => f.write_str("truth"),
        }
    }
}

/// 错误的粗粒度分类.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// 调用方给出的输入不合法, 立即返回.
    InvalidArgument,

    /// 输入合法, 但所求指标在数学上不存在 (例如缺少边界时的表面距离).
    UndefinedMetric,
}

/// 评估过程中的错误.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricError {
    /// 预测掩膜与真值掩膜形状不同.
    ShapeMismatch {
        /// 预测掩膜的形状.
        prediction: Vec<usize>,
        /// 真值掩膜的形状.
        truth: Vec<usize>,
    },

    /// 不支持的维度. 仅支持二维和三维.
    UnsupportedDimension(usize),

    /// 某一轴长度为 0. 参数为轴下标.
    EmptyAxis(usize),

    /// 体素间距的分量数与掩膜维度不一致.
    SpacingLength {
        /// 掩膜维度.
        expected: usize,
        /// 体素间距分量数.
        actual: usize,
    },

    /// 体素间距分量不是有限正数.
    ///
    /// 第一个参数代表轴下标, 第二个参数代表非法的分量值.
    InvalidSpacing(usize, f64),

    /// 百分位不在 `(0, 100]` 中.
    PercentileOutOfRange(f64),

    /// 表面距离类指标需要的边界不存在. 参数指出哪一个掩膜没有前景.
    NoSurface(MaskRole),
}

impl MetricError {
    /// 错误分类.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSurface(_) => ErrorKind::UndefinedMetric,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { prediction, truth } => write!(
                f,
                "shape mismatch: prediction {prediction:?} vs truth {truth:?}"
            ),
            Self::UnsupportedDimension(n) => {
                write!(f, "unsupported dimensionality {n}, expected 2 or 3")
            }
            Self::EmptyAxis(axis) => write!(f, "axis {axis} has length 0"),
            Self::SpacingLength { expected, actual } => write!(
                f,
                "spacing has {actual} components, mask has {expected} axes"
            ),
            Self::InvalidSpacing(axis, v) => {
                write!(f, "spacing along axis {axis} must be finite and > 0, got {v}")
            }
            Self::PercentileOutOfRange(p) => {
                write!(f, "percentile must lie in (0, 100], got {p}")
            }
            Self::NoSurface(role) => write!(
                f,
                "{role} mask has no foreground, surface distance is undefined"
            ),
        }
    }
}

impl std::error::Error for MetricError {}

/// 评估结果.
pub type EvalResult<T> = Result<T, MetricError>;
