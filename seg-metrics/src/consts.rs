//! 通用常量.

/// 数值掩膜二值化阈值. 严格大于该值的体素为前景.
pub const BINARIZE_THRESHOLD: f64 = 0.5;

/// 鲁棒 Hausdorff 距离的默认百分位.
pub const DEFAULT_PERCENTILE: f64 = 95.0;

/// 每毫升对应的立方毫米数. 体积统计以 mL 为单位.
pub const MM3_PER_ML: f64 = 1000.0;
