//! 精确欧氏距离变换.
//!
//! 使用 Felzenszwalb & Huttenlocher 的抛物线下包络算法, 对每个轴依次做一维变换,
//! 每个轴以 `spacing[axis]²` 加权. 结果是到最近特征点的平方距离.

use ndarray::{ArrayD, ArrayViewMut1, Axis, Zip};

/// 计算所有位置到最近 `true` 位置的平方物理距离. 没有任何特征点时返回 `None`.
pub(crate) fn squared_distance_transform(
    features: &ArrayD<bool>,
    spacing: &[f64],
) -> Option<ArrayD<f64>> {
    if !features.iter().any(|&f| f) {
        return None;
    }
    let mut dist = features.mapv(|f| if f { 0.0 } else { f64::INFINITY });
    for (axis, &step) in spacing.iter().enumerate() {
        sweep_axis(&mut dist, axis, step * step);
    }
    Some(dist)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::parallel::prelude::*;

        // 每个 rayon 任务复用一份工作区.
        fn sweep_axis(dist: &mut ArrayD<f64>, axis: usize, weight: f64) {
            let n = dist.len_of(Axis(axis));
            Zip::from(dist.lanes_mut(Axis(axis)))
                .into_par_iter()
                .for_each_init(
                    || LowerEnvelope::with_capacity(n),
                    |envelope, (lane,)| envelope.transform(lane, weight),
                );
        }
    } else {
        fn sweep_axis(dist: &mut ArrayD<f64>, axis: usize, weight: f64) {
            let mut envelope = LowerEnvelope::with_capacity(dist.len_of(Axis(axis)));
            Zip::from(dist.lanes_mut(Axis(axis))).for_each(|lane| {
                envelope.transform(lane, weight);
            });
        }
    }
}

/// 一维变换的工作区, 可在多条线之间复用.
struct LowerEnvelope {
    input: Vec<f64>,
    // 包络中各抛物线的顶点位置
    vertices: Vec<usize>,
    // 相邻抛物线的交点, 比 `vertices` 多一个
    bounds: Vec<f64>,
}

impl LowerEnvelope {
    fn with_capacity(n: usize) -> Self {
        Self {
            input: Vec::with_capacity(n),
            vertices: Vec::with_capacity(n),
            bounds: Vec::with_capacity(n + 1),
        }
    }

    /// 原地变换: `out[q] = min_p (weight * (q - p)² + in[p])`.
    fn transform(&mut self, mut lane: ArrayViewMut1<f64>, weight: f64) {
        self.input.clear();
        self.input.extend(lane.iter().copied());
        let g = &self.input;

        let Some(first) = g.iter().position(|v| v.is_finite()) else {
            return;
        };

        let vertices = &mut self.vertices;
        let bounds = &mut self.bounds;
        vertices.clear();
        bounds.clear();
        vertices.push(first);
        bounds.push(f64::NEG_INFINITY);
        bounds.push(f64::INFINITY);

        let parabola = |p: usize| g[p] + weight * (p * p) as f64;
        for q in first + 1..g.len() {
            if !g[q].is_finite() {
                continue;
            }
            let fq = parabola(q);
            let mut s;
            loop {
                // 第一条抛物线的左界为 -inf, 不会被弹出.
                let k = vertices.len() - 1;
                let p = vertices[k];
                s = (fq - parabola(p)) / (2.0 * weight * (q - p) as f64);
                if s <= bounds[k] {
                    vertices.pop();
                    bounds.pop();
                } else {
                    break;
                }
            }
            vertices.push(q);
            if let Some(last) = bounds.last_mut() {
                *last = s;
            }
            bounds.push(f64::INFINITY);
        }

        let mut k = 0;
        for (q, out) in lane.iter_mut().enumerate() {
            while bounds[k + 1] < q as f64 {
                k += 1;
            }
            let p = vertices[k];
            let d = q.abs_diff(p) as f64;
            *out = weight * d * d + g[p];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, Dimension, IxDyn};

    fn brute_force(features: &ArrayD<bool>, spacing: &[f64]) -> ArrayD<f64> {
        let points: Vec<_> = features
            .indexed_iter()
            .filter(|(_, f)| **f)
            .map(|(idx, _)| idx.slice().to_vec())
            .collect();
        ArrayD::from_shape_fn(features.raw_dim(), |idx| {
            points
                .iter()
                .map(|p| {
                    p.iter()
                        .zip(idx.slice())
                        .zip(spacing)
                        .map(|((a, b), s)| {
                            let d = a.abs_diff(*b) as f64 * s;
                            d * d
                        })
                        .sum::<f64>()
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    fn assert_close(a: &ArrayD<f64>, b: &ArrayD<f64>) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9, "{x} != {y}");
        }
    }

    #[test]
    fn test_no_features() {
        let f = ArrayD::from_elem(IxDyn(&[3, 4]), false);
        assert!(squared_distance_transform(&f, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_line() {
        let f = Array2::from_shape_fn((1, 7), |(_, j)| j == 1 || j == 5).into_dyn();
        let d = squared_distance_transform(&f, &[1.0, 2.0]).unwrap();
        let expected = [4.0, 0.0, 4.0, 16.0, 4.0, 0.0, 4.0];
        for (x, y) in d.iter().zip(expected) {
            assert_eq!(*x, y);
        }
    }

    #[test]
    fn test_planar_against_brute_force() {
        let f = Array2::from_shape_fn((9, 11), |(i, j)| (i * 7 + j * 3) % 13 == 0 && i != 4)
            .into_dyn();
        let spacing = [1.5, 0.7];
        let d = squared_distance_transform(&f, &spacing).unwrap();
        assert_close(&d, &brute_force(&f, &spacing));
    }

    #[test]
    fn test_volumetric_against_brute_force() {
        let f = Array3::from_shape_fn((6, 7, 5), |(i, j, k)| (i * 5 + j * 3 + k * 11) % 17 == 2)
            .into_dyn();
        let spacing = [1.0, 0.5, 2.5];
        let d = squared_distance_transform(&f, &spacing).unwrap();
        assert_close(&d, &brute_force(&f, &spacing));

        let mut single = ArrayD::from_elem(IxDyn(&[5, 5, 5]), false);
        single[[4, 0, 2]] = true;
        let d = squared_distance_transform(&single, &spacing).unwrap();
        assert_close(&d, &brute_force(&single, &spacing));
    }

    #[test]
    fn test_many_lanes_share_workspace() {
        // 大量长短不一的线, 其中不少不含特征点.
        let f = Array3::from_shape_fn((23, 19, 17), |(i, j, k)| {
            (i * 13 + j * 7 + k * 5) % 97 == 3 || (i == 11 && k == 8)
        })
        .into_dyn();
        for spacing in [[1.0, 1.0, 1.0], [0.8, 2.0, 1.25]] {
            let d = squared_distance_transform(&f, &spacing).unwrap();
            assert_close(&d, &brute_force(&f, &spacing));
        }
    }
}
