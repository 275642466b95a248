//! 合成测试体模: 离散球体与圆盘.

use crate::{Idx2d, Idx3d};
use ndarray::{Array2, Array3};

#[inline]
fn sq_dist(a: usize, b: usize) -> usize {
    let d = a.abs_diff(b);
    d * d
}

/// 半径为 `radius` 的离散球, 边长 `2 * radius + 1`.
/// 到中心整数偏移满足 `x² + y² + z² <= r²` 的体素为前景.
pub fn ball(radius: usize) -> Array3<bool> {
    let side = 2 * radius + 1;
    place_ball((side, side, side), (radius, radius, radius), radius)
}

/// 半径为 `radius` 的离散圆盘, 边长 `2 * radius + 1`.
pub fn disk(radius: usize) -> Array2<bool> {
    let side = 2 * radius + 1;
    place_disk((side, side), (radius, radius), radius)
}

/// 在形状为 `shape` 的空白体数据中放置一个以 `centre` 为中心的球. 超出边界的部分被裁掉.
pub fn place_ball(shape: Idx3d, centre: Idx3d, radius: usize) -> Array3<bool> {
    let r2 = radius * radius;
    Array3::from_shape_fn(shape, |(i, j, k)| {
        sq_dist(i, centre.0) + sq_dist(j, centre.1) + sq_dist(k, centre.2) <= r2
    })
}

/// 在形状为 `shape` 的空白图像中放置一个以 `centre` 为中心的圆盘. 超出边界的部分被裁掉.
pub fn place_disk(shape: Idx2d, centre: Idx2d, radius: usize) -> Array2<bool> {
    let r2 = radius * radius;
    Array2::from_shape_fn(shape, |(i, j)| {
        sq_dist(i, centre.0) + sq_dist(j, centre.1) <= r2
    })
}
