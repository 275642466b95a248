//! 角点格上的邻域编码.

use super::lookup::{SurfelTable, CUBE_CORNERS, SQUARE_CORNERS};
use crate::mask::{BinaryMask, BoundingBox};
use ndarray::{ArrayD, IxDyn, Slice, Zip};

/// 在 `bbox` 范围内 (四周各补一层背景) 计算每个角点的邻域编码.
///
/// 结果每个轴的长度为 `extent + 1`. 下标为 `i` 的角点位于裁剪后体素 `i - 1` 与 `i` 之间.
pub(crate) fn neighbour_codes(mask: &BinaryMask, bbox: &BoundingBox) -> ArrayD<u8> {
    let extent = bbox.extent();
    let padded_shape: Vec<usize> = extent.iter().map(|e| e + 2).collect();
    let mut padded = ArrayD::from_elem(IxDyn(&padded_shape), false);
    padded
        .slice_each_axis_mut(|ax| Slice::from(1..extent[ax.axis.index()] + 1))
        .assign(&mask.view().slice_each_axis(|ax| {
            let k = ax.axis.index();
            Slice::from(bbox.min()[k]..bbox.max()[k] + 1)
        }));

    let corner_shape: Vec<usize> = extent.iter().map(|e| e + 1).collect();
    let offsets: Vec<&[usize]> = match mask.ndim() {
        2 => SQUARE_CORNERS.iter().map(|c| c.as_slice()).collect(),
        _ => CUBE_CORNERS.iter().map(|c| c.as_slice()).collect(),
    };

    let mut codes = ArrayD::<u8>::zeros(IxDyn(&corner_shape));
    for (bit, offset) in offsets.into_iter().enumerate() {
        let shifted = padded.slice_each_axis(|ax| {
            let k = ax.axis.index();
            Slice::from(offset[k]..offset[k] + corner_shape[k])
        });
        Zip::from(&mut codes).and(&shifted).for_each(|code, &v| {
            if v {
                *code |= 1 << bit;
            }
        });
    }
    codes
}

/// 边界角点分布图, 作为距离变换的特征点.
#[inline]
pub(crate) fn border_map(codes: &ArrayD<u8>, table: &SurfelTable) -> ArrayD<bool> {
    codes.mapv(|c| table.is_border(c))
}
