//! Reference forward kernels.
//!
//! Every read and write goes through the operand's own descriptor, so any mix of
//! plain and blocked layouts gives the same logical result. Work is split over
//! `(n, oc)` units; each unit accumulates sequentially in a fixed order and the
//! unit results are scattered into the destination afterwards.

use rayon::prelude::*;

use crate::tensor::{TensorDesc, TensorView, TensorViewMut};

use super::desc::{ConvolutionDesc, InnerProductDesc};

fn dims4(desc: &TensorDesc) -> [usize; 4] {
    let d = desc.dims();
    [d[0], d[1], d[2], d[3]]
}

/// `dst[n, oc] = bias[oc] + sum over (ic, kh, kw) of src[n, ic, kh, kw] * weights[oc, ic, kh, kw]`
pub(crate) fn inner_product_fwd(
    desc: &InnerProductDesc,
    src: TensorView<'_>,
    weights: TensorView<'_>,
    bias: Option<TensorView<'_>>,
    dst: &mut TensorViewMut<'_>,
    grain: usize,
) {
    let shape = *desc.shape();
    let spatial = desc.is_spatial();

    let values: Vec<f32> = (0..shape.mb * shape.oc)
        .into_par_iter()
        .with_min_len(grain)
        .map(|unit| {
            let n = unit / shape.oc;
            let oc = unit % shape.oc;
            let mut acc = bias.map_or(0.0, |b| b.at(&[oc]));
            for ic in 0..shape.ic {
                if !spatial {
                    acc += src.at(&[n, ic]) * weights.at(&[oc, ic]);
                    continue;
                }
                for kh in 0..shape.kh {
                    for kw in 0..shape.kw {
                        acc += src.at(&[n, ic, kh, kw]) * weights.at(&[oc, ic, kh, kw]);
                    }
                }
            }
            acc
        })
        .collect();

    for (unit, value) in values.into_iter().enumerate() {
        dst.set_at(&[unit / shape.oc, unit % shape.oc], value);
    }
}

/// Direct convolution with zero padding; positions that fall into the padding
/// contribute nothing.
pub(crate) fn convolution_fwd(
    desc: &ConvolutionDesc,
    src: TensorView<'_>,
    weights: TensorView<'_>,
    bias: Option<TensorView<'_>>,
    dst: &mut TensorViewMut<'_>,
    grain: usize,
) {
    let [mb, in_channels, in_h, in_w] = dims4(desc.src());
    let [out_channels, _, kernel_h, kernel_w] = dims4(desc.weights());
    let [out_h, out_w] = desc.output_spatial();
    let [stride_h, stride_w] = desc.strides();
    let [pad_h, pad_w] = desc.padding();

    let planes: Vec<Vec<f32>> = (0..mb * out_channels)
        .into_par_iter()
        .with_min_len(grain)
        .map(|unit| {
            let n = unit / out_channels;
            let oc = unit % out_channels;
            let init = bias.map_or(0.0, |b| b.at(&[oc]));
            let mut plane = Vec::with_capacity(out_h * out_w);
            for oh in 0..out_h {
                for ow in 0..out_w {
                    let mut acc = init;
                    for ic in 0..in_channels {
                        for kh in 0..kernel_h {
                            let ih = match (oh * stride_h + kh).checked_sub(pad_h) {
                                Some(ih) if ih < in_h => ih,
                                _ => continue,
                            };
                            for kw in 0..kernel_w {
                                let iw = match (ow * stride_w + kw).checked_sub(pad_w) {
                                    Some(iw) if iw < in_w => iw,
                                    _ => continue,
                                };
                                acc += src.at(&[n, ic, ih, iw]) * weights.at(&[oc, ic, kh, kw]);
                            }
                        }
                    }
                    plane.push(acc);
                }
            }
            plane
        })
        .collect();

    for (unit, plane) in planes.iter().enumerate() {
        let n = unit / out_channels;
        let oc = unit % out_channels;
        for oh in 0..out_h {
            for ow in 0..out_w {
                dst.set_at(&[n, oc, oh, ow], plane[oh * out_w + ow]);
            }
        }
    }
}
