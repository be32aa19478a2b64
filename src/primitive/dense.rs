//! Inner product over natural row-major operands.
//!
//! With every operand in `nc`/`nchw`/`oi`/`oihw`/`x` order, a source row and a
//! weight row are contiguous slices of length `ic * kh * kw` whose element order
//! matches the reference traversal, so the results are bit-identical.

use rayon::prelude::*;

use crate::tensor::{TensorView, TensorViewMut};

use super::desc::InnerProductDesc;

pub(crate) fn inner_product_fwd(
    desc: &InnerProductDesc,
    src: TensorView<'_>,
    weights: TensorView<'_>,
    bias: Option<TensorView<'_>>,
    dst: &mut TensorViewMut<'_>,
    grain: usize,
) {
    let shape = desc.shape();
    let (mb, oc, k) = (shape.mb, shape.oc, shape.reduction_len());
    let src = &src.data()[..mb * k];
    let weights = &weights.data()[..oc * k];
    let bias = bias.map(|b| &b.data()[..oc]);

    dst.data_mut()[..mb * oc]
        .par_chunks_mut(oc)
        .with_min_len((grain / oc).max(1))
        .enumerate()
        .for_each(|(n, row)| {
            let src_row = &src[n * k..(n + 1) * k];
            for (o, out) in row.iter_mut().enumerate() {
                let w_row = &weights[o * k..(o + 1) * k];
                let mut acc = bias.map_or(0.0, |b| b[o]);
                for (s, w) in src_row.iter().zip(w_row) {
                    acc += s * w;
                }
                *out = acc;
            }
        });
}
