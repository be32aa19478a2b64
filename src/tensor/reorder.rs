use tracing::trace;

use crate::error::{PrimitiveError, Result};

use super::view::{TensorView, TensorViewMut};

/// Copy `src` into `dst`, converting between their layouts.
///
/// Both descriptors must describe the same logical tensor (dims and precision).
pub fn reorder(src: &TensorView<'_>, dst: &mut TensorViewMut<'_>) -> Result<()> {
    let src_desc = src.desc();
    let dst_desc = dst.desc();
    if !src_desc.is_compatible(dst_desc) {
        return Err(PrimitiveError::ShapeMismatch {
            operand: "reorder destination",
            expected: src_desc.dims().to_vec(),
            got: dst_desc.dims().to_vec(),
        });
    }
    trace!(src = %src_desc, dst = %dst_desc, "reorder");

    if src_desc == dst_desc {
        let n = src_desc.nelems();
        dst.data_mut()[..n].copy_from_slice(&src.data()[..n]);
        return Ok(());
    }

    let data = src.data();
    src_desc.for_each_index(|idx| {
        dst.set_at(idx, data[src_desc.map_index(idx)]);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{MemoryFormat, Precision, Tensor, TensorDesc};

    #[test]
    fn nchw_to_blocked_and_back() {
        let plain = TensorDesc::new(&[2, 16, 3, 3], Precision::F32, MemoryFormat::Nchw).unwrap();
        let blocked =
            TensorDesc::new(&[2, 16, 3, 3], Precision::F32, MemoryFormat::NChw8c).unwrap();
        let t = Tensor::from_fn(plain.clone(), |i| (i[0] * 1000 + i[1] * 100 + i[2] * 10 + i[3]) as f32);

        let b = t.reorder_to(&blocked).unwrap();
        assert_ne!(b.data(), t.data());
        assert_eq!(b.get(&[1, 9, 2, 1]), 1921.0);

        let back = b.reorder_to(&plain).unwrap();
        assert_eq!(back.data(), t.data());
    }

    #[test]
    fn mismatched_dims_rejected() {
        let a = TensorDesc::new(&[2, 3], Precision::F32, MemoryFormat::Nc).unwrap();
        let b = TensorDesc::new(&[3, 2], Precision::F32, MemoryFormat::Nc).unwrap();
        let t = Tensor::zeros(a);
        assert!(matches!(
            t.reorder_to(&b),
            Err(PrimitiveError::ShapeMismatch { .. })
        ));
    }
}
