use crate::error::{PrimitiveError, Result};
use crate::tensor::TensorDesc;

use super::shape::ShapeParams;
use super::PropKind;

fn expect_dims(operand: &'static str, desc: &TensorDesc, expected: &[usize]) -> Result<()> {
    if desc.dims() != expected {
        return Err(PrimitiveError::ShapeMismatch {
            operand,
            expected: expected.to_vec(),
            got: desc.dims().to_vec(),
        });
    }
    Ok(())
}

/// Setup-time description of an inner product: shape plus one descriptor per operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerProductDesc {
    prop_kind: PropKind,
    shape: ShapeParams,
    src: TensorDesc,
    weights: TensorDesc,
    bias: Option<TensorDesc>,
    dst: TensorDesc,
}

impl InnerProductDesc {
    /// Check that every operand descriptor agrees with `shape`.
    ///
    /// Source and weights are either both 2-D (`[mb, ic]`, `[oc, ic]`, only for a
    /// 1x1 window) or both 4-D with the kernel window as spatial extent.
    pub fn new(
        prop_kind: PropKind,
        shape: ShapeParams,
        src: TensorDesc,
        weights: TensorDesc,
        bias: Option<TensorDesc>,
        dst: TensorDesc,
    ) -> Result<Self> {
        let spatial = src.ndims() == 4 || shape.has_spatial();
        expect_dims("src", &src, &shape.src_dims(spatial))?;
        expect_dims("weights", &weights, &shape.weights_dims(spatial))?;
        if let Some(bias) = &bias {
            expect_dims("bias", bias, &shape.bias_dims())?;
        }
        expect_dims("dst", &dst, &shape.dst_dims())?;

        Ok(InnerProductDesc {
            prop_kind,
            shape,
            src,
            weights,
            bias,
            dst,
        })
    }

    pub fn prop_kind(&self) -> PropKind {
        self.prop_kind
    }

    pub fn shape(&self) -> &ShapeParams {
        &self.shape
    }

    /// True when source and weights carry the kernel window as two extra dims.
    pub fn is_spatial(&self) -> bool {
        self.src.ndims() == 4
    }

    pub fn src(&self) -> &TensorDesc {
        &self.src
    }

    pub fn weights(&self) -> &TensorDesc {
        &self.weights
    }

    pub fn bias(&self) -> Option<&TensorDesc> {
        self.bias.as_ref()
    }

    pub fn dst(&self) -> &TensorDesc {
        &self.dst
    }
}

/// Setup-time description of a 2-D convolution with zero padding.
///
/// Source `[mb, ic, ih, iw]`, weights `[oc, ic, kh, kw]`, optional bias `[oc]`,
/// destination `[mb, oc, oh, ow]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvolutionDesc {
    prop_kind: PropKind,
    src: TensorDesc,
    weights: TensorDesc,
    bias: Option<TensorDesc>,
    dst: TensorDesc,
    strides: [usize; 2],
    padding: [usize; 2],
}

impl ConvolutionDesc {
    pub fn new(
        prop_kind: PropKind,
        src: TensorDesc,
        weights: TensorDesc,
        bias: Option<TensorDesc>,
        dst: TensorDesc,
        strides: [usize; 2],
        padding: [usize; 2],
    ) -> Result<Self> {
        for (operand, desc) in [("src", &src), ("weights", &weights), ("dst", &dst)] {
            if desc.ndims() != 4 {
                return Err(PrimitiveError::RankMismatch {
                    format: format!("convolution {}", operand),
                    expected: 4,
                    got: desc.ndims(),
                });
            }
        }
        if strides.contains(&0) {
            return Err(PrimitiveError::InvalidDims {
                dims: strides.to_vec(),
                reason: "strides must be positive",
            });
        }

        let (mb, ic, ih, iw) = (src.dims()[0], src.dims()[1], src.dims()[2], src.dims()[3]);
        let (oc, kh, kw) = (weights.dims()[0], weights.dims()[2], weights.dims()[3]);
        expect_dims("weights", &weights, &[oc, ic, kh, kw])?;
        let padded = |extent: usize, pad: usize| {
            pad.checked_mul(2)
                .and_then(|p| extent.checked_add(p))
                .ok_or_else(|| PrimitiveError::InvalidDims {
                    dims: padding.to_vec(),
                    reason: "padded extent overflows usize",
                })
        };
        let (padded_h, padded_w) = (padded(ih, padding[0])?, padded(iw, padding[1])?);
        if padded_h < kh || padded_w < kw {
            return Err(PrimitiveError::InvalidDims {
                dims: weights.dims().to_vec(),
                reason: "kernel does not fit inside the padded source",
            });
        }
        let oh = (padded_h - kh) / strides[0] + 1;
        let ow = (padded_w - kw) / strides[1] + 1;
        if let Some(bias) = &bias {
            expect_dims("bias", bias, &[oc])?;
        }
        expect_dims("dst", &dst, &[mb, oc, oh, ow])?;

        Ok(ConvolutionDesc {
            prop_kind,
            src,
            weights,
            bias,
            dst,
            strides,
            padding,
        })
    }

    pub fn prop_kind(&self) -> PropKind {
        self.prop_kind
    }

    pub fn src(&self) -> &TensorDesc {
        &self.src
    }

    pub fn weights(&self) -> &TensorDesc {
        &self.weights
    }

    pub fn bias(&self) -> Option<&TensorDesc> {
        self.bias.as_ref()
    }

    pub fn dst(&self) -> &TensorDesc {
        &self.dst
    }

    pub fn strides(&self) -> [usize; 2] {
        self.strides
    }

    pub fn padding(&self) -> [usize; 2] {
        self.padding
    }

    /// Minibatch, channels and kernel window of this convolution.
    pub fn shape(&self) -> ShapeParams {
        let w = self.weights.dims();
        ShapeParams {
            mb: self.src.dims()[0],
            ic: w[1],
            oc: w[0],
            kh: w[2],
            kw: w[3],
        }
    }

    pub fn output_spatial(&self) -> [usize; 2] {
        [self.dst.dims()[2], self.dst.dims()[3]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{MemoryFormat, Precision};

    fn desc(dims: &[usize], format: MemoryFormat) -> TensorDesc {
        TensorDesc::new(dims, Precision::F32, format).unwrap()
    }

    #[test]
    fn inner_product_accepts_consistent_shapes() {
        let shape = ShapeParams::new(2, 32, 48, 6, 6).unwrap();
        let ip = InnerProductDesc::new(
            PropKind::Forward,
            shape,
            desc(&[2, 32, 6, 6], MemoryFormat::NChw8c),
            desc(&[48, 32, 6, 6], MemoryFormat::Oihw),
            Some(desc(&[48], MemoryFormat::X)),
            desc(&[2, 48], MemoryFormat::Nc),
        )
        .unwrap();
        assert!(ip.is_spatial());
    }

    #[test]
    fn inner_product_rejects_channel_mismatch() {
        let shape = ShapeParams::inner_product(2, 32, 16).unwrap();
        let err = InnerProductDesc::new(
            PropKind::Forward,
            shape,
            desc(&[2, 32], MemoryFormat::Nc),
            desc(&[16, 31], MemoryFormat::Oi),
            None,
            desc(&[2, 16], MemoryFormat::Nc),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PrimitiveError::ShapeMismatch {
                operand: "weights",
                expected: vec![16, 32],
                got: vec![16, 31],
            }
        );
    }

    #[test]
    fn flat_source_needs_unit_window() {
        let shape = ShapeParams::new(2, 8, 4, 3, 3).unwrap();
        let err = InnerProductDesc::new(
            PropKind::Forward,
            shape,
            desc(&[2, 8], MemoryFormat::Nc),
            desc(&[4, 8], MemoryFormat::Oi),
            None,
            desc(&[2, 4], MemoryFormat::Nc),
        )
        .unwrap_err();
        assert!(matches!(err, PrimitiveError::ShapeMismatch { operand: "src", .. }));
    }

    #[test]
    fn convolution_rejects_overflowing_padding() {
        let err = ConvolutionDesc::new(
            PropKind::Forward,
            desc(&[1, 8, 7, 7], MemoryFormat::Nchw),
            desc(&[4, 8, 3, 3], MemoryFormat::Oihw),
            None,
            desc(&[1, 4, 5, 5], MemoryFormat::Nchw),
            [1, 1],
            [usize::MAX / 2, 0],
        )
        .unwrap_err();
        assert_eq!(
            err,
            PrimitiveError::InvalidDims {
                dims: vec![usize::MAX / 2, 0],
                reason: "padded extent overflows usize",
            }
        );
    }

    #[test]
    fn convolution_shape_reads_weights() {
        let conv = ConvolutionDesc::new(
            PropKind::Forward,
            desc(&[2, 8, 7, 7], MemoryFormat::NChw8c),
            desc(&[4, 8, 3, 3], MemoryFormat::OIhw8i),
            Some(desc(&[4], MemoryFormat::X)),
            desc(&[2, 4, 4, 4], MemoryFormat::Nchw),
            [2, 2],
            [1, 1],
        )
        .unwrap();
        assert_eq!(conv.shape(), ShapeParams::new(2, 8, 4, 3, 3).unwrap());
        assert_eq!(conv.output_spatial(), [4, 4]);
    }

    #[test]
    fn convolution_output_extent_checked() {
        let ok = ConvolutionDesc::new(
            PropKind::Forward,
            desc(&[1, 8, 7, 7], MemoryFormat::Nchw),
            desc(&[4, 8, 3, 3], MemoryFormat::Oihw),
            None,
            desc(&[1, 4, 4, 4], MemoryFormat::Nchw),
            [2, 2],
            [1, 1],
        );
        assert!(ok.is_ok());

        let err = ConvolutionDesc::new(
            PropKind::Forward,
            desc(&[1, 8, 7, 7], MemoryFormat::Nchw),
            desc(&[4, 8, 3, 3], MemoryFormat::Oihw),
            None,
            desc(&[1, 4, 4, 4], MemoryFormat::Nchw),
            [1, 1],
            [0, 0],
        )
        .unwrap_err();
        assert!(matches!(err, PrimitiveError::ShapeMismatch { operand: "dst", .. }));
    }
}
