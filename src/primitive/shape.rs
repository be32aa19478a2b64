use crate::error::{PrimitiveError, Result};

/// Extents of an inner product: minibatch, input/output channels and kernel window.
///
/// A 1x1 window is the pure channel contraction of a fully-connected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeParams {
    pub mb: usize,
    pub ic: usize,
    pub oc: usize,
    pub kh: usize,
    pub kw: usize,
}

impl ShapeParams {
    pub fn new(mb: usize, ic: usize, oc: usize, kh: usize, kw: usize) -> Result<Self> {
        let shape = ShapeParams { mb, ic, oc, kh, kw };
        if [mb, ic, oc, kh, kw].contains(&0) {
            return Err(PrimitiveError::InvalidDims {
                dims: vec![mb, ic, oc, kh, kw],
                reason: "every extent must be positive",
            });
        }
        Ok(shape)
    }

    pub fn inner_product(mb: usize, ic: usize, oc: usize) -> Result<Self> {
        ShapeParams::new(mb, ic, oc, 1, 1)
    }

    pub fn has_spatial(&self) -> bool {
        self.kh > 1 || self.kw > 1
    }

    /// Number of products summed into each destination element.
    pub fn reduction_len(&self) -> usize {
        self.ic * self.kh * self.kw
    }

    pub fn src_dims(&self, spatial: bool) -> Vec<usize> {
        if spatial {
            vec![self.mb, self.ic, self.kh, self.kw]
        } else {
            vec![self.mb, self.ic]
        }
    }

    pub fn weights_dims(&self, spatial: bool) -> Vec<usize> {
        if spatial {
            vec![self.oc, self.ic, self.kh, self.kw]
        } else {
            vec![self.oc, self.ic]
        }
    }

    pub fn bias_dims(&self) -> Vec<usize> {
        vec![self.oc]
    }

    pub fn dst_dims(&self) -> Vec<usize> {
        vec![self.mb, self.oc]
    }
}
