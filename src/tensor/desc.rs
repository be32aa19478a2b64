use std::fmt;

use crate::error::{PrimitiveError, Result};

use super::format::{Layout, MemoryFormat, Precision, CHANNEL_AXIS};

/// Maximum rank a descriptor accepts.
pub const MAX_NDIMS: usize = 8;

/// Immutable description of a tensor: logical dims, precision and storage layout.
///
/// The descriptor owns the logical-to-physical index mapping. For every logical
/// index inside `dims` it yields a distinct offset in `0..nelems()`.
#[derive(Debug, Clone)]
pub struct TensorDesc {
    dims: Vec<usize>,
    precision: Precision,
    layout: Layout,
    format: Option<MemoryFormat>,
    // Per logical dim. For a blocked channel axis this is the stride of `c / block`.
    strides: Vec<usize>,
    nelems: usize,
}

impl TensorDesc {
    /// Describe a tensor stored in one of the named formats.
    pub fn new(dims: &[usize], precision: Precision, format: MemoryFormat) -> Result<Self> {
        if dims.len() != format.ndims() {
            return Err(PrimitiveError::RankMismatch {
                format: format.to_string(),
                expected: format.ndims(),
                got: dims.len(),
            });
        }
        let mut desc = TensorDesc::with_layout(dims, precision, format.layout())?;
        desc.format = Some(format);
        Ok(desc)
    }

    /// Describe a tensor with an arbitrary plain or blocked layout.
    pub fn with_layout(dims: &[usize], precision: Precision, layout: Layout) -> Result<Self> {
        let rank = dims.len();
        if rank == 0 || rank > MAX_NDIMS {
            return Err(PrimitiveError::InvalidDims {
                dims: dims.to_vec(),
                reason: "rank must be between 1 and 8",
            });
        }
        if dims.contains(&0) {
            return Err(PrimitiveError::InvalidDims {
                dims: dims.to_vec(),
                reason: "every extent must be positive",
            });
        }

        let order = layout.order();
        let mut seen = [false; MAX_NDIMS];
        let is_permutation = order.len() == rank
            && order.iter().all(|&d| {
                if d >= rank || seen[d] {
                    return false;
                }
                seen[d] = true;
                true
            });
        if !is_permutation {
            return Err(PrimitiveError::InvalidOrder {
                order: order.to_vec(),
                rank,
            });
        }

        if let Some(block) = layout.block() {
            if rank <= CHANNEL_AXIS {
                return Err(PrimitiveError::InvalidDims {
                    dims: dims.to_vec(),
                    reason: "blocked layouts need a channel axis",
                });
            }
            if block == 0 {
                return Err(PrimitiveError::InvalidDims {
                    dims: dims.to_vec(),
                    reason: "block size must be positive",
                });
            }
            if dims[CHANNEL_AXIS] % block != 0 {
                return Err(PrimitiveError::IndivisibleBlock {
                    channels: dims[CHANNEL_AXIS],
                    block,
                });
            }
        }

        let (strides, nelems) =
            compute_strides(dims, &layout).ok_or_else(|| PrimitiveError::InvalidDims {
                dims: dims.to_vec(),
                reason: "element count overflows usize",
            })?;
        Ok(TensorDesc {
            dims: dims.to_vec(),
            precision,
            layout,
            format: None,
            strides,
            nelems,
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    pub fn nelems(&self) -> usize {
        self.nelems
    }

    pub fn size_in_bytes(&self) -> usize {
        self.nelems * self.precision.size_in_bytes()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The named format this descriptor was built from, if any.
    pub fn format(&self) -> Option<MemoryFormat> {
        self.format
    }

    /// Physical offset of a logical multi-index.
    ///
    /// # Panics
    ///
    /// Panics if the index does not have one in-bounds coordinate per
    /// dimension. Use [`TensorDesc::try_offset`] for untrusted input.
    pub fn offset(&self, index: &[usize]) -> usize {
        assert!(
            self.contains(index),
            "index {:?} outside {:?}",
            index,
            self.dims
        );
        self.map_index(index)
    }

    /// Offset of an index the caller already knows to be in bounds.
    #[inline]
    pub(crate) fn map_index(&self, index: &[usize]) -> usize {
        debug_assert!(self.contains(index), "index {index:?} outside {:?}", self.dims);
        match self.layout.block() {
            None => index
                .iter()
                .zip(&self.strides)
                .map(|(&i, &s)| i * s)
                .sum(),
            Some(block) => index
                .iter()
                .zip(&self.strides)
                .enumerate()
                .map(|(axis, (&i, &s))| {
                    if axis == CHANNEL_AXIS {
                        (i / block) * s + i % block
                    } else {
                        i * s
                    }
                })
                .sum(),
        }
    }

    pub fn try_offset(&self, index: &[usize]) -> Result<usize> {
        if !self.contains(index) {
            return Err(PrimitiveError::IndexOutOfBounds {
                index: index.to_vec(),
                dims: self.dims.clone(),
            });
        }
        Ok(self.map_index(index))
    }

    /// Physical offset of the element whose row-major logical position is `linear`.
    ///
    /// # Panics
    ///
    /// Panics if `linear` is not below [`TensorDesc::nelems`].
    pub fn offset_of_linear(&self, linear: usize) -> usize {
        assert!(
            linear < self.nelems,
            "linear index {} outside {} elements",
            linear,
            self.nelems
        );
        let mut index = [0usize; MAX_NDIMS];
        let rank = self.dims.len();
        let mut rest = linear;
        for axis in (0..rank).rev() {
            index[axis] = rest % self.dims[axis];
            rest /= self.dims[axis];
        }
        self.map_index(&index[..rank])
    }

    pub fn contains(&self, index: &[usize]) -> bool {
        index.len() == self.dims.len() && index.iter().zip(&self.dims).all(|(i, d)| i < d)
    }

    /// Visit every logical index in row-major order.
    pub fn for_each_index<F: FnMut(&[usize])>(&self, mut f: F) {
        let rank = self.dims.len();
        let mut index = [0usize; MAX_NDIMS];
        for _ in 0..self.nelems {
            f(&index[..rank]);
            for axis in (0..rank).rev() {
                index[axis] += 1;
                if index[axis] < self.dims[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
    }

    /// Same dims and precision, possibly different layout.
    pub fn is_compatible(&self, other: &TensorDesc) -> bool {
        self.dims == other.dims && self.precision == other.precision
    }
}

impl PartialEq for TensorDesc {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.precision == other.precision && self.layout == other.layout
    }
}

impl Eq for TensorDesc {}

impl fmt::Display for TensorDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{}", d)?;
        }
        match (self.format, &self.layout) {
            (Some(format), _) => write!(f, ":{}", format)?,
            (None, Layout::Plain { order }) => write!(f, ":plain{:?}", order)?,
            (None, Layout::Blocked { order, block }) => {
                write!(f, ":blocked{:?}/{}", order, block)?
            }
        }
        write!(f, ":{}", self.precision)
    }
}

/// Strides per logical dim and the total element count; `None` on overflow.
fn compute_strides(dims: &[usize], layout: &Layout) -> Option<(Vec<usize>, usize)> {
    let block = layout.block();
    let mut strides = vec![0usize; dims.len()];
    let mut acc = block.unwrap_or(1);
    for &axis in layout.order().iter().rev() {
        strides[axis] = acc;
        acc = acc.checked_mul(match block {
            Some(k) if axis == CHANNEL_AXIS => dims[axis] / k,
            _ => dims[axis],
        })?;
    }
    Some((strides, acc))
}
