use crate::error::{PrimitiveError, Result};

use super::desc::TensorDesc;

/// Read-only buffer borrowed together with the descriptor that addresses it.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    desc: &'a TensorDesc,
    data: &'a [f32],
}

impl<'a> TensorView<'a> {
    pub fn new(desc: &'a TensorDesc, data: &'a [f32]) -> Result<Self> {
        check_len(desc, data.len())?;
        Ok(TensorView { desc, data })
    }

    pub(crate) fn from_parts(desc: &'a TensorDesc, data: &'a [f32]) -> Self {
        debug_assert!(data.len() >= desc.nelems());
        TensorView { desc, data }
    }

    pub fn desc(&self) -> &'a TensorDesc {
        self.desc
    }

    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Element at an in-bounds logical index.
    #[inline]
    pub(crate) fn at(&self, index: &[usize]) -> f32 {
        self.data[self.desc.map_index(index)]
    }

    pub fn get(&self, index: &[usize]) -> Result<f32> {
        Ok(self.data[self.desc.try_offset(index)?])
    }
}

/// Mutable counterpart of [`TensorView`].
#[derive(Debug)]
pub struct TensorViewMut<'a> {
    desc: &'a TensorDesc,
    data: &'a mut [f32],
}

impl<'a> TensorViewMut<'a> {
    pub fn new(desc: &'a TensorDesc, data: &'a mut [f32]) -> Result<Self> {
        check_len(desc, data.len())?;
        Ok(TensorViewMut { desc, data })
    }

    pub(crate) fn from_parts(desc: &'a TensorDesc, data: &'a mut [f32]) -> Self {
        debug_assert!(data.len() >= desc.nelems());
        TensorViewMut { desc, data }
    }

    pub fn desc(&self) -> &'a TensorDesc {
        self.desc
    }

    pub fn data(&self) -> &[f32] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut *self.data
    }

    pub fn as_view(&self) -> TensorView<'_> {
        TensorView {
            desc: self.desc,
            data: &*self.data,
        }
    }

    #[inline]
    pub(crate) fn set_at(&mut self, index: &[usize], value: f32) {
        let offset = self.desc.map_index(index);
        self.data[offset] = value;
    }

    pub fn set(&mut self, index: &[usize], value: f32) -> Result<()> {
        let offset = self.desc.try_offset(index)?;
        self.data[offset] = value;
        Ok(())
    }
}

fn check_len(desc: &TensorDesc, len: usize) -> Result<()> {
    if len < desc.nelems() {
        return Err(PrimitiveError::BufferTooSmall {
            len,
            required: desc.nelems(),
        });
    }
    Ok(())
}
