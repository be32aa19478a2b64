use std::fmt;

use crate::error::Result;

use super::desc::TensorDesc;
use super::reorder::reorder;
use super::view::{TensorView, TensorViewMut};

/// An owned f32 buffer together with its descriptor.
///
/// Element access is by logical index; the descriptor decides where each
/// element lives in `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    desc: TensorDesc,
    data: Vec<f32>,
}

impl Tensor {
    pub fn zeros(desc: TensorDesc) -> Self {
        let data = vec![0.0; desc.nelems()];
        Tensor { desc, data }
    }

    pub fn filled(desc: TensorDesc, val: f32) -> Self {
        let data = vec![val; desc.nelems()];
        Tensor { desc, data }
    }

    /// Build a tensor by evaluating `f` at every logical index.
    pub fn from_fn<F: FnMut(&[usize]) -> f32>(desc: TensorDesc, mut f: F) -> Self {
        let mut data = vec![0.0; desc.nelems()];
        desc.for_each_index(|idx| data[desc.map_index(idx)] = f(idx));
        Tensor { desc, data }
    }

    /// Wrap a buffer that is already laid out according to `desc`.
    pub fn from_vec(desc: TensorDesc, data: Vec<f32>) -> Result<Self> {
        TensorView::new(&desc, &data)?;
        Ok(Tensor { desc, data })
    }

    pub fn desc(&self) -> &TensorDesc {
        &self.desc
    }

    pub fn dims(&self) -> &[usize] {
        self.desc.dims()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn fill(&mut self, val: f32) {
        self.data.fill(val);
    }

    /// Element at a logical index.
    ///
    /// # Panics
    ///
    /// Panics if the index is outside the tensor's dims.
    pub fn get(&self, index: &[usize]) -> f32 {
        self.data[self.desc.offset(index)]
    }

    /// # Panics
    ///
    /// Panics if the index is outside the tensor's dims.
    pub fn set(&mut self, index: &[usize], val: f32) {
        let offset = self.desc.offset(index);
        self.data[offset] = val;
    }

    pub fn view(&self) -> TensorView<'_> {
        TensorView::from_parts(&self.desc, &self.data)
    }

    pub fn view_mut(&mut self) -> TensorViewMut<'_> {
        TensorViewMut::from_parts(&self.desc, &mut self.data)
    }

    /// Copy into a new tensor stored with `desc`. Dims and precision must match.
    pub fn reorder_to(&self, desc: &TensorDesc) -> Result<Tensor> {
        let mut out = Tensor::zeros(desc.clone());
        reorder(&self.view(), &mut out.view_mut())?;
        Ok(out)
    }

    /// Elements in row-major logical order, independent of the storage layout.
    pub fn to_logical_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.desc.nelems());
        self.desc.for_each_index(|idx| out.push(self.data[self.desc.map_index(idx)]));
        out
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.desc)
    }
}
