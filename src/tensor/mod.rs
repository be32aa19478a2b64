mod desc;
mod format;
mod reorder;
mod tensor;
mod view;

pub use desc::{TensorDesc, MAX_NDIMS};
pub use format::{Layout, MemoryFormat, Precision, CHANNEL_AXIS};
pub use reorder::reorder;
pub use tensor::Tensor;
pub use view::{TensorView, TensorViewMut};
