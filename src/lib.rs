//! Layout-aware reference inner-product and convolution primitives for CPU.
//!
//! Every tensor operand carries a [`tensor::TensorDesc`] that maps logical
//! indices to physical offsets, either plain (a permuted row-major order such as
//! `nchw` or `nhwc`) or channel-blocked (such as `nChw8c`). Primitives produce
//! the same logical result for any mix of operand layouts.
//!
//! # Example
//!
//! ```
//! use microdnn::primitive::{ExecConfig, InnerProductDesc, Operands, Primitive, PropKind, Registry, ShapeParams};
//! use microdnn::tensor::{MemoryFormat, Precision, Tensor, TensorDesc};
//!
//! let shape = ShapeParams::new(2, 16, 4, 3, 3).unwrap();
//! let src = TensorDesc::new(&[2, 16, 3, 3], Precision::F32, MemoryFormat::NChw8c).unwrap();
//! let weights = TensorDesc::new(&[4, 16, 3, 3], Precision::F32, MemoryFormat::Oihw).unwrap();
//! let dst = TensorDesc::new(&[2, 4], Precision::F32, MemoryFormat::Nc).unwrap();
//! let desc = InnerProductDesc::new(PropKind::Forward, shape, src.clone(), weights.clone(), None, dst.clone()).unwrap();
//!
//! let ip = Primitive::new(desc, &Registry::default(), ExecConfig::default()).unwrap();
//!
//! let src = Tensor::filled(src, 1.0);
//! let weights = Tensor::filled(weights, 0.5);
//! let mut dst = Tensor::zeros(dst);
//! ip.execute_forward(Operands::new(src.view(), weights.view(), None, dst.view_mut())).unwrap();
//! assert_eq!(dst.get(&[1, 3]), 72.0);
//! ```

/// Crate-wide error type and pipeline status codes.
pub mod error;
/// Tensor descriptors, formats, views and reorder.
pub mod tensor;
/// Inner-product and convolution primitives, implementations and registry.
pub mod primitive;

pub use error::{PrimitiveError, Result, Status};
