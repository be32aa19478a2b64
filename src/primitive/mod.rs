//! Forward inner-product and convolution primitives.
//!
//! A [`Primitive`] is created once from an operation descriptor and bound to the
//! first [`Algorithm`] in a [`Registry`] that accepts it. Execution borrows the
//! operand buffers for one call and writes only the destination.

mod algorithm;
mod config;
mod dense;
mod desc;
mod reference;
mod registry;
mod shape;

pub use algorithm::Algorithm;
pub use config::{ExecConfig, GRAIN_ENV, NUM_THREADS_ENV};
pub use desc::{ConvolutionDesc, InnerProductDesc};
pub use registry::Registry;
pub use shape::ShapeParams;

use std::fmt;
use std::sync::Arc;

use rayon::ThreadPool;
use tracing::{trace, warn};

use crate::error::{PrimitiveError, Result, Status};
use crate::tensor::{TensorDesc, TensorView, TensorViewMut};

/// Which operation a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    InnerProduct,
    Convolution,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::InnerProduct => write!(f, "inner_product"),
            PrimitiveKind::Convolution => write!(f, "convolution"),
        }
    }
}

/// Propagation direction. Only `Forward` is executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    Forward,
    BackwardData,
    BackwardWeights,
    BackwardBias,
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKind::Forward => write!(f, "forward"),
            PropKind::BackwardData => write!(f, "backward_data"),
            PropKind::BackwardWeights => write!(f, "backward_weights"),
            PropKind::BackwardBias => write!(f, "backward_bias"),
        }
    }
}

/// Any operation descriptor the registry can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpDesc {
    InnerProduct(InnerProductDesc),
    Convolution(ConvolutionDesc),
}

impl OpDesc {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            OpDesc::InnerProduct(_) => PrimitiveKind::InnerProduct,
            OpDesc::Convolution(_) => PrimitiveKind::Convolution,
        }
    }

    pub fn prop_kind(&self) -> PropKind {
        match self {
            OpDesc::InnerProduct(d) => d.prop_kind(),
            OpDesc::Convolution(d) => d.prop_kind(),
        }
    }

    pub fn src(&self) -> &TensorDesc {
        match self {
            OpDesc::InnerProduct(d) => d.src(),
            OpDesc::Convolution(d) => d.src(),
        }
    }

    pub fn weights(&self) -> &TensorDesc {
        match self {
            OpDesc::InnerProduct(d) => d.weights(),
            OpDesc::Convolution(d) => d.weights(),
        }
    }

    pub fn bias(&self) -> Option<&TensorDesc> {
        match self {
            OpDesc::InnerProduct(d) => d.bias(),
            OpDesc::Convolution(d) => d.bias(),
        }
    }

    pub fn dst(&self) -> &TensorDesc {
        match self {
            OpDesc::InnerProduct(d) => d.dst(),
            OpDesc::Convolution(d) => d.dst(),
        }
    }

    /// Named operand descriptors, skipping an absent bias.
    pub fn operands(&self) -> impl Iterator<Item = (&'static str, &TensorDesc)> + '_ {
        [
            ("src", Some(self.src())),
            ("weights", Some(self.weights())),
            ("bias", self.bias()),
            ("dst", Some(self.dst())),
        ]
        .into_iter()
        .filter_map(|(name, desc)| desc.map(|d| (name, d)))
    }
}

impl From<InnerProductDesc> for OpDesc {
    fn from(desc: InnerProductDesc) -> Self {
        OpDesc::InnerProduct(desc)
    }
}

impl From<ConvolutionDesc> for OpDesc {
    fn from(desc: ConvolutionDesc) -> Self {
        OpDesc::Convolution(desc)
    }
}

/// Buffers for one forward execution.
#[derive(Debug)]
pub struct Operands<'a> {
    pub src: TensorView<'a>,
    pub weights: TensorView<'a>,
    pub bias: Option<TensorView<'a>>,
    pub dst: TensorViewMut<'a>,
}

impl<'a> Operands<'a> {
    pub fn new(
        src: TensorView<'a>,
        weights: TensorView<'a>,
        bias: Option<TensorView<'a>>,
        dst: TensorViewMut<'a>,
    ) -> Self {
        Operands {
            src,
            weights,
            bias,
            dst,
        }
    }
}

fn check_operand(operand: &'static str, expected: &TensorDesc, got: &TensorDesc) -> Result<()> {
    if expected.dims() != got.dims() {
        return Err(PrimitiveError::ShapeMismatch {
            operand,
            expected: expected.dims().to_vec(),
            got: got.dims().to_vec(),
        });
    }
    if expected != got {
        return Err(PrimitiveError::DescriptorMismatch { operand });
    }
    Ok(())
}

/// A descriptor bound to an implementation, ready to execute.
#[derive(Debug)]
pub struct Primitive {
    desc: OpDesc,
    algorithm: Algorithm,
    config: ExecConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl Primitive {
    /// Bind `desc` to the first implementation in `registry` that accepts it.
    pub fn new(desc: impl Into<OpDesc>, registry: &Registry, config: ExecConfig) -> Result<Self> {
        let desc = desc.into();
        let algorithm = registry.select(&desc)?;
        Primitive::build(desc, algorithm, config)
    }

    /// Bind `desc` to a specific implementation, still subject to its constraint.
    pub fn with_algorithm(
        desc: impl Into<OpDesc>,
        algorithm: Algorithm,
        config: ExecConfig,
    ) -> Result<Self> {
        let desc = desc.into();
        if let Err(err) = algorithm.constraint(&desc) {
            warn!(primitive = %desc.kind(), %algorithm, reason = %err, "requested implementation rejected");
            return Err(err);
        }
        Primitive::build(desc, algorithm, config)
    }

    fn build(desc: OpDesc, algorithm: Algorithm, config: ExecConfig) -> Result<Self> {
        let pool = config.build_pool()?;
        Ok(Primitive {
            desc,
            algorithm,
            config,
            pool,
        })
    }

    pub fn desc(&self) -> &OpDesc {
        &self.desc
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.desc.kind()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Run the forward pass.
    ///
    /// Operand descriptors must equal the ones the primitive was created with; on
    /// any mismatch the call fails before the destination is touched.
    pub fn execute_forward(&self, operands: Operands<'_>) -> Result<()> {
        self.check_operands(&operands)?;
        let Operands {
            src,
            weights,
            bias,
            mut dst,
        } = operands;

        trace!(
            primitive = %self.kind(),
            algorithm = %self.algorithm,
            src = %src.desc(),
            weights = %weights.desc(),
            dst = %dst.desc(),
            "execute forward"
        );

        let algorithm = self.algorithm;
        let desc = &self.desc;
        let grain = self.config.grain;
        match &self.pool {
            Some(pool) => pool
                .install(|| algorithm.execute_forward(desc, src, weights, bias, &mut dst, grain)),
            None => algorithm.execute_forward(desc, src, weights, bias, &mut dst, grain),
        }
    }

    /// [`Primitive::execute_forward`] reduced to a status code for pipeline stages.
    pub fn execute(&self, operands: Operands<'_>) -> Status {
        Status::from(&self.execute_forward(operands))
    }

    fn check_operands(&self, operands: &Operands<'_>) -> Result<()> {
        check_operand("src", self.desc.src(), operands.src.desc())?;
        check_operand("weights", self.desc.weights(), operands.weights.desc())?;
        match (self.desc.bias(), &operands.bias) {
            (Some(expected), Some(view)) => check_operand("bias", expected, view.desc())?,
            (Some(_), None) => return Err(PrimitiveError::MissingOperand { operand: "bias" }),
            (None, Some(_)) => return Err(PrimitiveError::UnexpectedOperand { operand: "bias" }),
            (None, None) => {}
        }
        check_operand("dst", self.desc.dst(), operands.dst.desc())
    }
}
