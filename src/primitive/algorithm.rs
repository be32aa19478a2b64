use std::fmt;

use crate::error::{PrimitiveError, Result};
use crate::tensor::{Precision, TensorView, TensorViewMut};

use super::{dense, reference, OpDesc, PrimitiveKind, PropKind};

/// Forward implementations a primitive can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Contiguous-row inner product. Every operand must be in natural row-major order.
    DensePlain,
    /// Layout-agnostic inner product and convolution through the index mapper.
    Reference,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::DensePlain, Algorithm::Reference];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::DensePlain => "dense_plain",
            Algorithm::Reference => "reference",
        }
    }

    /// Accept or reject a descriptor. A rejected descriptor is never executed by
    /// this variant.
    pub fn constraint(self, desc: &OpDesc) -> Result<()> {
        let algorithm = self.name();
        if desc.prop_kind() != PropKind::Forward {
            return Err(PrimitiveError::UnsupportedPropKind {
                algorithm,
                prop_kind: desc.prop_kind(),
            });
        }
        for (_, operand) in desc.operands() {
            if operand.precision() != Precision::F32 {
                return Err(PrimitiveError::UnsupportedPrecision {
                    algorithm,
                    precision: operand.precision(),
                });
            }
        }

        match self {
            Algorithm::Reference => Ok(()),
            Algorithm::DensePlain => {
                if desc.kind() != PrimitiveKind::InnerProduct {
                    return Err(PrimitiveError::Unsupported {
                        algorithm,
                        reason: format!("{} is not implemented", desc.kind()),
                    });
                }
                for (name, operand) in desc.operands() {
                    if !operand.layout().is_row_major() {
                        return Err(PrimitiveError::Unsupported {
                            algorithm,
                            reason: format!("{} layout {} is not row-major", name, operand),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    pub(crate) fn execute_forward(
        self,
        desc: &OpDesc,
        src: TensorView<'_>,
        weights: TensorView<'_>,
        bias: Option<TensorView<'_>>,
        dst: &mut TensorViewMut<'_>,
        grain: usize,
    ) -> Result<()> {
        match (self, desc) {
            (Algorithm::Reference, OpDesc::InnerProduct(d)) => {
                reference::inner_product_fwd(d, src, weights, bias, dst, grain);
            }
            (Algorithm::Reference, OpDesc::Convolution(d)) => {
                reference::convolution_fwd(d, src, weights, bias, dst, grain);
            }
            (Algorithm::DensePlain, OpDesc::InnerProduct(d)) => {
                dense::inner_product_fwd(d, src, weights, bias, dst, grain);
            }
            (Algorithm::DensePlain, OpDesc::Convolution(_)) => {
                return Err(PrimitiveError::Unsupported {
                    algorithm: self.name(),
                    reason: format!("{} is not implemented", PrimitiveKind::Convolution),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
