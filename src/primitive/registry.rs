use tracing::debug;

use crate::error::{PrimitiveError, Result};

use super::{Algorithm, OpDesc};

/// Ordered list of candidate implementations; the first one whose constraint
/// accepts a descriptor wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    algorithms: Vec<Algorithm>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry {
            algorithms: vec![Algorithm::DensePlain, Algorithm::Reference],
        }
    }
}

impl Registry {
    pub fn new(algorithms: Vec<Algorithm>) -> Self {
        Registry { algorithms }
    }

    pub fn reference_only() -> Self {
        Registry::new(vec![Algorithm::Reference])
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn select(&self, desc: &OpDesc) -> Result<Algorithm> {
        let mut last_rejection = None;
        for &algorithm in &self.algorithms {
            match algorithm.constraint(desc) {
                Ok(()) => {
                    debug!(primitive = %desc.kind(), %algorithm, "selected implementation");
                    return Ok(algorithm);
                }
                Err(err) => {
                    debug!(primitive = %desc.kind(), %algorithm, reason = %err, "implementation rejected");
                    last_rejection = Some(err);
                }
            }
        }
        Err(PrimitiveError::NoImplementation {
            primitive: desc.kind(),
            reason: last_rejection
                .map(|err| err.to_string())
                .unwrap_or_else(|| "registry is empty".to_string()),
        })
    }
}
