use std::env;
use std::sync::Arc;

use rayon::ThreadPool;

use crate::error::Result;

pub const NUM_THREADS_ENV: &str = "MICRODNN_NUM_THREADS";
pub const GRAIN_ENV: &str = "MICRODNN_GRAIN";

/// How a primitive spreads its `(minibatch, output channel)` units over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecConfig {
    /// Minimum number of output units handed to one task.
    pub grain: usize,
    /// Dedicated pool size; `None` runs on the global rayon pool.
    pub num_threads: Option<usize>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        ExecConfig {
            grain: 1,
            num_threads: None,
        }
    }
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|&v| v > 0)
}

impl ExecConfig {
    pub fn with_grain(mut self, grain: usize) -> Self {
        self.grain = grain.max(1);
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads.max(1));
        self
    }

    /// Defaults overridden by `MICRODNN_NUM_THREADS` and `MICRODNN_GRAIN`.
    ///
    /// Unset, empty or non-positive values keep the default.
    pub fn from_env() -> Self {
        let mut config = ExecConfig::default();
        if let Some(n) = env::var(NUM_THREADS_ENV).ok().as_deref().and_then(parse_positive) {
            config.num_threads = Some(n);
        }
        if let Some(g) = env::var(GRAIN_ENV).ok().as_deref().and_then(parse_positive) {
            config.grain = g;
        }
        config
    }

    pub(crate) fn build_pool(&self) -> Result<Option<Arc<ThreadPool>>> {
        match self.num_threads {
            None => Ok(None),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("microdnn-{}", i))
                    .build()?;
                Ok(Some(Arc::new(pool)))
            }
        }
    }
}
