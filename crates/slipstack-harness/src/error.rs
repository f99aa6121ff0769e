#![forbid(unsafe_code)]

use std::path::PathBuf;

use slipstack_core::error::{ConfigError, RegistryError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),

    #[error("step {step} ({op}) rejected by the navigator tree: {source}")]
    Registry {
        step: usize,
        op: &'static str,
        #[source]
        source: RegistryError,
    },

    #[error("failed to write transcript: {0}")]
    Output(#[source] std::io::Error),
}

impl HarnessError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Registry { .. } => 1,
            Self::Io { .. } | Self::Parse(_) | Self::Config(_) => 2,
            Self::Output(_) => 3,
        }
    }
}
