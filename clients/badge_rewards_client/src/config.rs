//! Client configuration and the explicit program context.
//!
//! Configuration is read once at startup and turned into a
//! [`ProgramContext`], which is then passed to every derivation, builder and
//! client call. There is no process-wide client handle.

use std::{env, str::FromStr};

use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    pubkey::Pubkey,
};
use thiserror::Error;

use crate::constants::{COMMITMENT_ENV, DEFAULT_RPC_URL, PROGRAM_ID_ENV, RPC_URL_ENV};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the program id must be provided via {0}")]
    MissingProgramId(&'static str),
    #[error("invalid program id `{0}`")]
    InvalidProgramId(String),
    #[error("invalid commitment level `{0}`")]
    InvalidCommitment(String),
}

/// Settings needed to talk to a deployed badge rewards program.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Address of the deployed program.
    pub program_id: Pubkey,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Commitment used for reads and confirmation.
    pub commitment: CommitmentConfig,
}

impl ClientConfig {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// The program id is required; URL and commitment fall back to devnet and
    /// `confirmed`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_id = lookup(PROGRAM_ID_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingProgramId(PROGRAM_ID_ENV))?;
        let program_id = Pubkey::from_str(raw_id.trim())
            .map_err(|_| ConfigError::InvalidProgramId(raw_id.clone()))?;

        let mut config = Self::new(program_id);
        if let Some(url) = lookup(RPC_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config.rpc_url = url.trim().to_string();
        }
        if let Some(level) = lookup(COMMITMENT_ENV).filter(|value| !value.trim().is_empty()) {
            let commitment = CommitmentLevel::from_str(level.trim())
                .map_err(|_| ConfigError::InvalidCommitment(level.clone()))?;
            config.commitment = CommitmentConfig { commitment };
        }
        Ok(config)
    }

    pub fn context(&self) -> ProgramContext {
        ProgramContext::new(self.program_id)
    }
}

/// The program every derivation and instruction is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramContext {
    program_id: Pubkey,
}

impl ProgramContext {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }
}

impl Default for ProgramContext {
    /// Context for the program id the account types were declared against.
    fn default() -> Self {
        Self::new(crate::ID)
    }
}
