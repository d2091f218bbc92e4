//! # Badge Rewards Client
//!
//! Off-chain client for the badge rewards program. Owners issue badges and
//! rewards gated behind those badges; users earn badges, claim rewards and
//! may lock a claimed reward in a time-locked stake.
//!
//! ## Layers
//! - [`pda`]: deterministic program-derived addresses for every account kind
//! - [`instructions`]: validated, fully bound instruction builders
//! - [`transaction`]: signing, submission and failure normalization
//! - [`accessors`]: typed reads of on-chain account state
//! - [`lifecycle`]: claim / stake / unstake state machine with per-key actors
//!
//! ## Configuration
//! The program id is never hard-wired into a call path. Build a
//! [`ProgramContext`] once (usually from [`ClientConfig::from_env`]) and pass
//! it to every derivation, builder and client.

use anchor_lang::prelude::*;

declare_id!("Cw4KGKQcW3Y2C2h299p8h45ETKmtVipVsm7ZkDtEsEQR");

pub mod accessors;
pub mod config;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod lifecycle;
pub mod pda;
pub mod state;
pub mod transaction;

pub use config::{ClientConfig, ProgramContext};
pub use error::{BuildError, DerivationError, FetchError, LifecycleError, SubmissionFailure};
pub use pda::U64Input;
pub use state::{Badge, Reward, RewardType, UserBadge, UserReward};
