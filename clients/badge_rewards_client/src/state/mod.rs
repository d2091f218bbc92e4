//! On-chain account layouts of the badge rewards program.
//!
//! Declared with `#[account]` so decoding checks the 8-byte account
//! discriminator before reading any field.

pub mod badge;
pub mod reward;
pub mod user_badge;
pub mod user_reward;

pub use badge::*;
pub use reward::*;
pub use user_badge::*;
pub use user_reward::*;
