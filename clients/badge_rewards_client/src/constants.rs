//! Constants shared by the derivation, builder and lifecycle layers.
//!
//! Seed prefixes and instruction names are part of the deployed program's
//! address space and wire contract. Changing any of them re-addresses every
//! existing account.

use solana_sdk::{pubkey, pubkey::Pubkey};

/// Seed for deriving badge PDAs
pub const BADGE_SEED: &[u8] = b"badge";

/// Seed for deriving user badge PDAs
pub const USER_BADGE_SEED: &[u8] = b"user_badge";

/// Seed for deriving reward PDAs
pub const REWARD_SEED: &[u8] = b"reward";

/// Seed for deriving user reward PDAs
pub const USER_REWARD_SEED: &[u8] = b"user_reward";

/// Maximum badge or reward name length in bytes
pub const MAX_NAME_LEN: usize = 100;

/// Maximum badge or reward description length in bytes
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum icon URI length in bytes
pub const MAX_ICON_URI_LEN: usize = 200;

/// Wrapped SOL mint. Bound as the claim mint of `Other` rewards, which carry
/// no mint of their own while the program still requires a mint account.
pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

/// Number of seconds in a day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Environment variable holding the base58 program id
pub const PROGRAM_ID_ENV: &str = "BADGE_REWARDS_PROGRAM_ID";

/// Environment variable holding the JSON-RPC endpoint
pub const RPC_URL_ENV: &str = "BADGE_REWARDS_RPC_URL";

/// Environment variable holding the commitment level
pub const COMMITMENT_ENV: &str = "BADGE_REWARDS_COMMITMENT";

/// RPC endpoint used when none is configured
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Instruction names as declared by the on-chain program.
///
/// The Anchor discriminator of each is `sha256("global:<name>")[..8]`.
pub mod ix {
    pub const INITIALIZE_BADGE: &str = "initialize_badge";
    pub const UPDATE_BADGE: &str = "update_badge";
    pub const INITIALIZE_REWARD: &str = "initialize_reward";
    pub const UPDATE_REWARD: &str = "update_reward";
    pub const CLAIM_REWARD: &str = "claim_reward";
    pub const GET_USER_BADGES: &str = "get_user_badges";
    pub const GET_USER_REWARDS: &str = "get_user_rewards";
    /// Awards a badge to a user (creates the user badge record).
    pub const STAKE_BADGE: &str = "stake_badge";
    /// Withdraws an awarded badge, decrementing the earned count.
    pub const UNSTAKE_BADGE: &str = "unstake_badge";
    pub const FREEZE_BADGE: &str = "freeze_badge";
}

/// Reward type wire values
pub mod reward_type {
    /// Fungible token payout
    pub const TOKEN: u8 = 0;
    /// NFT payout
    pub const NFT: u8 = 1;
    /// Off-chain or custom payout
    pub const OTHER: u8 = 2;
}
