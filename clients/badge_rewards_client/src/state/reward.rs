use std::fmt;

use anchor_lang::prelude::*;

use crate::constants::reward_type;

#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Reward {
    pub owner: Pubkey,
    pub badge_id: u64,
    pub reward_id: u64,
    pub name: String,
    pub description: String,
    pub reward_type: u8,
    pub reward_value: u64,
    pub token_mint: Option<Pubkey>,
    pub nft_mint: Option<Pubkey>,
    pub is_active: bool,
    pub bump: u8,
}

impl Reward {
    /// Space the program allocates for a reward account.
    pub const LEN: usize = 918;

    /// Decoded reward type, `None` if the stored byte is unknown.
    pub fn kind(&self) -> Option<RewardType> {
        RewardType::try_from(self.reward_type).ok()
    }
}

/// Payout kind of a reward. Encoded on the wire as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardType {
    Token,
    Nft,
    Other,
}

impl RewardType {
    pub fn as_u8(self) -> u8 {
        match self {
            RewardType::Token => reward_type::TOKEN,
            RewardType::Nft => reward_type::NFT,
            RewardType::Other => reward_type::OTHER,
        }
    }
}

impl TryFrom<u8> for RewardType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            reward_type::TOKEN => Ok(RewardType::Token),
            reward_type::NFT => Ok(RewardType::Nft),
            reward_type::OTHER => Ok(RewardType::Other),
            other => Err(other),
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardType::Token => f.write_str("Token"),
            RewardType::Nft => f.write_str("NFT"),
            RewardType::Other => f.write_str("Other"),
        }
    }
}
