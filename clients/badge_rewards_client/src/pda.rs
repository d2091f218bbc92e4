//! Program-derived addresses for every account the program owns.
//!
//! Each derivation has a fixed, ordered seed sequence. Numeric components are
//! encoded as 8-byte little-endian `u64`. The reward derivation takes the
//! owner as a mandatory seed: there is no way to build [`RewardSeeds`]
//! without one.

use std::fmt;

use anchor_spl::{associated_token, token};
use solana_sdk::pubkey::Pubkey;

use crate::{
    config::ProgramContext,
    constants::{BADGE_SEED, REWARD_SEED, USER_BADGE_SEED, USER_REWARD_SEED},
    error::{DerivationError, IntegerInputError},
};

/// An integer as handed over by a caller: native, decimal text, or wide.
///
/// Normalization to `u64` happens where the value is consumed, so a bad
/// input surfaces as an error naming the field that carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum U64Input {
    Absent,
    Native(u64),
    Text(String),
    Wide(i128),
}

impl U64Input {
    pub fn to_u64(&self) -> Result<u64, IntegerInputError> {
        match self {
            U64Input::Absent => Err(IntegerInputError::Absent),
            U64Input::Native(value) => Ok(*value),
            U64Input::Text(text) => parse_decimal(text),
            U64Input::Wide(value) => wide_to_u64(*value),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, U64Input::Absent)
    }
}

fn parse_decimal(text: &str) -> Result<u64, IntegerInputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IntegerInputError::NotNumeric(text.to_string()));
    }
    if let Some(digits) = trimmed.strip_prefix('-') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let magnitude = digits.parse::<i128>().unwrap_or(i128::MAX);
            return Err(IntegerInputError::Negative(-magnitude));
        }
        return Err(IntegerInputError::NotNumeric(text.to_string()));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IntegerInputError::NotNumeric(text.to_string()));
    }
    match trimmed.parse::<u128>() {
        Ok(value) => u64::try_from(value).map_err(|_| IntegerInputError::Overflow(value)),
        Err(_) => Err(IntegerInputError::Overflow(u128::MAX)),
    }
}

fn wide_to_u64(value: i128) -> Result<u64, IntegerInputError> {
    if value < 0 {
        return Err(IntegerInputError::Negative(value));
    }
    u64::try_from(value).map_err(|_| IntegerInputError::Overflow(value as u128))
}

impl From<u64> for U64Input {
    fn from(value: u64) -> Self {
        U64Input::Native(value)
    }
}

impl From<u32> for U64Input {
    fn from(value: u32) -> Self {
        U64Input::Native(u64::from(value))
    }
}

impl From<i64> for U64Input {
    fn from(value: i64) -> Self {
        U64Input::Wide(i128::from(value))
    }
}

impl From<i32> for U64Input {
    fn from(value: i32) -> Self {
        U64Input::Wide(i128::from(value))
    }
}

impl From<i128> for U64Input {
    fn from(value: i128) -> Self {
        U64Input::Wide(value)
    }
}

impl From<u128> for U64Input {
    fn from(value: u128) -> Self {
        match i128::try_from(value) {
            Ok(wide) => U64Input::Wide(wide),
            // Anything above i128::MAX is far above u64::MAX as well.
            Err(_) => U64Input::Text(value.to_string()),
        }
    }
}

impl From<&str> for U64Input {
    fn from(value: &str) -> Self {
        U64Input::Text(value.to_string())
    }
}

impl From<String> for U64Input {
    fn from(value: String) -> Self {
        U64Input::Text(value)
    }
}

impl<T: Into<U64Input>> From<Option<T>> for U64Input {
    fn from(value: Option<T>) -> Self {
        value.map_or(U64Input::Absent, Into::into)
    }
}

fn seed_u64(
    derivation: &'static str,
    field: &'static str,
    input: &U64Input,
) -> Result<u64, DerivationError> {
    input.to_u64().map_err(|source| match source {
        IntegerInputError::Absent => DerivationError::MissingField { derivation, field },
        source => DerivationError::InvalidInteger {
            derivation,
            field,
            source,
        },
    })
}

/// Address kinds owned by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivationKind {
    Badge,
    UserBadge,
    Reward,
    UserReward,
}

impl DerivationKind {
    pub fn name(self) -> &'static str {
        match self {
            DerivationKind::Badge => "badge",
            DerivationKind::UserBadge => "user_badge",
            DerivationKind::Reward => "reward",
            DerivationKind::UserReward => "user_reward",
        }
    }
}

impl fmt::Display for DerivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSeeds {
    pub owner: Pubkey,
    pub badge_id: U64Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadgeSeeds {
    pub user: Pubkey,
    pub badge_id: U64Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSeeds {
    pub owner: Pubkey,
    pub badge_id: U64Input,
    pub reward_id: U64Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRewardSeeds {
    pub user: Pubkey,
    pub reward_id: U64Input,
}

/// Seeds for any derivation kind, for callers that dispatch at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSet {
    Badge(BadgeSeeds),
    UserBadge(UserBadgeSeeds),
    Reward(RewardSeeds),
    UserReward(UserRewardSeeds),
}

impl SeedSet {
    pub fn kind(&self) -> DerivationKind {
        match self {
            SeedSet::Badge(_) => DerivationKind::Badge,
            SeedSet::UserBadge(_) => DerivationKind::UserBadge,
            SeedSet::Reward(_) => DerivationKind::Reward,
            SeedSet::UserReward(_) => DerivationKind::UserReward,
        }
    }
}

/// Derives the address of `kind` from `seeds`.
///
/// Fails if `seeds` belong to another kind or any seed is invalid.
pub fn derive(
    kind: DerivationKind,
    seeds: &SeedSet,
    ctx: &ProgramContext,
) -> Result<(Pubkey, u8), DerivationError> {
    if seeds.kind() != kind {
        return Err(DerivationError::KindMismatch {
            expected: kind.name(),
            got: seeds.kind().name(),
        });
    }
    match seeds {
        SeedSet::Badge(seeds) => derive_badge(seeds, ctx),
        SeedSet::UserBadge(seeds) => derive_user_badge(seeds, ctx),
        SeedSet::Reward(seeds) => derive_reward(seeds, ctx),
        SeedSet::UserReward(seeds) => derive_user_reward(seeds, ctx),
    }
}

pub fn derive_badge(
    seeds: &BadgeSeeds,
    ctx: &ProgramContext,
) -> Result<(Pubkey, u8), DerivationError> {
    let badge_id = seed_u64("badge", "badge_id", &seeds.badge_id)?;
    Ok(badge_address(&seeds.owner, badge_id, ctx))
}

pub fn derive_user_badge(
    seeds: &UserBadgeSeeds,
    ctx: &ProgramContext,
) -> Result<(Pubkey, u8), DerivationError> {
    let badge_id = seed_u64("user_badge", "badge_id", &seeds.badge_id)?;
    Ok(user_badge_address(&seeds.user, badge_id, ctx))
}

pub fn derive_reward(
    seeds: &RewardSeeds,
    ctx: &ProgramContext,
) -> Result<(Pubkey, u8), DerivationError> {
    let badge_id = seed_u64("reward", "badge_id", &seeds.badge_id)?;
    let reward_id = seed_u64("reward", "reward_id", &seeds.reward_id)?;
    Ok(reward_address(&seeds.owner, badge_id, reward_id, ctx))
}

pub fn derive_user_reward(
    seeds: &UserRewardSeeds,
    ctx: &ProgramContext,
) -> Result<(Pubkey, u8), DerivationError> {
    let reward_id = seed_u64("user_reward", "reward_id", &seeds.reward_id)?;
    Ok(user_reward_address(&seeds.user, reward_id, ctx))
}

// Normalized forms, used by the builders once every id is a `u64`.

pub fn badge_address(owner: &Pubkey, badge_id: u64, ctx: &ProgramContext) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[BADGE_SEED, owner.as_ref(), &badge_id.to_le_bytes()],
        ctx.program_id(),
    )
}

pub fn user_badge_address(user: &Pubkey, badge_id: u64, ctx: &ProgramContext) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_BADGE_SEED, user.as_ref(), &badge_id.to_le_bytes()],
        ctx.program_id(),
    )
}

pub fn reward_address(
    owner: &Pubkey,
    badge_id: u64,
    reward_id: u64,
    ctx: &ProgramContext,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            REWARD_SEED,
            owner.as_ref(),
            &badge_id.to_le_bytes(),
            &reward_id.to_le_bytes(),
        ],
        ctx.program_id(),
    )
}

pub fn user_reward_address(user: &Pubkey, reward_id: u64, ctx: &ProgramContext) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_REWARD_SEED, user.as_ref(), &reward_id.to_le_bytes()],
        ctx.program_id(),
    )
}

/// Associated token account of `wallet` for `mint` under the classic token
/// program.
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[wallet.as_ref(), token::ID.as_ref(), mint.as_ref()],
        &associated_token::ID,
    )
}
