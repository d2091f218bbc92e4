//! Issue-reward builder (`initialize_reward`).

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_sdk::{pubkey::Pubkey, system_program};

use super::{check_text, require_positive, require_u64, AccountBinding, BuiltInstruction};
use crate::{
    config::ProgramContext,
    constants::{ix, MAX_DESCRIPTION_LEN, MAX_NAME_LEN},
    error::BuildError,
    pda::{self, U64Input},
    state::RewardType,
};

#[derive(Debug, Clone)]
pub struct InitializeRewardArgs {
    pub fee_payer: Pubkey,
    pub owner: Pubkey,
    pub badge_id: U64Input,
    pub reward_id: U64Input,
    pub name: String,
    pub description: String,
    /// Raw reward type byte: 0 = Token, 1 = NFT, 2 = Other.
    pub reward_type: u8,
    pub reward_value: U64Input,
    pub token_mint: Option<Pubkey>,
    pub nft_mint: Option<Pubkey>,
    pub is_active: bool,
}

/// Wire arguments of `initialize_reward`.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InitializeRewardData {
    pub badge_id: u64,
    pub reward_id: u64,
    pub name: String,
    pub description: String,
    pub reward_type: u8,
    pub reward_value: u64,
    pub token_mint: Option<Pubkey>,
    pub nft_mint: Option<Pubkey>,
    pub is_active: bool,
}

pub(crate) fn parse_reward_type(raw: u8) -> Result<RewardType, BuildError> {
    RewardType::try_from(raw).map_err(BuildError::InvalidRewardType)
}

/// Checks which mint a reward of `reward_type` may carry.
///
/// Token rewards need a token mint, NFT rewards need an NFT mint, and no
/// reward takes the other kind's mint.
pub(crate) fn check_mints(
    reward_type: RewardType,
    token_mint: bool,
    nft_mint: bool,
) -> Result<(), BuildError> {
    let (token_allowed, nft_allowed) = match reward_type {
        RewardType::Token => (true, false),
        RewardType::Nft => (false, true),
        RewardType::Other => (false, false),
    };
    if token_mint && !token_allowed {
        return Err(BuildError::Inapplicable { field: "token_mint", reward_type });
    }
    if nft_mint && !nft_allowed {
        return Err(BuildError::Inapplicable { field: "nft_mint", reward_type });
    }
    if token_allowed && !token_mint {
        return Err(BuildError::RequiredFor { field: "token_mint", reward_type });
    }
    if nft_allowed && !nft_mint {
        return Err(BuildError::RequiredFor { field: "nft_mint", reward_type });
    }
    Ok(())
}

/// Builds the instruction creating a reward gated behind `(owner, badge_id)`.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[writable]` reward
/// 2. `[signer]` owner
/// 3. `[]` system_program
pub fn initialize_reward(
    ctx: &ProgramContext,
    args: &InitializeRewardArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;
    let reward_id = require_u64("reward_id", &args.reward_id)?;
    let reward_type = parse_reward_type(args.reward_type)?;
    let reward_value = require_positive("reward_value", &args.reward_value)?;
    check_text("name", &args.name, MAX_NAME_LEN)?;
    check_text("description", &args.description, MAX_DESCRIPTION_LEN)?;
    check_mints(reward_type, args.token_mint.is_some(), args.nft_mint.is_some())?;

    let (reward, _) = pda::reward_address(&args.owner, badge_id, reward_id, ctx);

    BuiltInstruction::new(
        ctx,
        ix::INITIALIZE_REWARD,
        vec![
            AccountBinding::writable_signer("fee_payer", args.fee_payer),
            AccountBinding::writable("reward", reward),
            AccountBinding::signer("owner", args.owner),
            AccountBinding::readonly("system_program", system_program::ID),
        ],
        &InitializeRewardData {
            badge_id,
            reward_id,
            name: args.name.clone(),
            description: args.description.clone(),
            reward_type: reward_type.as_u8(),
            reward_value,
            token_mint: args.token_mint,
            nft_mint: args.nft_mint,
            is_active: args.is_active,
        },
    )
}
