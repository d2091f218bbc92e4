//! Claim-reward builder (`claim_reward`).

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use anchor_spl::{associated_token, token};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::{
    initialize_reward::parse_reward_type, require_positive, require_u64, AccountBinding,
    BuiltInstruction,
};
use crate::{
    config::ProgramContext,
    constants::{ix, NATIVE_MINT},
    error::BuildError,
    pda::{self, U64Input},
    state::{Reward, RewardType},
};

/// Instruction index of `CreateIdempotent` in the associated token program.
const CREATE_IDEMPOTENT: u8 = 1;

#[derive(Debug, Clone)]
pub struct ClaimRewardArgs {
    pub fee_payer: Pubkey,
    pub user: Pubkey,
    /// Owner of both the badge and the reward.
    pub owner: Pubkey,
    pub badge_id: U64Input,
    pub reward_id: U64Input,
    pub reward_type: u8,
    pub reward_value: U64Input,
    /// Required for Token and NFT rewards; `Other` rewards default to
    /// [`NATIVE_MINT`].
    pub reward_mint: Option<Pubkey>,
    /// Defaults to the user's associated token account for `reward_mint`.
    pub user_token_account: Option<Pubkey>,
    /// Defaults to the badge PDA's associated token account for `reward_mint`.
    pub reward_token_account: Option<Pubkey>,
}

impl ClaimRewardArgs {
    /// Claim arguments matching an on-chain reward record.
    ///
    /// The mint is taken from the reward: its token mint for Token rewards,
    /// its NFT mint for NFT rewards. `Other` rewards fall back to
    /// [`NATIVE_MINT`] when they carry no mint.
    pub fn for_reward(fee_payer: Pubkey, user: Pubkey, reward: &Reward) -> Result<Self, BuildError> {
        let kind = parse_reward_type(reward.reward_type)?;
        let reward_mint = match kind {
            RewardType::Token => reward.token_mint,
            RewardType::Nft => reward.nft_mint,
            RewardType::Other => reward.token_mint.or(reward.nft_mint).or(Some(NATIVE_MINT)),
        };
        Ok(Self {
            fee_payer,
            user,
            owner: reward.owner,
            badge_id: reward.badge_id.into(),
            reward_id: reward.reward_id.into(),
            reward_type: reward.reward_type,
            reward_value: reward.reward_value.into(),
            reward_mint,
            user_token_account: None,
            reward_token_account: None,
        })
    }
}

/// Wire arguments of `claim_reward`.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClaimRewardData {
    pub owner: Pubkey,
    pub badge_id: u64,
    pub reward_id: u64,
    pub reward_type: u8,
    pub reward_value: u64,
}

/// Idempotent creation of `wallet`'s associated token account for `mint`.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    let (ata, _) = pda::associated_token_address(wallet, mint);
    Instruction {
        program_id: associated_token::ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(token::ID, false),
        ],
        data: vec![CREATE_IDEMPOTENT],
    }
}

/// Builds the instruction claiming a reward for `args.user`.
///
/// When the user token account is derived rather than supplied, the result
/// carries a setup instruction creating it if it does not exist yet.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[]` badge
/// 2. `[writable]` reward
/// 3. `[writable]` user_reward
/// 4. `[writable]` user_badge
/// 5. `[writable]` user_token_account
/// 6. `[writable]` reward_token_account
/// 7. `[]` reward_mint
/// 8. `[signer]` user
/// 9. `[]` system_program
/// 10. `[]` associated_token_program
/// 11. `[]` token_program
pub fn claim_reward(
    ctx: &ProgramContext,
    args: &ClaimRewardArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;
    let reward_id = require_u64("reward_id", &args.reward_id)?;
    let reward_type = parse_reward_type(args.reward_type)?;
    let reward_value = require_positive("reward_value", &args.reward_value)?;
    let reward_mint = match (args.reward_mint, reward_type) {
        (Some(mint), _) => mint,
        (None, RewardType::Other) => NATIVE_MINT,
        (None, _) => return Err(BuildError::MissingAccount { role: "reward_mint" }),
    };

    let (badge, _) = pda::badge_address(&args.owner, badge_id, ctx);
    let (reward, _) = pda::reward_address(&args.owner, badge_id, reward_id, ctx);
    let (user_reward, _) = pda::user_reward_address(&args.user, reward_id, ctx);
    let (user_badge, _) = pda::user_badge_address(&args.user, badge_id, ctx);
    let user_token_account = args
        .user_token_account
        .unwrap_or_else(|| pda::associated_token_address(&args.user, &reward_mint).0);
    let reward_token_account = args
        .reward_token_account
        .unwrap_or_else(|| pda::associated_token_address(&badge, &reward_mint).0);

    let built = BuiltInstruction::new(
        ctx,
        ix::CLAIM_REWARD,
        vec![
            AccountBinding::writable_signer("fee_payer", args.fee_payer),
            AccountBinding::readonly("badge", badge),
            AccountBinding::writable("reward", reward),
            AccountBinding::writable("user_reward", user_reward),
            AccountBinding::writable("user_badge", user_badge),
            AccountBinding::writable("user_token_account", user_token_account),
            AccountBinding::writable("reward_token_account", reward_token_account),
            AccountBinding::readonly("reward_mint", reward_mint),
            AccountBinding::signer("user", args.user),
            AccountBinding::readonly("system_program", system_program::ID),
            AccountBinding::readonly("associated_token_program", associated_token::ID),
            AccountBinding::readonly("token_program", token::ID),
        ],
        &ClaimRewardData {
            owner: args.owner,
            badge_id,
            reward_id,
            reward_type: reward_type.as_u8(),
            reward_value,
        },
    )?;

    if args.user_token_account.is_none() {
        Ok(built.with_setup(create_associated_token_account_idempotent(
            &args.fee_payer,
            &args.user,
            &reward_mint,
        )))
    } else {
        Ok(built)
    }
}
