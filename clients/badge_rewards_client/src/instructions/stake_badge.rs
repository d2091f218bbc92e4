//! Award-badge builder.
//!
//! The program names this instruction `stake_badge`; it creates the
//! `UserBadge` record, so the badge owner and the recipient both sign.

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_sdk::{pubkey::Pubkey, system_program};

use super::{require_u64, AccountBinding, BuiltInstruction};
use crate::{
    config::ProgramContext,
    constants::ix,
    error::BuildError,
    pda::{self, U64Input},
};

/// Arguments shared by the award and withdraw builders.
#[derive(Debug, Clone)]
pub struct BadgeHolderArgs {
    pub fee_payer: Pubkey,
    pub badge_owner: Pubkey,
    pub user: Pubkey,
    pub badge_id: U64Input,
}

/// Wire arguments of `stake_badge`, `unstake_badge` and `freeze_badge`.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct BadgeIdData {
    pub badge_id: u64,
}

pub(crate) fn holder_accounts(
    ctx: &ProgramContext,
    args: &BadgeHolderArgs,
    badge_id: u64,
) -> Vec<AccountBinding> {
    let (badge, _) = pda::badge_address(&args.badge_owner, badge_id, ctx);
    let (user_badge, _) = pda::user_badge_address(&args.user, badge_id, ctx);
    vec![
        AccountBinding::writable_signer("fee_payer", args.fee_payer),
        AccountBinding::writable("badge", badge),
        AccountBinding::writable("user_badge", user_badge),
        AccountBinding::signer("badge_owner", args.badge_owner),
        AccountBinding::signer("user", args.user),
        AccountBinding::readonly("system_program", system_program::ID),
    ]
}

/// Builds the instruction awarding a badge to `args.user`.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[writable]` badge
/// 2. `[writable]` user_badge
/// 3. `[signer]` badge_owner
/// 4. `[signer]` user
/// 5. `[]` system_program
pub fn award_badge(
    ctx: &ProgramContext,
    args: &BadgeHolderArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;
    BuiltInstruction::new(
        ctx,
        ix::STAKE_BADGE,
        holder_accounts(ctx, args, badge_id),
        &BadgeIdData { badge_id },
    )
}
