//! Freeze-badge builder (`freeze_badge`).

use solana_sdk::pubkey::Pubkey;

use super::{require_u64, AccountBinding, BadgeIdData, BuiltInstruction};
use crate::{
    config::ProgramContext,
    constants::ix,
    error::BuildError,
    pda::{self, U64Input},
};

/// Builds the instruction deactivating a badge.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[writable]` badge
/// 2. `[signer]` badge_owner
pub fn freeze_badge(
    ctx: &ProgramContext,
    fee_payer: Pubkey,
    badge_owner: Pubkey,
    badge_id: impl Into<U64Input>,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &badge_id.into())?;
    let (badge, _) = pda::badge_address(&badge_owner, badge_id, ctx);
    BuiltInstruction::new(
        ctx,
        ix::FREEZE_BADGE,
        vec![
            AccountBinding::writable_signer("fee_payer", fee_payer),
            AccountBinding::writable("badge", badge),
            AccountBinding::signer("badge_owner", badge_owner),
        ],
        &BadgeIdData { badge_id },
    )
}
