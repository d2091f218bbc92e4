//! Withdraw-badge builder (`unstake_badge`).

use super::{
    require_u64, stake_badge::holder_accounts, BadgeHolderArgs, BadgeIdData, BuiltInstruction,
};
use crate::{config::ProgramContext, constants::ix, error::BuildError};

/// Builds the instruction withdrawing a badge from `args.user`.
///
/// Takes the same accounts as [`super::award_badge`].
pub fn withdraw_badge(
    ctx: &ProgramContext,
    args: &BadgeHolderArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;
    BuiltInstruction::new(
        ctx,
        ix::UNSTAKE_BADGE,
        holder_accounts(ctx, args, badge_id),
        &BadgeIdData { badge_id },
    )
}
