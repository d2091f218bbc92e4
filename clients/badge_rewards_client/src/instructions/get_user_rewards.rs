//! `get_user_rewards` builder.
//!
//! The program accepts this call but returns nothing; use
//! [`crate::accessors::list_user_rewards`] to actually read the records.

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_sdk::pubkey::Pubkey;

use super::{AccountBinding, BuiltInstruction};
use crate::{config::ProgramContext, constants::ix, error::BuildError};

/// Wire arguments of `get_user_rewards`.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct GetUserRewardsData {
    pub user: Pubkey,
}

/// Accounts:
/// 0. `[writable, signer]` fee_payer
pub fn get_user_rewards(
    ctx: &ProgramContext,
    fee_payer: Pubkey,
    user: Pubkey,
) -> Result<BuiltInstruction, BuildError> {
    BuiltInstruction::new(
        ctx,
        ix::GET_USER_REWARDS,
        vec![AccountBinding::writable_signer("fee_payer", fee_payer)],
        &GetUserRewardsData { user },
    )
}
