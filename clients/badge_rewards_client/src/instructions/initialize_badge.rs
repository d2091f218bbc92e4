//! Issue-badge builder (`initialize_badge`).

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_sdk::{pubkey::Pubkey, system_program};

use super::{check_text, require_positive, require_u64, AccountBinding, BuiltInstruction};
use crate::{
    config::ProgramContext,
    constants::{ix, MAX_DESCRIPTION_LEN, MAX_ICON_URI_LEN, MAX_NAME_LEN},
    error::BuildError,
    pda::{self, U64Input},
};

#[derive(Debug, Clone)]
pub struct InitializeBadgeArgs {
    pub fee_payer: Pubkey,
    pub owner: Pubkey,
    pub badge_id: U64Input,
    pub name: String,
    pub description: String,
    pub icon_uri: String,
    pub required_points: U64Input,
    pub max_earnings: U64Input,
    pub is_active: bool,
}

/// Wire arguments of `initialize_badge`.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InitializeBadgeData {
    pub badge_id: u64,
    pub name: String,
    pub description: String,
    pub icon_uri: String,
    pub required_points: u64,
    pub max_earnings: u64,
    pub is_active: bool,
}

/// Builds the instruction creating a badge owned by `args.owner`.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[writable]` badge
/// 2. `[signer]` owner
/// 3. `[]` system_program
pub fn initialize_badge(
    ctx: &ProgramContext,
    args: &InitializeBadgeArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;
    let required_points = require_positive("required_points", &args.required_points)?;
    let max_earnings = require_positive("max_earnings", &args.max_earnings)?;
    check_text("name", &args.name, MAX_NAME_LEN)?;
    check_text("description", &args.description, MAX_DESCRIPTION_LEN)?;
    check_text("icon_uri", &args.icon_uri, MAX_ICON_URI_LEN)?;

    let (badge, _) = pda::badge_address(&args.owner, badge_id, ctx);

    BuiltInstruction::new(
        ctx,
        ix::INITIALIZE_BADGE,
        vec![
            AccountBinding::writable_signer("fee_payer", args.fee_payer),
            AccountBinding::writable("badge", badge),
            AccountBinding::signer("owner", args.owner),
            AccountBinding::readonly("system_program", system_program::ID),
        ],
        &InitializeBadgeData {
            badge_id,
            name: args.name.clone(),
            description: args.description.clone(),
            icon_uri: args.icon_uri.clone(),
            required_points,
            max_earnings,
            is_active: args.is_active,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntegerInputError;

    fn args(owner: Pubkey) -> InitializeBadgeArgs {
        InitializeBadgeArgs {
            fee_payer: owner,
            owner,
            badge_id: 1u64.into(),
            name: "Early Adopter".to_string(),
            description: "Joined during the first week".to_string(),
            icon_uri: "https://example.org/early.png".to_string(),
            required_points: 100u64.into(),
            max_earnings: 1_000u64.into(),
            is_active: true,
        }
    }

    #[test]
    fn binds_every_role() {
        let ctx = ProgramContext::new(Pubkey::new_unique());
        let owner = Pubkey::new_unique();
        let built = initialize_badge(&ctx, &args(owner)).unwrap();

        assert_eq!(built.program_id, *ctx.program_id());
        assert_eq!(built.roles(), vec!["fee_payer", "badge", "owner", "system_program"]);
        assert_eq!(built.address_of("badge"), Some(pda::badge_address(&owner, 1, &ctx).0));
        assert_eq!(built.fee_payer(), owner);
        // fee payer and owner are the same key
        assert_eq!(built.required_signers().len(), 1);

        let data = InitializeBadgeData::try_from_slice(built.args_bytes()).unwrap();
        assert_eq!(data.badge_id, 1);
        assert_eq!(data.required_points, 100);
        assert_eq!(data.name, "Early Adopter");
    }

    #[test]
    fn text_and_wide_ids_build_the_same_instruction() {
        let ctx = ProgramContext::default();
        let owner = Pubkey::new_unique();
        let native = initialize_badge(&ctx, &args(owner)).unwrap();
        let mut text = args(owner);
        text.badge_id = "1".into();
        let mut wide = args(owner);
        wide.badge_id = 1i128.into();

        assert_eq!(initialize_badge(&ctx, &text).unwrap(), native);
        assert_eq!(initialize_badge(&ctx, &wide).unwrap(), native);
    }

    #[test]
    fn fails_closed_on_bad_input() {
        let ctx = ProgramContext::default();
        let owner = Pubkey::new_unique();

        let mut missing = args(owner);
        missing.badge_id = U64Input::Absent;
        assert_eq!(
            initialize_badge(&ctx, &missing).unwrap_err(),
            BuildError::MissingArgument { field: "badge_id" }
        );

        let mut negative = args(owner);
        negative.max_earnings = (-1i64).into();
        assert_eq!(
            initialize_badge(&ctx, &negative).unwrap_err(),
            BuildError::InvalidInteger {
                field: "max_earnings",
                source: IntegerInputError::Negative(-1),
            }
        );

        let mut zero_points = args(owner);
        zero_points.required_points = 0u64.into();
        assert!(matches!(
            initialize_badge(&ctx, &zero_points),
            Err(BuildError::OutOfRange { field: "required_points", .. })
        ));

        let mut long_icon = args(owner);
        long_icon.icon_uri = "i".repeat(MAX_ICON_URI_LEN + 1);
        assert!(matches!(
            initialize_badge(&ctx, &long_icon),
            Err(BuildError::TextTooLong { field: "icon_uri", .. })
        ));
    }
}
