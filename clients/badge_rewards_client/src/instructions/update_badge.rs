//! Update-badge builder (`update_badge`).

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_sdk::pubkey::Pubkey;

use super::{check_text, require_positive, require_u64, AccountBinding, BuiltInstruction, FieldUpdate};
use crate::{
    config::ProgramContext,
    constants::{ix, MAX_DESCRIPTION_LEN, MAX_ICON_URI_LEN, MAX_NAME_LEN},
    error::BuildError,
    pda::{self, U64Input},
};

/// Per-field badge update. Fields left as `Keep` are not touched on-chain.
#[derive(Debug, Clone)]
pub struct UpdateBadgeArgs {
    pub fee_payer: Pubkey,
    pub owner: Pubkey,
    pub badge_id: U64Input,
    pub name: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub icon_uri: FieldUpdate<String>,
    pub required_points: FieldUpdate<U64Input>,
    pub max_earnings: FieldUpdate<U64Input>,
    pub is_active: FieldUpdate<bool>,
}

impl UpdateBadgeArgs {
    /// An update that changes nothing yet; set fields individually.
    pub fn new(fee_payer: Pubkey, owner: Pubkey, badge_id: impl Into<U64Input>) -> Self {
        Self {
            fee_payer,
            owner,
            badge_id: badge_id.into(),
            name: FieldUpdate::Keep,
            description: FieldUpdate::Keep,
            icon_uri: FieldUpdate::Keep,
            required_points: FieldUpdate::Keep,
            max_earnings: FieldUpdate::Keep,
            is_active: FieldUpdate::Keep,
        }
    }
}

/// Wire arguments of `update_badge`. `None` leaves the field unchanged.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateBadgeData {
    pub badge_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_uri: Option<String>,
    pub required_points: Option<u64>,
    pub max_earnings: Option<u64>,
    pub is_active: Option<bool>,
}

/// Builds the instruction updating a badge in place.
///
/// None of the badge fields are nullable, so `Clear` is rejected everywhere.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[writable]` badge
/// 2. `[signer]` owner
pub fn update_badge(
    ctx: &ProgramContext,
    args: &UpdateBadgeArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;

    let name = args.name.clone().into_wire("name")?;
    let description = args.description.clone().into_wire("description")?;
    let icon_uri = args.icon_uri.clone().into_wire("icon_uri")?;
    if let Some(name) = &name {
        check_text("name", name, MAX_NAME_LEN)?;
    }
    if let Some(description) = &description {
        check_text("description", description, MAX_DESCRIPTION_LEN)?;
    }
    if let Some(icon_uri) = &icon_uri {
        check_text("icon_uri", icon_uri, MAX_ICON_URI_LEN)?;
    }

    let required_points = args
        .required_points
        .clone()
        .into_wire("required_points")?
        .map(|input| require_positive("required_points", &input))
        .transpose()?;
    let max_earnings = args
        .max_earnings
        .clone()
        .into_wire("max_earnings")?
        .map(|input| require_positive("max_earnings", &input))
        .transpose()?;
    let is_active = args.is_active.clone().into_wire("is_active")?;

    let (badge, _) = pda::badge_address(&args.owner, badge_id, ctx);

    BuiltInstruction::new(
        ctx,
        ix::UPDATE_BADGE,
        vec![
            AccountBinding::writable_signer("fee_payer", args.fee_payer),
            AccountBinding::writable("badge", badge),
            AccountBinding::signer("owner", args.owner),
        ],
        &UpdateBadgeData {
            badge_id,
            name,
            description,
            icon_uri,
            required_points,
            max_earnings,
            is_active,
        },
    )
}
