//! Update-reward builder (`update_reward`).

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_sdk::pubkey::Pubkey;

use super::{
    check_text, initialize_reward::parse_reward_type, require_positive, require_u64,
    AccountBinding, BuiltInstruction, FieldUpdate,
};
use crate::{
    config::ProgramContext,
    constants::{ix, MAX_DESCRIPTION_LEN, MAX_NAME_LEN},
    error::BuildError,
    pda::{self, U64Input},
    state::RewardType,
};

/// Per-field reward update.
///
/// The mint fields are the only ones that may be `Clear`ed, and only when the
/// reward's type after the update is known and is not the mint's own type.
#[derive(Debug, Clone)]
pub struct UpdateRewardArgs {
    pub fee_payer: Pubkey,
    pub owner: Pubkey,
    pub badge_id: U64Input,
    pub reward_id: U64Input,
    pub name: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub reward_type: FieldUpdate<u8>,
    pub reward_value: FieldUpdate<U64Input>,
    pub token_mint: FieldUpdate<Pubkey>,
    pub nft_mint: FieldUpdate<Pubkey>,
    pub is_active: FieldUpdate<bool>,
    /// Type currently stored on-chain, when the caller knows it. Used to
    /// check mint applicability when `reward_type` is `Keep`; must match the
    /// account for a mint `Clear` to have the intended effect.
    pub current_type: Option<RewardType>,
}

impl UpdateRewardArgs {
    pub fn new(
        fee_payer: Pubkey,
        owner: Pubkey,
        badge_id: impl Into<U64Input>,
        reward_id: impl Into<U64Input>,
    ) -> Self {
        Self {
            fee_payer,
            owner,
            badge_id: badge_id.into(),
            reward_id: reward_id.into(),
            name: FieldUpdate::Keep,
            description: FieldUpdate::Keep,
            reward_type: FieldUpdate::Keep,
            reward_value: FieldUpdate::Keep,
            token_mint: FieldUpdate::Keep,
            nft_mint: FieldUpdate::Keep,
            is_active: FieldUpdate::Keep,
            current_type: None,
        }
    }
}

/// Wire arguments of `update_reward`. `None` leaves the field unchanged.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateRewardData {
    pub badge_id: u64,
    pub reward_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub reward_type: Option<u8>,
    pub reward_value: Option<u64>,
    pub token_mint: Option<Pubkey>,
    pub nft_mint: Option<Pubkey>,
    pub is_active: Option<bool>,
}

/// Wire value for one mint field.
///
/// The program stores a sent mint only when the reward's (updated) type is
/// `mint_type` and nulls the field otherwise. A `Clear` therefore goes out as
/// `Some(Pubkey::default())` against a type that cannot hold the mint.
fn mint_on_wire(
    field: &'static str,
    update: &FieldUpdate<Pubkey>,
    mint_type: RewardType,
    effective: Option<RewardType>,
) -> Result<Option<Pubkey>, BuildError> {
    match (update, effective) {
        (FieldUpdate::Keep, _) => Ok(None),
        (FieldUpdate::Set(_), Some(reward_type)) if reward_type != mint_type => {
            Err(BuildError::Inapplicable { field, reward_type })
        }
        (FieldUpdate::Set(mint), _) => Ok(Some(*mint)),
        (FieldUpdate::Clear, None) => Err(BuildError::ClearNeedsType { field }),
        (FieldUpdate::Clear, Some(reward_type)) if reward_type == mint_type => {
            Err(BuildError::RequiredFor { field, reward_type })
        }
        (FieldUpdate::Clear, Some(_)) => Ok(Some(Pubkey::default())),
    }
}

/// Builds the instruction updating a reward in place.
///
/// Mint applicability is checked against the type the reward will have after
/// the update: the new type if one is `Set`, else `args.current_type`.
///
/// Accounts:
/// 0. `[writable, signer]` fee_payer
/// 1. `[writable]` reward
/// 2. `[signer]` owner
pub fn update_reward(
    ctx: &ProgramContext,
    args: &UpdateRewardArgs,
) -> Result<BuiltInstruction, BuildError> {
    let badge_id = require_u64("badge_id", &args.badge_id)?;
    let reward_id = require_u64("reward_id", &args.reward_id)?;

    let name = args.name.clone().into_wire("name")?;
    let description = args.description.clone().into_wire("description")?;
    if let Some(name) = &name {
        check_text("name", name, MAX_NAME_LEN)?;
    }
    if let Some(description) = &description {
        check_text("description", description, MAX_DESCRIPTION_LEN)?;
    }

    let new_type = args
        .reward_type
        .clone()
        .into_wire("reward_type")?
        .map(parse_reward_type)
        .transpose()?;
    let reward_value = args
        .reward_value
        .clone()
        .into_wire("reward_value")?
        .map(|input| require_positive("reward_value", &input))
        .transpose()?;
    let is_active = args.is_active.clone().into_wire("is_active")?;

    let effective = new_type.or(args.current_type);
    let token_mint = mint_on_wire("token_mint", &args.token_mint, RewardType::Token, effective)?;
    let nft_mint = mint_on_wire("nft_mint", &args.nft_mint, RewardType::Nft, effective)?;

    let (reward, _) = pda::reward_address(&args.owner, badge_id, reward_id, ctx);

    BuiltInstruction::new(
        ctx,
        ix::UPDATE_REWARD,
        vec![
            AccountBinding::writable_signer("fee_payer", args.fee_payer),
            AccountBinding::writable("reward", reward),
            AccountBinding::signer("owner", args.owner),
        ],
        &UpdateRewardData {
            badge_id,
            reward_id,
            name,
            description,
            reward_type: new_type.map(RewardType::as_u8),
            reward_value,
            token_mint,
            nft_mint,
            is_active,
        },
    )
}
