//! Typed reads of on-chain account state.

use anchor_lang::{AccountDeserialize, Discriminator};
use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::{
    config::ProgramContext,
    error::{FetchError, LedgerError},
    lifecycle::ClaimGate,
    pda,
    state::{Badge, Reward, UserBadge, UserReward},
    transaction::{AccountFilter, Ledger},
};

fn unavailable(address: Pubkey, err: LedgerError) -> FetchError {
    FetchError::Unavailable {
        address,
        message: err.to_string(),
    }
}

fn decode<T: AccountDeserialize>(address: Pubkey, data: &[u8]) -> Result<T, FetchError> {
    let mut bytes = data;
    T::try_deserialize(&mut bytes).map_err(|err| FetchError::Decode {
        address,
        message: err.to_string(),
    })
}

/// Fetches and decodes the account at `address`.
///
/// Decoding checks the account discriminator, so reading a reward address as
/// a badge is a [`FetchError::Decode`], not garbage.
pub async fn fetch<T, L>(ledger: &L, address: &Pubkey) -> Result<T, FetchError>
where
    T: AccountDeserialize,
    L: Ledger + ?Sized,
{
    let data = ledger
        .account_data(address)
        .await
        .map_err(|err| unavailable(*address, err))?
        .ok_or(FetchError::NotFound(*address))?;
    decode(*address, &data)
}

/// Like [`fetch`], with a missing account mapped to `None`.
pub async fn fetch_optional<T, L>(ledger: &L, address: &Pubkey) -> Result<Option<T>, FetchError>
where
    T: AccountDeserialize,
    L: Ledger + ?Sized,
{
    match fetch(ledger, address).await {
        Ok(record) => Ok(Some(record)),
        Err(FetchError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn fetch_badge<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    owner: &Pubkey,
    badge_id: u64,
) -> Result<Badge, FetchError> {
    fetch(ledger, &pda::badge_address(owner, badge_id, ctx).0).await
}

pub async fn fetch_reward<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    owner: &Pubkey,
    badge_id: u64,
    reward_id: u64,
) -> Result<Reward, FetchError> {
    fetch(ledger, &pda::reward_address(owner, badge_id, reward_id, ctx).0).await
}

pub async fn fetch_user_badge<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    user: &Pubkey,
    badge_id: u64,
) -> Result<UserBadge, FetchError> {
    fetch(ledger, &pda::user_badge_address(user, badge_id, ctx).0).await
}

pub async fn fetch_user_reward<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    user: &Pubkey,
    reward_id: u64,
) -> Result<UserReward, FetchError> {
    fetch(ledger, &pda::user_reward_address(user, reward_id, ctx).0).await
}

async fn list_by_user<T, L>(
    ledger: &L,
    ctx: &ProgramContext,
    user: &Pubkey,
    user_offset: usize,
) -> Result<Vec<(Pubkey, T)>, FetchError>
where
    T: AccountDeserialize + Discriminator,
    L: Ledger + ?Sized,
{
    let filters = [
        AccountFilter::new(0, T::discriminator().to_vec()),
        AccountFilter::new(user_offset, user.to_bytes().to_vec()),
    ];
    let accounts = ledger
        .accounts_matching(ctx.program_id(), &filters)
        .await
        .map_err(|err| unavailable(*ctx.program_id(), err))?;
    debug!("{} account(s) matched user {user}", accounts.len());
    accounts
        .into_iter()
        .map(|(address, data)| decode(address, &data).map(|record| (address, record)))
        .collect()
}

/// Every badge `user` holds, with the address of each join record.
pub async fn list_user_badges<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    user: &Pubkey,
) -> Result<Vec<(Pubkey, UserBadge)>, FetchError> {
    list_by_user(ledger, ctx, user, UserBadge::USER_OFFSET).await
}

/// Every reward `user` has claimed, with the address of each join record.
pub async fn list_user_rewards<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    user: &Pubkey,
) -> Result<Vec<(Pubkey, UserReward)>, FetchError> {
    list_by_user(ledger, ctx, user, UserReward::USER_OFFSET).await
}

/// Reads the three accounts that decide whether `user` may claim a reward.
///
/// A missing reward is reported as `NotFound`; a missing badge holding or
/// claim record is simply a `false` / absent flag in the gate.
pub async fn claim_gate<L: Ledger + ?Sized>(
    ledger: &L,
    ctx: &ProgramContext,
    user: &Pubkey,
    owner: &Pubkey,
    badge_id: u64,
    reward_id: u64,
) -> Result<ClaimGate, FetchError> {
    let reward = fetch_reward(ledger, ctx, owner, badge_id, reward_id).await?;
    let user_badge = fetch_optional::<UserBadge, _>(
        ledger,
        &pda::user_badge_address(user, badge_id, ctx).0,
    )
    .await?;
    let user_reward = fetch_optional::<UserReward, _>(
        ledger,
        &pda::user_reward_address(user, reward_id, ctx).0,
    )
    .await?;
    Ok(ClaimGate {
        holds_badge: user_badge.is_some(),
        reward_active: reward.is_active,
        already_claimed: user_reward.is_some(),
    })
}
