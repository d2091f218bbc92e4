//! In-memory ledger that executes the badge rewards program's account
//! effects, for driving the client end to end without a validator.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use anchor_lang::{prelude::borsh, AccountDeserialize, AccountSerialize, AnchorDeserialize};
use anchor_spl::associated_token;
use async_trait::async_trait;
use badge_rewards_client::{
    constants::ix,
    error::LedgerError,
    instructions::{
        award_badge, discriminator, initialize_badge, initialize_reward, BadgeHolderArgs,
        BadgeIdData, ClaimRewardArgs, ClaimRewardData, InitializeBadgeArgs, InitializeBadgeData,
        InitializeRewardArgs, InitializeRewardData,
    },
    lifecycle::{Clock, ManualClock},
    pda,
    transaction::{AccountFilter, Ledger, TransactionClient},
    Badge, ProgramContext, Reward, UserBadge, UserReward,
};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

pub const T0: i64 = 1_700_000_000;

/// Badge and reward ids of the standard scenario.
pub const BADGE_ID: u64 = 1;
pub const REWARD_ID: u64 = 1;
pub const REWARD_VALUE: u64 = 10;
pub const MAX_EARNINGS: u64 = 5;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A resolved instruction: program, account keys in order, data.
struct Call {
    program_id: Pubkey,
    accounts: Vec<Pubkey>,
    data: Vec<u8>,
}

type Accounts = HashMap<Pubkey, Vec<u8>>;

/// `update_badge` arguments as the program declares them, independent of the
/// client's own encoding.
#[derive(AnchorDeserialize)]
struct ProgramUpdateBadge {
    badge_id: u64,
    name: Option<String>,
    description: Option<String>,
    icon_uri: Option<String>,
    required_points: Option<u64>,
    max_earnings: Option<u64>,
    is_active: Option<bool>,
}

/// `update_reward` arguments as the program declares them.
#[derive(AnchorDeserialize)]
struct ProgramUpdateReward {
    badge_id: u64,
    reward_id: u64,
    name: Option<String>,
    description: Option<String>,
    reward_type: Option<u8>,
    reward_value: Option<u64>,
    token_mint: Option<Pubkey>,
    nft_mint: Option<Pubkey>,
    is_active: Option<bool>,
}

pub struct MockLedger {
    ctx: ProgramContext,
    pub clock: Arc<ManualClock>,
    accounts: Mutex<Accounts>,
    offline: AtomicBool,
    submitted: Mutex<Vec<Transaction>>,
}

impl MockLedger {
    pub fn new(ctx: ProgramContext) -> Self {
        Self {
            ctx,
            clock: Arc::new(ManualClock::new(T0)),
            accounts: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Makes every call fail as if the endpoint were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn put_raw(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(address, data);
    }

    fn check_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn execute(&self, state: &mut Accounts, call: &Call) -> Result<(), String> {
        if call.program_id == associated_token::ID {
            // Token balances are not modelled; the account only has to exist.
            state.entry(call.accounts[1]).or_default();
            return Ok(());
        }
        if call.program_id != *self.ctx.program_id() {
            return Err(format!("unknown program {}", call.program_id));
        }
        if call.data.len() < 8 {
            return Err("InstructionMissing".to_string());
        }
        let (tag, mut args) = call.data.split_at(8);
        let name = [
            ix::INITIALIZE_BADGE,
            ix::UPDATE_BADGE,
            ix::INITIALIZE_REWARD,
            ix::UPDATE_REWARD,
            ix::CLAIM_REWARD,
            ix::GET_USER_BADGES,
            ix::GET_USER_REWARDS,
            ix::STAKE_BADGE,
            ix::UNSTAKE_BADGE,
            ix::FREEZE_BADGE,
        ]
        .into_iter()
        .find(|name| discriminator(name) == tag)
        .ok_or_else(|| "InstructionFallbackNotFound".to_string())?;

        let now = self.clock.now();
        let keys = &call.accounts;
        match name {
            ix::INITIALIZE_BADGE => {
                let data = decode::<InitializeBadgeData>(&mut args)?;
                let (address, bump) = pda::badge_address(&keys[2], data.badge_id, &self.ctx);
                expect_address(keys[1], address)?;
                create(
                    state,
                    address,
                    &Badge {
                        owner: keys[2],
                        badge_id: data.badge_id,
                        name: data.name,
                        description: data.description,
                        icon_uri: data.icon_uri,
                        required_points: data.required_points,
                        max_earnings: data.max_earnings,
                        total_earned: 0,
                        is_active: data.is_active,
                        bump,
                    },
                )
            }
            ix::UPDATE_BADGE => {
                let data = decode::<ProgramUpdateBadge>(&mut args)?;
                expect_address(keys[1], pda::badge_address(&keys[2], data.badge_id, &self.ctx).0)?;
                let mut badge: Badge = load(state, &keys[1])?;
                require(badge.owner == keys[2], "Unauthorized")?;
                require(badge.badge_id == data.badge_id, "InvalidBadgeId")?;
                if let Some(name) = data.name {
                    require(name.len() <= 100, "NameTooLong")?;
                    badge.name = name;
                }
                if let Some(description) = data.description {
                    require(description.len() <= 500, "DescriptionTooLong")?;
                    badge.description = description;
                }
                if let Some(icon_uri) = data.icon_uri {
                    require(icon_uri.len() <= 200, "IconUriTooLong")?;
                    badge.icon_uri = icon_uri;
                }
                if let Some(required_points) = data.required_points {
                    require(required_points > 0, "InvalidRequiredPoints")?;
                    badge.required_points = required_points;
                }
                if let Some(max_earnings) = data.max_earnings {
                    require(max_earnings > 0, "InvalidMaxEarnings")?;
                    badge.max_earnings = max_earnings;
                }
                if let Some(is_active) = data.is_active {
                    badge.is_active = is_active;
                }
                store(state, keys[1], &badge)
            }
            ix::INITIALIZE_REWARD => {
                let data = decode::<InitializeRewardData>(&mut args)?;
                let (address, bump) =
                    pda::reward_address(&keys[2], data.badge_id, data.reward_id, &self.ctx);
                expect_address(keys[1], address)?;
                require(data.reward_type <= 2, "InvalidRewardType")?;
                require(data.reward_type != 0 || data.token_mint.is_some(), "MissingTokenMint")?;
                require(data.reward_type != 1 || data.nft_mint.is_some(), "MissingNftMint")?;
                create(
                    state,
                    address,
                    &Reward {
                        owner: keys[2],
                        badge_id: data.badge_id,
                        reward_id: data.reward_id,
                        name: data.name,
                        description: data.description,
                        reward_type: data.reward_type,
                        reward_value: data.reward_value,
                        token_mint: data.token_mint,
                        nft_mint: data.nft_mint,
                        is_active: data.is_active,
                        bump,
                    },
                )
            }
            ix::UPDATE_REWARD => {
                let data = decode::<ProgramUpdateReward>(&mut args)?;
                let (address, _) =
                    pda::reward_address(&keys[2], data.badge_id, data.reward_id, &self.ctx);
                expect_address(keys[1], address)?;
                let mut reward: Reward = load(state, &keys[1])?;
                require(reward.owner == keys[2], "Unauthorized")?;
                require(reward.badge_id == data.badge_id, "InvalidBadgeId")?;
                require(reward.reward_id == data.reward_id, "InvalidRewardId")?;
                if let Some(name) = data.name {
                    require(name.len() <= 100, "NameTooLong")?;
                    reward.name = name;
                }
                if let Some(description) = data.description {
                    require(description.len() <= 500, "DescriptionTooLong")?;
                    reward.description = description;
                }
                if let Some(reward_type) = data.reward_type {
                    require(reward_type <= 2, "InvalidRewardType")?;
                    reward.reward_type = reward_type;
                }
                if let Some(reward_value) = data.reward_value {
                    require(reward_value > 0, "InvalidRewardValue")?;
                    reward.reward_value = reward_value;
                }
                // A sent mint sticks only on the matching type; otherwise the
                // field is nulled.
                if let Some(mint) = data.token_mint {
                    reward.token_mint = (reward.reward_type == 0).then_some(mint);
                }
                if let Some(mint) = data.nft_mint {
                    reward.nft_mint = (reward.reward_type == 1).then_some(mint);
                }
                if let Some(is_active) = data.is_active {
                    reward.is_active = is_active;
                }
                store(state, keys[1], &reward)
            }
            ix::CLAIM_REWARD => {
                let data = decode::<ClaimRewardData>(&mut args)?;
                let user = keys[8];
                expect_address(keys[1], pda::badge_address(&data.owner, data.badge_id, &self.ctx).0)?;
                expect_address(
                    keys[2],
                    pda::reward_address(&data.owner, data.badge_id, data.reward_id, &self.ctx).0,
                )?;
                expect_address(keys[4], pda::user_badge_address(&user, data.badge_id, &self.ctx).0)?;
                let (user_reward, bump) = pda::user_reward_address(&user, data.reward_id, &self.ctx);
                expect_address(keys[3], user_reward)?;

                let _badge: Badge = load(state, &keys[1])?;
                let reward: Reward = load(state, &keys[2])?;
                let _held: UserBadge = load(state, &keys[4])?;
                require(reward.is_active, "RewardNotActive")?;
                require(reward.reward_type == data.reward_type, "InvalidRewardType")?;
                require(reward.reward_value == data.reward_value, "InvalidRewardValue")?;
                if reward.reward_type == 0 {
                    require(reward.token_mint == Some(keys[7]), "InvalidTokenMint")?;
                }
                create(
                    state,
                    user_reward,
                    &UserReward {
                        user,
                        reward_id: data.reward_id,
                        claimed_at: now,
                        bump,
                    },
                )
            }
            ix::GET_USER_BADGES | ix::GET_USER_REWARDS => Ok(()),
            ix::STAKE_BADGE => {
                let data = decode::<BadgeIdData>(&mut args)?;
                let (owner, user) = (keys[3], keys[4]);
                expect_address(keys[1], pda::badge_address(&owner, data.badge_id, &self.ctx).0)?;
                let (user_badge, bump) = pda::user_badge_address(&user, data.badge_id, &self.ctx);
                expect_address(keys[2], user_badge)?;
                let mut badge: Badge = load(state, &keys[1])?;
                require(badge.is_active, "BadgeNotActive")?;
                require(badge.owner == owner, "Unauthorized")?;
                create(
                    state,
                    user_badge,
                    &UserBadge {
                        user,
                        badge_id: data.badge_id,
                        earned_at: now,
                        bump,
                    },
                )?;
                badge.total_earned = badge.total_earned.saturating_add(1);
                store(state, keys[1], &badge)
            }
            ix::UNSTAKE_BADGE => {
                let data = decode::<BadgeIdData>(&mut args)?;
                let mut badge: Badge = load(state, &keys[1])?;
                let held: UserBadge = load(state, &keys[2])?;
                require(badge.owner == keys[3], "Unauthorized")?;
                require(held.user == keys[4] && held.badge_id == data.badge_id, "Unauthorized")?;
                badge.total_earned = badge.total_earned.saturating_sub(1);
                store(state, keys[1], &badge)
            }
            ix::FREEZE_BADGE => {
                let data = decode::<BadgeIdData>(&mut args)?;
                let mut badge: Badge = load(state, &keys[1])?;
                require(badge.owner == keys[2], "Unauthorized")?;
                require(badge.badge_id == data.badge_id, "InvalidBadgeId")?;
                badge.is_active = false;
                store(state, keys[1], &badge)
            }
            other => Err(format!("unhandled instruction {other}")),
        }
    }
}

fn decode<T: AnchorDeserialize>(args: &mut &[u8]) -> Result<T, String> {
    T::deserialize(args).map_err(|_| "InstructionDidNotDeserialize".to_string())
}

fn require(condition: bool, code: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(code.to_string())
    }
}

fn expect_address(got: Pubkey, expected: Pubkey) -> Result<(), String> {
    require(got == expected, "ConstraintSeeds")
}

fn load<T: AccountDeserialize>(state: &Accounts, address: &Pubkey) -> Result<T, String> {
    let data = state
        .get(address)
        .ok_or_else(|| "AccountNotInitialized".to_string())?;
    let mut bytes = data.as_slice();
    T::try_deserialize(&mut bytes).map_err(|_| "AccountDidNotDeserialize".to_string())
}

fn store<T: AccountSerialize>(state: &mut Accounts, address: Pubkey, account: &T) -> Result<(), String> {
    let mut data = Vec::new();
    account
        .try_serialize(&mut data)
        .map_err(|_| "AccountDidNotSerialize".to_string())?;
    state.insert(address, data);
    Ok(())
}

fn create<T: AccountSerialize>(state: &mut Accounts, address: Pubkey, account: &T) -> Result<(), String> {
    if state.contains_key(&address) {
        return Err(format!("Allocate: account Address {{ address: {address}, base: None }} already in use"));
    }
    store(state, address, account)
}

#[async_trait]
impl Ledger for MockLedger {
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.check_online()?;
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        self.check_online()?;
        transaction.verify().map_err(|err| LedgerError::Rejected {
            message: err.to_string(),
            logs: Vec::new(),
        })?;
        self.submitted.lock().unwrap().push(transaction.clone());

        let keys = &transaction.message.account_keys;
        let calls: Vec<Call> = transaction
            .message
            .instructions
            .iter()
            .map(|compiled| Call {
                program_id: keys[compiled.program_id_index as usize],
                accounts: compiled.accounts.iter().map(|i| keys[*i as usize]).collect(),
                data: compiled.data.clone(),
            })
            .collect();

        let mut accounts = self.accounts.lock().unwrap();
        let mut scratch = accounts.clone();
        let mut logs = Vec::new();
        for (index, call) in calls.iter().enumerate() {
            logs.push(format!("Program {} invoke [1]", call.program_id));
            if let Err(code) = self.execute(&mut scratch, call) {
                logs.push(format!("Program log: AnchorError occurred. Error Code: {code}."));
                logs.push(format!("Program {} failed: custom program error", call.program_id));
                return Err(LedgerError::Rejected {
                    message: format!(
                        "Transaction simulation failed: Error processing Instruction {index}: {code}"
                    ),
                    logs,
                });
            }
            logs.push(format!("Program {} success", call.program_id));
        }
        *accounts = scratch;
        Ok(transaction.signatures[0])
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        self.check_online()?;
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn accounts_matching(
        &self,
        _program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        self.check_online()?;
        let accounts = self.accounts.lock().unwrap();
        let mut matched: Vec<(Pubkey, Vec<u8>)> = accounts
            .iter()
            .filter(|(_, data)| filters.iter().all(|filter| filter.matches(data)))
            .map(|(address, data)| (*address, data.clone()))
            .collect();
        matched.sort_by_key(|(address, _)| *address);
        Ok(matched)
    }
}

/// Everyone who appears in a scenario.
pub struct Actors {
    pub owner: Keypair,
    pub user: Keypair,
    pub mint: Pubkey,
}

impl Actors {
    pub fn new() -> Self {
        Self {
            owner: Keypair::new(),
            user: Keypair::new(),
            mint: Pubkey::new_unique(),
        }
    }

    pub fn owner_key(&self) -> Pubkey {
        self.owner.pubkey()
    }

    pub fn user_key(&self) -> Pubkey {
        self.user.pubkey()
    }
}

/// Client, ledger and actors wired to a fresh program id.
pub fn harness() -> (ProgramContext, Arc<MockLedger>, TransactionClient<MockLedger>, Actors) {
    init_logger();
    let ctx = ProgramContext::new(Pubkey::new_unique());
    let ledger = Arc::new(MockLedger::new(ctx));
    let client = TransactionClient::new(ctx, Arc::clone(&ledger));
    (ctx, ledger, client, Actors::new())
}

/// Issues badge `(owner, BADGE_ID)` and submits it.
pub async fn issue_badge(
    ctx: &ProgramContext,
    client: &TransactionClient<MockLedger>,
    actors: &Actors,
) {
    let built = initialize_badge(
        ctx,
        &InitializeBadgeArgs {
            fee_payer: actors.owner_key(),
            owner: actors.owner_key(),
            badge_id: BADGE_ID.into(),
            name: "Early Adopter".to_string(),
            description: "Joined in the first week".to_string(),
            icon_uri: "https://example.org/early.png".to_string(),
            required_points: 100u64.into(),
            max_earnings: MAX_EARNINGS.into(),
            is_active: true,
        },
    )
    .unwrap();
    client.submit(&built, &[&actors.owner]).await.unwrap();
}

/// Issues a Token reward `(owner, BADGE_ID, REWARD_ID)` worth 10 of
/// `actors.mint`.
pub async fn issue_token_reward(
    ctx: &ProgramContext,
    client: &TransactionClient<MockLedger>,
    actors: &Actors,
) {
    issue_reward(ctx, client, actors, 0, Some(actors.mint)).await;
}

/// Issues reward `(owner, BADGE_ID, REWARD_ID)` of `reward_type`, with
/// `token_mint` for Token rewards and no mint otherwise.
pub async fn issue_reward(
    ctx: &ProgramContext,
    client: &TransactionClient<MockLedger>,
    actors: &Actors,
    reward_type: u8,
    token_mint: Option<Pubkey>,
) {
    let built = initialize_reward(
        ctx,
        &InitializeRewardArgs {
            fee_payer: actors.owner_key(),
            owner: actors.owner_key(),
            badge_id: BADGE_ID.into(),
            reward_id: REWARD_ID.into(),
            name: "Launch bonus".to_string(),
            description: "Ten tokens".to_string(),
            reward_type,
            reward_value: REWARD_VALUE.into(),
            token_mint,
            nft_mint: None,
            is_active: true,
        },
    )
    .unwrap();
    client.submit(&built, &[&actors.owner]).await.unwrap();
}

/// Awards badge `(owner, BADGE_ID)` to the user.
pub async fn award(ctx: &ProgramContext, client: &TransactionClient<MockLedger>, actors: &Actors) {
    let built = award_badge(
        ctx,
        &BadgeHolderArgs {
            fee_payer: actors.owner_key(),
            badge_owner: actors.owner_key(),
            user: actors.user_key(),
            badge_id: BADGE_ID.into(),
        },
    )
    .unwrap();
    client.submit(&built, &[&actors.owner, &actors.user]).await.unwrap();
}

pub fn claim_args(actors: &Actors) -> ClaimRewardArgs {
    ClaimRewardArgs {
        fee_payer: actors.user_key(),
        user: actors.user_key(),
        owner: actors.owner_key(),
        badge_id: BADGE_ID.into(),
        reward_id: REWARD_ID.into(),
        reward_type: 0,
        reward_value: REWARD_VALUE.into(),
        reward_mint: Some(actors.mint),
        user_token_account: None,
        reward_token_account: None,
    }
}
