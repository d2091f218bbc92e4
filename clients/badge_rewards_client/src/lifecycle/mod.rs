//! Reward lifecycle: claim, stake and unstake.
//!
//! ```text
//! Unclaimed --claim--> Liquid <--stake / unstake--> Staked
//! ```
//!
//! The transitions themselves are pure and take the current time as an
//! argument. [`StakeRegistry`] runs one actor per (user, reward) so that
//! concurrent callers never race on the same record.

pub mod actor;
pub mod clock;

pub use actor::{StakeHandle, StakeKey, StakeRegistry};
pub use clock::{Clock, ManualClock, SystemClock};

use crate::error::LifecycleError;

/// On-chain facts a claim depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimGate {
    /// A `UserBadge` exists for the reward's badge.
    pub holds_badge: bool,
    pub reward_active: bool,
    /// A `UserReward` already exists for this (user, reward).
    pub already_claimed: bool,
}

impl ClaimGate {
    /// All preconditions met.
    pub fn open() -> Self {
        Self {
            holds_badge: true,
            reward_active: true,
            already_claimed: false,
        }
    }

    /// First unmet precondition, double claims reported before anything else.
    pub fn check(&self) -> Result<(), LifecycleError> {
        if self.already_claimed {
            return Err(LifecycleError::AlreadyClaimed);
        }
        if !self.holds_badge {
            return Err(LifecycleError::MissingBadge);
        }
        if !self.reward_active {
            return Err(LifecycleError::RewardInactive);
        }
        Ok(())
    }
}

/// A live stake. Dropped on unstake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeRecord {
    pub staked_at: i64,
    pub minimum_period_secs: u64,
}

impl StakeRecord {
    pub fn new(staked_at: i64, minimum_period_secs: u64) -> Self {
        Self {
            staked_at,
            minimum_period_secs,
        }
    }

    /// `max(0, minimum - (now - staked_at))`.
    pub fn remaining_secs(&self, now: i64) -> u64 {
        let elapsed = i128::from(now) - i128::from(self.staked_at);
        let remaining = i128::from(self.minimum_period_secs) - elapsed;
        u64::try_from(remaining.max(0)).unwrap_or(u64::MAX)
    }

    pub fn unlocks_at(&self) -> i64 {
        self.staked_at.saturating_add_unsigned(self.minimum_period_secs)
    }

    pub fn is_unlocked(&self, now: i64) -> bool {
        now >= self.staked_at && self.remaining_secs(now) == 0
    }
}

/// Custody state of one reward held by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardLifecycle {
    #[default]
    Unclaimed,
    Liquid {
        claimed_at: i64,
    },
    Staked {
        claimed_at: i64,
        stake: StakeRecord,
    },
}

impl RewardLifecycle {
    /// A reward whose owner chose to stake it at issuance.
    pub fn staked_on_issue(now: i64, minimum_period_secs: u64) -> Self {
        RewardLifecycle::Staked {
            claimed_at: now,
            stake: StakeRecord::new(now, minimum_period_secs),
        }
    }

    pub fn is_claimed(&self) -> bool {
        !matches!(self, RewardLifecycle::Unclaimed)
    }

    pub fn is_staked(&self) -> bool {
        matches!(self, RewardLifecycle::Staked { .. })
    }

    pub fn stake_record(&self) -> Option<&StakeRecord> {
        match self {
            RewardLifecycle::Staked { stake, .. } => Some(stake),
            _ => None,
        }
    }

    /// Seconds until unstake is allowed, `None` unless staked.
    pub fn remaining_lock(&self, now: i64) -> Option<u64> {
        self.stake_record().map(|stake| stake.remaining_secs(now))
    }

    pub fn claim(&mut self, gate: ClaimGate, now: i64) -> Result<(), LifecycleError> {
        if self.is_claimed() {
            return Err(LifecycleError::AlreadyClaimed);
        }
        gate.check()?;
        *self = RewardLifecycle::Liquid { claimed_at: now };
        Ok(())
    }

    pub fn stake(&mut self, minimum_period_secs: u64, now: i64) -> Result<(), LifecycleError> {
        match *self {
            RewardLifecycle::Unclaimed => Err(LifecycleError::NotClaimed),
            RewardLifecycle::Staked { .. } => Err(LifecycleError::AlreadyStaked),
            RewardLifecycle::Liquid { claimed_at } => {
                *self = RewardLifecycle::Staked {
                    claimed_at,
                    stake: StakeRecord::new(now, minimum_period_secs),
                };
                Ok(())
            }
        }
    }

    /// Releases the stake once the minimum period has elapsed.
    ///
    /// Returns the record that was dropped.
    pub fn unstake(&mut self, now: i64) -> Result<StakeRecord, LifecycleError> {
        match *self {
            RewardLifecycle::Unclaimed => Err(LifecycleError::NotClaimed),
            RewardLifecycle::Liquid { .. } => Err(LifecycleError::NotStaked),
            RewardLifecycle::Staked { claimed_at, stake } => {
                if now < stake.staked_at {
                    return Err(LifecycleError::InvalidTimestamp {
                        now,
                        staked_at: stake.staked_at,
                    });
                }
                let remaining_secs = stake.remaining_secs(now);
                if remaining_secs > 0 {
                    return Err(LifecycleError::StillLocked { remaining_secs });
                }
                *self = RewardLifecycle::Liquid { claimed_at };
                Ok(stake)
            }
        }
    }
}
