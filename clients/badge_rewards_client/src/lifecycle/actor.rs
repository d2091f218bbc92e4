//! One actor per (user, reward).
//!
//! Every mutation for a key is a message to that key's task, handled in
//! arrival order, so at most one transition per key is ever in flight.
//! Distinct keys proceed independently.
//!
//! An actor runs until the registry retires it ([`StakeRegistry::release`],
//! [`StakeRegistry::evict_idle`], [`StakeRegistry::shutdown`]) or until every
//! sender to its mailbox is gone. Handles to a retired actor answer
//! [`LifecycleError::RegistryClosed`].

use std::{collections::HashMap, sync::Arc};

use log::{debug, warn};
use solana_sdk::pubkey::Pubkey;
use tokio::sync::{mpsc, oneshot, Mutex};

use super::{ClaimGate, Clock, RewardLifecycle, StakeRecord};
use crate::{config::ProgramContext, error::LifecycleError, pda};

const MAILBOX_CAPACITY: usize = 32;

/// Identity of one reward held by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StakeKey {
    pub user: Pubkey,
    /// Address of the reward account.
    pub reward: Pubkey,
}

impl StakeKey {
    pub fn new(user: Pubkey, reward: Pubkey) -> Self {
        Self { user, reward }
    }

    /// Key for the reward `(owner, badge_id, reward_id)`.
    pub fn for_reward(
        ctx: &ProgramContext,
        user: Pubkey,
        owner: &Pubkey,
        badge_id: u64,
        reward_id: u64,
    ) -> Self {
        Self::new(user, pda::reward_address(owner, badge_id, reward_id, ctx).0)
    }
}

enum Command {
    Claim {
        gate: ClaimGate,
        reply: oneshot::Sender<Result<(), LifecycleError>>,
    },
    Stake {
        minimum_period_secs: u64,
        reply: oneshot::Sender<Result<(), LifecycleError>>,
    },
    Unstake {
        reply: oneshot::Sender<Result<StakeRecord, LifecycleError>>,
    },
    Snapshot {
        reply: oneshot::Sender<RewardLifecycle>,
    },
    /// Stop unconditionally, replying with the final state.
    Stop {
        reply: oneshot::Sender<RewardLifecycle>,
    },
    /// Stop unless a stake is in force; replies whether the actor stopped.
    StopIfIdle {
        reply: oneshot::Sender<bool>,
    },
}

async fn run(
    key: StakeKey,
    mut state: RewardLifecycle,
    clock: Arc<dyn Clock>,
    mut mailbox: mpsc::Receiver<Command>,
) {
    while let Some(command) = mailbox.recv().await {
        let now = clock.now();
        // A dropped reply receiver means the caller went away; the
        // transition still stands.
        match command {
            Command::Claim { gate, reply } => {
                let outcome = state.claim(gate, now);
                log_transition(&key, "claim", &outcome);
                let _ = reply.send(outcome);
            }
            Command::Stake {
                minimum_period_secs,
                reply,
            } => {
                let outcome = state.stake(minimum_period_secs, now);
                log_transition(&key, "stake", &outcome);
                let _ = reply.send(outcome);
            }
            Command::Unstake { reply } => {
                let outcome = state.unstake(now);
                log_transition(&key, "unstake", &outcome);
                let _ = reply.send(outcome);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(state);
            }
            Command::Stop { reply } => {
                let _ = reply.send(state);
                break;
            }
            Command::StopIfIdle { reply } => {
                let idle = !state.is_staked();
                let _ = reply.send(idle);
                if idle {
                    break;
                }
            }
        }
    }
    debug!("stake actor for {} / {} stopped", key.user, key.reward);
}

fn log_transition<T>(key: &StakeKey, action: &str, outcome: &Result<T, LifecycleError>) {
    match outcome {
        Ok(_) => debug!("{action} applied for {} / {}", key.user, key.reward),
        Err(err) => warn!("{action} rejected for {} / {}: {err}", key.user, key.reward),
    }
}

/// Cheap, cloneable handle to one key's actor.
#[derive(Clone)]
pub struct StakeHandle {
    key: StakeKey,
    mailbox: mpsc::Sender<Command>,
}

impl StakeHandle {
    pub fn key(&self) -> &StakeKey {
        &self.key
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, LifecycleError> {
        let (reply, response) = oneshot::channel();
        self.mailbox
            .send(command(reply))
            .await
            .map_err(|_| LifecycleError::RegistryClosed)?;
        response.await.map_err(|_| LifecycleError::RegistryClosed)
    }

    pub async fn claim(&self, gate: ClaimGate) -> Result<(), LifecycleError> {
        self.request(|reply| Command::Claim { gate, reply }).await?
    }

    pub async fn stake(&self, minimum_period_secs: u64) -> Result<(), LifecycleError> {
        self.request(|reply| Command::Stake {
            minimum_period_secs,
            reply,
        })
        .await?
    }

    pub async fn unstake(&self) -> Result<StakeRecord, LifecycleError> {
        self.request(|reply| Command::Unstake { reply }).await?
    }

    pub async fn snapshot(&self) -> Result<RewardLifecycle, LifecycleError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}

/// Spawns and tracks the per-key actors. Must be used inside a tokio runtime.
pub struct StakeRegistry {
    clock: Arc<dyn Clock>,
    actors: Mutex<HashMap<StakeKey, mpsc::Sender<Command>>>,
}

impl StakeRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            actors: Mutex::new(HashMap::new()),
        }
    }

    /// Handle for `key`, starting it as `Unclaimed` if it has no actor yet.
    pub async fn handle(&self, key: StakeKey) -> StakeHandle {
        self.handle_or_insert(key, RewardLifecycle::Unclaimed).await
    }

    /// Handle for `key`, starting it in `initial` if it has no actor yet.
    ///
    /// An existing actor keeps its state; `initial` is ignored.
    pub async fn handle_or_insert(&self, key: StakeKey, initial: RewardLifecycle) -> StakeHandle {
        let mut actors = self.actors.lock().await;
        if let Some(mailbox) = actors.get(&key) {
            if !mailbox.is_closed() {
                return StakeHandle {
                    key,
                    mailbox: mailbox.clone(),
                };
            }
        }

        let (mailbox, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        tokio::spawn(run(key, initial, Arc::clone(&self.clock), inbox));
        actors.insert(key, mailbox.clone());
        debug!("started stake actor for {} / {}", key.user, key.reward);
        StakeHandle { key, mailbox }
    }

    /// Stops the actor for `key` and forgets it, returning its final state.
    ///
    /// `None` if there was no live actor. A later `handle` for the same key
    /// starts afresh.
    pub async fn release(&self, key: &StakeKey) -> Option<RewardLifecycle> {
        let mailbox = self.actors.lock().await.remove(key)?;
        let (reply, response) = oneshot::channel();
        mailbox.send(Command::Stop { reply }).await.ok()?;
        let last = response.await.ok()?;
        debug!("released stake actor for {} / {}", key.user, key.reward);
        Some(last)
    }

    /// Stops every actor that holds no stake in force, and drops entries
    /// whose actor is already gone. Returns how many entries were removed.
    pub async fn evict_idle(&self) -> usize {
        let mut actors = self.actors.lock().await;
        let mut evicted = Vec::new();
        for (key, mailbox) in actors.iter() {
            let (reply, response) = oneshot::channel();
            let stopped = match mailbox.send(Command::StopIfIdle { reply }).await {
                Ok(()) => response.await.unwrap_or(true),
                Err(_) => true,
            };
            if stopped {
                evicted.push(*key);
            }
        }
        for key in &evicted {
            actors.remove(key);
        }
        if !evicted.is_empty() {
            debug!("evicted {} idle stake actor(s)", evicted.len());
        }
        evicted.len()
    }

    /// Stops every actor, staked or not, and empties the registry.
    pub async fn shutdown(&self) {
        let drained: Vec<_> = self.actors.lock().await.drain().collect();
        for (key, mailbox) in drained {
            let (reply, response) = oneshot::channel();
            if mailbox.send(Command::Stop { reply }).await.is_ok() {
                if let Ok(RewardLifecycle::Staked { .. }) = response.await {
                    warn!(
                        "stopped stake actor for {} / {} with a stake in force",
                        key.user, key.reward
                    );
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.actors.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.actors.lock().await.is_empty()
    }
}
