//! Error types for the badge rewards client.
//!
//! ## Categories
//! - Validation: malformed or missing seed/argument input ([`DerivationError`],
//!   [`BuildError`]); detected before any network call
//! - Applicability: an argument that does not fit the reward type
//!   ([`BuildError::Inapplicable`], [`BuildError::RequiredFor`])
//! - Submission: the ledger rejected or could not confirm a transaction
//!   ([`SubmissionFailure`])
//! - Reads: missing or undecodable accounts ([`FetchError`])
//! - Lifecycle: claim / stake / unstake rejected by the state machine
//!   ([`LifecycleError`])

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::state::RewardType;

/// Why a numeric input could not be normalized to `u64`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegerInputError {
    #[error("value is absent")]
    Absent,

    #[error("`{0}` is not an unsigned decimal integer")]
    NotNumeric(String),

    #[error("{0} is negative")]
    Negative(i128),

    #[error("{0} exceeds u64::MAX")]
    Overflow(u128),
}

/// Seed validation failures raised by [`crate::pda`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// A required seed component was not supplied.
    #[error("invalid seeds for {derivation}: {field} is missing")]
    MissingField {
        derivation: &'static str,
        field: &'static str,
    },

    /// A numeric seed component could not be coerced to `u64`.
    #[error("invalid seeds for {derivation}: {field}: {source}")]
    InvalidInteger {
        derivation: &'static str,
        field: &'static str,
        #[source]
        source: IntegerInputError,
    },

    /// The seed set handed to [`crate::pda::derive`] belongs to another kind.
    #[error("seed set for {got} cannot derive a {expected} address")]
    KindMismatch {
        expected: &'static str,
        got: &'static str,
    },
}

/// Build-time failures raised by [`crate::instructions`].
///
/// None of these ever reach the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    // ========== Input Validation ==========
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// A required argument was not supplied.
    #[error("argument `{field}` is missing")]
    MissingArgument { field: &'static str },

    /// A numeric argument could not be normalized to `u64`.
    #[error("argument `{field}`: {source}")]
    InvalidInteger {
        field: &'static str,
        #[source]
        source: IntegerInputError,
    },

    /// A numeric argument is outside the range the program accepts.
    #[error("argument `{field}` {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },

    /// A text argument exceeds the program's byte limit.
    #[error("argument `{field}` is {len} bytes (max {max})")]
    TextTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The reward type byte is not one of the known discriminants.
    #[error("invalid reward type {0} (must be 0=Token, 1=NFT, 2=Other)")]
    InvalidRewardType(u8),

    // ========== Applicability ==========
    /// An optional argument was supplied for a reward type that cannot use it.
    #[error("argument `{field}` does not apply to {reward_type} rewards")]
    Inapplicable {
        field: &'static str,
        reward_type: RewardType,
    },

    /// An optional argument is mandatory for this reward type.
    #[error("argument `{field}` is required for {reward_type} rewards")]
    RequiredFor {
        field: &'static str,
        reward_type: RewardType,
    },

    /// `FieldUpdate::Clear` was used on a field the program cannot null out.
    #[error("field `{field}` cannot be cleared")]
    NotClearable { field: &'static str },

    /// A mint can only be cleared when the reward type it will end up with
    /// is known.
    #[error("clearing `{field}` needs the reward type (set `reward_type` or `current_type`)")]
    ClearNeedsType { field: &'static str },

    /// Arguments could not be encoded.
    #[error("argument encoding failed: {0}")]
    Encoding(String),

    // ========== Account Binding ==========
    /// An account role had no address and none could be derived.
    #[error("no address bound for account role `{role}`")]
    MissingAccount { role: &'static str },
}

/// Transport-level failures reported by a [`crate::transaction::Ledger`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger could not be reached or did not answer.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger processed the request and rejected it.
    #[error("{message}")]
    Rejected { message: String, logs: Vec<String> },
}

/// Structured failure returned by [`crate::transaction::TransactionClient::submit`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionFailure {
    /// Human-readable summary.
    pub message: String,
    /// Program log lines from the failed simulation or execution, if any.
    pub logs: Vec<String>,
    /// The error's cause chain, outermost first.
    pub trace: Vec<String>,
}

impl SubmissionFailure {
    /// Captures `err` and its full source chain.
    pub fn capture(err: &(dyn std::error::Error + 'static)) -> Self {
        let logs = match err.downcast_ref::<LedgerError>() {
            Some(LedgerError::Rejected { logs, .. }) => logs.clone(),
            _ => Vec::new(),
        };
        let mut trace = Vec::new();
        let mut cause = Some(err);
        while let Some(current) = cause {
            trace.push(current.to_string());
            cause = current.source();
        }
        Self {
            message: err.to_string(),
            logs,
            trace,
        }
    }

    /// A failure detected locally, before anything was sent.
    pub fn local(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            trace: vec![message.clone()],
            message,
            logs: Vec::new(),
        }
    }
}

/// Read failures raised by [`crate::accessors`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No account exists at the address.
    #[error("account {0} not found")]
    NotFound(Pubkey),

    /// The ledger could not be queried.
    #[error("ledger unavailable while reading {address}: {message}")]
    Unavailable { address: Pubkey, message: String },

    /// The account exists but is not the expected type.
    #[error("account {address} could not be decoded: {message}")]
    Decode { address: Pubkey, message: String },
}

/// Transitions rejected by [`crate::lifecycle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    // ========== Claim ==========
    /// The (user, reward) pair has already been claimed.
    #[error("reward already claimed")]
    AlreadyClaimed,

    /// The user does not hold the badge the reward is gated behind.
    #[error("user does not hold the prerequisite badge")]
    MissingBadge,

    /// The reward is deactivated.
    #[error("reward is not active")]
    RewardInactive,

    // ========== Stake ==========
    /// Stake or unstake was attempted before a claim.
    #[error("reward has not been claimed")]
    NotClaimed,

    /// The reward is already locked in a stake.
    #[error("reward is already staked")]
    AlreadyStaked,

    /// Unstake was attempted on a liquid reward.
    #[error("reward is not staked")]
    NotStaked,

    /// The minimum stake period has not elapsed.
    #[error("minimum stake period not reached: {remaining_secs}s remaining")]
    StillLocked { remaining_secs: u64 },

    /// The supplied time precedes the recorded stake time.
    #[error("timestamp {now} precedes stake time {staked_at}")]
    InvalidTimestamp { now: i64, staked_at: i64 },

    // ========== Actor ==========
    /// The per-key actor stopped before answering.
    #[error("stake registry for this key has shut down")]
    RegistryClosed,
}
