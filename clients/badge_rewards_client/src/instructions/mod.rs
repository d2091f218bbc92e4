//! Instruction builders for the badge rewards program.
//!
//! Every builder derives the accounts it needs, validates and normalizes its
//! arguments, and binds each account role of the operation explicitly. A
//! builder either returns a complete [`BuiltInstruction`] or a
//! [`BuildError`]; nothing half-built ever reaches the transaction layer.

use anchor_lang::AnchorSerialize;
use solana_sdk::{
    hash::hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::{config::ProgramContext, error::BuildError, pda::U64Input};

pub mod claim_reward;
pub mod field_update;
pub mod freeze_badge;
pub mod get_user_badges;
pub mod get_user_rewards;
pub mod initialize_badge;
pub mod initialize_reward;
pub mod stake_badge;
pub mod unstake_badge;
pub mod update_badge;
pub mod update_reward;

pub use claim_reward::*;
pub use field_update::*;
pub use freeze_badge::*;
pub use get_user_badges::*;
pub use get_user_rewards::*;
pub use initialize_badge::*;
pub use initialize_reward::*;
pub use stake_badge::*;
pub use unstake_badge::*;
pub use update_badge::*;
pub use update_reward::*;

/// Role name of the account paying fees and rent. Always the first account.
pub const FEE_PAYER_ROLE: &str = "fee_payer";

/// Role name given to caller-supplied trailing accounts.
pub const REMAINING_ROLE: &str = "remaining";

/// Anchor instruction discriminator: `sha256("global:<name>")[..8]`.
pub fn discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest.to_bytes()[..8]);
    out
}

/// One account of an instruction, bound to the role it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBinding {
    pub role: &'static str,
    pub address: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountBinding {
    pub fn writable_signer(role: &'static str, address: Pubkey) -> Self {
        Self { role, address, is_signer: true, is_writable: true }
    }

    pub fn signer(role: &'static str, address: Pubkey) -> Self {
        Self { role, address, is_signer: true, is_writable: false }
    }

    pub fn writable(role: &'static str, address: Pubkey) -> Self {
        Self { role, address, is_signer: false, is_writable: true }
    }

    pub fn readonly(role: &'static str, address: Pubkey) -> Self {
        Self { role, address, is_signer: false, is_writable: false }
    }

    pub fn meta(&self) -> AccountMeta {
        if self.is_writable {
            AccountMeta::new(self.address, self.is_signer)
        } else {
            AccountMeta::new_readonly(self.address, self.is_signer)
        }
    }
}

/// A fully specified program instruction plus the setup it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInstruction {
    /// Program instruction name.
    pub name: &'static str,
    pub program_id: Pubkey,
    /// Accounts in wire order.
    pub accounts: Vec<AccountBinding>,
    /// Discriminator followed by the borsh-encoded arguments.
    pub data: Vec<u8>,
    /// Instructions that must run earlier in the same transaction.
    pub setup: Vec<Instruction>,
}

impl BuiltInstruction {
    pub(crate) fn new<A: AnchorSerialize>(
        ctx: &ProgramContext,
        name: &'static str,
        accounts: Vec<AccountBinding>,
        args: &A,
    ) -> Result<Self, BuildError> {
        debug_assert_eq!(accounts.first().map(|a| a.role), Some(FEE_PAYER_ROLE));
        let mut data = discriminator(name).to_vec();
        args.serialize(&mut data)
            .map_err(|err| BuildError::Encoding(err.to_string()))?;
        Ok(Self {
            name,
            program_id: *ctx.program_id(),
            accounts,
            data,
            setup: Vec::new(),
        })
    }

    pub(crate) fn with_setup(mut self, setup: Instruction) -> Self {
        self.setup.push(setup);
        self
    }

    /// Appends caller-supplied accounts after the fixed role list.
    pub fn with_remaining_accounts(mut self, metas: impl IntoIterator<Item = AccountMeta>) -> Self {
        self.accounts.extend(metas.into_iter().map(|meta| AccountBinding {
            role: REMAINING_ROLE,
            address: meta.pubkey,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        }));
        self
    }

    pub fn instruction(&self) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: self.accounts.iter().map(AccountBinding::meta).collect(),
            data: self.data.clone(),
        }
    }

    /// Setup instructions followed by the program instruction.
    pub fn transaction_instructions(&self) -> Vec<Instruction> {
        let mut instructions = self.setup.clone();
        instructions.push(self.instruction());
        instructions
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.accounts[0].address
    }

    /// Address bound to `role`, if the role is part of this instruction.
    pub fn address_of(&self, role: &str) -> Option<Pubkey> {
        self.accounts
            .iter()
            .find(|binding| binding.role == role)
            .map(|binding| binding.address)
    }

    pub fn roles(&self) -> Vec<&'static str> {
        self.accounts.iter().map(|binding| binding.role).collect()
    }

    /// Signing accounts, deduplicated by address, in wire order.
    pub fn required_signers(&self) -> Vec<&AccountBinding> {
        let mut signers: Vec<&AccountBinding> = Vec::new();
        for binding in self.accounts.iter().filter(|binding| binding.is_signer) {
            if !signers.iter().any(|seen| seen.address == binding.address) {
                signers.push(binding);
            }
        }
        signers
    }

    /// Serialized arguments without the discriminator.
    pub fn args_bytes(&self) -> &[u8] {
        &self.data[8..]
    }
}

// ========== Argument validation ==========

pub(crate) fn require_u64(field: &'static str, input: &U64Input) -> Result<u64, BuildError> {
    use crate::error::IntegerInputError;
    input.to_u64().map_err(|source| match source {
        IntegerInputError::Absent => BuildError::MissingArgument { field },
        source => BuildError::InvalidInteger { field, source },
    })
}

pub(crate) fn require_positive(field: &'static str, input: &U64Input) -> Result<u64, BuildError> {
    let value = require_u64(field, input)?;
    if value == 0 {
        return Err(BuildError::OutOfRange {
            field,
            reason: "must be greater than zero",
        });
    }
    Ok(value)
}

pub(crate) fn check_text(field: &'static str, text: &str, max: usize) -> Result<(), BuildError> {
    if text.len() > max {
        return Err(BuildError::TextTooLong {
            field,
            len: text.len(),
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_matches_anchor_sighash() {
        let digest = hash(b"global:initialize_badge").to_bytes();
        assert_eq!(discriminator("initialize_badge"), digest[..8]);
        assert_ne!(discriminator("initialize_badge"), discriminator("update_badge"));
    }

    #[test]
    fn account_meta_flags_follow_binding() {
        let key = Pubkey::new_unique();
        assert_eq!(
            AccountBinding::writable_signer("a", key).meta(),
            AccountMeta::new(key, true)
        );
        assert_eq!(
            AccountBinding::readonly("a", key).meta(),
            AccountMeta::new_readonly(key, false)
        );
        assert_eq!(
            AccountBinding::signer("a", key).meta(),
            AccountMeta::new_readonly(key, true)
        );
    }

    #[test]
    fn zero_is_rejected_for_positive_arguments() {
        assert_eq!(
            require_positive("required_points", &0u64.into()),
            Err(BuildError::OutOfRange {
                field: "required_points",
                reason: "must be greater than zero",
            })
        );
        assert_eq!(
            require_u64("badge_id", &U64Input::Absent),
            Err(BuildError::MissingArgument { field: "badge_id" })
        );
    }
}
