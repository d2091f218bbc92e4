//! Signing, submission and failure normalization.
//!
//! [`Ledger`] is the only seam to the network. [`RpcLedger`] implements it
//! over the nonblocking JSON-RPC client; tests substitute an in-memory
//! ledger.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::Transaction,
};

use crate::{
    config::{ClientConfig, ProgramContext},
    error::{LedgerError, SubmissionFailure},
    instructions::BuiltInstruction,
};

/// Byte-equality filter on raw account data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl AccountFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len()) == Some(self.bytes.as_slice())
    }
}

/// Minimal ledger surface the client needs.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Sends a signed transaction and waits for confirmation.
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;

    /// Raw data of the account at `address`, `None` if it does not exist.
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Accounts owned by `program_id` whose data matches every filter.
    async fn accounts_matching(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError>;
}

/// [`Ledger`] backed by a Solana JSON-RPC endpoint.
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
            commitment,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.rpc_url.clone(), config.commitment)
    }
}

/// Sorts an RPC client error into "never got an answer" and "answered no",
/// keeping preflight simulation logs when the node returned them.
fn classify(err: ClientError) -> LedgerError {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError { message, data, .. }) => {
            let logs = match data {
                RpcResponseErrorData::SendTransactionPreflightFailure(simulation) => {
                    simulation.logs.clone().unwrap_or_default()
                }
                _ => Vec::new(),
            };
            LedgerError::Rejected {
                message: message.clone(),
                logs,
            }
        }
        ClientErrorKind::TransactionError(tx_err) => LedgerError::Rejected {
            message: tx_err.to_string(),
            logs: Vec::new(),
        },
        _ => LedgerError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.client.get_latest_blockhash().await.map_err(classify)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(classify)
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(classify)?;
        Ok(response.value.map(|account| account.data))
    }

    async fn accounts_matching(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(
                filters
                    .iter()
                    .map(|f| RpcFilterType::Memcmp(Memcmp::new_base58_encoded(f.offset, &f.bytes)))
                    .collect(),
            ),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(classify)?;
        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }
}

/// Submits built instructions through a [`Ledger`].
pub struct TransactionClient<L: Ledger> {
    ctx: ProgramContext,
    ledger: Arc<L>,
}

impl<L: Ledger> Clone for TransactionClient<L> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx,
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: Ledger> TransactionClient<L> {
    pub fn new(ctx: ProgramContext, ledger: Arc<L>) -> Self {
        Self { ctx, ledger }
    }

    pub fn context(&self) -> &ProgramContext {
        &self.ctx
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Signs and submits `built`, setup instructions first.
    ///
    /// `signers` may hold more keys than the transaction needs; only the
    /// required ones sign. A missing signer or a foreign program id fails
    /// before anything is sent. Nothing is retried. Signers are `Sync` so the
    /// returned future can be spawned onto a multi-threaded runtime.
    pub async fn submit(
        &self,
        built: &BuiltInstruction,
        signers: &[&(dyn Signer + Sync)],
    ) -> Result<Signature, SubmissionFailure> {
        if built.program_id != *self.ctx.program_id() {
            return Err(SubmissionFailure::local(format!(
                "{} targets program {}, client is bound to {}",
                built.name,
                built.program_id,
                self.ctx.program_id()
            )));
        }

        let fee_payer = built.fee_payer();
        let mut transaction =
            Transaction::new_with_payer(&built.transaction_instructions(), Some(&fee_payer));

        let mut chosen: Vec<&(dyn Signer + Sync)> = Vec::new();
        for required in transaction.message.signer_keys() {
            match signers.iter().find(|signer| signer.pubkey() == *required) {
                Some(signer) => chosen.push(*signer),
                None => {
                    let role = built
                        .accounts
                        .iter()
                        .find(|binding| binding.address == *required)
                        .map_or("setup", |binding| binding.role);
                    return Err(SubmissionFailure::local(format!(
                        "{}: missing signature for `{role}` ({required})",
                        built.name
                    )));
                }
            }
        }

        debug!(
            "submitting {} with {} instruction(s), fee payer {fee_payer}",
            built.name,
            transaction.message.instructions.len()
        );

        let blockhash = self.ledger.latest_blockhash().await.map_err(|err| {
            warn!("{}: could not fetch blockhash: {err}", built.name);
            SubmissionFailure::capture(&err)
        })?;
        {
            let signing: Vec<&dyn Signer> =
                chosen.iter().map(|signer| *signer as &dyn Signer).collect();
            transaction
                .try_sign(&signing, blockhash)
                .map_err(|err| SubmissionFailure::capture(&err))?;
        }

        match self.ledger.send_and_confirm(&transaction).await {
            Ok(signature) => {
                info!("{} confirmed: {signature}", built.name);
                Ok(signature)
            }
            Err(err) => {
                let failure = SubmissionFailure::capture(&err);
                warn!(
                    "{} failed: {} ({} log line(s))",
                    built.name,
                    failure.message,
                    failure.logs.len()
                );
                for line in &failure.logs {
                    debug!("  {line}");
                }
                Err(failure)
            }
        }
    }
}
