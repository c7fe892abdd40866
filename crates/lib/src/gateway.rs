use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mockall::automock;
use solana_account_decoder::UiAccountData;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_request::TokenAccountsFilter};
use solana_commitment_config::CommitmentConfig;
use solana_program_pack::Pack;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::{str::FromStr, sync::Arc, time::Duration};

use crate::{error::SweepError, scan::TokenAccountRecord, token::TokenProgramVariant};

/// Outcome of a single signature status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Not yet visible at the target commitment; keep polling.
    Pending,
    Confirmed,
    /// Landed on chain but the transaction itself failed.
    Failed(String),
}

/// One token program's scan result: decoded records plus the count of
/// accounts that could not be decoded and were left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAccountBatch {
    pub records: Vec<TokenAccountRecord>,
    pub undecodable: usize,
}

/// Everything the engine needs from the cluster. Read-only queries plus
/// transaction submission and status checks; mockable for tests.
#[automock]
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn get_token_accounts(
        &self,
        owner: &Pubkey,
        variant: TokenProgramVariant,
    ) -> Result<TokenAccountBatch, SweepError>;

    async fn get_mint_decimals(&self, mint: &Pubkey) -> Result<u8, SweepError>;

    async fn get_rent_exempt_minimum(&self, account_size: usize) -> Result<u64, SweepError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, SweepError>;

    async fn submit(&self, transaction: &Transaction) -> Result<Signature, SweepError>;

    async fn confirm(&self, signature: &Signature) -> Result<ConfirmationStatus, SweepError>;
}

/// Bounded retry policy for read-only RPC calls. Submissions are never
/// retried through this.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts: attempts.max(1), backoff }
    }
}

pub struct RpcGateway {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
    retry: RetryPolicy,
}

impl RpcGateway {
    pub fn new(client: Arc<RpcClient>, commitment: CommitmentConfig, retry: RetryPolicy) -> Self {
        Self { client, commitment, retry }
    }

    /// Retry `RpcError` failures only; any other error is definitive and
    /// returned as-is.
    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T, SweepError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, SweepError>>,
    {
        let mut last_error = None;
        for attempt in 1..=self.retry.attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(SweepError::RpcError(message)) => {
                    log::warn!(
                        "RPC attempt {attempt}/{} failed: {message}",
                        self.retry.attempts
                    );
                    last_error = Some(SweepError::RpcError(message));
                    if attempt < self.retry.attempts {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
                Err(other) => return Err(other),
            }
        }
        Err(last_error
            .unwrap_or_else(|| SweepError::InternalError("retry exhausted".to_string())))
    }
}

#[async_trait]
impl LedgerGateway for RpcGateway {
    async fn get_token_accounts(
        &self,
        owner: &Pubkey,
        variant: TokenProgramVariant,
    ) -> Result<TokenAccountBatch, SweepError> {
        let keyed_accounts = self
            .with_retry(|| async {
                self.client
                    .get_token_accounts_by_owner(
                        owner,
                        TokenAccountsFilter::ProgramId(variant.program_id()),
                    )
                    .await
                    .map_err(SweepError::from)
            })
            .await?;

        let mut batch = TokenAccountBatch::default();
        for keyed in keyed_accounts {
            let Some((raw_amount, mint_address)) = parse_token_account_data(&keyed.account.data)
            else {
                log::warn!("Token account {} has undecodable data", keyed.pubkey);
                batch.undecodable += 1;
                continue;
            };
            let Ok(account_address) = Pubkey::from_str(&keyed.pubkey) else {
                log::warn!("Token account address {} does not parse", keyed.pubkey);
                batch.undecodable += 1;
                continue;
            };
            batch.records.push(TokenAccountRecord {
                account_address,
                mint_address,
                raw_amount,
                owner_program: variant,
                rent_lamports: keyed.account.lamports,
            });
        }
        Ok(batch)
    }

    async fn get_mint_decimals(&self, mint: &Pubkey) -> Result<u8, SweepError> {
        let account = self
            .with_retry(|| async { self.client.get_account(mint).await.map_err(SweepError::from) })
            .await
            .map_err(|e| match e {
                SweepError::AccountNotFound(_) => SweepError::AccountNotFound(mint.to_string()),
                other => other,
            })?;

        let variant = TokenProgramVariant::from_owner(&account.owner)?;
        let mint_state = variant.interface().unpack_mint(mint, &account.data)?;
        Ok(mint_state.decimals())
    }

    async fn get_rent_exempt_minimum(&self, account_size: usize) -> Result<u64, SweepError> {
        self.with_retry(|| async {
            self.client
                .get_minimum_balance_for_rent_exemption(account_size)
                .await
                .map_err(SweepError::from)
        })
        .await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, SweepError> {
        self.with_retry(|| async {
            self.client.get_latest_blockhash().await.map_err(SweepError::from)
        })
        .await
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Signature, SweepError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|e| SweepError::BroadcastError(e.to_string()))
    }

    async fn confirm(&self, signature: &Signature) -> Result<ConfirmationStatus, SweepError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(SweepError::from)?;

        match response.value.first().cloned().flatten() {
            None => Ok(ConfirmationStatus::Pending),
            Some(status) => {
                if let Some(err) = status.err {
                    Ok(ConfirmationStatus::Failed(err.to_string()))
                } else if status.satisfies_commitment(self.commitment) {
                    Ok(ConfirmationStatus::Confirmed)
                } else {
                    Ok(ConfirmationStatus::Pending)
                }
            }
        }
    }
}

/// Parse amount and mint out of a token account's RPC payload, whichever
/// encoding the node returned.
fn parse_token_account_data(data: &UiAccountData) -> Option<(u64, Pubkey)> {
    match data {
        UiAccountData::Json(parsed) => {
            let info = parsed.parsed.get("info")?;
            let mint = info.get("mint")?.as_str()?;
            let amount = info.get("tokenAmount")?.get("amount")?.as_str()?;
            Some((amount.parse().ok()?, Pubkey::from_str(mint).ok()?))
        }
        UiAccountData::Binary(data_str, _) => {
            let bytes = STANDARD.decode(data_str).ok()?;
            if let Ok(account) = spl_token_interface::state::Account::unpack(&bytes) {
                return Some((account.amount, account.mint));
            }
            if let Ok(account) = spl_token_2022_interface::state::Account::unpack(&bytes) {
                return Some((account.amount, account.mint));
            }
            None
        }
        _ => None,
    }
}
