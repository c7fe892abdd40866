use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mockall::automock;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use std::{fs, time::Duration};
use tokio::time::Instant;

use crate::{
    constant::{DEFAULT_CONFIRM_POLL_MILLIS, DEFAULT_CONFIRM_TIMEOUT_SECS},
    error::SweepError,
    gateway::{ConfirmationStatus, LedgerGateway},
};

/// Lifecycle of one cleanup transaction. A transaction moves forward only;
/// `Confirmed`, `Failed` and `Expired` are terminal and a terminal
/// transaction is never resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStage {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Failed,
    /// Submitted but not confirmed before the deadline; outcome unknown.
    Expired,
}

impl TransactionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStage::Confirmed | TransactionStage::Failed | TransactionStage::Expired
        )
    }
}

/// Signing capability. The single suspension point where a human (or a
/// hardware device) may approve or reject the transaction.
#[automock]
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    async fn sign_transaction(&self, transaction: &Transaction) -> Result<Signature, SweepError>;
}

/// Keypair-backed signer. Accepts a base58 string, a "[0, 1, ...]" byte
/// array, or a path to a JSON keypair file.
pub struct LocalSigner {
    keypair: Keypair,
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_private_key_string(private_key: &str) -> Result<Self, SweepError> {
        if let Ok(file_content) = fs::read_to_string(private_key) {
            return Self::from_json_keypair(&file_content);
        }

        if private_key.trim().starts_with('[') && private_key.trim().ends_with(']') {
            return Self::from_u8_array_string(private_key);
        }

        Self::from_base58(private_key)
    }

    // Malformed key material is a configuration problem; `SignerRejected`
    // is reserved for a declined signature request.
    fn from_base58(private_key: &str) -> Result<Self, SweepError> {
        let decoded = bs58::decode(private_key)
            .into_vec()
            .map_err(|e| SweepError::ConfigError(format!("Invalid base58 private key: {e}")))?;
        Self::from_bytes(&decoded)
    }

    fn from_u8_array_string(array_str: &str) -> Result<Self, SweepError> {
        let inner = array_str.trim().trim_start_matches('[').trim_end_matches(']');
        let bytes: Vec<u8> = inner
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|e| SweepError::ConfigError(format!("Failed to parse byte array: {e}")))?;
        Self::from_bytes(&bytes)
    }

    fn from_json_keypair(json_content: &str) -> Result<Self, SweepError> {
        let bytes: Vec<u8> = serde_json::from_str(json_content).map_err(|e| {
            SweepError::ConfigError(format!(
                "Invalid JSON keypair, expected an array of 64 bytes: {e}"
            ))
        })?;
        Self::from_bytes(&bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, SweepError> {
        if bytes.len() != 64 {
            return Err(SweepError::ConfigError(format!(
                "Private key must be exactly 64 bytes, got {}",
                bytes.len()
            )));
        }
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| SweepError::ConfigError(format!("Invalid private key bytes: {e}")))?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, transaction: &Transaction) -> Result<Signature, SweepError> {
        Ok(self.keypair.try_sign_message(&transaction.message.serialize())?)
    }
}

/// Confirmation-side knobs for `execute`.
#[derive(Debug, Clone)]
pub struct ExecutePolicy {
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ExecutePolicy {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_CONFIRM_POLL_MILLIS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub signature: Signature,
    pub stage: TransactionStage,
}

/// Compile an unsigned transaction for the given payer. Blockhash is bound
/// separately, right before signing.
pub fn new_unsigned_transaction(instructions: &[Instruction], payer: &Pubkey) -> Transaction {
    Transaction::new_with_payer(instructions, Some(payer))
}

pub fn encode_transaction_b64(transaction: &Transaction) -> Result<String, SweepError> {
    let serialized = bincode::serialize(transaction)?;
    Ok(STANDARD.encode(serialized))
}

/// Drive one transaction through its full lifecycle: bind a fresh
/// blockhash, collect the signature, broadcast once, then poll until the
/// target commitment or the deadline.
///
/// Signer rejection and cluster rejection surface as errors before and
/// after broadcast respectively; a confirmation deadline surfaces as
/// `ConfirmationTimeout` carrying the signature, since the transaction may
/// still land.
pub async fn execute(
    instructions: &[Instruction],
    signer: &dyn TransactionSigner,
    gateway: &dyn LedgerGateway,
    policy: &ExecutePolicy,
) -> Result<Confirmation, SweepError> {
    let payer = signer.pubkey();
    let blockhash = gateway.get_latest_blockhash().await?;

    let mut transaction = new_unsigned_transaction(instructions, &payer);
    transaction.message.recent_blockhash = blockhash;
    log::debug!("Built transaction with {} instructions for payer {payer}", instructions.len());

    let signature = signer.sign_transaction(&transaction).await?;
    transaction.signatures[0] = signature;

    let signature = gateway.submit(&transaction).await?;
    log::info!("Submitted transaction {signature}");

    let deadline = Instant::now() + policy.confirm_timeout;
    loop {
        match gateway.confirm(&signature).await {
            Ok(ConfirmationStatus::Confirmed) => {
                log::info!("Transaction {signature} confirmed");
                return Ok(Confirmation { signature, stage: TransactionStage::Confirmed });
            }
            Ok(ConfirmationStatus::Failed(reason)) => {
                return Err(SweepError::BroadcastError(reason));
            }
            Ok(ConfirmationStatus::Pending) => {}
            // A failed status check is not a failed transaction; keep
            // polling until the deadline.
            Err(e) => log::warn!("Status check for {signature} failed: {e}"),
        }

        if Instant::now() >= deadline {
            return Err(SweepError::ConfirmationTimeout(signature.to_string()));
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}
