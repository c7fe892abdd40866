use serde::{Deserialize, Serialize};
use solana_client::client_error::ClientError;
use solana_program::program_error::ProgramError;
use solana_sdk::signature::SignerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepError {
    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Signature request rejected: {0}")]
    SignerRejected(String),

    #[error("Transaction rejected by the cluster: {0}")]
    BroadcastError(String),

    #[error("Transaction {0} was not confirmed before the deadline and may still land")]
    ConfirmationTimeout(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Classification failed: {0}")]
    ClassificationError(String),

    #[error("Inventory is stale: {0}")]
    StaleInventory(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<ClientError> for SweepError {
    fn from(e: ClientError) -> Self {
        let message = e.to_string();
        if message.contains("AccountNotFound") || message.contains("could not find account") {
            SweepError::AccountNotFound(message)
        } else {
            SweepError::RpcError(message)
        }
    }
}

impl From<SignerError> for SweepError {
    fn from(e: SignerError) -> Self {
        SweepError::SignerRejected(e.to_string())
    }
}

impl From<ProgramError> for SweepError {
    fn from(e: ProgramError) -> Self {
        SweepError::InternalError(e.to_string())
    }
}

impl From<bincode::Error> for SweepError {
    fn from(e: bincode::Error) -> Self {
        SweepError::SerializationError(e.to_string())
    }
}

impl From<bs58::decode::Error> for SweepError {
    fn from(e: bs58::decode::Error) -> Self {
        SweepError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for SweepError {
    fn from(e: std::io::Error) -> Self {
        SweepError::InternalError(e.to_string())
    }
}
