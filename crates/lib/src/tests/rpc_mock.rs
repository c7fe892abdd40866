use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_request::RpcRequest};
use solana_sdk::{account::Account, pubkey::Pubkey};
use std::{collections::HashMap, sync::Arc};

use crate::tests::account_mock::MintAccountMockBuilder;

pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:8899";

/// Builder for mock RPC clients with canned responses per request kind.
pub struct RpcMockBuilder {
    mocks: HashMap<RpcRequest, Value>,
}

impl Default for RpcMockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcMockBuilder {
    pub fn new() -> Self {
        Self { mocks: HashMap::new() }
    }

    pub fn with_account_info(mut self, account: &Account) -> Self {
        let encoded_data = STANDARD.encode(&account.data);
        self.mocks.insert(
            RpcRequest::GetAccountInfo,
            json!({
                "context": { "slot": 1 },
                "value": {
                    "data": [encoded_data, "base64"],
                    "executable": account.executable,
                    "lamports": account.lamports,
                    "owner": account.owner.to_string(),
                    "rentEpoch": account.rent_epoch
                }
            }),
        );
        self
    }

    pub fn with_account_not_found(mut self) -> Self {
        self.mocks.insert(
            RpcRequest::GetAccountInfo,
            json!({
                "context": { "slot": 1 },
                "value": null
            }),
        );
        self
    }

    pub fn with_mint_account(self, decimals: u8) -> Self {
        let mint_account = MintAccountMockBuilder::new().with_decimals(decimals).build();
        self.with_account_info(&mint_account)
    }

    pub fn with_token_accounts(mut self, accounts: &[(Pubkey, Account)]) -> Self {
        let keyed: Vec<Value> = accounts
            .iter()
            .map(|(pubkey, account)| {
                json!({
                    "pubkey": pubkey.to_string(),
                    "account": {
                        "data": [STANDARD.encode(&account.data), "base64"],
                        "executable": account.executable,
                        "lamports": account.lamports,
                        "owner": account.owner.to_string(),
                        "rentEpoch": account.rent_epoch
                    }
                })
            })
            .collect();
        self.mocks.insert(
            RpcRequest::GetTokenAccountsByOwner,
            json!({
                "context": { "slot": 1 },
                "value": keyed
            }),
        );
        self
    }

    pub fn with_blockhash(mut self) -> Self {
        self.mocks.insert(
            RpcRequest::GetLatestBlockhash,
            json!({
                "context": { "slot": 1 },
                "value": {
                    "blockhash": Pubkey::new_unique().to_string(),
                    "lastValidBlockHeight": 1000
                }
            }),
        );
        self
    }

    pub fn with_confirmed_signature_status(mut self) -> Self {
        self.mocks.insert(
            RpcRequest::GetSignatureStatuses,
            json!({
                "context": { "slot": 1 },
                "value": [
                    {
                        "slot": 1,
                        "confirmations": null,
                        "err": null,
                        "status": { "Ok": null },
                        "confirmationStatus": "finalized"
                    }
                ]
            }),
        );
        self
    }

    pub fn with_unknown_signature_status(mut self) -> Self {
        self.mocks.insert(
            RpcRequest::GetSignatureStatuses,
            json!({
                "context": { "slot": 1 },
                "value": [null]
            }),
        );
        self
    }

    pub fn with_failed_signature_status(mut self) -> Self {
        self.mocks.insert(
            RpcRequest::GetSignatureStatuses,
            json!({
                "context": { "slot": 1 },
                "value": [
                    {
                        "slot": 1,
                        "confirmations": null,
                        "err": { "InstructionError": [1, { "Custom": 1 }] },
                        "status": { "Err": { "InstructionError": [1, { "Custom": 1 }] } },
                        "confirmationStatus": "finalized"
                    }
                ]
            }),
        );
        self
    }

    pub fn build(self) -> Arc<RpcClient> {
        Arc::new(RpcClient::new_mock_with_mocks(DEFAULT_LOCAL_RPC_URL.to_string(), self.mocks))
    }
}
