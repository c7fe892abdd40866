use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};
use tokio::sync::Mutex;

use crate::{
    action::{build_action_instructions, ActionKind, ActionRequest, FeeSpec},
    config::Config,
    error::SweepError,
    gateway::LedgerGateway,
    inventory::{InventoryCache, InventorySnapshot},
    orchestrator::{execute, ExecutePolicy, TransactionSigner, TransactionStage},
    scan::{classify, AccountCategory, ClassifiedAccount, ResolvedDecimals},
    token::TokenProgramVariant,
};

/// Terminal report of one `perform_action` attempt that reached execution.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub stage: TransactionStage,
    pub message: String,
    pub signature: Option<Signature>,
}

/// Upward-facing facade over scanning, classification, transaction
/// construction and confirmation for a single wallet session.
pub struct SweepEngine {
    gateway: Arc<dyn LedgerGateway>,
    signer: Arc<dyn TransactionSigner>,
    fee: FeeSpec,
    policy: ExecutePolicy,
    inventory: InventoryCache,
    // Count of in-flight scans; overlapping refreshes must not clear the
    // loading flag for each other.
    refreshing: AtomicUsize,
    // One cleanup action at a time; scans stay concurrent.
    action_lock: Mutex<()>,
    // After an Expired outcome, actions are blocked until a refresh with a
    // newer generation lands. Zero means no block.
    rescan_floor: AtomicU64,
}

impl SweepEngine {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        signer: Arc<dyn TransactionSigner>,
        config: &Config,
    ) -> Result<Self, SweepError> {
        let fee = FeeSpec::from_config(&config.fee)?;
        let policy = ExecutePolicy {
            confirm_timeout: config.confirm_timeout(),
            poll_interval: config.confirm_poll(),
        };
        Ok(Self {
            gateway,
            signer,
            fee,
            policy,
            inventory: InventoryCache::new(config.refresh_interval()),
            refreshing: AtomicUsize::new(0),
            action_lock: Mutex::new(()),
            rescan_floor: AtomicU64::new(0),
        })
    }

    pub fn fee(&self) -> &FeeSpec {
        &self.fee
    }

    pub fn payer(&self) -> Pubkey {
        self.signer.pubkey()
    }

    pub fn inventory(&self) -> &InventoryCache {
        &self.inventory
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst) > 0
    }

    /// Scan both token programs for `owner`, classify, and install the
    /// result. A refresh that is superseded by a newer one while running
    /// has its result dropped; the returned snapshot is whatever readers
    /// now see.
    pub async fn refresh(&self, owner: &Pubkey) -> Result<Arc<InventorySnapshot>, SweepError> {
        if let Some(current) = self.inventory.get() {
            if current.owner != *owner {
                log::info!("Owner changed, discarding inventory for {}", current.owner);
                self.inventory.clear();
            }
        }

        let generation = self.inventory.next_ticket();
        self.refreshing.fetch_add(1, Ordering::SeqCst);
        let result = self.scan_owner(owner, generation).await;
        self.refreshing.fetch_sub(1, Ordering::SeqCst);

        Ok(self.inventory.install(result?))
    }

    async fn scan_owner(
        &self,
        owner: &Pubkey,
        generation: u64,
    ) -> Result<InventorySnapshot, SweepError> {
        let mut records = Vec::new();
        let mut undecodable = 0;
        for variant in TokenProgramVariant::ALL {
            let batch = self.gateway.get_token_accounts(owner, variant).await?;
            undecodable += batch.undecodable;
            records.extend(batch.records);
        }
        log::debug!("Fetched {} token accounts for {owner}", records.len());

        // One decimals lookup per unique mint; a failed lookup leaves the
        // mint unresolved and its accounts Ignored.
        let mut decimals_by_mint: HashMap<Pubkey, u8> = HashMap::new();
        for record in &records {
            if decimals_by_mint.contains_key(&record.mint_address) {
                continue;
            }
            match self.gateway.get_mint_decimals(&record.mint_address).await {
                Ok(decimals) => {
                    decimals_by_mint.insert(record.mint_address, decimals);
                }
                Err(e) => {
                    log::warn!("Decimals unresolved for mint {}: {e}", record.mint_address)
                }
            }
        }

        let outcome = classify(records, &ResolvedDecimals::new(decimals_by_mint));
        // Accounts the gateway could not decode count as unclassified too.
        let unresolved = outcome.unresolved + undecodable;
        if unresolved > 0 {
            log::warn!("{unresolved} account(s) could not be classified this scan");
        }

        Ok(InventorySnapshot {
            owner: *owner,
            generation,
            accounts: outcome.accounts,
            unresolved,
            taken_at: Instant::now(),
        })
    }

    /// Read-only view over the current snapshot.
    pub fn accounts_in(&self, category: AccountCategory) -> Vec<ClassifiedAccount> {
        match self.inventory.get() {
            Some(snapshot) => snapshot.accounts_in(category).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Perform one reclaim or burn against an account from the current
    /// snapshot.
    ///
    /// Pre-flight failures (no snapshot, unknown account, invalid pairing,
    /// rescan required) return `Err` without touching the chain. Attempts
    /// that reach execution return an `ActionOutcome` with a terminal
    /// stage; `Confirmed` triggers a refresh so the account disappears
    /// from subsequent views, `Expired` blocks further actions until the
    /// next scan.
    pub async fn perform_action(
        &self,
        account_address: &Pubkey,
        kind: ActionKind,
    ) -> Result<ActionOutcome, SweepError> {
        let _guard = self.action_lock.lock().await;

        let snapshot = self.inventory.get().ok_or_else(|| {
            SweepError::StaleInventory("no inventory snapshot; run a scan first".to_string())
        })?;

        let floor = self.rescan_floor.load(Ordering::SeqCst);
        if floor != 0 && snapshot.generation <= floor {
            return Err(SweepError::StaleInventory(
                "a previous transaction expired unconfirmed; re-scan before acting again"
                    .to_string(),
            ));
        }

        let target = snapshot
            .find(account_address)
            .cloned()
            .ok_or_else(|| SweepError::AccountNotFound(account_address.to_string()))?;

        let request = ActionRequest::new(target, kind)?;
        let payer = self.signer.pubkey();
        let instructions = build_action_instructions(&request, &self.fee, &payer)?;

        match execute(&instructions, self.signer.as_ref(), self.gateway.as_ref(), &self.policy)
            .await
        {
            Ok(confirmation) => {
                if let Err(e) = self.refresh(&snapshot.owner).await {
                    log::warn!("Post-action refresh failed: {e}");
                }
                Ok(ActionOutcome {
                    stage: TransactionStage::Confirmed,
                    message: format!(
                        "{kind:?} of {account_address} confirmed in transaction {}",
                        confirmation.signature
                    ),
                    signature: Some(confirmation.signature),
                })
            }
            Err(SweepError::ConfirmationTimeout(signature)) => {
                self.rescan_floor.store(snapshot.generation, Ordering::SeqCst);
                Ok(ActionOutcome {
                    stage: TransactionStage::Expired,
                    message: format!(
                        "Transaction {signature} was submitted but not confirmed in time; it may \
                         still land. Re-scan before retrying."
                    ),
                    signature: Signature::from_str(&signature).ok(),
                })
            }
            Err(SweepError::SignerRejected(reason)) => Ok(ActionOutcome {
                stage: TransactionStage::Failed,
                message: format!("Signature request was declined: {reason}"),
                signature: None,
            }),
            Err(SweepError::BroadcastError(reason)) => Ok(ActionOutcome {
                stage: TransactionStage::Failed,
                message: format!("The cluster rejected the transaction: {reason}"),
                signature: None,
            }),
            Err(other) => Err(other),
        }
    }
}
