use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

use crate::{error::SweepError, token::TokenProgramVariant};

/// Raw projection of one on-chain token account, as fetched. Decimals are
/// deliberately absent; they belong to the mint and are resolved during
/// classification through a [`DecimalsResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountRecord {
    pub account_address: Pubkey,
    pub mint_address: Pubkey,
    pub raw_amount: u64,
    pub owner_program: TokenProgramVariant,
    /// The account's native balance, recovered in full when it is closed.
    pub rent_lamports: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountCategory {
    /// Empty account whose rent can be reclaimed by closing it.
    Cleanable,
    /// Exactly one unit of a zero-decimals mint.
    Nft,
    /// Positive balance of a divisible token.
    FungibleToken,
    /// Unclassifiable; excluded from cleanup actions.
    Ignored,
}

impl AccountCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AccountCategory::Cleanable => "cleanable",
            AccountCategory::Nft => "nft",
            AccountCategory::FungibleToken => "fungible",
            AccountCategory::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAccount {
    pub record: TokenAccountRecord,
    pub decimals: u8,
    pub category: AccountCategory,
}

impl ClassifiedAccount {
    /// Balance in display units.
    pub fn ui_amount(&self) -> f64 {
        self.record.raw_amount as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// Capability for looking up a mint's decimals. Classification itself stays
/// pure; callers decide where decimals come from (chain, cache, fixture).
pub trait DecimalsResolver {
    fn resolve_decimals(&self, mint: &Pubkey) -> Result<u8, SweepError>;
}

/// Map-backed resolver; the engine pre-fetches decimals per unique mint and
/// hands the result here.
#[derive(Debug, Default)]
pub struct ResolvedDecimals(HashMap<Pubkey, u8>);

impl ResolvedDecimals {
    pub fn new(decimals_by_mint: HashMap<Pubkey, u8>) -> Self {
        Self(decimals_by_mint)
    }
}

impl DecimalsResolver for ResolvedDecimals {
    fn resolve_decimals(&self, mint: &Pubkey) -> Result<u8, SweepError> {
        self.0
            .get(mint)
            .copied()
            .ok_or_else(|| SweepError::ClassificationError(format!("No decimals for mint {mint}")))
    }
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// One entry per input record, in input order.
    pub accounts: Vec<ClassifiedAccount>,
    /// Records whose decimals could not be resolved; classified `Ignored`.
    pub unresolved: usize,
}

/// Classify every record. A resolver failure never fails the scan: the
/// account is kept as `Ignored` (decimals 0) and counted in `unresolved`.
pub fn classify(records: Vec<TokenAccountRecord>, resolver: &dyn DecimalsResolver) -> ScanOutcome {
    let mut accounts = Vec::with_capacity(records.len());
    let mut unresolved = 0;

    for record in records {
        let (decimals, category) = match resolver.resolve_decimals(&record.mint_address) {
            Ok(decimals) => (decimals, categorize(record.raw_amount, decimals)),
            Err(e) => {
                log::warn!("Could not resolve decimals for mint {}: {e}", record.mint_address);
                unresolved += 1;
                (0, AccountCategory::Ignored)
            }
        };
        accounts.push(ClassifiedAccount { record, decimals, category });
    }

    ScanOutcome { accounts, unresolved }
}

// Records only exist for accounts owned by a supported token program, so
// an empty balance is always cleanable here.
fn categorize(raw_amount: u64, decimals: u8) -> AccountCategory {
    if raw_amount == 0 {
        AccountCategory::Cleanable
    } else if raw_amount == 1 && decimals == 0 {
        AccountCategory::Nft
    } else {
        AccountCategory::FungibleToken
    }
}
