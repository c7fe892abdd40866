use mockall::automock;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::error::SweepError;

pub trait TokenState: Send + Sync {
    fn mint(&self) -> Pubkey;
    fn owner(&self) -> Pubkey;
    fn amount(&self) -> u64;
}

pub trait TokenMint: Send + Sync {
    fn address(&self) -> Pubkey;
    fn supply(&self) -> u64;
    fn decimals(&self) -> u8;
    fn is_initialized(&self) -> bool;
}

/// Common surface over the legacy token program and its extended successor.
/// Covers exactly what scanning and cleanup need: unpacking account/mint
/// state and constructing close/burn instructions.
#[automock]
pub trait TokenInterface: Send + Sync {
    fn program_id(&self) -> Pubkey;

    fn unpack_token_account(
        &self,
        data: &[u8],
    ) -> Result<Box<dyn TokenState + Send + Sync>, SweepError>;

    fn unpack_mint(
        &self,
        mint: &Pubkey,
        mint_data: &[u8],
    ) -> Result<Box<dyn TokenMint + Send + Sync>, SweepError>;

    /// Close `account`, sending its full lamport balance to `destination`.
    fn create_close_account_instruction(
        &self,
        account: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
    ) -> Result<Instruction, SweepError>;

    fn create_burn_instruction(
        &self,
        account: &Pubkey,
        mint: &Pubkey,
        authority: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, SweepError>;
}
