use super::interface::{TokenInterface, TokenMint, TokenState};
use crate::error::SweepError;
use solana_sdk::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use spl_token_interface::{
    self,
    state::{Account as TokenAccountState, Mint as MintState},
};

#[derive(Debug)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenState for TokenAccount {
    fn mint(&self) -> Pubkey {
        self.mint
    }
    fn owner(&self) -> Pubkey {
        self.owner
    }
    fn amount(&self) -> u64 {
        self.amount
    }
}

#[derive(Debug)]
pub struct SplMint {
    pub mint: Pubkey,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
}

impl TokenMint for SplMint {
    fn address(&self) -> Pubkey {
        self.mint
    }

    fn supply(&self) -> u64 {
        self.supply
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

pub struct TokenProgram;

impl Default for TokenProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProgram {
    pub fn new() -> Self {
        Self
    }
}

impl TokenInterface for TokenProgram {
    fn program_id(&self) -> Pubkey {
        spl_token_interface::id()
    }

    fn unpack_token_account(
        &self,
        data: &[u8],
    ) -> Result<Box<dyn TokenState + Send + Sync>, SweepError> {
        let account = TokenAccountState::unpack(data)?;

        Ok(Box::new(TokenAccount {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
        }))
    }

    fn unpack_mint(
        &self,
        mint: &Pubkey,
        mint_data: &[u8],
    ) -> Result<Box<dyn TokenMint + Send + Sync>, SweepError> {
        let mint_state = MintState::unpack(mint_data)?;

        Ok(Box::new(SplMint {
            mint: *mint,
            supply: mint_state.supply,
            decimals: mint_state.decimals,
            is_initialized: mint_state.is_initialized,
        }))
    }

    fn create_close_account_instruction(
        &self,
        account: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
    ) -> Result<Instruction, SweepError> {
        Ok(spl_token_interface::instruction::close_account(
            &self.program_id(),
            account,
            destination,
            authority,
            &[],
        )?)
    }

    fn create_burn_instruction(
        &self,
        account: &Pubkey,
        mint: &Pubkey,
        authority: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, SweepError> {
        Ok(spl_token_interface::instruction::burn(
            &self.program_id(),
            account,
            mint,
            authority,
            &[],
            amount,
        )?)
    }
}
