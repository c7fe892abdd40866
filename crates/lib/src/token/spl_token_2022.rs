use super::interface::{TokenInterface, TokenMint, TokenState};
use crate::error::SweepError;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_token_2022_interface::{
    extension::StateWithExtensions,
    state::{Account as Token2022AccountState, Mint as Token2022MintState},
};

#[derive(Debug)]
pub struct Token2022Account {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenState for Token2022Account {
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
pub struct Token2022Mint {
    pub mint: Pubkey,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
}

impl TokenMint for Token2022Mint {
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

pub struct Token2022Program;

impl Default for Token2022Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Token2022Program {
    pub fn new() -> Self {
        Self
    }
}

impl TokenInterface for Token2022Program {
    fn program_id(&self) -> Pubkey {
        spl_token_2022_interface::id()
    }

    fn unpack_token_account(
        &self,
        data: &[u8],
    ) -> Result<Box<dyn TokenState + Send + Sync>, SweepError> {
        // Extension TLV data past the base state is irrelevant here.
        let state = StateWithExtensions::<Token2022AccountState>::unpack(data)?;

        Ok(Box::new(Token2022Account {
            mint: state.base.mint,
            owner: state.base.owner,
            amount: state.base.amount,
        }))
    }

    fn unpack_mint(
        &self,
        mint: &Pubkey,
        mint_data: &[u8],
    ) -> Result<Box<dyn TokenMint + Send + Sync>, SweepError> {
        let state = StateWithExtensions::<Token2022MintState>::unpack(mint_data)?;

        Ok(Box::new(Token2022Mint {
            mint: *mint,
            supply: state.base.supply,
            decimals: state.base.decimals,
            is_initialized: state.base.is_initialized,
        }))
    }

    fn create_close_account_instruction(
        &self,
        account: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
    ) -> Result<Instruction, SweepError> {
        Ok(spl_token_2022_interface::instruction::close_account(
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
        Ok(spl_token_2022_interface::instruction::burn(
            &self.program_id(),
            account,
            mint,
            authority,
            &[],
            amount,
        )?)
    }
}
