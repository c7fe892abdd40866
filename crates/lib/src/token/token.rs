use super::{
    interface::TokenInterface,
    spl_token::TokenProgram,
    spl_token_2022::Token2022Program,
};
use crate::error::SweepError;
use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// The two token program variants a wallet's accounts can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenProgramVariant {
    Spl,
    Token2022,
}

impl TokenProgramVariant {
    /// Scan order: the legacy program first, then the extended one.
    pub const ALL: [TokenProgramVariant; 2] =
        [TokenProgramVariant::Spl, TokenProgramVariant::Token2022];

    pub fn program_id(&self) -> Pubkey {
        match self {
            TokenProgramVariant::Spl => spl_token_interface::id(),
            TokenProgramVariant::Token2022 => spl_token_2022_interface::id(),
        }
    }

    pub fn interface(&self) -> Box<dyn TokenInterface> {
        match self {
            TokenProgramVariant::Spl => Box::new(TokenProgram::new()),
            TokenProgramVariant::Token2022 => Box::new(Token2022Program::new()),
        }
    }

    pub fn from_owner(owner: &Pubkey) -> Result<Self, SweepError> {
        if *owner == spl_token_interface::id() {
            Ok(TokenProgramVariant::Spl)
        } else if *owner == spl_token_2022_interface::id() {
            Ok(TokenProgramVariant::Token2022)
        } else {
            Err(SweepError::ClassificationError(format!(
                "Account owner {owner} is not a supported token program"
            )))
        }
    }
}

impl fmt::Display for TokenProgramVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenProgramVariant::Spl => write!(f, "spl-token"),
            TokenProgramVariant::Token2022 => write!(f, "token-2022"),
        }
    }
}
