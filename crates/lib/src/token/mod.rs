pub mod interface;
pub mod spl_token;
pub mod spl_token_2022;
pub mod token;

pub use interface::{TokenInterface, TokenMint, TokenState};
pub use token::TokenProgramVariant;
