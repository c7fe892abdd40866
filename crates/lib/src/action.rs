use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::str::FromStr;

use crate::{
    config::FeeConfig,
    error::SweepError,
    scan::{AccountCategory, ClassifiedAccount},
};

/// The mandatory service fee attached to every cleanup transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSpec {
    pub lamports: u64,
    pub recipient: Pubkey,
}

impl FeeSpec {
    pub fn from_config(config: &FeeConfig) -> Result<Self, SweepError> {
        if config.lamports == 0 {
            return Err(SweepError::ConfigError("fee.lamports must be positive".to_string()));
        }
        let recipient = Pubkey::from_str(&config.recipient).map_err(|e| {
            SweepError::ConfigError(format!(
                "fee.recipient is not a valid address ({}): {e}",
                config.recipient
            ))
        })?;
        Ok(Self { lamports: config.lamports, recipient })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Close an empty account and recover its rent.
    Reclaim,
    /// Burn the account's full balance.
    Burn,
}

/// A validated pairing of a classified account and an action. Construction
/// fails with `InvalidAction` before any instruction exists.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    target: ClassifiedAccount,
    kind: ActionKind,
}

impl ActionRequest {
    pub fn new(target: ClassifiedAccount, kind: ActionKind) -> Result<Self, SweepError> {
        let valid = match kind {
            ActionKind::Reclaim => target.category == AccountCategory::Cleanable,
            ActionKind::Burn => {
                matches!(target.category, AccountCategory::Nft | AccountCategory::FungibleToken)
            }
        };
        if !valid {
            return Err(SweepError::InvalidAction(format!(
                "{kind:?} is not valid for a {} account",
                target.category.label()
            )));
        }
        Ok(Self { target, kind })
    }

    pub fn target(&self) -> &ClassifiedAccount {
        &self.target
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

/// Build the instruction pair for one action. The fee transfer is always
/// instruction 0 and the close or burn instruction 1; both land atomically
/// or not at all.
pub fn build_action_instructions(
    request: &ActionRequest,
    fee: &FeeSpec,
    payer: &Pubkey,
) -> Result<Vec<Instruction>, SweepError> {
    let record = &request.target().record;

    let fee_transfer =
        solana_system_interface::instruction::transfer(payer, &fee.recipient, fee.lamports);

    let program = record.owner_program.interface();
    let action = match request.kind() {
        ActionKind::Reclaim => {
            // Rent goes back to the wallet that owns the account.
            program.create_close_account_instruction(&record.account_address, payer, payer)?
        }
        ActionKind::Burn => program.create_burn_instruction(
            &record.account_address,
            &record.mint_address,
            payer,
            record.raw_amount,
        )?,
    };

    Ok(vec![fee_transfer, action])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scan::TokenAccountRecord, token::TokenProgramVariant};

    fn classified(raw_amount: u64, decimals: u8, category: AccountCategory) -> ClassifiedAccount {
        ClassifiedAccount {
            record: TokenAccountRecord {
                account_address: Pubkey::new_unique(),
                mint_address: Pubkey::new_unique(),
                raw_amount,
                owner_program: TokenProgramVariant::Spl,
                rent_lamports: 2_039_280,
            },
            decimals,
            category,
        }
    }

    fn fee_spec() -> FeeSpec {
        FeeSpec { lamports: 100_000_000, recipient: Pubkey::new_unique() }
    }

    #[test]
    fn test_fee_spec_from_config() {
        let config = FeeConfig {
            lamports: 25_000_000,
            recipient: Pubkey::new_unique().to_string(),
        };
        let spec = FeeSpec::from_config(&config).unwrap();
        assert_eq!(spec.lamports, 25_000_000);
    }

    #[test]
    fn test_fee_spec_rejects_zero_lamports() {
        let config = FeeConfig { lamports: 0, recipient: Pubkey::new_unique().to_string() };
        assert!(matches!(FeeSpec::from_config(&config), Err(SweepError::ConfigError(_))));
    }

    #[test]
    fn test_fee_spec_rejects_invalid_recipient() {
        let config = FeeConfig { lamports: 1, recipient: "garbage".to_string() };
        assert!(matches!(FeeSpec::from_config(&config), Err(SweepError::ConfigError(_))));
    }

    #[test]
    fn test_reclaim_requires_cleanable() {
        let target = classified(5, 6, AccountCategory::FungibleToken);
        let result = ActionRequest::new(target, ActionKind::Reclaim);
        assert!(matches!(result, Err(SweepError::InvalidAction(_))));
    }

    #[test]
    fn test_burn_rejects_cleanable() {
        let target = classified(0, 6, AccountCategory::Cleanable);
        let result = ActionRequest::new(target, ActionKind::Burn);
        assert!(matches!(result, Err(SweepError::InvalidAction(_))));
    }

    #[test]
    fn test_burn_rejects_ignored() {
        let target = classified(9, 0, AccountCategory::Ignored);
        let result = ActionRequest::new(target, ActionKind::Burn);
        assert!(matches!(result, Err(SweepError::InvalidAction(_))));
    }

    #[test]
    fn test_reclaim_instructions_fee_first() {
        let payer = Pubkey::new_unique();
        let fee = fee_spec();
        let target = classified(0, 6, AccountCategory::Cleanable);
        let account_address = target.record.account_address;
        let request = ActionRequest::new(target, ActionKind::Reclaim).unwrap();

        let instructions = build_action_instructions(&request, &fee, &payer).unwrap();
        assert_eq!(instructions.len(), 2);

        let expected_fee =
            solana_system_interface::instruction::transfer(&payer, &fee.recipient, fee.lamports);
        assert_eq!(instructions[0], expected_fee);

        assert_eq!(instructions[1].program_id, spl_token_interface::id());
        assert_eq!(instructions[1].accounts[0].pubkey, account_address);
        // Destination and authority are both the payer
        assert_eq!(instructions[1].accounts[1].pubkey, payer);
        assert_eq!(instructions[1].accounts[2].pubkey, payer);
    }

    #[test]
    fn test_burn_instructions_fee_first_full_amount() {
        let payer = Pubkey::new_unique();
        let fee = fee_spec();
        let target = classified(1, 0, AccountCategory::Nft);
        let mint_address = target.record.mint_address;
        let raw_amount = target.record.raw_amount;
        let request = ActionRequest::new(target.clone(), ActionKind::Burn).unwrap();

        let instructions = build_action_instructions(&request, &fee, &payer).unwrap();
        assert_eq!(instructions.len(), 2);

        let expected_fee =
            solana_system_interface::instruction::transfer(&payer, &fee.recipient, fee.lamports);
        assert_eq!(instructions[0], expected_fee);

        let expected_burn = spl_token_interface::instruction::burn(
            &spl_token_interface::id(),
            &target.record.account_address,
            &mint_address,
            &payer,
            &[],
            raw_amount,
        )
        .unwrap();
        assert_eq!(instructions[1], expected_burn);
    }

    #[test]
    fn test_token2022_action_targets_extended_program() {
        let payer = Pubkey::new_unique();
        let fee = fee_spec();
        let mut target = classified(0, 6, AccountCategory::Cleanable);
        target.record.owner_program = TokenProgramVariant::Token2022;
        let request = ActionRequest::new(target, ActionKind::Reclaim).unwrap();

        let instructions = build_action_instructions(&request, &fee, &payer).unwrap();
        assert_eq!(instructions[1].program_id, spl_token_2022_interface::id());
    }
}
