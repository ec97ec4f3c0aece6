//! Instruction planning and ordering validation
//!
//! A landing transaction is laid out as:
//! 1. `SetComputeUnitLimit` (position 0)
//! 2. `SetComputeUnitPrice` (position 1)
//! 3. `SetLoadedAccountsDataSizeLimit`
//! 4. lamport transfer, signer -> destination
//! 5. first program call, data `[0x00]`
//! 6. second program call, data `[0x01]`
//!
//! Items 3-6 are the base plan built by [`plan_base_instructions`]; the
//! budget pair is prepended once the estimate and fee are known.

use crate::tx_builder::errors::TransactionBuilderError;
use solana_sdk::{
    compute_budget::{self, ComputeBudgetInstruction},
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
#[allow(deprecated)]
use solana_sdk::system_instruction;

/// Discriminant sent to the first program
pub const FIRST_PROGRAM_DISCRIMINANT: u8 = 0x00;
/// Discriminant sent to the second program
pub const SECOND_PROGRAM_DISCRIMINANT: u8 = 0x01;

/// Highest unit limit the runtime accepts; used as the simulation placeholder
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

// ComputeBudgetInstruction borsh tags
const SET_COMPUTE_UNIT_LIMIT_TAG: u8 = 2;
const SET_COMPUTE_UNIT_PRICE_TAG: u8 = 3;

/// Fixed, resolved contents of a landing transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPlan {
    /// Recipient of the lamport transfer
    pub destination: Pubkey,
    /// Lamports moved from the signer to `destination`
    pub transfer_lamports: u64,
    /// Cap on loaded account data, in bytes
    pub loaded_accounts_data_size_limit: u32,
    /// Program invoked with discriminant `0x00`
    pub first_program: Pubkey,
    /// Program invoked with discriminant `0x01`
    pub second_program: Pubkey,
}

impl TransactionPlan {
    /// Addresses queried for recent prioritization fees
    pub fn fee_accounts(&self) -> [Pubkey; 2] {
        [self.first_program, self.second_program]
    }
}

/// Ordered base instructions, before budget instructions are prepended
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    /// The ordered list of instructions for the transaction
    pub instructions: Vec<Instruction>,

    /// Whether the compute-unit limit and price have been prepended
    pub has_budget: bool,
}

impl InstructionPlan {
    /// Create a new InstructionPlan
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            has_budget: false,
        }
    }

    /// Put the unit-limit and unit-price instructions at positions 0 and 1
    pub fn with_compute_budget(mut self, cu_limit: u32, cu_price: u64) -> Self {
        let mut instructions = Vec::with_capacity(self.instructions.len() + 2);
        instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(cu_limit));
        instructions.push(ComputeBudgetInstruction::set_compute_unit_price(cu_price));
        instructions.append(&mut self.instructions);

        Self {
            instructions,
            has_budget: true,
        }
    }

    /// Instructions used for the compute-unit simulation
    ///
    /// A max limit is prepended so the simulation is not cut short by the
    /// runtime's default per-instruction allowance.
    pub fn for_simulation(&self) -> Vec<Instruction> {
        let mut instructions = Vec::with_capacity(self.instructions.len() + 1);
        instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(
            MAX_COMPUTE_UNIT_LIMIT,
        ));
        instructions.extend(self.instructions.iter().cloned());
        instructions
    }
}

/// Build the fixed instruction sequence for one attempt
///
/// # Arguments
///
/// * `plan` - Resolved addresses and amounts
/// * `signer` - Fee payer and transfer source
/// * `ephemeral` - Account generated for this attempt
///
/// # Errors
///
/// Returns `TransactionBuilderError::Configuration` if the plan would produce
/// a self-referencing or empty program call.
pub fn plan_base_instructions(
    plan: &TransactionPlan,
    signer: &Pubkey,
    ephemeral: &Pubkey,
) -> Result<InstructionPlan, TransactionBuilderError> {
    if plan.first_program == Pubkey::default() || plan.second_program == Pubkey::default() {
        return Err(TransactionBuilderError::Configuration(
            "Program address is unset".to_string(),
        ));
    }
    if signer == ephemeral {
        return Err(TransactionBuilderError::Configuration(
            "Ephemeral account must differ from the signer".to_string(),
        ));
    }

    let program_accounts = vec![
        AccountMeta::new(*ephemeral, true),
        AccountMeta::new(*signer, true),
    ];

    let instructions = vec![
        ComputeBudgetInstruction::set_loaded_accounts_data_size_limit(
            plan.loaded_accounts_data_size_limit,
        ),
        system_instruction::transfer(signer, &plan.destination, plan.transfer_lamports),
        Instruction::new_with_bytes(
            plan.first_program,
            &[FIRST_PROGRAM_DISCRIMINANT],
            program_accounts.clone(),
        ),
        Instruction::new_with_bytes(
            plan.second_program,
            &[SECOND_PROGRAM_DISCRIMINANT],
            program_accounts,
        ),
    ];

    Ok(InstructionPlan::new(instructions))
}

fn is_budget_instruction(ix: &Instruction, tag: u8) -> bool {
    ix.program_id == compute_budget::id() && ix.data.first() == Some(&tag)
}

/// Validate that the unit limit and unit price lead the instruction list
///
/// # Errors
///
/// Returns `TransactionBuilderError::InvalidInstructionOrder` if:
/// - the list has fewer than three instructions
/// - position 0 is not `SetComputeUnitLimit`
/// - position 1 is not `SetComputeUnitPrice`
/// - either budget instruction appears again later in the list
pub fn sanity_check_ix_order(instructions: &[Instruction]) -> Result<(), TransactionBuilderError> {
    if instructions.len() < 3 {
        return Err(TransactionBuilderError::invalid_order(format!(
            "Expected budget instructions followed by program instructions, got {} instructions",
            instructions.len()
        )));
    }

    if !is_budget_instruction(&instructions[0], SET_COMPUTE_UNIT_LIMIT_TAG) {
        return Err(TransactionBuilderError::invalid_order(format!(
            "Position 0 must be SetComputeUnitLimit, got program_id: {}",
            instructions[0].program_id
        )));
    }
    if !is_budget_instruction(&instructions[1], SET_COMPUTE_UNIT_PRICE_TAG) {
        return Err(TransactionBuilderError::invalid_order(format!(
            "Position 1 must be SetComputeUnitPrice, got program_id: {}",
            instructions[1].program_id
        )));
    }

    for (idx, ix) in instructions.iter().enumerate().skip(2) {
        if is_budget_instruction(ix, SET_COMPUTE_UNIT_LIMIT_TAG)
            || is_budget_instruction(ix, SET_COMPUTE_UNIT_PRICE_TAG)
        {
            return Err(TransactionBuilderError::invalid_order(format!(
                "Duplicate budget instruction at position {}",
                idx
            )));
        }
    }

    Ok(())
}
