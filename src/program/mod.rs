//! The multisig distributor program
//!
//! A closed instruction set over one explicit [`ProgramState`]:
//! - `initialize` sets up the signer registry
//! - proposal lifecycle: create, approve, execute, cancel
//! - token mints and transfers used to fund the treasury
//! - merkle distributor claims

pub mod instruction;
pub mod processor;
pub mod state;

pub use instruction::{InitializeArgs, Instruction};
pub use processor::{process_instruction, ProgramError};
pub use state::{ProgramEvent, ProgramState};
