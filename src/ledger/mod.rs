//! Signed transactions and the ledger that commits them

pub mod ledger;
pub mod transaction;

pub use ledger::{Ledger, LedgerError, TxReceipt};
pub use transaction::SignedTransaction;
