//! Core engine for the waste bank: members, the waste-type catalog,
//! deposits, the organization cash ledger, and the append-only
//! balance-history ledger behind every member balance change.

pub use balance_history::{BalanceHistoryEntry, LedgerCategory, LedgerDirection};
pub use cash_transactions::{CashCategory, CashDirection, CashTransaction};
pub use commands::{AdjustmentCmd, CashTransactionCmd, DepositCmd};
pub use deposits::Deposit;
pub use error::EngineError;
pub use members::Member;
pub use money::Money;
pub use ops::{CashSummary, DashboardStats, Engine, EngineBuilder, LedgerCheck};
pub use users::Role;
pub use waste_types::WasteType;
pub use weight::Weight;

mod balance_history;
mod cash_transactions;
mod commands;
mod deposits;
mod error;
mod members;
mod money;
mod ops;
pub mod users;
mod util;
mod waste_types;
mod weight;

pub type ResultEngine<T> = Result<T, EngineError>;
