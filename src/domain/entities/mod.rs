//! Domain entities - Core business objects with no external dependencies

pub mod amount;
pub mod command;
pub mod event;
pub mod identity;
pub mod transaction;

pub use amount::{parse_whole_units, AmountScale, DEFAULT_MINOR_UNITS_PER_UNIT};
pub use command::Command;
pub use event::ChatEvent;
pub use identity::LedgerIdentity;
pub use transaction::{
    CreditRequest, LedgerMutation, LedgerTransaction, TransactionStatus, TransferOutcome,
    TransferRequest,
};
