//! chatpay-bot - rewards chat activity and relays `!pay` commands to a ledger

pub mod domain;
pub mod application;
pub mod infrastructure;
