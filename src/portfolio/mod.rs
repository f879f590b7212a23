pub mod ledger;
pub mod position;

pub use ledger::{LedgerError, Portfolio};
pub use position::{Position, TradeRecord};
