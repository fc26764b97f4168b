//! Plain data: the order aggregate, its line items, ledgers and history, plus
//! the identities and events that travel with it.

pub mod actor;
pub mod ledger;
pub mod notification;
pub mod order;
pub mod product;
pub mod staff;
pub mod status;

pub use actor::*;
pub use ledger::*;
pub use notification::*;
pub use order::*;
pub use product::*;
pub use staff::*;
pub use status::*;
