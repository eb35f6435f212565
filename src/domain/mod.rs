mod customer;
mod ledger;
mod money;
mod query;
mod tenant;
mod transaction;

pub use customer::*;
pub use ledger::*;
pub use money::*;
pub use query::*;
pub use tenant::*;
pub use transaction::*;
