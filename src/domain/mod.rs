pub mod calendar;
pub mod category;
pub mod common;
pub mod transaction;

pub use calendar::{CalendarZone, TransactionDate};
pub use category::Category;
pub use common::{Displayable, Identifiable, NamedEntity, TransactionKind, UserId};
pub use transaction::{DateChange, ParsedAmount, Transaction, TransactionChanges};
