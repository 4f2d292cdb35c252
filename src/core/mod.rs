pub mod clock;
pub mod period;
pub mod services;
pub mod session;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use period::{filter_period, PeriodSelector};
pub use session::{DashboardFeed, LedgerSession, RecordOutcome};
