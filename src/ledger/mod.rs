// ledger module: the pure accounting core (no I/O besides CSV readers/writers).

pub mod aggregation;
pub mod amortization;
pub mod charts;
pub mod csv;

pub use aggregation::*;
pub use amortization::{EntryDraft, ScheduleRow, expand, schedule};
pub use charts::{BalancePoint, MonthlySummary, monthly_summary, running_balance};
