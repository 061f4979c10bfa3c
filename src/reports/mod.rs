// Reporting over computed ledger fields

pub mod totals;

pub use totals::{totalize, PeriodTotals, TotalsReport};
