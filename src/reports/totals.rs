//! Monthly and yearly totals across profiles sharing one currency
//!
//! Reads only the engine-computed per-line fields; never recomputes cost
//! basis itself. Setup lines seed a position without being trades, so they
//! are excluded from every total.

use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{LedgerError, Result};
use crate::ledger::{LedgerProfile, LineType};

/// Sums for one calendar period
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodTotals {
    pub bought: Decimal,
    pub sold: Decimal,
    pub realized_result: Decimal,
    /// Bought plus sold amounts
    pub volume: Decimal,
}

impl PeriodTotals {
    fn add_buy(&mut self, amount: Decimal) {
        self.bought += amount;
        self.volume += amount;
    }

    fn add_sell(&mut self, amount: Decimal, realized_gain: Decimal) {
        self.sold += amount;
        self.volume += amount;
        self.realized_result += realized_gain;
    }
}

/// Aggregated totals for a set of profiles
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsReport {
    pub currency: String,
    /// Keyed by year, ascending
    pub yearly: BTreeMap<i32, PeriodTotals>,
    /// Keyed by (year, month), ascending
    pub monthly: BTreeMap<(i32, u32), PeriodTotals>,
}

/// Aggregate monthly and yearly totals over the given profiles.
///
/// Fails with [`LedgerError::MixedCurrency`] unless every profile uses the
/// same currency. An empty profile set yields an empty report with an empty
/// currency code.
pub fn totalize(profiles: &[&LedgerProfile]) -> Result<TotalsReport> {
    let mut currency = String::new();
    for profile in profiles {
        if currency.is_empty() {
            currency = profile.currency().to_string();
        } else if profile.currency() != currency {
            return Err(LedgerError::MixedCurrency(
                currency,
                profile.currency().to_string(),
            ));
        }
    }

    let mut yearly: BTreeMap<i32, PeriodTotals> = BTreeMap::new();
    let mut monthly: BTreeMap<(i32, u32), PeriodTotals> = BTreeMap::new();

    for profile in profiles {
        for line in profile.lines() {
            let year = line.date.year();
            let month = line.date.month();
            match line.line_type {
                LineType::Buy => {
                    yearly.entry(year).or_default().add_buy(line.amount);
                    monthly
                        .entry((year, month))
                        .or_default()
                        .add_buy(line.amount);
                }
                LineType::Sell => {
                    yearly
                        .entry(year)
                        .or_default()
                        .add_sell(line.amount, line.realized_gain);
                    monthly
                        .entry((year, month))
                        .or_default()
                        .add_sell(line.amount, line.realized_gain);
                }
                LineType::Setup => {}
            }
        }
    }

    Ok(TotalsReport {
        currency,
        yearly,
        monthly,
    })
}
