use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of ledger event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineType {
    Buy,
    Sell,
    /// Opening-balance entry: seeds quantity and cost without being a trade
    Setup,
}

impl LineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineType::Buy => "BUY",
            LineType::Sell => "SELL",
            LineType::Setup => "SETUP",
        }
    }
}

impl FromStr for LineType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "B" => Ok(LineType::Buy),
            "SELL" | "S" => Ok(LineType::Sell),
            "SETUP" | "OPENING" => Ok(LineType::Setup),
            _ => Err(()),
        }
    }
}

/// Accounting method used to cost sales of a profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalculationMethod {
    /// One blended average cost shared by every held unit
    WeightedAverage,
    /// Per-purchase lots, oldest consumed first
    Fifo,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::WeightedAverage => "WEIGHTED_AVERAGE",
            CalculationMethod::Fifo => "FIFO",
        }
    }
}

impl FromStr for CalculationMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEIGHTED_AVERAGE" | "WEIGHTED-AVERAGE" | "AVERAGE" | "AVG" => {
                Ok(CalculationMethod::WeightedAverage)
            }
            "FIFO" => Ok(CalculationMethod::Fifo),
            _ => Err(()),
        }
    }
}

/// One ledger event with its engine-computed running figures.
///
/// The input fields (date, type, quantity, amount, comment) are set when the
/// line is added and never patched afterwards; the derived fields are
/// rewritten by a full replay of the profile's calculation method and must
/// never be edited by callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineRecord {
    pub id: i64,
    pub date: NaiveDate,
    /// Dense zero-based rank within the owning profile
    pub display_order: usize,
    pub line_type: LineType,
    pub quantity: Decimal,
    /// Total paid or received for the whole line, not a unit price
    pub amount: Decimal,
    pub comment: Option<String>,

    // Derived by the calculation strategy
    pub avg_cost: Decimal,
    pub total_cost: Decimal,
    pub total_quantity: Decimal,
    /// Proceeds minus consumed cost basis; zero for Buy and Setup lines
    pub realized_gain: Decimal,
}

impl LineRecord {
    /// Unit price implied by this line's inputs (0 when quantity is 0)
    pub fn unit_price(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.amount / self.quantity
        }
    }
}
