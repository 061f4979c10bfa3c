//! Calculation strategies for the ledger replay
//!
//! Both strategies consume the ordered line sequence from the start and
//! write every line's running figures (average cost, total cost, total
//! quantity) plus the realized gain of each sell. A replay is a pure
//! function of the ordered inputs: running it twice over the same lines
//! yields identical output.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::error::LedgerError;
use crate::ledger::line::{CalculationMethod, LineRecord, LineType};

/// One open FIFO lot. Carries the lot's remaining total cost rather than a
/// unit cost so that fully consuming the lot releases its exact cost and
/// selling the whole position drives the running totals to exactly zero.
#[derive(Debug, Clone, PartialEq)]
struct Lot {
    quantity: Decimal,
    cost: Decimal,
}

/// Working state of the active calculation method during a replay
#[derive(Debug, Clone)]
enum StrategyState {
    WeightedAverage {
        total_quantity: Decimal,
        total_cost: Decimal,
    },
    Fifo {
        lots: VecDeque<Lot>,
    },
}

impl StrategyState {
    fn new(method: CalculationMethod) -> Self {
        match method {
            CalculationMethod::WeightedAverage => StrategyState::WeightedAverage {
                total_quantity: Decimal::ZERO,
                total_cost: Decimal::ZERO,
            },
            CalculationMethod::Fifo => StrategyState::Fifo {
                lots: VecDeque::new(),
            },
        }
    }

    fn holdings(&self) -> (Decimal, Decimal) {
        match self {
            StrategyState::WeightedAverage {
                total_quantity,
                total_cost,
            } => (*total_quantity, *total_cost),
            StrategyState::Fifo { lots } => lots.iter().fold(
                (Decimal::ZERO, Decimal::ZERO),
                |(quantity, cost), lot| (quantity + lot.quantity, cost + lot.cost),
            ),
        }
    }

    /// Buy and Setup both add to holdings; Setup seeds an opening position
    /// without being a realized transaction.
    fn acquire(&mut self, quantity: Decimal, amount: Decimal) {
        match self {
            StrategyState::WeightedAverage {
                total_quantity,
                total_cost,
            } => {
                *total_quantity += quantity;
                *total_cost += amount;
            }
            StrategyState::Fifo { lots } => {
                lots.push_back(Lot {
                    quantity,
                    cost: amount,
                });
            }
        }
    }

    /// Consume `quantity` from holdings, returning the cost basis released.
    /// The caller has already checked that holdings cover the quantity.
    fn consume(&mut self, quantity: Decimal) -> Decimal {
        match self {
            StrategyState::WeightedAverage {
                total_quantity,
                total_cost,
            } => {
                // Selling everything releases the whole cost, avoiding a
                // q * (c / q) rounding residue.
                let released = if quantity == *total_quantity {
                    *total_cost
                } else {
                    (*total_cost / *total_quantity) * quantity
                };
                *total_quantity -= quantity;
                *total_cost -= released;
                released
            }
            StrategyState::Fifo { lots } => {
                let mut remaining = quantity;
                let mut released = Decimal::ZERO;
                while remaining > Decimal::ZERO {
                    let lot = lots
                        .front_mut()
                        .expect("oversell checked before consuming lots");
                    if remaining >= lot.quantity {
                        released += lot.cost;
                        remaining -= lot.quantity;
                        lots.pop_front();
                    } else {
                        let partial = lot.cost * remaining / lot.quantity;
                        released += partial;
                        lot.quantity -= remaining;
                        lot.cost -= partial;
                        remaining = Decimal::ZERO;
                    }
                }
                released
            }
        }
    }
}

/// Recompute the derived fields of every line, strictly in slice order.
///
/// The slice must already be sorted by display order. Fails with
/// [`LedgerError::Oversell`] if any sell exceeds the holdings running total
/// immediately before it; the caller discards the partially rewritten slice
/// in that case.
pub(crate) fn replay(method: CalculationMethod, lines: &mut [LineRecord]) -> Result<(), LedgerError> {
    let mut state = StrategyState::new(method);

    for line in lines.iter_mut() {
        match line.line_type {
            LineType::Buy | LineType::Setup => {
                state.acquire(line.quantity, line.amount);
                line.realized_gain = Decimal::ZERO;
            }
            LineType::Sell => {
                let (held, _) = state.holdings();
                if line.quantity > held {
                    return Err(LedgerError::Oversell {
                        line_id: line.id,
                        requested: line.quantity,
                        available: held,
                    });
                }
                let released = state.consume(line.quantity);
                line.realized_gain = line.amount - released;
            }
        }

        let (total_quantity, total_cost) = state.holdings();
        line.total_quantity = total_quantity;
        line.total_cost = total_cost;
        line.avg_cost = if total_quantity.is_zero() {
            Decimal::ZERO
        } else {
            total_cost / total_quantity
        };
    }

    Ok(())
}
