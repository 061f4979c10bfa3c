//! Ledger aggregate: a profile owning an ordered sequence of lines
//!
//! The profile is the only writer of its lines. Every structural mutation
//! (add, remove, move, edit, method change) builds a candidate sequence,
//! replays the active calculation method over it, and commits only when the
//! replay succeeds, so a rejected mutation leaves the profile exactly as it
//! was. Display order is the vector index: dense, zero-based, gap-free.

pub mod line;
mod strategy;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
pub use line::{CalculationMethod, LineRecord, LineType};

/// Aggregate root for one tracked asset's buy/sell history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerProfile {
    /// Database id; None until first saved
    pub id: Option<i64>,
    name: String,
    asset_name: String,
    currency: String,
    precision: u32,
    visible: bool,
    icon: Option<String>,
    method: CalculationMethod,
    lines: Vec<LineRecord>,
    /// Source of line ids; persisted so ids stay stable across saves
    next_line_id: i64,
}

impl LedgerProfile {
    pub fn new(
        name: &str,
        asset_name: &str,
        currency: &str,
        precision: u32,
        method: CalculationMethod,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(LedgerError::EmptyName);
        }
        Ok(Self {
            id: None,
            name: name.trim().to_string(),
            asset_name: asset_name.to_string(),
            currency: currency.to_string(),
            precision,
            visible: true,
            icon: None,
            method,
            lines: Vec::new(),
            next_line_id: 1,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn method(&self) -> CalculationMethod {
        self.method
    }

    /// Next id the profile will hand to a new line; persisted with the
    /// aggregate so ids stay stable across save/load cycles
    pub fn next_line_id(&self) -> i64 {
        self.next_line_id
    }

    /// Read-only view of the lines, ascending by display order
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn line_by_id(&self, line_id: i64) -> Option<&LineRecord> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Insert a line at `display_order` (clamped to the end), shifting the
    /// rank of every line at or after that position up by one. Returns the
    /// new line's id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_line(
        &mut self,
        date: NaiveDate,
        display_order: usize,
        line_type: LineType,
        quantity: Decimal,
        amount: Decimal,
        comment: Option<String>,
    ) -> Result<i64> {
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let line_id = self.next_line_id;
        let position = display_order.min(self.lines.len());
        let mut candidate = self.lines.clone();
        candidate.insert(
            position,
            LineRecord {
                id: line_id,
                date,
                display_order: position,
                line_type,
                quantity,
                amount,
                comment,
                avg_cost: Decimal::ZERO,
                total_cost: Decimal::ZERO,
                total_quantity: Decimal::ZERO,
                realized_gain: Decimal::ZERO,
            },
        );
        self.commit(candidate)?;
        self.next_line_id += 1;
        Ok(line_id)
    }

    /// Remove a line and compact the ranks after it
    pub fn remove_line(&mut self, line_id: i64) -> Result<()> {
        let index = self.index_of(line_id)?;
        let mut candidate = self.lines.clone();
        candidate.remove(index);
        self.commit(candidate)
    }

    /// Replace a line's inputs, keeping its rank. Modelled as remove plus
    /// re-add so the derived fields always come from a clean replay; the
    /// replacement gets a fresh id.
    #[allow(clippy::too_many_arguments)]
    pub fn edit_line(
        &mut self,
        line_id: i64,
        date: NaiveDate,
        line_type: LineType,
        quantity: Decimal,
        amount: Decimal,
        comment: Option<String>,
    ) -> Result<i64> {
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let index = self.index_of(line_id)?;
        let new_id = self.next_line_id;
        let mut candidate = self.lines.clone();
        candidate[index] = LineRecord {
            id: new_id,
            date,
            display_order: index,
            line_type,
            quantity,
            amount,
            comment,
            avg_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            total_quantity: Decimal::ZERO,
            realized_gain: Decimal::ZERO,
        };
        self.commit(candidate)?;
        self.next_line_id += 1;
        Ok(new_id)
    }

    /// Swap the line with its predecessor; no-op at the top
    pub fn move_line_up(&mut self, line_id: i64) -> Result<()> {
        let index = self.index_of(line_id)?;
        if index == 0 {
            return Ok(());
        }
        let mut candidate = self.lines.clone();
        candidate.swap(index - 1, index);
        self.commit(candidate)
    }

    /// Swap the line with its successor; no-op at the bottom
    pub fn move_line_down(&mut self, line_id: i64) -> Result<()> {
        let index = self.index_of(line_id)?;
        if index + 1 >= self.lines.len() {
            return Ok(());
        }
        let mut candidate = self.lines.clone();
        candidate.swap(index, index + 1);
        self.commit(candidate)
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(LedgerError::EmptyName);
        }
        self.name = name.trim().to_string();
        Ok(())
    }

    pub fn change_asset(&mut self, asset_name: &str, precision: u32) {
        self.asset_name = asset_name.to_string();
        self.precision = precision;
    }

    pub fn change_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn change_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    /// Switch the accounting method and replay every line under it. The
    /// running quantity sequence is the same under both methods, so the
    /// switch itself cannot introduce an oversell, but a failed replay
    /// still leaves the profile untouched.
    pub fn change_calculation_method(&mut self, method: CalculationMethod) -> Result<()> {
        if method == self.method {
            return Ok(());
        }
        let mut candidate = self.lines.clone();
        strategy::replay(method, &mut candidate)?;
        self.method = method;
        self.lines = candidate;
        Ok(())
    }

    fn index_of(&self, line_id: i64) -> Result<usize> {
        self.lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or(LedgerError::LineNotFound(line_id))
    }

    /// Renumber, replay, and adopt a candidate sequence
    fn commit(&mut self, mut candidate: Vec<LineRecord>) -> Result<()> {
        for (index, line) in candidate.iter_mut().enumerate() {
            line.display_order = index;
        }
        strategy::replay(self.method, &mut candidate)?;
        self.lines = candidate;
        Ok(())
    }

    /// Rebuild a profile from storage. The lines must arrive sorted by
    /// display order; derived fields are recomputed rather than trusted.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: i64,
        name: String,
        asset_name: String,
        currency: String,
        precision: u32,
        visible: bool,
        icon: Option<String>,
        method: CalculationMethod,
        lines: Vec<LineRecord>,
        next_line_id: i64,
    ) -> Result<Self> {
        let mut profile = Self {
            id: Some(id),
            name,
            asset_name,
            currency,
            precision,
            visible,
            icon,
            method,
            lines: Vec::new(),
            next_line_id,
        };
        profile.commit(lines)?;
        Ok(profile)
    }
}
