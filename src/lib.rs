//! Costbook - personal-finance cost-basis ledger
//!
//! This library tracks buy/sell/opening-balance events per asset and keeps
//! a running acquisition cost, holdings quantity, and realized gain for
//! every line under a selectable accounting method (weighted average or
//! FIFO lot accounting).

pub mod db;
pub mod error;
pub mod ledger;
pub mod reports;
pub mod utils;
