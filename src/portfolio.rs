//! Portfolio valuation: per-holding and aggregate unrealized P&L.

use serde::Serialize;

use crate::catalog::InstrumentCatalog;
use crate::ledger::Ledger;
use crate::types::instrument::{Instrument, InstrumentId, Price, Qty};
use crate::types::position::Position;

pub fn current_value(position: &Position, reference_price: Price) -> f64 {
    position.quantity * reference_price
}

pub fn cost_basis_value(position: &Position) -> f64 {
    position.quantity * position.average_entry_price
}

/// Current value minus cost basis. Positive when the holding is in profit.
pub fn unrealized_pnl(position: &Position, reference_price: Price) -> f64 {
    current_value(position, reference_price) - cost_basis_value(position)
}

/// P&L as a percent of cost basis; `0.0` when the cost basis is zero.
pub fn unrealized_pnl_percent(position: &Position, reference_price: Price) -> f64 {
    pnl_percent(
        unrealized_pnl(position, reference_price),
        cost_basis_value(position),
    )
}

fn pnl_percent(pnl: f64, cost_basis: f64) -> f64 {
    if cost_basis == 0.0 {
        return 0.0;
    }
    pnl / cost_basis * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    pub instrument_id: InstrumentId,
    pub symbol: String,
    pub full_name: String,
    pub quantity: Qty,
    pub average_entry_price: Price,
    pub reference_price: Price,
    pub current_value: f64,
    pub cost_basis: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_percent: f64,
}

impl HoldingValuation {
    pub fn new(position: &Position, instrument: &Instrument) -> Self {
        let current_value = current_value(position, instrument.price);
        let cost_basis = cost_basis_value(position);
        let unrealized_pnl = current_value - cost_basis;
        Self {
            instrument_id: position.instrument_id,
            symbol: instrument.symbol.clone(),
            full_name: instrument.full_name.clone(),
            quantity: position.quantity,
            average_entry_price: position.average_entry_price,
            reference_price: instrument.price,
            current_value,
            cost_basis,
            unrealized_pnl,
            unrealized_pnl_percent: pnl_percent(unrealized_pnl, cost_basis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<HoldingValuation>,
    pub holding_count: usize,
    pub total_value: f64,
    pub total_invested: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
}

impl PortfolioSummary {
    /// Values every position against the catalog. Holdings are ordered by
    /// current value, largest first.
    pub fn value(ledger: &Ledger, catalog: &InstrumentCatalog) -> Self {
        let mut holdings: Vec<HoldingValuation> = ledger
            .positions()
            .filter_map(|pos| match catalog.get(pos.instrument_id) {
                Some(instrument) => Some(HoldingValuation::new(pos, instrument)),
                None => {
                    tracing::warn!(
                        instrument_id = pos.instrument_id,
                        "position references unknown instrument, skipped in valuation"
                    );
                    None
                }
            })
            .collect();
        holdings.sort_by(|a, b| b.current_value.total_cmp(&a.current_value));

        let total_value: f64 = holdings.iter().map(|h| h.current_value).sum();
        let total_invested: f64 = holdings.iter().map(|h| h.cost_basis).sum();
        let total_pnl = total_value - total_invested;

        Self {
            holding_count: holdings.len(),
            holdings,
            total_value,
            total_invested,
            total_pnl,
            total_pnl_percent: pnl_percent(total_pnl, total_invested),
        }
    }
}
