//! Position ledger: apply_buy, apply_sell, weighted-average cost basis.
//! Testable without HTTP.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::instrument::{InstrumentId, Price, Qty};
use crate::types::position::Position;
use crate::types::trade::TradeEvent;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("invalid quantity: {0} (must be a finite number greater than zero)")]
    InvalidQuantity(f64),
    #[error("invalid price: {0} (must be a finite number not below zero)")]
    InvalidPrice(f64),
    #[error("no open position for instrument {0}")]
    NoPosition(InstrumentId),
    #[error(
        "insufficient position in instrument {instrument_id}: held {held}, requested {requested}"
    )]
    InsufficientPosition {
        instrument_id: InstrumentId,
        held: Qty,
        requested: Qty,
    },
    #[error("buy of {quantity} at {price} overflows the position in instrument {instrument_id}")]
    Overflow {
        instrument_id: InstrumentId,
        quantity: Qty,
        price: Price,
    },
}

/// How a ledger treats sells that exceed what is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellPolicy {
    /// Oversell closes the position; selling an untracked instrument is a no-op.
    #[default]
    Permissive,
    /// Oversell fails with `InsufficientPosition`, untracked sell with `NoPosition`.
    Strict,
}

/// What a sell did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SellOutcome {
    Reduced(Position),
    /// Position removed; carries the position as it was before the sell.
    Closed(Position),
    Untracked,
}

/// Result of applying any `TradeEvent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Applied {
    Bought(Position),
    Sold(SellOutcome),
}

impl Applied {
    /// The position left open after the event, if any.
    pub fn open_position(&self) -> Option<Position> {
        match self {
            Applied::Bought(pos) | Applied::Sold(SellOutcome::Reduced(pos)) => Some(*pos),
            Applied::Sold(_) => None,
        }
    }
}

/// Per-session mapping of instrument to open position.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    positions: HashMap<InstrumentId, Position>,
    policy: SellPolicy,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SellPolicy) -> Self {
        Self {
            positions: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> SellPolicy {
        self.policy
    }

    /// Add `quantity` at `price`. The average entry price becomes the
    /// volume-weighted mean of the held and the bought quantity. A buy whose
    /// result is not representable fails with `Overflow` and changes nothing.
    pub fn apply_buy(
        &mut self,
        instrument_id: InstrumentId,
        quantity: Qty,
        price: Price,
    ) -> Result<Position, LedgerError> {
        validate_quantity(quantity)?;
        if !price.is_finite() || price < 0.0 {
            return Err(LedgerError::InvalidPrice(price));
        }

        let position = match self.positions.get(&instrument_id) {
            Some(pos) => {
                let new_qty = pos.quantity + quantity;
                let new_avg =
                    (pos.quantity * pos.average_entry_price + quantity * price) / new_qty;
                if !new_qty.is_finite() || !new_avg.is_finite() {
                    return Err(LedgerError::Overflow {
                        instrument_id,
                        quantity,
                        price,
                    });
                }
                Position {
                    instrument_id,
                    quantity: new_qty,
                    average_entry_price: new_avg,
                }
            }
            None => Position {
                instrument_id,
                quantity,
                average_entry_price: price,
            },
        };

        self.positions.insert(instrument_id, position);
        Ok(position)
    }

    /// Remove `quantity`. Average entry price is never touched by a sell;
    /// reaching zero or below removes the position.
    pub fn apply_sell(
        &mut self,
        instrument_id: InstrumentId,
        quantity: Qty,
    ) -> Result<SellOutcome, LedgerError> {
        validate_quantity(quantity)?;

        let Some(pos) = self.positions.get(&instrument_id).copied() else {
            return match self.policy {
                SellPolicy::Permissive => Ok(SellOutcome::Untracked),
                SellPolicy::Strict => Err(LedgerError::NoPosition(instrument_id)),
            };
        };

        if self.policy == SellPolicy::Strict && quantity > pos.quantity {
            return Err(LedgerError::InsufficientPosition {
                instrument_id,
                held: pos.quantity,
                requested: quantity,
            });
        }

        let new_qty = pos.quantity - quantity;
        if new_qty <= 0.0 {
            self.positions.remove(&instrument_id);
            return Ok(SellOutcome::Closed(pos));
        }

        let reduced = Position {
            quantity: new_qty,
            ..pos
        };
        self.positions.insert(instrument_id, reduced);
        Ok(SellOutcome::Reduced(reduced))
    }

    pub fn apply(&mut self, event: TradeEvent) -> Result<Applied, LedgerError> {
        match event {
            TradeEvent::Buy {
                instrument_id,
                quantity,
                price,
            } => self.apply_buy(instrument_id, quantity, price).map(Applied::Bought),
            TradeEvent::Sell {
                instrument_id,
                quantity,
            } => self.apply_sell(instrument_id, quantity).map(Applied::Sold),
        }
    }

    pub fn get(&self, instrument_id: InstrumentId) -> Option<&Position> {
        self.positions.get(&instrument_id)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

fn validate_quantity(quantity: Qty) -> Result<(), LedgerError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidQuantity(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_quantity_rejects_nan_zero_and_negative() {
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(0.0001).is_ok());
    }

    #[test]
    fn applied_open_position() {
        let pos = Position {
            instrument_id: 1,
            quantity: 2.0,
            average_entry_price: 1.0,
        };
        assert_eq!(Applied::Bought(pos).open_position(), Some(pos));
        assert_eq!(Applied::Sold(SellOutcome::Reduced(pos)).open_position(), Some(pos));
        assert_eq!(Applied::Sold(SellOutcome::Closed(pos)).open_position(), None);
        assert_eq!(Applied::Sold(SellOutcome::Untracked).open_position(), None);
    }
}
