//! Trade desk: turns user trade requests into ledger events priced at the
//! catalog reference price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::InstrumentCatalog;
use crate::ledger::{Ledger, LedgerError};
use crate::types::instrument::{InstrumentId, Price, Qty};
use crate::types::position::Position;
use crate::types::trade::{TradeEvent, TradeSide};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error("instrument {0} not found")]
    UnknownInstrument(InstrumentId),
    #[error("invalid amount: {0} (must be a finite number greater than zero)")]
    InvalidAmount(f64),
    #[error("instrument {instrument_id} has no usable reference price ({price})")]
    InvalidPrice { instrument_id: InstrumentId, price: Price },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What a user asks for. Buys are sized in quote currency, sells in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum TradeRequest {
    Buy {
        instrument_id: InstrumentId,
        notional: f64,
    },
    Sell {
        instrument_id: InstrumentId,
        quantity: Qty,
    },
}

impl TradeRequest {
    pub fn instrument_id(&self) -> InstrumentId {
        match self {
            TradeRequest::Buy { instrument_id, .. } | TradeRequest::Sell { instrument_id, .. } => {
                *instrument_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeReceipt {
    pub instrument_id: InstrumentId,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Qty,
    pub price: Price,
    pub notional: f64,
    /// Position after the trade; `None` once closed or when nothing was held.
    pub position: Option<Position>,
    pub executed_at: DateTime<Utc>,
}

/// Price a request against the catalog without touching any ledger.
pub fn price_request(
    catalog: &InstrumentCatalog,
    request: TradeRequest,
) -> Result<TradeEvent, TradeError> {
    let instrument_id = request.instrument_id();
    let price = catalog
        .reference_price(instrument_id)
        .ok_or(TradeError::UnknownInstrument(instrument_id))?;

    match request {
        TradeRequest::Buy { notional, .. } => {
            if !notional.is_finite() || notional <= 0.0 {
                return Err(TradeError::InvalidAmount(notional));
            }
            if !price.is_finite() || price <= 0.0 {
                return Err(TradeError::InvalidPrice {
                    instrument_id,
                    price,
                });
            }
            Ok(TradeEvent::Buy {
                instrument_id,
                quantity: notional / price,
                price,
            })
        }
        TradeRequest::Sell { quantity, .. } => {
            if !quantity.is_finite() || quantity <= 0.0 {
                return Err(TradeError::InvalidAmount(quantity));
            }
            Ok(TradeEvent::Sell {
                instrument_id,
                quantity,
            })
        }
    }
}

/// Price and apply a request to `ledger`. The ledger is unchanged on error.
pub fn execute(
    ledger: &mut Ledger,
    catalog: &InstrumentCatalog,
    request: TradeRequest,
) -> Result<TradeReceipt, TradeError> {
    let event = price_request(catalog, request)?;
    let instrument_id = event.instrument_id();
    let instrument = catalog
        .get(instrument_id)
        .ok_or(TradeError::UnknownInstrument(instrument_id))?;
    let price = instrument.price;
    let symbol = instrument.symbol.clone();

    let quantity = match event {
        TradeEvent::Buy { quantity, .. } | TradeEvent::Sell { quantity, .. } => quantity,
    };

    let applied = ledger.apply(event)?;

    tracing::info!(
        instrument_id,
        symbol = %symbol,
        side = ?event.side(),
        quantity,
        price,
        "trade executed"
    );

    Ok(TradeReceipt {
        instrument_id,
        symbol,
        side: event.side(),
        quantity,
        price,
        notional: quantity * price,
        position: applied.open_position(),
        executed_at: Utc::now(),
    })
}
