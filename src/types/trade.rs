use serde::{Deserialize, Serialize};

use crate::types::instrument::{InstrumentId, Price, Qty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A fill applied to a ledger. Only buys carry a price; a sell never redefines cost basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum TradeEvent {
    Buy {
        instrument_id: InstrumentId,
        quantity: Qty,
        price: Price,
    },
    Sell {
        instrument_id: InstrumentId,
        quantity: Qty,
    },
}

impl TradeEvent {
    pub fn instrument_id(&self) -> InstrumentId {
        match self {
            TradeEvent::Buy { instrument_id, .. } | TradeEvent::Sell { instrument_id, .. } => {
                *instrument_id
            }
        }
    }

    pub fn side(&self) -> TradeSide {
        match self {
            TradeEvent::Buy { .. } => TradeSide::Buy,
            TradeEvent::Sell { .. } => TradeSide::Sell,
        }
    }
}
