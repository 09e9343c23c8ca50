use serde::{Deserialize, Serialize};

use crate::types::instrument::{InstrumentId, Price, Qty};

/// Open holding in one instrument. A stored position always has `quantity > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument_id: InstrumentId,
    pub quantity: Qty,
    pub average_entry_price: Price,
}
