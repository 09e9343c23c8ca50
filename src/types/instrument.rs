use serde::{Deserialize, Serialize};

pub type InstrumentId = u32;
pub type Price = f64;
pub type Qty = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

/// Reference data for one tradable coin. Read-only once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub symbol: String,
    pub full_name: String,
    pub celebrity: String,
    pub category: String,
    pub price: Price,
    /// Signed percent change over 24h.
    pub change_24h: f64,
    pub change_7d: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub holders: u64,
    pub trend: Trend,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
    pub alerts: Vec<String>,
}
