//! Instrument catalog: static coin dataset, market list search and stats.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::instrument::{
    Instrument, InstrumentId, Price, Recommendation, RiskLevel, Trend,
};

/// Market list filter. Absent or `"all"` category means no category filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketStats {
    pub count: usize,
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    pub rising: usize,
}

impl MarketStats {
    pub fn from_instruments(instruments: &[&Instrument]) -> Self {
        Self {
            count: instruments.len(),
            total_market_cap: instruments.iter().map(|i| i.market_cap).sum(),
            total_volume_24h: instruments.iter().map(|i| i.volume_24h).sum(),
            rising: instruments
                .iter()
                .filter(|i| i.trend == Trend::Rising)
                .count(),
        }
    }
}

/// Read-only instrument reference data, kept in insertion order.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
    index: HashMap<InstrumentId, usize>,
}

impl InstrumentCatalog {
    /// Later duplicates of an id replace earlier ones.
    pub fn new(instruments: Vec<Instrument>) -> Self {
        let mut deduped: Vec<Instrument> = Vec::with_capacity(instruments.len());
        let mut index = HashMap::new();
        for instrument in instruments {
            match index.get(&instrument.id) {
                Some(&slot) => deduped[slot] = instrument,
                None => {
                    index.insert(instrument.id, deduped.len());
                    deduped.push(instrument);
                }
            }
        }
        Self {
            instruments: deduped,
            index,
        }
    }

    /// The built-in dataset of fictional celebrity coins.
    pub fn seeded() -> Self {
        Self::new(seed_instruments())
    }

    pub fn get(&self, id: InstrumentId) -> Option<&Instrument> {
        self.index.get(&id).map(|&slot| &self.instruments[slot])
    }

    pub fn reference_price(&self, id: InstrumentId) -> Option<Price> {
        self.get(id).map(|i| i.price)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Case-insensitive match on symbol, celebrity and full name, optional
    /// category filter, ordered by market cap descending.
    pub fn search(&self, query: &MarketQuery) -> Vec<&Instrument> {
        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_lowercase();
        let category = query
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

        let mut matches: Vec<&Instrument> = self
            .instruments
            .iter()
            .filter(|i| {
                needle.is_empty()
                    || i.symbol.to_lowercase().contains(&needle)
                    || i.celebrity.to_lowercase().contains(&needle)
                    || i.full_name.to_lowercase().contains(&needle)
            })
            .filter(|i| category.is_none_or(|c| i.category.eq_ignore_ascii_case(c)))
            .collect();

        matches.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
        matches
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for instrument in &self.instruments {
            if !seen.contains(&instrument.category.as_str()) {
                seen.push(&instrument.category);
            }
        }
        seen
    }

    /// Biggest 24h gainers first.
    pub fn top_movers(&self, limit: usize) -> Vec<&Instrument> {
        let mut movers: Vec<&Instrument> = self.instruments.iter().collect();
        movers.sort_by(|a, b| b.change_24h.total_cmp(&a.change_24h));
        movers.truncate(limit);
        movers
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[allow(clippy::too_many_arguments)]
fn coin(
    id: InstrumentId,
    symbol: &str,
    full_name: &str,
    celebrity: &str,
    category: &str,
    price: Price,
    change_24h: f64,
    change_7d: f64,
    market_cap: f64,
    volume_24h: f64,
    holders: u64,
    trend: Trend,
    risk_level: RiskLevel,
    recommendation: Recommendation,
    alerts: &[&str],
) -> Instrument {
    Instrument {
        id,
        symbol: symbol.to_string(),
        full_name: full_name.to_string(),
        celebrity: celebrity.to_string(),
        category: category.to_string(),
        price,
        change_24h,
        change_7d,
        market_cap,
        volume_24h,
        holders,
        trend,
        risk_level,
        recommendation,
        alerts: alerts.iter().map(|a| a.to_string()).collect(),
    }
}

#[rustfmt::skip]
fn seed_instruments() -> Vec<Instrument> {
    use Recommendation::*;
    use RiskLevel::*;
    use Trend::*;

    vec![
        coin(1, "NOVA", "Nova Starlight Token", "Nova Starlight", "Music",
            0.004215, 62.4, 148.9, 421_500_000.0, 38_200_000.0, 184_320,
            Rising, High, Buy, &["Volume spike after surprise album drop"]),
        coin(2, "BLITZ", "Blitz Okafor Coin", "Blitz Okafor", "Sports",
            0.018730, 12.8, 31.2, 312_000_000.0, 21_450_000.0, 96_115,
            Rising, Medium, Buy, &[]),
        coin(3, "REEL", "Reel Marlowe Token", "Reel Marlowe", "Film",
            0.000912, -4.6, -12.3, 88_400_000.0, 6_720_000.0, 41_870,
            Declining, Medium, Hold, &[]),
        coin(4, "CHEF", "Chef Rosalind Coin", "Rosalind Vey", "Lifestyle",
            0.002640, 1.2, 3.8, 54_900_000.0, 2_980_000.0, 22_403,
            Stable, Low, Hold, &[]),
        coin(5, "GLITCH", "Glitch Streamer Token", "Glitch", "Gaming",
            0.000087, 87.1, 212.5, 19_800_000.0, 9_870_000.0, 58_960,
            Rising, High, Buy, &["Extreme volatility", "Liquidity concentrated in few wallets"]),
        coin(6, "ACE", "Ace Delacroix Coin", "Ace Delacroix", "Sports",
            0.011450, -18.9, -35.4, 143_000_000.0, 11_300_000.0, 70_245,
            Declining, High, Sell, &["Team announced a contract dispute"]),
        coin(7, "MUSE", "Muse Halloway Token", "Muse Halloway", "Music",
            0.006300, 0.0, 2.1, 201_700_000.0, 7_410_000.0, 103_558,
            Stable, Low, Hold, &[]),
        coin(8, "BYTE", "Byte Kessler Coin", "Byte Kessler", "Tech",
            0.032900, 5.5, 9.7, 265_300_000.0, 14_060_000.0, 87_932,
            Rising, Medium, Buy, &[]),
    ]
}
