use std::collections::BTreeMap;

use broker_query_core::brokers as core_brokers;
use broker_query_core::constants::UNKNOWN_DOUBLE;
use broker_query_core::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

fn unknown_double() -> f64 {
    UNKNOWN_DOUBLE
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Filled from the map key when empty.
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shares: i32,
    #[serde(default = "unknown_double")]
    pub price: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default = "unknown_double")]
    pub total: f64,
    #[serde(default = "unknown_double")]
    pub commission: f64,
}

impl From<core_brokers::Stock> for Stock {
    fn from(s: core_brokers::Stock) -> Self {
        Self {
            symbol: s.symbol,
            shares: s.shares,
            price: s.price,
            date: s.date,
            total: s.total,
            commission: s.commission,
        }
    }
}

impl From<Stock> for core_brokers::Stock {
    fn from(s: Stock) -> Self {
        core_brokers::Stock::new(s.symbol, s.shares, s.commission, s.price, s.total, s.date)
    }
}

/// Broker record as exchanged over HTTP. Amounts keep full precision; missing
/// fields default to the unknown sentinels (`-1`, `"Unknown"`).
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct Broker {
    pub owner: String,
    pub total: f64,
    pub loyalty: String,
    pub balance: f64,
    pub commissions: f64,
    pub free: i32,
    pub next_commission: f64,
    pub sentiment: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub stocks: BTreeMap<String, Stock>,
}

impl Default for Broker {
    fn default() -> Self {
        core_brokers::Broker::default().into()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Stock>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl From<core_brokers::Broker> for Broker {
    fn from(b: core_brokers::Broker) -> Self {
        Self {
            owner: b.owner,
            total: b.total,
            loyalty: b.loyalty,
            balance: b.balance,
            commissions: b.commissions,
            free: b.free,
            next_commission: b.next_commission,
            sentiment: b.sentiment,
            stocks: b
                .stocks
                .into_iter()
                .map(|(symbol, stock)| (symbol, stock.into()))
                .collect(),
        }
    }
}

/// Stocks are keyed by symbol: an empty symbol takes its key, and a stock
/// filed under a different symbol is rejected.
impl TryFrom<Broker> for core_brokers::Broker {
    type Error = ValidationError;

    fn try_from(b: Broker) -> Result<Self, Self::Error> {
        let mut stocks = BTreeMap::new();
        for (key, mut stock) in b.stocks {
            if stock.symbol.is_empty() {
                stock.symbol = key.clone();
            } else if stock.symbol != key {
                return Err(ValidationError::InvalidInput(format!(
                    "stock keyed '{}' has symbol '{}'",
                    key, stock.symbol
                )));
            }
            stocks.insert(key, stock.into());
        }

        Ok(Self {
            owner: b.owner,
            total: b.total,
            loyalty: b.loyalty,
            balance: b.balance,
            commissions: b.commissions,
            free: b.free,
            next_commission: b.next_commission,
            sentiment: b.sentiment,
            stocks,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub refreshed: usize,
}
