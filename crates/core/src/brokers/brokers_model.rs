//! Broker domain models.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::cache::CacheValue;
use crate::constants::{UNKNOWN_DOUBLE, UNKNOWN_INT, UNKNOWN_STRING};
use crate::portfolios::{Account, Portfolio};

fn unknown_double() -> f64 {
    UNKNOWN_DOUBLE
}

/// A position in one ticker symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
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

impl Stock {
    pub fn new(
        symbol: impl Into<String>,
        shares: i32,
        commission: f64,
        price: f64,
        total: f64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            price,
            date: date.into(),
            total,
            commission,
        }
    }
}

/// Denormalized read-model: one owner's portfolio total merged with the
/// owner's account attributes.
///
/// Fields whose upstream data is unavailable hold the sentinels from
/// [`crate::constants`] (`-1.0`, `-1`, `"Unknown"`). Those are placeholders,
/// not measurements.
///
/// Equality compares the display rendering (see [`Broker::render`]), so two
/// records that differ only below the second decimal are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
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
    /// Keyed by ticker symbol. Never null on the wire: a missing or null
    /// field deserializes to an empty map.
    #[serde(deserialize_with = "deserialize_stocks")]
    pub stocks: BTreeMap<String, Stock>,
}

impl Default for Broker {
    fn default() -> Self {
        Self {
            owner: String::new(),
            total: UNKNOWN_DOUBLE,
            loyalty: UNKNOWN_STRING.to_string(),
            balance: UNKNOWN_DOUBLE,
            commissions: UNKNOWN_DOUBLE,
            free: UNKNOWN_INT,
            next_commission: UNKNOWN_DOUBLE,
            sentiment: UNKNOWN_STRING.to_string(),
            stocks: BTreeMap::new(),
        }
    }
}

impl Broker {
    /// Creates a record for `owner` with every other field unknown.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Merges a portfolio with its account.
    ///
    /// Owner, total and stocks come from the portfolio. The financial fields
    /// come from the account, or are left at their sentinels when there is
    /// no matching account.
    pub fn from_parts(portfolio: Portfolio, account: Option<Account>) -> Self {
        let mut broker = Self {
            owner: portfolio.owner,
            total: portfolio.total,
            stocks: portfolio.stocks,
            ..Self::default()
        };

        if let Some(account) = account {
            broker.loyalty = account.loyalty;
            broker.balance = account.balance;
            broker.commissions = account.commissions;
            broker.free = account.free;
            broker.sentiment = account.sentiment;
            broker.next_commission = account.next_commission;
        }

        broker
    }

    /// Adds or wholly replaces the position for the stock's symbol.
    ///
    /// Returns the position that was replaced, if any. A stock with an empty
    /// symbol is ignored. Field-level merging is the caller's job.
    pub fn add_stock(&mut self, stock: Stock) -> Option<Stock> {
        if stock.symbol.is_empty() {
            return None;
        }
        self.stocks.insert(stock.symbol.clone(), stock)
    }

    /// False when every account-derived field still holds its sentinel.
    pub fn has_account_data(&self) -> bool {
        !(self.loyalty == UNKNOWN_STRING
            && self.balance == UNKNOWN_DOUBLE
            && self.commissions == UNKNOWN_DOUBLE
            && self.free == UNKNOWN_INT
            && self.sentiment == UNKNOWN_STRING
            && self.next_commission == UNKNOWN_DOUBLE)
    }
}

impl CacheValue for Broker {
    const TYPE_NAME: &'static str = "Broker";
}

/// Accepts a missing or null stocks object and back-fills empty symbols from
/// the map key. A stock whose symbol differs from its key is rejected.
pub(crate) fn deserialize_stocks<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Stock>, D::Error>
where
    D: Deserializer<'de>,
{
    let stocks = Option::<BTreeMap<String, Stock>>::deserialize(deserializer)?.unwrap_or_default();
    stocks
        .into_iter()
        .map(|(key, mut stock)| {
            if stock.symbol.is_empty() {
                stock.symbol = key.clone();
            } else if stock.symbol != key {
                return Err(<D::Error as de::Error>::custom(format!(
                    "stock keyed '{}' has symbol '{}'",
                    key, stock.symbol
                )));
            }
            Ok((key, stock))
        })
        .collect()
}
