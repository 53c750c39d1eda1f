//! Upstream Portfolio and Account models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::brokers::{deserialize_stocks, Stock};

/// Portfolio as served by the Portfolio service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub owner: String,
    #[serde(default)]
    pub total: f64,
    #[serde(rename = "accountID", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_stocks")]
    pub stocks: BTreeMap<String, Stock>,
}

/// Account as served by the Account service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub owner: String,
    pub loyalty: String,
    pub balance: f64,
    pub commissions: f64,
    pub free: i32,
    pub sentiment: String,
    pub next_commission: f64,
}
