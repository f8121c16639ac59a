use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Shopify order payload, trimmed to the fields we act on.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub line_items: Vec<LineItem>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    // sku is expected to match the product id in our db
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    Local { path: String },
    Remote { url: String, auth_token: String },
}

impl Display for DatabaseConfig {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            DatabaseConfig::Local { path } => write!(f, "local libsql db at {path}"),
            DatabaseConfig::Remote { url, .. } => write!(f, "remote libsql db at {url}"),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StockUpdateOutcome {
    Updated,
    NotFound,
    Failed(String),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LineItemResult {
    pub sku: String,
    pub quantity: u32,
    pub outcome: StockUpdateOutcome,
}
