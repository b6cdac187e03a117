//! Order types for placing a new trade.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    #[default]
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            other => Err(format!("action must be 'buy' or 'sell', got '{}'", other)),
        }
    }
}

/// Type of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Executes immediately at the current price.
    #[default]
    Market,
    /// Rests at `entry_price` until filled.
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            other => Err(format!("order_type must be 'market' or 'limit', got '{}'", other)),
        }
    }
}

/// Default risk shown in a freshly opened trade form.
pub const DEFAULT_RISK_PERCENT: &str = "1";

/// In-progress trade form.
///
/// Numeric fields hold the raw text the user typed; parsing happens in
/// validation and payload building. An empty string means "not supplied".
#[derive(Debug, Clone, PartialEq)]
pub struct TradeDraft {
    pub pair: String,
    pub action: TradeAction,
    pub risk_percent: String,
    order_type: OrderType,
    pub entry_price: String,
    pub stop_loss: String,
    pub target_level: String,
}

impl Default for TradeDraft {
    fn default() -> Self {
        Self {
            pair: String::new(),
            action: TradeAction::Buy,
            risk_percent: DEFAULT_RISK_PERCENT.to_string(),
            order_type: OrderType::Market,
            entry_price: String::new(),
            stop_loss: String::new(),
            target_level: String::new(),
        }
    }
}

impl TradeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Switch the order type.
    ///
    /// Price levels depend on the order type, so a change clears entry,
    /// stop loss and target. Re-selecting the current type keeps them.
    pub fn set_order_type(&mut self, order_type: OrderType) {
        if self.order_type == order_type {
            return;
        }
        self.order_type = order_type;
        self.entry_price.clear();
        self.stop_loss.clear();
        self.target_level.clear();
    }

    /// Reset after a successful submission, keeping the selected order type.
    pub fn reset(&mut self) {
        *self = Self {
            order_type: self.order_type,
            ..Self::default()
        };
    }

    pub fn with_pair(mut self, pair: impl Into<String>) -> Self {
        self.pair = pair.into();
        self
    }

    pub fn with_action(mut self, action: TradeAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_risk_percent(mut self, risk: impl Into<String>) -> Self {
        self.risk_percent = risk.into();
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.set_order_type(order_type);
        self
    }

    pub fn with_entry_price(mut self, price: impl Into<String>) -> Self {
        self.entry_price = price.into();
        self
    }

    pub fn with_stop_loss(mut self, price: impl Into<String>) -> Self {
        self.stop_loss = price.into();
        self
    }

    pub fn with_target_level(mut self, price: impl Into<String>) -> Self {
        self.target_level = price.into();
        self
    }
}

/// Body of `POST /trade_order`.
///
/// Optional levels are omitted from the JSON when absent: the backend treats
/// a missing field differently from one present with value zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePayload {
    pub pair: String,
    pub action: TradeAction,
    pub risk_percent: f64,
    pub order_type: OrderType,
    pub stop_loss: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
}
