//! Session, history and statistics records returned by the backend.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::order::{OrderType, TradeAction};

/// Hours after which the backend closes a session on its own.
pub const SESSION_EXPIRATION_HOURS: i64 = 24;

/// How a session's positions exist on the broker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Filled market position.
    #[default]
    Position,
    /// Pending limit order.
    Order,
}

/// The trade a session was opened with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeDetails {
    /// Broker symbol (may carry a broker suffix, e.g. `EURUSDm`).
    pub symbol: String,
    pub action: TradeAction,
    pub order_type: OrderType,
    pub stop_loss: Option<f64>,
    pub target_level: Option<f64>,
    pub entry_price: Option<f64>,
}

/// Per-account result of a broker operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub entry_type: Option<EntryType>,
    #[serde(default)]
    pub order_id: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResult {
    pub account: u64,
    pub result: ExecutionResult,
}

/// Response of `POST /trade_order`.
///
/// Every field defaults: a 2xx reply is a success even when the backend
/// leaves some of them out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeOrderResponse {
    pub session_id: String,
    pub successful_trades: u32,
    pub total_accounts: u32,
    pub failed_trades: u32,
    pub trade_details: TradeDetails,
    pub results: Vec<AccountResult>,
    pub entry_type: Option<EntryType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationDetails {
    #[serde(default)]
    pub new_sl: Option<f64>,
    #[serde(default)]
    pub new_tp: Option<f64>,
}

/// Response of `POST /modify_positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyResponse {
    pub successful_modifications: u32,
    pub failed_modifications: u32,
    pub new_sl: Option<f64>,
    pub new_tp: Option<f64>,
    pub modification_details: Option<ModificationDetails>,
}

impl ModifyResponse {
    /// Applied stop loss, whether reported at the top level or in the details.
    pub fn applied_sl(&self) -> Option<f64> {
        self.new_sl
            .or_else(|| self.modification_details.as_ref().and_then(|d| d.new_sl))
    }

    /// Applied take profit, whether reported at the top level or in the details.
    pub fn applied_tp(&self) -> Option<f64> {
        self.new_tp
            .or_else(|| self.modification_details.as_ref().and_then(|d| d.new_tp))
    }
}

/// Response of `POST /close_positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseResponse {
    pub successful_closures: u32,
    pub failed_closures: u32,
    pub total_profit: Option<f64>,
}

/// A session that still has open positions or pending orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub trade_details: TradeDetails,
    #[serde(default)]
    pub entry_type: EntryType,
    /// Backend-local creation time.
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub total_accounts: u32,
    #[serde(default)]
    pub successful_trades: u32,
    #[serde(default)]
    pub failed_trades: u32,
}

impl ActiveSession {
    /// When the backend will close the session automatically.
    pub fn expires_at(&self) -> NaiveDateTime {
        self.timestamp + Duration::hours(SESSION_EXPIRATION_HOURS)
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at()
    }
}

/// Response of `GET /active_sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveSessions {
    #[serde(default)]
    pub sessions: BTreeMap<String, ActiveSession>,
}

impl ActiveSessions {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Sessions ordered by creation time, newest first.
    pub fn newest_first(&self) -> Vec<(&str, &ActiveSession)> {
        let mut sessions: Vec<_> = self
            .sessions
            .iter()
            .map(|(id, session)| (id.as_str(), session))
            .collect();
        sessions.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
        sessions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfit {
    pub account: u64,
    pub profit: f64,
}

/// A closed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub trade_details: TradeDetails,
    pub timestamp: NaiveDateTime,
    pub closing_time: NaiveDateTime,
    /// Closed by the backend's expiry sweep rather than by the user.
    #[serde(default)]
    pub expired: bool,
    pub total_profit: f64,
    #[serde(default)]
    pub account_profits: Vec<AccountProfit>,
}

impl HistoryEntry {
    pub fn is_profitable(&self) -> bool {
        self.total_profit > 0.0
    }

    pub fn duration(&self) -> Duration {
        self.closing_time - self.timestamp
    }
}

/// Response of `GET /trade_history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeHistory {
    #[serde(default)]
    pub history: BTreeMap<String, HistoryEntry>,
}

impl TradeHistory {
    /// Entries ordered by closing time, most recent first.
    pub fn recent_first(&self) -> Vec<(&str, &HistoryEntry)> {
        let mut entries: Vec<_> = self
            .history
            .iter()
            .map(|(id, entry)| (id.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| b.1.closing_time.cmp(&a.1.closing_time));
        entries
    }

    pub fn total_profit(&self) -> f64 {
        self.history.values().map(|e| e.total_profit).sum()
    }
}

/// Response of `GET /dashboard_stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active_sessions: u32,
    /// Percentage, rounded to one decimal by the backend.
    pub success_rate: f64,
    pub today_pnl: f64,
    pub total_pnl: f64,
}

/// Response of `GET /sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionIds {
    #[serde(default)]
    pub sessions: Vec<String>,
}

/// An open broker position belonging to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePosition {
    pub account: u64,
    pub ticket: u64,
    pub symbol: String,
}

/// Response of `GET /sessions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session_id: String,
    #[serde(default)]
    pub active_positions: Vec<ActivePosition>,
    #[serde(flatten)]
    pub session: ActiveSession,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// Unix seconds on the backend clock.
    #[serde(default)]
    pub timestamp: f64,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Response of `GET /position_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDetails {
    pub success: bool,
    #[serde(default)]
    pub sl: Option<f64>,
    #[serde(default)]
    pub tp: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}
