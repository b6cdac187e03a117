//! HTTP access to the trading backend.

pub mod client;

pub use client::{Dashboard, DeskClient};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Backend routes used by the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    TradeOrder,
    ModifyPositions,
    ClosePositions,
    ActiveSessions,
    TradeHistory,
    DashboardStats,
    Sessions,
    Health,
    PositionDetails,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TradeOrder => "/trade_order",
            Endpoint::ModifyPositions => "/modify_positions",
            Endpoint::ClosePositions => "/close_positions",
            Endpoint::ActiveSessions => "/active_sessions",
            Endpoint::TradeHistory => "/trade_history",
            Endpoint::DashboardStats => "/dashboard_stats",
            Endpoint::Sessions => "/sessions",
            Endpoint::Health => "/health",
            Endpoint::PositionDetails => "/position_details",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A response whose body parsed as JSON, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Value,
}

/// Transport used by the forms to submit payloads.
///
/// One call is one attempt; implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradingApi: Send + Sync {
    /// POST a JSON body and return the parsed reply.
    ///
    /// `Err` means no usable response: connection failure, timeout, or a
    /// body that is not JSON.
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<HttpReply>;
}
