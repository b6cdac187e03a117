//! Text rendering of outcomes and dashboard panels.

use chrono::NaiveDateTime;
use desk_core::api::Dashboard;
use desk_core::types::{
    ActiveSession, ActiveSessions, CloseResponse, CurrencyPair, DashboardStats, HealthStatus,
    ModifyResponse, PositionDetails, SessionDetail, TradeDetails, TradeHistory,
    TradeOrderResponse,
};
use desk_core::SubmissionOutcome;
use std::fmt::Write;

/// A backend reply that can be shown in a result panel.
pub trait ResultPanel {
    const SUCCESS_TITLE: &'static str;
    const FAILURE_TITLE: &'static str;

    fn lines(&self) -> Vec<String>;
}

impl ResultPanel for TradeOrderResponse {
    const SUCCESS_TITLE: &'static str = "Trade Executed Successfully!";
    const FAILURE_TITLE: &'static str = "Trade Execution Failed";

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Session ID: {}", self.session_id),
            format!(
                "✓ Successful trades: {}/{}",
                self.successful_trades, self.total_accounts
            ),
        ];
        if self.failed_trades > 0 {
            lines.push(format!("⚠ Failed trades: {}", self.failed_trades));
        }
        lines.push(format!("Symbol: {}", self.trade_details.symbol));
        lines.push(format!(
            "Action: {}",
            self.trade_details.action.as_str().to_uppercase()
        ));
        lines.push(format!(
            "Order Type: {}",
            self.trade_details.order_type.as_str().to_uppercase()
        ));
        lines
    }
}

impl ResultPanel for ModifyResponse {
    const SUCCESS_TITLE: &'static str = "Modification Successful!";
    const FAILURE_TITLE: &'static str = "Modification Failed";

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "✓ Positions modified: {}",
            self.successful_modifications
        )];
        if self.failed_modifications > 0 {
            lines.push(format!(
                "⚠ Failed modifications: {}",
                self.failed_modifications
            ));
        }
        if let Some(sl) = self.applied_sl() {
            lines.push(format!("New Stop Loss: {}", sl));
        }
        if let Some(tp) = self.applied_tp() {
            lines.push(format!("New Take Profit: {}", tp));
        }
        lines
    }
}

impl ResultPanel for CloseResponse {
    const SUCCESS_TITLE: &'static str = "Positions Closed Successfully!";
    const FAILURE_TITLE: &'static str = "Closure Failed";

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("✓ Positions closed: {}", self.successful_closures)];
        if self.failed_closures > 0 {
            lines.push(format!("⚠ Failed closures: {}", self.failed_closures));
        }
        if let Some(profit) = self.total_profit {
            lines.push(format!("Realized P&L: {}", signed_money(profit)));
        }
        lines
    }
}

pub fn outcome<T: ResultPanel>(outcome: &SubmissionOutcome<T>) -> String {
    match outcome {
        SubmissionOutcome::Success { data } => {
            let mut out = format!("{}\n", T::SUCCESS_TITLE);
            for line in data.lines() {
                let _ = writeln!(out, "  {}", line);
            }
            out
        }
        failed => format!(
            "{}\n  {}\n",
            T::FAILURE_TITLE,
            failed.error_message().unwrap_or_default()
        ),
    }
}

pub fn stats(stats: &DashboardStats) -> String {
    format!(
        "Active sessions: {}  |  Success rate: {:.1}%  |  P&L today: {}  |  Total P&L: {}\n",
        stats.active_sessions,
        stats.success_rate,
        signed_money(stats.today_pnl),
        signed_money(stats.total_pnl)
    )
}

pub fn dashboard(dashboard: &Dashboard, now: NaiveDateTime) -> String {
    let mut out = stats(&dashboard.stats);
    out.push('\n');
    out.push_str(&sessions(&dashboard.sessions, now));
    out
}

pub fn sessions(sessions: &ActiveSessions, now: NaiveDateTime) -> String {
    if sessions.is_empty() {
        return "No Active Sessions\n  Execute a new trade to see active sessions here\n".to_string();
    }

    let mut out = String::from("Active Trading Sessions\n");
    for (id, session) in sessions.newest_first() {
        let _ = writeln!(out, "  {}", session_line(id, session, now));
    }
    out
}

fn session_line(id: &str, session: &ActiveSession, now: NaiveDateTime) -> String {
    let expiry = if session.is_expired(now) {
        "expiring".to_string()
    } else {
        let left = session.expires_at() - now;
        format!("expires in {}h{:02}m", left.num_hours(), left.num_minutes() % 60)
    };

    format!(
        "{}  {}  opened {}  {}",
        id,
        details_summary(&session.trade_details),
        session.timestamp.format("%H:%M:%S"),
        expiry
    )
}

fn details_summary(details: &TradeDetails) -> String {
    let mut out = format!(
        "{} {}",
        details.symbol,
        details.action.as_str().to_uppercase()
    );
    if let Some(sl) = details.stop_loss {
        let _ = write!(out, "  SL: {}", sl);
    }
    if let Some(tp) = details.target_level {
        let _ = write!(out, "  TP: {}", tp);
    }
    out
}

pub fn history(history: &TradeHistory) -> String {
    if history.history.is_empty() {
        return "No closed sessions yet\n".to_string();
    }

    let mut out = String::from("Trade History\n");
    for (id, entry) in history.recent_first() {
        let _ = writeln!(
            out,
            "  {}  {}  closed {}  {}{}",
            id,
            details_summary(&entry.trade_details),
            entry.closing_time.format("%Y-%m-%d %H:%M"),
            signed_money(entry.total_profit),
            if entry.expired { "  (expired)" } else { "" }
        );
        for account in &entry.account_profits {
            let _ = writeln!(
                out,
                "      account {}: {}",
                account.account,
                signed_money(account.profit)
            );
        }
    }
    let _ = writeln!(out, "  Total: {}", signed_money(history.total_profit()));
    out
}

pub fn session_detail(detail: &SessionDetail, now: NaiveDateTime) -> String {
    let mut out = format!("{}\n", session_line(&detail.session_id, &detail.session, now));
    if detail.active_positions.is_empty() {
        out.push_str("  No open positions\n");
    }
    for position in &detail.active_positions {
        let _ = writeln!(
            out,
            "  account {}  ticket {}  {}",
            position.account, position.ticket, position.symbol
        );
    }
    out
}

pub fn position(details: &PositionDetails) -> String {
    if !details.success {
        return format!(
            "Position lookup failed: {}\n",
            details.error.as_deref().unwrap_or("unknown reason")
        );
    }
    let level = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    format!("SL: {}  TP: {}\n", level(details.sl), level(details.tp))
}

pub fn health(status: &HealthStatus) -> String {
    format!("Backend status: {}\n", status.status)
}

pub fn pairs() -> String {
    let names: Vec<&str> = CurrencyPair::ALL.iter().map(|p| p.as_str()).collect();
    format!("{}\n", names.join(" "))
}

fn signed_money(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("+${:.2}", value)
    }
}
