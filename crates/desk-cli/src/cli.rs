//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use desk_core::types::{
    CloseDraft, ModifyDraft, OrderType, TradeAction, TradeDraft, DEFAULT_RISK_PERCENT,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "desk", version, about = "Place, adjust and close trading sessions")]
pub struct Cli {
    /// Backend address, overrides configuration
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Configuration file (defaults to ./desk.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print responses as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a new session on every account
    Trade(TradeArgs),
    /// Move the stop loss and/or take profit of a session
    Modify(ModifyArgs),
    /// Close every position of a session
    Close {
        /// Session to close
        session_id: Option<String>,
    },
    /// Active sessions and headline statistics
    Sessions,
    /// Closed sessions, most recent first
    History,
    /// Headline statistics only
    Stats,
    /// One active session with its open positions
    Session { session_id: String },
    /// Live stop loss / take profit of a broker position
    Position {
        #[arg(long)]
        ticket: u64,
        #[arg(long)]
        account: u64,
    },
    /// Backend health check
    Health,
    /// List supported currency pairs
    Pairs,
}

#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
pub struct TradeArgs {
    /// Currency pair, e.g. EURUSD
    #[arg(long)]
    pub pair: Option<String>,

    #[arg(long, default_value = "buy")]
    pub action: TradeAction,

    /// Percent of account equity to risk (0.1 - 10)
    #[arg(long = "risk", default_value = DEFAULT_RISK_PERCENT)]
    pub risk_percent: String,

    #[arg(long = "type", default_value = "market")]
    pub order_type: OrderType,

    /// Entry price, limit orders only
    #[arg(long = "entry")]
    pub entry_price: Option<String>,

    #[arg(long = "sl")]
    pub stop_loss: Option<String>,

    /// Optional profit target
    #[arg(long = "tp")]
    pub target_level: Option<String>,
}

impl TradeArgs {
    pub fn into_draft(self) -> TradeDraft {
        // Order type first: switching it clears the price levels
        TradeDraft::new()
            .with_order_type(self.order_type)
            .with_pair(self.pair.unwrap_or_default())
            .with_action(self.action)
            .with_risk_percent(self.risk_percent)
            .with_entry_price(self.entry_price.unwrap_or_default())
            .with_stop_loss(self.stop_loss.unwrap_or_default())
            .with_target_level(self.target_level.unwrap_or_default())
    }
}

#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
pub struct ModifyArgs {
    pub session_id: Option<String>,

    /// New stop loss
    #[arg(long = "sl")]
    pub new_sl: Option<String>,

    /// New take profit
    #[arg(long = "tp")]
    pub new_tp: Option<String>,
}

impl ModifyArgs {
    pub fn into_draft(self) -> ModifyDraft {
        ModifyDraft::for_session(self.session_id.unwrap_or_default())
            .with_new_sl(self.new_sl.unwrap_or_default())
            .with_new_tp(self.new_tp.unwrap_or_default())
    }
}

pub fn close_draft(session_id: Option<String>) -> CloseDraft {
    CloseDraft::for_session(session_id.unwrap_or_default())
}
