//! Draft validation.
//!
//! Every rule is evaluated; the returned messages keep rule order. An empty
//! list means the draft may be built and sent.

use crate::types::{CloseDraft, CurrencyPair, ModifyDraft, OrderType, TradeAction, TradeDraft};

pub const PAIR_REQUIRED: &str = "Currency pair is required";
pub const RISK_OUT_OF_RANGE: &str = "Risk percentage must be between 0.1 and 10";
pub const STOP_LOSS_REQUIRED: &str = "Stop loss is required";
pub const ENTRY_PRICE_REQUIRED: &str = "Entry price is required for limit orders";
pub const BUY_STOP_ABOVE_ENTRY: &str = "For BUY orders, stop loss must be below entry price";
pub const SELL_STOP_BELOW_ENTRY: &str = "For SELL orders, stop loss must be above entry price";
pub const TARGET_INVALID: &str = "Target level must be a positive number";
pub const SESSION_REQUIRED: &str = "Session ID is required";
pub const LEVEL_REQUIRED: &str = "At least one of Stop Loss or Take Profit must be provided";
pub const PRICES_POSITIVE: &str = "Price values must be positive";

/// Inclusive risk bounds, in percent of account equity.
pub const MIN_RISK_PERCENT: f64 = 0.1;
pub const MAX_RISK_PERCENT: f64 = 10.0;

/// A numeric form field after parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Field {
    Absent,
    Invalid,
    Value(f64),
}

impl Field {
    pub(crate) fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Field::Absent;
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Field::Value(value),
            _ => Field::Invalid,
        }
    }

    fn is_positive(self) -> bool {
        matches!(self, Field::Value(v) if v > 0.0)
    }
}

pub fn validate_trade(draft: &TradeDraft) -> Vec<String> {
    let mut errors = Vec::new();

    let pair = draft.pair.trim();
    if pair.is_empty() {
        errors.push(PAIR_REQUIRED.to_string());
    } else if let Err(e) = pair.parse::<CurrencyPair>() {
        errors.push(e);
    }

    match Field::parse(&draft.risk_percent) {
        Field::Value(risk) if (MIN_RISK_PERCENT..=MAX_RISK_PERCENT).contains(&risk) => {}
        _ => errors.push(RISK_OUT_OF_RANGE.to_string()),
    }

    let stop_loss = Field::parse(&draft.stop_loss);
    if !stop_loss.is_positive() {
        errors.push(STOP_LOSS_REQUIRED.to_string());
    }

    if draft.order_type() == OrderType::Limit {
        let entry = Field::parse(&draft.entry_price);
        if !entry.is_positive() {
            errors.push(ENTRY_PRICE_REQUIRED.to_string());
        }

        if let (Field::Value(entry), Field::Value(stop)) = (entry, stop_loss) {
            match draft.action {
                TradeAction::Buy if stop >= entry => errors.push(BUY_STOP_ABOVE_ENTRY.to_string()),
                TradeAction::Sell if stop <= entry => errors.push(SELL_STOP_BELOW_ENTRY.to_string()),
                _ => {}
            }
        }
    }

    let target = Field::parse(&draft.target_level);
    if target != Field::Absent && !target.is_positive() {
        errors.push(TARGET_INVALID.to_string());
    }

    errors
}

pub fn validate_modify(draft: &ModifyDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.session_id.trim().is_empty() {
        errors.push(SESSION_REQUIRED.to_string());
    }

    let levels = [Field::parse(&draft.new_sl), Field::parse(&draft.new_tp)];
    if levels.iter().all(|f| *f == Field::Absent) {
        errors.push(LEVEL_REQUIRED.to_string());
    } else if levels
        .iter()
        .any(|f| *f != Field::Absent && !f.is_positive())
    {
        errors.push(PRICES_POSITIVE.to_string());
    }

    errors
}

pub fn validate_close(draft: &CloseDraft) -> Vec<String> {
    if draft.session_id.trim().is_empty() {
        vec![SESSION_REQUIRED.to_string()]
    } else {
        Vec::new()
    }
}
