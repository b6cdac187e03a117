//! Wire payload construction.
//!
//! Builders assume the draft already passed validation and do not repeat
//! the business rules. A field that still fails to parse is reported as
//! [`Error::InvalidField`].

use super::validate::Field;
use crate::types::{
    CloseDraft, CloseRequest, CurrencyPair, ModifyDraft, ModifyRequest, OrderType, TradeDraft,
    TradePayload,
};
use crate::{Error, Result};

pub fn build_trade(draft: &TradeDraft) -> Result<TradePayload> {
    let pair = match draft.pair.parse::<CurrencyPair>() {
        Ok(pair) => pair.to_string(),
        Err(_) => draft.pair.trim().to_string(),
    };

    // A stale entry price on a market draft is never sent
    let entry_price = match draft.order_type() {
        OrderType::Limit => Some(required("entry_price", &draft.entry_price)?),
        OrderType::Market => None,
    };

    Ok(TradePayload {
        pair,
        action: draft.action,
        risk_percent: required("risk_percent", &draft.risk_percent)?,
        order_type: draft.order_type(),
        stop_loss: required("stop_loss", &draft.stop_loss)?,
        target_level: optional("target_level", &draft.target_level)?,
        entry_price,
    })
}

pub fn build_modify(draft: &ModifyDraft) -> Result<ModifyRequest> {
    Ok(ModifyRequest {
        session_id: draft.session_id.trim().to_string(),
        new_sl: optional("new_sl", &draft.new_sl)?,
        new_tp: optional("new_tp", &draft.new_tp)?,
    })
}

pub fn build_close(draft: &CloseDraft) -> Result<CloseRequest> {
    Ok(CloseRequest {
        session_id: draft.session_id.trim().to_string(),
    })
}

fn required(field: &'static str, text: &str) -> Result<f64> {
    match Field::parse(text) {
        Field::Value(value) => Ok(value),
        Field::Absent | Field::Invalid => Err(Error::InvalidField {
            field,
            value: text.to_string(),
        }),
    }
}

fn optional(field: &'static str, text: &str) -> Result<Option<f64>> {
    match Field::parse(text) {
        Field::Absent => Ok(None),
        Field::Value(value) => Ok(Some(value)),
        Field::Invalid => Err(Error::InvalidField {
            field,
            value: text.to_string(),
        }),
    }
}
