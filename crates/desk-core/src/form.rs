//! Form state and the submit flow shared by the trade, modify and close forms.
//!
//! A [`Form`] owns its draft and its last [`SubmissionOutcome`]. Submitting
//! validates locally, sends at most one request, and stores the interpreted
//! reply. While a submit is pending, further submits are refused.

use crate::api::{Endpoint, TradingApi};
use crate::submission::{self, interpret_reply, SubmissionOutcome};
use crate::types::{
    CloseDraft, CloseRequest, CloseResponse, ModifyDraft, ModifyRequest, ModifyResponse,
    TradeDraft, TradeOrderResponse, TradePayload,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// One kind of form: its draft, wire payload, reply and route.
pub trait Submission {
    type Draft: Clone + Default + Send;
    type Payload: Serialize;
    type Response: DeserializeOwned + Default + Clone + Send;

    const ENDPOINT: Endpoint;
    /// Name used in logs.
    const NAME: &'static str;

    fn validate(draft: &Self::Draft) -> Vec<String>;
    fn build(draft: &Self::Draft) -> Result<Self::Payload>;
    /// Clear the draft after a successful submit.
    fn reset(draft: &mut Self::Draft);
}

/// Place a new trade.
#[derive(Debug, Clone, Copy)]
pub struct PlaceTrade;

impl Submission for PlaceTrade {
    type Draft = TradeDraft;
    type Payload = TradePayload;
    type Response = TradeOrderResponse;

    const ENDPOINT: Endpoint = Endpoint::TradeOrder;
    const NAME: &'static str = "trade";

    fn validate(draft: &TradeDraft) -> Vec<String> {
        submission::validate_trade(draft)
    }

    fn build(draft: &TradeDraft) -> Result<TradePayload> {
        submission::build_trade(draft)
    }

    fn reset(draft: &mut TradeDraft) {
        draft.reset();
    }
}

/// Move the stop loss and/or take profit of a session.
#[derive(Debug, Clone, Copy)]
pub struct ModifyPositions;

impl Submission for ModifyPositions {
    type Draft = ModifyDraft;
    type Payload = ModifyRequest;
    type Response = ModifyResponse;

    const ENDPOINT: Endpoint = Endpoint::ModifyPositions;
    const NAME: &'static str = "modify";

    fn validate(draft: &ModifyDraft) -> Vec<String> {
        submission::validate_modify(draft)
    }

    fn build(draft: &ModifyDraft) -> Result<ModifyRequest> {
        submission::build_modify(draft)
    }

    fn reset(draft: &mut ModifyDraft) {
        *draft = ModifyDraft::default();
    }
}

/// Close every position of a session.
#[derive(Debug, Clone, Copy)]
pub struct ClosePositions;

impl Submission for ClosePositions {
    type Draft = CloseDraft;
    type Payload = CloseRequest;
    type Response = CloseResponse;

    const ENDPOINT: Endpoint = Endpoint::ClosePositions;
    const NAME: &'static str = "close";

    fn validate(draft: &CloseDraft) -> Vec<String> {
        submission::validate_close(draft)
    }

    fn build(draft: &CloseDraft) -> Result<CloseRequest> {
        submission::build_close(draft)
    }

    fn reset(draft: &mut CloseDraft) {
        *draft = CloseDraft::default();
    }
}

pub type TradeForm = Form<PlaceTrade>;
pub type ModifyForm = Form<ModifyPositions>;
pub type CloseForm = Form<ClosePositions>;

pub struct Form<S: Submission> {
    draft: Mutex<S::Draft>,
    outcome: Mutex<Option<SubmissionOutcome<S::Response>>>,
    submitting: AtomicBool,
}

impl<S: Submission> Default for Form<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Submission> Form<S> {
    pub fn new() -> Self {
        Self::with_draft(S::Draft::default())
    }

    pub fn with_draft(draft: S::Draft) -> Self {
        Self {
            draft: Mutex::new(draft),
            outcome: Mutex::new(None),
            submitting: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> S::Draft {
        lock(&self.draft).clone()
    }

    /// Mutate the draft in place.
    pub fn edit<R>(&self, f: impl FnOnce(&mut S::Draft) -> R) -> R {
        f(&mut lock(&self.draft))
    }

    /// Outcome of the last submit, if any.
    pub fn outcome(&self) -> Option<SubmissionOutcome<S::Response>> {
        lock(&self.outcome).clone()
    }

    pub fn clear_outcome(&self) {
        *lock(&self.outcome) = None;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Validate and submit the current draft.
    ///
    /// Returns [`Error::SubmissionInFlight`] without touching the outcome if
    /// another submit on this form has not finished. Rejections and transport
    /// failures are reported as outcomes; an error that stopped the request
    /// from being sent at all (bad URL or configuration) is returned as `Err`.
    pub async fn submit<A>(&self, api: &A) -> Result<SubmissionOutcome<S::Response>>
    where
        A: TradingApi + ?Sized,
    {
        let _guard = InFlight::acquire(&self.submitting).ok_or_else(|| {
            debug!(form = S::NAME, "Submit ignored, previous submit still pending");
            Error::SubmissionInFlight
        })?;

        self.clear_outcome();
        let draft = self.draft();

        let violations = S::validate(&draft);
        let outcome = if violations.is_empty() {
            self.send(api, &draft).await?
        } else {
            info!(
                form = S::NAME,
                violations = violations.len(),
                "Submission rejected by validation"
            );
            SubmissionOutcome::validation(violations)
        };

        if outcome.is_success() {
            self.edit(S::reset);
        }
        *lock(&self.outcome) = Some(outcome.clone());

        Ok(outcome)
    }

    async fn send<A>(&self, api: &A, draft: &S::Draft) -> Result<SubmissionOutcome<S::Response>>
    where
        A: TradingApi + ?Sized,
    {
        let body = match S::build(draft).and_then(|payload| Ok(serde_json::to_value(payload)?)) {
            Ok(body) => body,
            Err(e) => {
                warn!(form = S::NAME, error = %e, "Could not build payload");
                return Ok(SubmissionOutcome::validation(vec![e.to_string()]));
            }
        };

        debug!(form = S::NAME, endpoint = %S::ENDPOINT, "Sending submission");
        let outcome = interpret_reply(api.post_json(S::ENDPOINT, body).await)?
            .map(decode_success::<S::Response>);

        match &outcome {
            SubmissionOutcome::Success { .. } => {
                info!(form = S::NAME, "Submission accepted")
            }
            SubmissionOutcome::ApiError { message } => {
                warn!(form = S::NAME, message = %message, "Submission rejected by backend")
            }
            SubmissionOutcome::NetworkError { message } => {
                warn!(form = S::NAME, message = %message, "Submission failed in transport")
            }
            SubmissionOutcome::ValidationError { .. } => {}
        }

        Ok(outcome)
    }
}

/// Decode a 2xx body into the response model.
///
/// The backend has already acted when it answers 2xx, so the submit is a
/// success whatever the body holds; fields it leaves out take defaults.
fn decode_success<R: DeserializeOwned + Default>(body: Value) -> R {
    serde_json::from_value(body).unwrap_or_else(|e| {
        warn!(error = %e, "Success reply did not match the response model");
        R::default()
    })
}

/// Holds the submitting flag; clears it on drop, including when the submit
/// future is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpReply, MockTradingApi};
    use crate::submission::validate::{LEVEL_REQUIRED, PAIR_REQUIRED, SESSION_REQUIRED};
    use crate::types::{OrderType, TradeAction};
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use std::task::Poll;
    use tokio::sync::Notify;

    fn valid_draft() -> TradeDraft {
        TradeDraft::new()
            .with_pair("EURUSD")
            .with_action(TradeAction::Buy)
            .with_risk_percent("1.5")
            .with_order_type(OrderType::Limit)
            .with_entry_price("1.2000")
            .with_stop_loss("1.1990")
    }

    fn trade_reply() -> HttpReply {
        HttpReply {
            status: 200,
            body: json!({
                "success": true,
                "session_id": "trade_1700000000000",
                "successful_trades": 2,
                "total_accounts": 2,
                "failed_trades": 0,
                "trade_details": {"symbol": "EURUSDm", "action": "buy", "order_type": "limit"},
                "results": [
                    {"account": 273162078, "result": {"success": true, "order_id": 1, "entry_type": "order"}}
                ]
            }),
        }
    }

    /// Blocks inside `post_json` until released.
    struct GatedApi {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
        reply: HttpReply,
    }

    impl GatedApi {
        fn new(reply: HttpReply) -> Self {
            Self {
                entered: Notify::new(),
                release: Notify::new(),
                calls: AtomicUsize::new(0),
                reply,
            }
        }
    }

    #[async_trait]
    impl TradingApi for GatedApi {
        async fn post_json(&self, _endpoint: Endpoint, _body: Value) -> Result<HttpReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_invalid_draft_never_hits_the_network() {
        let mut api = MockTradingApi::new();
        api.expect_post_json().times(0);

        let form = TradeForm::with_draft(valid_draft().with_pair(""));
        let outcome = form.submit(&api).await.unwrap();

        match &outcome {
            SubmissionOutcome::ValidationError { messages } => {
                assert_eq!(messages, &vec![PAIR_REQUIRED.to_string()])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(form.outcome(), Some(outcome));
        // Draft untouched so the user can fix it
        assert_eq!(form.draft().stop_loss, "1.1990");
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_successful_trade_resets_draft() {
        let mut api = MockTradingApi::new();
        api.expect_post_json()
            .withf(|endpoint, body| {
                *endpoint == Endpoint::TradeOrder
                    && body["pair"] == "EURUSD"
                    && body["entry_price"] == 1.2
                    && body.get("target_level").is_none()
            })
            .times(1)
            .returning(|_, _| Ok(trade_reply()));

        let form = TradeForm::with_draft(valid_draft());
        let outcome = form.submit(&api).await.unwrap();

        let data = outcome.data().expect("success");
        assert_eq!(data.session_id, "trade_1700000000000");
        assert_eq!(data.successful_trades, 2);

        let draft = form.draft();
        assert!(draft.pair.is_empty());
        assert!(draft.entry_price.is_empty());
        assert_eq!(draft.order_type(), OrderType::Limit);
    }

    #[tokio::test]
    async fn test_api_error_keeps_draft() {
        let mut api = MockTradingApi::new();
        api.expect_post_json().times(1).returning(|_, _| {
            Ok(HttpReply {
                status: 400,
                body: json!({"detail": "All trades failed"}),
            })
        });

        let form = TradeForm::with_draft(valid_draft());
        let outcome = form.submit(&api).await.unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::ApiError {
                message: "All trades failed".to_string()
            }
        );
        assert_eq!(form.draft(), valid_draft());
    }

    #[tokio::test]
    async fn test_transport_failure_clears_guard() {
        let mut api = MockTradingApi::new();
        api.expect_post_json().times(1).returning(|_, _| {
            Err(Error::Json(serde_json::from_str::<Value>("").unwrap_err()))
        });

        let form = TradeForm::with_draft(valid_draft());
        let outcome = form.submit(&api).await.unwrap();

        assert!(matches!(outcome, SubmissionOutcome::NetworkError { .. }));
        assert!(outcome.error_message().unwrap().starts_with("Network error: "));
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_partial_success_body_is_still_success() {
        let mut api = MockTradingApi::new();
        api.expect_post_json().times(1).returning(|_, _| {
            Ok(HttpReply {
                status: 200,
                body: json!({
                    "success": true,
                    "session_id": "trade_1",
                    "successful_trades": 2,
                    "total_accounts": 2,
                    "failed_trades": 0
                }),
            })
        });

        let form = TradeForm::with_draft(valid_draft());
        let outcome = form.submit(&api).await.unwrap();

        let data = outcome.data().expect("2xx is a success");
        assert_eq!(data.session_id, "trade_1");
        assert_eq!(data.successful_trades, 2);
        // Every 2xx resets the draft
        assert!(form.draft().pair.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_success_body_uses_defaults() {
        let mut api = MockTradingApi::new();
        api.expect_post_json().times(1).returning(|_, _| {
            Ok(HttpReply {
                status: 200,
                body: json!("closed"),
            })
        });

        let form = CloseForm::with_draft(CloseDraft::for_session("trade_1"));
        let outcome = form.submit(&api).await.unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::Success {
                data: CloseResponse::default()
            }
        );
        assert!(form.draft().session_id.is_empty());
    }

    #[tokio::test]
    async fn test_unsendable_request_is_an_error() {
        let mut api = MockTradingApi::new();
        api.expect_post_json().times(1).returning(|_, _| {
            Err(Error::Config {
                message: "base URL cannot carry a path".to_string(),
            })
        });

        let form = CloseForm::with_draft(CloseDraft::for_session("trade_1"));
        let result = form.submit(&api).await;

        assert!(matches!(result, Err(Error::Config { .. })));
        assert_eq!(form.outcome(), None);
        assert_eq!(form.draft().session_id, "trade_1");
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_outcome_is_replaced_not_accumulated() {
        let mut api = MockTradingApi::new();
        api.expect_post_json()
            .with(eq(Endpoint::ClosePositions), eq(json!({"session_id": "trade_1"})))
            .times(1)
            .returning(|_, _| {
                Ok(HttpReply {
                    status: 200,
                    body: json!({"successful_closures": 2, "failed_closures": 0, "total_profit": 5.0}),
                })
            });

        let form = CloseForm::new();
        let first = form.submit(&api).await.unwrap();
        assert_eq!(first.error_message().unwrap(), SESSION_REQUIRED);

        form.edit(|draft| draft.session_id = "trade_1".to_string());
        let second = form.submit(&api).await.unwrap();

        assert!(second.is_success());
        assert_eq!(form.outcome(), Some(second));
        assert!(form.draft().session_id.is_empty());
    }

    #[tokio::test]
    async fn test_modify_requires_a_level() {
        let mut api = MockTradingApi::new();
        api.expect_post_json()
            .with(
                eq(Endpoint::ModifyPositions),
                eq(json!({"session_id": "trade_1", "new_sl": 1.205})),
            )
            .times(1)
            .returning(|_, _| {
                Ok(HttpReply {
                    status: 200,
                    body: json!({"successful_modifications": 1, "failed_modifications": 0, "modification_details": {"new_sl": 1.205}}),
                })
            });

        let form = ModifyForm::with_draft(ModifyDraft::for_session("trade_1"));
        let outcome = form.submit(&api).await.unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::ValidationError {
                messages: vec![LEVEL_REQUIRED.to_string()]
            }
        );

        form.edit(|draft| draft.new_sl = "1.2050".to_string());
        let outcome = form.submit(&api).await.unwrap();
        assert_eq!(outcome.data().unwrap().applied_sl(), Some(1.205));
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let api = GatedApi::new(trade_reply());
        let form = TradeForm::with_draft(valid_draft());

        let first = form.submit(&api);
        let second = async {
            api.entered.notified().await;
            assert!(form.is_submitting());
            let rejected = form.submit(&api).await;
            api.release.notify_one();
            rejected
        };

        let (first, second) = tokio::join!(first, second);

        assert!(matches!(second, Err(Error::SubmissionInFlight)));
        assert!(first.unwrap().is_success());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_cancelled_submit_clears_guard() {
        let api = GatedApi::new(trade_reply());
        let form = TradeForm::with_draft(valid_draft());

        {
            let mut pending = tokio_test::task::spawn(form.submit(&api));
            assert!(matches!(pending.poll(), Poll::Pending));
            assert!(form.is_submitting());
        }

        assert!(!form.is_submitting());
        assert_eq!(form.outcome(), None);
    }
}
