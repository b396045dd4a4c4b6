//! Session Controller use case
//!
//! Orchestrates turn taking for one chat session: validates input, appends
//! the user's message, asks the completion gateway for a reply, and appends
//! that reply (or an error reply). A single latch guarantees at most one
//! completion request in flight.
//!
//! # Turn lifecycle
//!
//! ```text
//! idle ──submit(text)──▶ awaiting-reply ──reply/failure──▶ idle
//!   │                         │
//!   │ empty text: InvalidInput│ submit: Busy
//!   ▼                         ▼
//! (no side effect)       (no side effect)
//! ```
//!
//! The user's message is appended before the gateway is called and is
//! never rolled back. Gateway failures become a visible assistant message.

use crate::persistence::SessionStore;
use crate::ports::completion_gateway::{CompletionGateway, GatewayError};
use crate::ports::render_sink::RenderSink;
use chatline_domain::{
    DomainError, Message, MessageLog, Model, Prompt, RequestState, Role, SessionPreferences,
    Theme, TransportMessage,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Assistant notice appended when connectivity is lost
pub const OFFLINE_NOTICE: &str = "You appear to be offline. Please check your connection.";

/// Errors returned when the controller refuses an operation.
///
/// Both variants are raised before any side effect; the UI may ignore them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    InvalidInput(#[from] DomainError),

    #[error("A reply is still pending")]
    Busy,
}

/// Result of one completed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The user's message as appended
    pub prompt: Message,
    /// The assistant reply, or the synthesized error reply
    pub reply: Message,
    /// The gateway failure behind an error reply
    pub error: Option<GatewayError>,
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

struct SessionState {
    log: MessageLog,
    request: RequestState,
    preferences: SessionPreferences,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the latch, and tells the sink, if a turn is dropped while
/// awaiting its reply.
struct PendingTurn<'a> {
    state: &'a Mutex<SessionState>,
    sink: &'a dyn RenderSink,
    armed: bool,
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("Pending turn dropped before its reply arrived");
            lock(self.state).request = RequestState::Idle;
            self.sink.on_request_state(RequestState::Idle);
        }
    }
}

/// Controller for a single chat session
pub struct SessionController<G: CompletionGateway + 'static> {
    gateway: Arc<G>,
    store: SessionStore,
    sink: Arc<dyn RenderSink>,
    state: Mutex<SessionState>,
}

impl<G: CompletionGateway + 'static> SessionController<G> {
    /// Open a session, restoring preferences and history from `store`.
    ///
    /// Restored history is handed to the sink once via
    /// [`RenderSink::on_history`].
    pub fn open(gateway: Arc<G>, store: SessionStore, sink: Arc<dyn RenderSink>) -> Self {
        let preferences = store.load_preferences();
        let log = MessageLog::from_messages(store.load_log());

        if !log.is_empty() {
            sink.on_history(log.messages());
        }
        info!(
            "Session opened with {} messages, model {}",
            log.len(),
            preferences.model
        );

        Self {
            gateway,
            store,
            sink,
            state: Mutex::new(SessionState {
                log,
                request: RequestState::Idle,
                preferences,
            }),
        }
    }

    /// Submit user text and wait for the assistant's turn.
    ///
    /// Returns [`SessionError::InvalidInput`] for empty or whitespace-only
    /// text and [`SessionError::Busy`] while another turn is pending;
    /// neither appends anything nor calls the gateway. Otherwise the turn
    /// always completes with two appended messages, even when the gateway
    /// fails.
    pub async fn submit(&self, text: &str) -> Result<TurnOutcome, SessionError> {
        let prompt = Prompt::parse(text)?;
        if prompt.exceeds_advisory_limit() {
            debug!("Prompt has {} characters", prompt.char_count());
        }

        let (user_message, transport, model) = {
            let mut state = lock(&self.state);
            if !state.request.is_idle() {
                debug!("Rejecting submission while a reply is pending");
                return Err(SessionError::Busy);
            }
            state.request = RequestState::AwaitingReply;

            let message = state.log.append(Role::User, prompt.into_content()).clone();
            self.commit(&state.log, &message);

            let transport: Vec<TransportMessage> = state.log.to_transport_form().collect();
            (message, transport, state.preferences.model.clone())
        };
        let mut pending = PendingTurn {
            state: &self.state,
            sink: self.sink.as_ref(),
            armed: true,
        };
        self.sink.on_request_state(RequestState::AwaitingReply);

        info!(
            "Requesting completion from {} with {} messages",
            model,
            transport.len()
        );
        let (content, error) = match self.gateway.complete(&transport, &model).await {
            Ok(content) => (content, None),
            Err(e) => {
                warn!("Completion failed ({}): {}", e.kind, e.detail);
                (error_reply(&e), Some(e))
            }
        };

        let reply = {
            let mut state = lock(&self.state);
            let reply = state.log.append(Role::Assistant, content).clone();
            self.commit(&state.log, &reply);
            state.request = RequestState::Idle;
            reply
        };
        pending.armed = false;
        self.sink.on_request_state(RequestState::Idle);

        Ok(TurnOutcome {
            prompt: user_message,
            reply,
            error,
        })
    }

    /// Clear the log and its persisted copy. Preferences are kept.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut state = lock(&self.state);
        if !state.request.is_idle() {
            return Err(SessionError::Busy);
        }
        state.log.clear();
        self.store.clear_log();
        self.sink.on_clear();
        info!("Session reset");
        Ok(())
    }

    /// Append the offline notice as an assistant message.
    pub fn announce_offline(&self) -> Message {
        let mut state = lock(&self.state);
        let notice = state.log.append(Role::Assistant, OFFLINE_NOTICE).clone();
        self.commit(&state.log, &notice);
        notice
    }

    /// Select the model used for subsequent turns.
    pub fn select_model(&self, model: Model) {
        self.store.save_model(&model);
        info!("Selected model {}", model);
        lock(&self.state).preferences.model = model;
    }

    pub fn set_theme(&self, theme: Theme) {
        self.store.save_theme(theme);
        lock(&self.state).preferences.theme = theme;
    }

    /// Pretty JSON of the whole log, for export.
    pub fn export(&self) -> Result<String, serde_json::Error> {
        lock(&self.state).log.export_json()
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).log.messages().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).log.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).log.is_empty()
    }

    pub fn request_state(&self) -> RequestState {
        lock(&self.state).request
    }

    pub fn preferences(&self) -> SessionPreferences {
        lock(&self.state).preferences.clone()
    }

    /// Persist the whole log and render the new entry.
    fn commit(&self, log: &MessageLog, appended: &Message) {
        self.store.save_log(log.messages());
        self.sink.on_append(appended);
    }
}

/// Text of the assistant message that stands in for a failed reply
pub fn error_reply(error: &GatewayError) -> String {
    format!("Sorry, I encountered an error: {}", error.detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::GatewayErrorKind;
    use crate::ports::key_value_store::{KeyValueStore, MemoryKeyValueStore, StoreError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    // === Mock implementations ===

    struct MockGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        calls: Mutex<Vec<(Vec<TransportMessage>, Model)>>,
    }

    impl MockGateway {
        fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from(replies)),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> (Vec<TransportMessage>, Model) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CompletionGateway for MockGateway {
        async fn complete(
            &self,
            messages: &[TransportMessage],
            model: &Model,
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.to_vec(), model.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("mock response".to_string()))
        }
    }

    /// Gateway that blocks until released, to hold a turn in flight.
    struct GatedGateway {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    impl GatedGateway {
        fn new() -> Self {
            Self {
                entered: Notify::new(),
                release: Notify::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionGateway for GatedGateway {
        async fn complete(
            &self,
            _messages: &[TransportMessage],
            _model: &Model,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok("released".to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SinkEvent {
        Append(Role, String),
        History(usize),
        Clear,
        State(RequestState),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<SinkEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<SinkEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl RenderSink for RecordingSink {
        fn on_append(&self, message: &Message) {
            self.events.lock().unwrap().push(SinkEvent::Append(
                message.role(),
                message.content().to_string(),
            ));
        }

        fn on_history(&self, messages: &[Message]) {
            self.events
                .lock()
                .unwrap()
                .push(SinkEvent::History(messages.len()));
        }

        fn on_clear(&self) {
            self.events.lock().unwrap().push(SinkEvent::Clear);
        }

        fn on_request_state(&self, state: RequestState) {
            self.events.lock().unwrap().push(SinkEvent::State(state));
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("no storage".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("no storage".to_string()))
        }
    }

    // === Helpers ===

    struct Fixture<G: CompletionGateway + 'static> {
        controller: SessionController<G>,
        gateway: Arc<G>,
        raw: Arc<MemoryKeyValueStore>,
        sink: Arc<RecordingSink>,
    }

    fn fixture<G: CompletionGateway + 'static>(gateway: G) -> Fixture<G> {
        fixture_with_store(gateway, Arc::new(MemoryKeyValueStore::new()))
    }

    fn fixture_with_store<G: CompletionGateway + 'static>(
        gateway: G,
        raw: Arc<MemoryKeyValueStore>,
    ) -> Fixture<G> {
        let gateway = Arc::new(gateway);
        let sink = Arc::new(RecordingSink::default());
        let controller =
            SessionController::open(gateway.clone(), SessionStore::new(raw.clone()), sink.clone());
        Fixture {
            controller,
            gateway,
            raw,
            sink,
        }
    }

    fn contents(messages: &[Message]) -> Vec<(Role, &str)> {
        messages.iter().map(|m| (m.role(), m.content())).collect()
    }

    // === Scenarios ===

    #[tokio::test]
    async fn test_successful_turn() {
        let f = fixture(MockGateway::new(vec![Ok("Hi there".to_string())]));

        let outcome = f.controller.submit("Hello").await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.reply.content(), "Hi there");
        let messages = f.controller.messages();
        assert_eq!(
            contents(&messages),
            vec![(Role::User, "Hello"), (Role::Assistant, "Hi there")]
        );
        assert_eq!(f.controller.request_state(), RequestState::Idle);

        let (sent, model) = f.gateway.last_call();
        assert_eq!(model.as_str(), "mixtral-8x7b-32768");
        assert_eq!(sent, vec![TransportMessage::new(Role::User, "Hello")]);
    }

    #[tokio::test]
    async fn test_network_failure_becomes_assistant_message() {
        let f = fixture(MockGateway::new(vec![Err(GatewayError::network(
            "connection refused",
        ))]));

        let outcome = f.controller.submit("Hello").await.unwrap();

        assert_eq!(
            outcome.error.as_ref().map(|e| e.kind),
            Some(GatewayErrorKind::NetworkFailure)
        );
        let messages = f.controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content(), "Hello");
        assert_eq!(messages[1].role(), Role::Assistant);
        assert!(messages[1].content().contains("connection refused"));
        assert_eq!(
            messages[1].content(),
            "Sorry, I encountered an error: connection refused"
        );
        assert_eq!(f.controller.request_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_side_effects() {
        let f = fixture(MockGateway::new(vec![]));

        for text in ["", "   ", "\n\t"] {
            let result = f.controller.submit(text).await;
            assert!(matches!(result, Err(SessionError::InvalidInput(_))));
        }

        assert!(f.controller.is_empty());
        assert_eq!(f.gateway.call_count(), 0);
        assert!(f.sink.events().is_empty());
        assert!(f.raw.get("chatHistory").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_successful_turns_alternate_roles() {
        let f = fixture(MockGateway::new(vec![]));

        for i in 0..5 {
            f.controller.submit(&format!("question {}", i)).await.unwrap();
        }

        let messages = f.controller.messages();
        assert_eq!(messages.len(), 10);
        for (i, message) in messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role(), expected);
        }
        assert!(
            messages
                .windows(2)
                .all(|w| w[0].timestamp() <= w[1].timestamp())
        );
    }

    #[tokio::test]
    async fn test_gateway_receives_full_history() {
        let f = fixture(MockGateway::new(vec![
            Ok("first reply".to_string()),
            Err(GatewayError::upstream("Failed to get response")),
        ]));

        f.controller.submit("one").await.unwrap();
        f.controller.submit("two").await.unwrap();
        f.controller.submit("three").await.unwrap();

        let (sent, _) = f.gateway.last_call();
        let roles: Vec<_> = sent.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User
            ]
        );
        assert_eq!(sent[3].content, "Sorry, I encountered an error: Failed to get response");
        assert_eq!(sent[4].content, "three");
    }

    #[tokio::test]
    async fn test_submission_while_awaiting_reply_is_rejected() {
        let f = fixture(GatedGateway::new());
        let controller = Arc::new(f.controller);

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("A").await }
        });
        f.gateway.entered.notified().await;

        assert_eq!(controller.request_state(), RequestState::AwaitingReply);
        let second = controller.submit("B").await;
        assert!(matches!(second, Err(SessionError::Busy)));
        assert_eq!(contents(&controller.messages()), vec![(Role::User, "A")]);
        assert!(matches!(controller.reset(), Err(SessionError::Busy)));

        f.gateway.release.notify_one();
        let outcome = first.await.unwrap().unwrap();

        assert_eq!(outcome.prompt.content(), "A");
        assert_eq!(f.gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            contents(&controller.messages()),
            vec![(Role::User, "A"), (Role::Assistant, "released")]
        );
        assert_eq!(controller.request_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_abandoned_turn_releases_latch() {
        let f = fixture(GatedGateway::new());
        let controller = Arc::new(f.controller);

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("A").await }
        });
        f.gateway.entered.notified().await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        assert_eq!(controller.request_state(), RequestState::Idle);
        // The optimistic user entry stays.
        assert_eq!(controller.len(), 1);
        assert_eq!(
            f.sink.events(),
            vec![
                SinkEvent::Append(Role::User, "A".to_string()),
                SinkEvent::State(RequestState::AwaitingReply),
                SinkEvent::State(RequestState::Idle),
            ]
        );
    }

    #[tokio::test]
    async fn test_sink_sees_each_append_once_in_order() {
        let f = fixture(MockGateway::new(vec![Ok("Hi there".to_string())]));

        f.controller.submit("Hello").await.unwrap();

        assert_eq!(
            f.sink.events(),
            vec![
                SinkEvent::Append(Role::User, "Hello".to_string()),
                SinkEvent::State(RequestState::AwaitingReply),
                SinkEvent::Append(Role::Assistant, "Hi there".to_string()),
                SinkEvent::State(RequestState::Idle),
            ]
        );
    }

    #[tokio::test]
    async fn test_every_append_is_persisted() {
        let f = fixture(MockGateway::new(vec![Ok("Hi there".to_string())]));

        f.controller.submit("Hello").await.unwrap();

        let reopened = SessionStore::new(f.raw.clone()).load_log();
        assert_eq!(reopened, f.controller.messages());
    }

    #[tokio::test]
    async fn test_reset_clears_log_and_storage_but_keeps_preferences() {
        let f = fixture(MockGateway::new(vec![]));
        f.controller.select_model(Model::Gemma7b);
        f.controller.set_theme(Theme::Light);
        f.controller.submit("Hello").await.unwrap();

        f.controller.reset().unwrap();

        assert!(f.controller.is_empty());
        let store = SessionStore::new(f.raw.clone());
        assert!(store.load_log().is_empty());
        assert_eq!(
            store.load_preferences(),
            SessionPreferences::new(Model::Gemma7b, Theme::Light)
        );
        assert_eq!(f.sink.events().last(), Some(&SinkEvent::Clear));
    }

    #[tokio::test]
    async fn test_partly_unreadable_history_survives_next_turn() {
        let raw = Arc::new(MemoryKeyValueStore::new());
        let stored = r#"[{"role":"user","content":"Hi","timestamp":"2024-01-01T00:00:00.000Z"},
                {"role":"bot","timestamp":"2024-01-01T00:00:01.000Z"},
                {"role":"user","content":"Still there?","timestamp":"2024-01-01T00:00:02.000Z"},
                {"role":"bot","content":"Yes","timestamp":"2024-01-01T00:00:03.000Z"}]"#;
        raw.set("chatHistory", stored).unwrap();

        let f = fixture_with_store(MockGateway::new(vec![Ok("r".to_string())]), raw);
        assert_eq!(f.controller.len(), 4);

        f.controller.submit("new").await.unwrap();

        let reopened = SessionStore::new(f.raw.clone()).load_log();
        assert_eq!(reopened.len(), 6);
        assert_eq!(reopened[0].content(), "Hi");
        assert_eq!(reopened[3].content(), "Yes");
        assert_eq!(reopened[5].content(), "r");
    }

    #[tokio::test]
    async fn test_open_restores_history_and_preferences() {
        let raw = Arc::new(MemoryKeyValueStore::new());
        raw.set(
            "chatHistory",
            r#"[{"role":"user","content":"Hi","timestamp":"2024-01-01T00:00:00.000Z"},
                {"role":"bot","content":"Hello!","timestamp":"2024-01-01T00:00:01.000Z"}]"#,
        )
        .unwrap();
        raw.set("selectedModel", "llama3-8b-8192").unwrap();
        raw.set("theme", "light").unwrap();

        let f = fixture_with_store(MockGateway::new(vec![]), raw);

        assert_eq!(f.sink.events(), vec![SinkEvent::History(2)]);
        assert_eq!(
            f.controller.preferences(),
            SessionPreferences::new(Model::Llama3_8b, Theme::Light)
        );

        f.controller.submit("again").await.unwrap();
        let (sent, model) = f.gateway.last_call();
        assert_eq!(model, Model::Llama3_8b);
        assert_eq!(sent[1], TransportMessage::new(Role::Assistant, "Hello!"));
        assert_eq!(f.controller.len(), 4);
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_change_behavior() {
        let gateway = Arc::new(MockGateway::new(vec![Ok("Hi there".to_string())]));
        let controller = SessionController::open(
            gateway.clone(),
            SessionStore::new(Arc::new(FailingStore)),
            Arc::new(RecordingSink::default()),
        );

        let outcome = controller.submit("Hello").await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(controller.len(), 2);
        controller.reset().unwrap();
        assert!(controller.is_empty());
    }

    #[tokio::test]
    async fn test_offline_notice_is_appended_and_persisted() {
        let f = fixture(MockGateway::new(vec![]));

        let notice = f.controller.announce_offline();

        assert_eq!(notice.role(), Role::Assistant);
        assert_eq!(notice.content(), OFFLINE_NOTICE);
        assert_eq!(SessionStore::new(f.raw.clone()).load_log().len(), 1);
    }

    #[tokio::test]
    async fn test_export_is_pretty_json_of_log() {
        let f = fixture(MockGateway::new(vec![Ok("Hi there".to_string())]));
        f.controller.submit("Hello").await.unwrap();

        let exported = f.controller.export().unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(value[0]["role"], "user");
        assert_eq!(value[1]["content"], "Hi there");
        assert!(value[1]["timestamp"].is_string());
    }
}
