//! Shared fakes for orchestrator tests: a recording message store that
//! mirrors persisted state, and a scripted response streamer.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_core::{Config, Message};
use conversation_manager::{ConversationEvent, ConversationManager, EventSender};
use message_store::{MessagePatch, MessageStore, NewMessage, StoreError};
use rag_client::{ResponseStreamer, StreamError, StreamEvent};
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One recorded store call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Create(Uuid),
    Update(Uuid),
    Delete(Uuid),
}

#[derive(Default)]
struct PersistedState {
    order: Vec<Uuid>,
    messages: HashMap<Uuid, Message>,
}

/// In-memory store that records call order and mirrors what a real backend
/// would hold, so tests can reload the persisted log after an operation.
pub struct RecordingStore {
    ops: Mutex<Vec<StoreOp>>,
    state: Mutex<PersistedState>,
    allowed_creates: AtomicUsize,
    pub fail_creates: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self {
            ops: Mutex::default(),
            state: Mutex::default(),
            allowed_creates: AtomicUsize::new(usize::MAX),
            fail_creates: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Let the next `count` creates succeed, then fail the rest.
    pub fn allow_creates(&self, count: usize) {
        self.allowed_creates.store(count, Ordering::SeqCst);
    }

    /// Seed the persisted log as the backend would hold it before the test.
    pub fn seed(&self, log: &[Message]) {
        let mut state = self.state.lock().expect("state lock");
        for message in log {
            state.order.push(message.id);
            state.messages.insert(message.id, message.clone());
        }
    }

    /// What a fresh load from the backend would return.
    pub fn fresh_load(&self) -> Vec<Message> {
        let state = self.state.lock().expect("state lock");
        state
            .order
            .iter()
            .filter_map(|id| state.messages.get(id).cloned())
            .collect()
    }

    pub fn recorded(&self) -> Vec<StoreOp> {
        self.ops.lock().expect("ops lock").clone()
    }
}

#[async_trait]
impl MessageStore for RecordingStore {
    async fn create(&self, message: &NewMessage) -> message_store::Result<()> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Status { status: 500 });
        }
        let remaining = self.allowed_creates.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(StoreError::Status { status: 500 });
        }
        if remaining != usize::MAX {
            self.allowed_creates.store(remaining - 1, Ordering::SeqCst);
        }
        self.ops
            .lock()
            .expect("ops lock")
            .push(StoreOp::Create(message.id));
        let mut state = self.state.lock().expect("state lock");
        state.order.push(message.id);
        state.messages.insert(
            message.id,
            Message {
                id: message.id,
                role: message.role,
                content: message.content.clone(),
                created_at: message.created_at,
                branches: Vec::new(),
                current_branch_index: None,
            },
        );
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &MessagePatch) -> message_store::Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Status { status: 500 });
        }
        self.ops.lock().expect("ops lock").push(StoreOp::Update(id));
        let mut state = self.state.lock().expect("state lock");
        if let Some(message) = state.messages.get_mut(&id) {
            if let Some(content) = &patch.content {
                message.content = content.clone();
            }
            if let Some(branches) = &patch.branches {
                message.branches = branches.clone();
            }
            if let Some(index) = patch.current_branch_index {
                message.current_branch_index = Some(index);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> message_store::Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Status { status: 500 });
        }
        self.ops.lock().expect("ops lock").push(StoreOp::Delete(id));
        let mut state = self.state.lock().expect("state lock");
        state.order.retain(|candidate| *candidate != id);
        state.messages.remove(&id);
        Ok(())
    }
}

/// One scripted reaction to a `stream_response` call.
pub enum Script {
    /// Send the given partials, then complete with the final response.
    Respond(Vec<String>, String),
    /// Fail immediately with a protocol error.
    Fail,
    /// Park until the token is cancelled, sending nothing.
    WaitForCancel,
    /// Park until notified, then complete.
    Block(Arc<Notify>, String),
}

/// Streamer that replays scripts in order; once the scripts run out, every
/// call completes with a distinct `response #N`.
pub struct ScriptedStreamer {
    scripts: Mutex<VecDeque<Script>>,
    calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedStreamer {
    pub fn new() -> Arc<Self> {
        Self::with_scripts(Vec::new())
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl ResponseStreamer for ScriptedStreamer {
    async fn stream_response(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
        tx: Sender<rag_client::Result<StreamEvent>>,
    ) -> rag_client::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());

        if cancel.is_cancelled() {
            return Err(StreamError::Cancelled);
        }

        let script = self.scripts.lock().expect("scripts lock").pop_front();
        match script {
            None => {
                let response = format!("response #{call}");
                let _ = tx
                    .send(Ok(StreamEvent::Delta {
                        partial: response.clone(),
                    }))
                    .await;
                let _ = tx.send(Ok(StreamEvent::Done { response })).await;
                Ok(())
            }
            Some(Script::Respond(partials, response)) => {
                for partial in partials {
                    let _ = tx.send(Ok(StreamEvent::Delta { partial })).await;
                }
                let _ = tx
                    .send(Ok(StreamEvent::Done {
                        response: response.clone(),
                    }))
                    .await;
                Ok(())
            }
            Some(Script::Fail) => {
                let error = StreamError::Protocol("scripted failure".to_string());
                let _ = tx.send(Err(error.clone())).await;
                Err(error)
            }
            Some(Script::WaitForCancel) => {
                cancel.cancelled().await;
                Err(StreamError::Cancelled)
            }
            Some(Script::Block(notify, response)) => {
                notify.notified().await;
                let _ = tx
                    .send(Ok(StreamEvent::Done {
                        response: response.clone(),
                    }))
                    .await;
                Ok(())
            }
        }
    }
}

pub fn manager_with(
    store: Arc<RecordingStore>,
    streamer: Arc<ScriptedStreamer>,
) -> ConversationManager {
    let config = Config {
        save_min_interval_ms: 0,
        ..Config::default()
    };
    ConversationManager::new(store, streamer, &config)
}

pub fn event_channel() -> (EventSender, UnboundedReceiver<ConversationEvent>) {
    mpsc::unbounded_channel()
}

pub fn drain_events(rx: &mut UnboundedReceiver<ConversationEvent>) -> Vec<ConversationEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
