//! Direct messages: conversation sidebar, per-thread history, and the
//! polling loop that keeps an open thread fresh.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::constants::PREVIEW_MAX_CHARS;
use crate::error::ApiError;
use crate::models::{ChatMessage, Conversation};

pub struct MessagesStore {
    client: Arc<ApiClient>,
    conversations: Mutex<Vec<Conversation>>,
    threads: Mutex<HashMap<String, Vec<ChatMessage>>>,
    search: Mutex<String>,
}

impl MessagesStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            conversations: Mutex::new(Vec::new()),
            threads: Mutex::new(HashMap::new()),
            search: Mutex::new(String::new()),
        }
    }

    pub fn set_search(&self, query: impl Into<String>) {
        *self.search.lock() = query.into();
    }

    /// Sidebar entries matching the current search, in server order.
    pub fn conversations(&self) -> Vec<Conversation> {
        let query = self.search.lock().clone();
        self.conversations
            .lock()
            .iter()
            .filter(|conv| conv.matches(&query))
            .cloned()
            .collect()
    }

    pub fn messages(&self, conversation_id: &str) -> Vec<ChatMessage> {
        self.threads
            .lock()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn refresh_conversations(&self) -> Result<usize, ApiError> {
        let conversations = self.client.conversations().await?;
        let count = conversations.len();
        *self.conversations.lock() = conversations;
        Ok(count)
    }

    /// Start (or resume) a thread with the given user and return it.
    pub async fn open(&self, participant_id: &str) -> Result<Conversation, ApiError> {
        let conversation = self.client.open_conversation(participant_id).await?;
        let mut conversations = self.conversations.lock();
        if !conversations.iter().any(|c| c.id == conversation.id) {
            conversations.insert(0, conversation.clone());
        }
        Ok(conversation)
    }

    /// Fetch the thread and merge by message id, keeping local copies the
    /// server does not know about yet. Returns the newly arrived messages.
    pub async fn refresh_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let fetched = self.client.messages(conversation_id).await?;

        let mut threads = self.threads.lock();
        let thread = threads.entry(conversation_id.to_string()).or_default();
        let known: HashSet<String> = thread.iter().map(|msg| msg.id.clone()).collect();
        let fresh: Vec<ChatMessage> = fetched
            .into_iter()
            .filter(|msg| !known.contains(&msg.id))
            .collect();
        thread.extend(fresh.iter().cloned());
        Ok(fresh)
    }

    /// Send a message. It appears in the thread immediately under a local
    /// id; on success the server's copy replaces it, on failure it is
    /// removed again and the error surfaced.
    pub async fn send(&self, conversation_id: &str, text: &str) -> Result<ChatMessage, ApiError> {
        if !self.client.is_authenticated() {
            return Err(ApiError::AuthRequired);
        }

        let local_id = Uuid::new_v4().to_string();
        let optimistic = ChatMessage {
            id: local_id.clone(),
            sender: Some("You".to_string()),
            is_self: true,
            body: text.to_string(),
            avatar: None,
            time: Some(chrono::Local::now().format("%H:%M").to_string()),
        };
        {
            let mut threads = self.threads.lock();
            threads
                .entry(conversation_id.to_string())
                .or_default()
                .push(optimistic);
        }
        self.update_preview(conversation_id, text);

        match self.client.send_message(conversation_id, text).await {
            Ok(sent) => {
                let mut threads = self.threads.lock();
                if let Some(thread) = threads.get_mut(conversation_id) {
                    if let Some(msg) = thread.iter_mut().find(|msg| msg.id == local_id) {
                        *msg = sent.clone();
                    }
                }
                Ok(sent)
            }
            Err(err) => {
                warn!(error = %err, conversation_id, "send failed, removing local copy");
                let mut threads = self.threads.lock();
                if let Some(thread) = threads.get_mut(conversation_id) {
                    thread.retain(|msg| msg.id != local_id);
                }
                Err(err)
            }
        }
    }

    fn update_preview(&self, conversation_id: &str, text: &str) {
        let mut conversations = self.conversations.lock();
        if let Some(conv) = conversations.iter_mut().find(|c| c.id == conversation_id) {
            conv.last_message = Some(preview(text));
        }
    }
}

fn preview(text: &str) -> String {
    let mut out = String::from("You: ");
    if text.chars().count() > PREVIEW_MAX_CHARS {
        out.extend(text.chars().take(PREVIEW_MAX_CHARS));
        out.push_str("...");
    } else {
        out.push_str(text);
    }
    out
}

/// Background task that refetches an open thread on a fixed cadence and
/// forwards newly arrived messages. Aborts when dropped.
pub struct ChatPoller {
    handle: JoinHandle<()>,
}

impl ChatPoller {
    pub fn spawn(
        store: Arc<MessagesStore>,
        conversation_id: impl Into<String>,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<ChatMessage>) {
        let conversation_id = conversation_id.into();
        let (tx, rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match store.refresh_messages(&conversation_id).await {
                    Ok(fresh) => {
                        for msg in fresh {
                            if tx.send(msg).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, conversation_id, "message poll failed");
                    }
                }
            }
        });
        (Self { handle }, rx)
    }
}

impl Drop for ChatPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
