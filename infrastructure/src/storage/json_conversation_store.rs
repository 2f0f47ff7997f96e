//! JSON file conversation store
//!
//! One pretty-printed `{id}.json` file per conversation in a single
//! directory. Every update is a read-modify-write under a store-wide lock and
//! lands through a temporary file plus rename, so a crash never leaves a
//! half-written conversation behind.

use super::write_atomically;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use council_application::ports::conversation_store::{ConversationStore, StoreError};
use council_domain::{AssistantMessage, Conversation, ConversationMeta, Feedback, Message};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct JsonConversationStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        is_valid_id(id).then(|| self.dir.join(format!("{}.json", id)))
    }

    async fn read(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn write(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self
            .path_for(&conversation.id)
            .ok_or_else(|| invalid_id(&conversation.id))?;
        let json = serde_json::to_vec_pretty(conversation).map_err(|e| StoreError::Corrupt {
            id: conversation.id.clone(),
            reason: e.to_string(),
        })?;
        write_atomically(&path, &json).await?;
        Ok(())
    }

    /// Load, change and save one conversation while holding the write lock
    async fn update(
        &self,
        id: &str,
        change: impl FnOnce(&mut Conversation) -> Result<(), StoreError> + Send,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut conversation = self
            .read(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        change(&mut conversation)?;
        self.write(&conversation).await
    }

    /// Ids of every `*.json` file in the directory
    async fn ids(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && is_valid_id(stem)
            {
                ids.push(stem.to_string());
            }
        }
        Ok(ids)
    }
}

/// Ids become file names, so only a safe character set is accepted
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn invalid_id(id: &str) -> StoreError {
    StoreError::Io(std::io::Error::new(
        ErrorKind::InvalidInput,
        format!("invalid conversation id '{}'", id),
    ))
}

#[async_trait]
impl ConversationStore for JsonConversationStore {
    async fn create(&self, id: &str) -> Result<Conversation, StoreError> {
        if !is_valid_id(id) {
            return Err(invalid_id(id));
        }
        let _guard = self.write_lock.lock().await;
        let conversation = Conversation::new(id, Utc::now());
        self.write(&conversation).await?;
        debug!("Created conversation {}", id);
        Ok(conversation)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        self.read(id).await
    }

    async fn list(&self) -> Result<Vec<ConversationMeta>, StoreError> {
        let (conversations, _) = self.load_all().await?;
        let mut metas: Vec<ConversationMeta> =
            conversations.iter().map(Conversation::meta).collect();
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }

    async fn load_all(&self) -> Result<(Vec<Conversation>, usize), StoreError> {
        let mut conversations = Vec::new();
        let mut unreadable = 0;
        for id in self.ids().await? {
            match self.read(&id).await {
                Ok(Some(conversation)) => conversations.push(conversation),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping conversation {}: {}", id, e);
                    unreadable += 1;
                }
            }
        }
        Ok((conversations, unreadable))
    }

    async fn add_user_message(&self, id: &str, content: &str) -> Result<(), StoreError> {
        self.update(id, |c| {
            c.messages.push(Message::user(content));
            Ok(())
        })
        .await
    }

    async fn add_assistant_message(
        &self,
        id: &str,
        message: AssistantMessage,
    ) -> Result<(), StoreError> {
        self.update(id, |c| {
            c.messages.push(Message::assistant(message));
            Ok(())
        })
        .await
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError> {
        self.update(id, |c| {
            c.title = title.to_string();
            Ok(())
        })
        .await
    }

    async fn update_feedback(
        &self,
        id: &str,
        message_index: usize,
        feedback: Feedback,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.update(id, |c| Ok(c.set_feedback(message_index, feedback, at)?))
            .await
    }
}
