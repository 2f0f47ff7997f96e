//! Scripted gateway and in-memory stores shared by the application tests.

use crate::ports::conversation_store::{ConversationStore, StoreError};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, ModelReply};
use crate::ports::progress::ProgressNotifier;
use crate::ports::snapshot_store::SnapshotStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use council_domain::{
    AggregateScore, AssistantMessage, ChatMessage, Conversation, ConversationMeta, Feedback,
    FinalAnswer, LabelMap, Message, Model, PerformanceSummary, Stage, Stage1, StrategyKind,
    StrategyMetadata, StrategyResult,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&Model, &str) -> Result<ModelReply, GatewayError> + Send + Sync>;

/// Gateway answering from per-model scripts, then from a responder closure.
///
/// The responder sees the model and the last message's content, which is
/// enough to tell the pipeline stages apart by their prompt wording.
pub(crate) struct ScriptedGateway {
    scripts: Mutex<HashMap<String, VecDeque<Result<ModelReply, GatewayError>>>>,
    delays: HashMap<String, Duration>,
    responder: Option<Responder>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            responder: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue one outcome for a model
    pub(crate) fn push(self, model: &str, outcome: Result<ModelReply, GatewayError>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub(crate) fn with_delay(mut self, model: &str, delay: Duration) -> Self {
        self.delays.insert(model.to_string(), delay);
        self
    }

    pub(crate) fn with_responder(
        mut self,
        responder: impl Fn(&Model, &str) -> Result<ModelReply, GatewayError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    pub(crate) fn call_count(&self, model: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == model)
            .count()
    }

    /// Prompts sent to a model, oldest first
    pub(crate) fn prompts_for(&self, model: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == model)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn complete(
        &self,
        model: &Model,
        messages: &[ChatMessage],
    ) -> Result<ModelReply, GatewayError> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.clone()));

        if let Some(delay) = self.delays.get(model.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model.as_str())
            .and_then(|queue| queue.pop_front());

        match (scripted, &self.responder) {
            (Some(outcome), _) => outcome,
            (None, Some(responder)) => responder(model, &prompt),
            (None, None) => Err(GatewayError::Other(format!("no script for {}", model))),
        }
    }
}

/// Ranking text with a well-formed final section
pub(crate) fn ranking_text(letters: &str) -> String {
    let lines: Vec<String> = letters
        .chars()
        .enumerate()
        .map(|(i, c)| format!("{}. Response {}", i + 1, c))
        .collect();
    format!("Evaluation of each response...\n\nFINAL RANKING:\n{}", lines.join("\n"))
}

/// Responder playing a whole council by recognising each stage's prompt.
///
/// `rankings` maps a critic to the letters it ranks, best first; critics
/// without an entry rank `"A"` only.
pub(crate) fn council_responder(
    rankings: &[(&str, &str)],
) -> impl Fn(&Model, &str) -> Result<ModelReply, GatewayError> + Send + Sync + 'static {
    let rankings: HashMap<String, String> = rankings
        .iter()
        .map(|(m, r)| (m.to_string(), r.to_string()))
        .collect();

    move |model, prompt| {
        let text = if prompt.contains("You are the Chairman") {
            format!("Synthesis by {}", model)
        } else if prompt.contains("FINAL RANKING") {
            ranking_text(rankings.get(model.as_str()).map(String::as_str).unwrap_or("A"))
        } else if prompt.contains("multi-round deliberation") {
            format!("Revised answer from {}", model)
        } else if prompt.starts_with("Generate a very short title") {
            "Rust Ownership Basics".to_string()
        } else {
            format!("Answer from {}", model)
        };
        Ok(ModelReply::new(text))
    }
}

/// Progress notifier recording every event as a short string
#[derive(Default)]
pub(crate) struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with("start:"))
            .collect()
    }
}

impl ProgressNotifier for RecordingProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("start:{}:{}", stage.as_str(), total_tasks));
    }

    fn on_task_complete(&self, stage: &Stage, model: &Model, success: bool) {
        self.events
            .lock()
            .unwrap()
            .push(format!("task:{}:{}:{}", stage.as_str(), model, success));
    }

    fn on_stage_complete(&self, stage: &Stage) {
        self.events.lock().unwrap().push(format!("end:{}", stage.as_str()));
    }
}

// ==================== In-memory stores ====================

/// Conversation store backed by a map, counting full scans
#[derive(Default)]
pub(crate) struct MemoryConversations {
    conversations: Mutex<BTreeMap<String, Conversation>>,
    unreadable: Mutex<usize>,
    scans: Mutex<usize>,
}

impl MemoryConversations {
    pub(crate) fn insert(&self, conversation: Conversation) {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id.clone(), conversation);
    }

    pub(crate) fn snapshot(&self, id: &str) -> Option<Conversation> {
        self.conversations.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn set_unreadable(&self, count: usize) {
        *self.unreadable.lock().unwrap() = count;
    }

    pub(crate) fn scans(&self) -> usize {
        *self.scans.lock().unwrap()
    }

    fn update(
        &self,
        id: &str,
        change: impl FnOnce(&mut Conversation) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.lock().unwrap();
        let conversation = conversations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        change(conversation)
    }
}

#[async_trait]
impl ConversationStore for MemoryConversations {
    async fn create(&self, id: &str) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(id, Utc::now());
        self.insert(conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        Ok(self.snapshot(id))
    }

    async fn list(&self) -> Result<Vec<ConversationMeta>, StoreError> {
        let mut metas: Vec<ConversationMeta> = self
            .conversations
            .lock()
            .unwrap()
            .values()
            .map(Conversation::meta)
            .collect();
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }

    async fn load_all(&self) -> Result<(Vec<Conversation>, usize), StoreError> {
        *self.scans.lock().unwrap() += 1;
        let conversations = self.conversations.lock().unwrap().values().cloned().collect();
        Ok((conversations, *self.unreadable.lock().unwrap()))
    }

    async fn add_user_message(&self, id: &str, content: &str) -> Result<(), StoreError> {
        self.update(id, |c| {
            c.messages.push(Message::user(content));
            Ok(())
        })
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
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError> {
        self.update(id, |c| {
            c.title = title.to_string();
            Ok(())
        })
    }

    async fn update_feedback(
        &self,
        id: &str,
        message_index: usize,
        feedback: Feedback,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.update(id, |c| Ok(c.set_feedback(message_index, feedback, at)?))
    }
}

/// Snapshot store holding at most one summary
#[derive(Default)]
pub(crate) struct MemorySnapshots {
    summary: Mutex<Option<PerformanceSummary>>,
    saves: Mutex<usize>,
    failing: Mutex<bool>,
}

impl MemorySnapshots {
    pub(crate) fn with(summary: PerformanceSummary) -> Self {
        Self {
            summary: Mutex::new(Some(summary)),
            ..Default::default()
        }
    }

    pub(crate) fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    pub(crate) fn clear(&self) {
        *self.summary.lock().unwrap() = None;
    }

    pub(crate) fn fail_saves(&self) {
        *self.failing.lock().unwrap() = true;
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn load(&self) -> Option<PerformanceSummary> {
        self.summary.lock().unwrap().clone()
    }

    async fn save(&self, summary: &PerformanceSummary) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        *self.saves.lock().unwrap() += 1;
        *self.summary.lock().unwrap() = Some(summary.clone());
        Ok(())
    }
}

/// Conversation with one question and one answer ranking `ranked` in order
pub(crate) fn answered_conversation(
    id: &str,
    strategy: StrategyKind,
    ranked: &[&str],
    feedback: Option<Feedback>,
) -> Conversation {
    let aggregate = ranked
        .iter()
        .enumerate()
        .map(|(i, model)| AggregateScore {
            model: Model::from(*model),
            mean_rank: (i + 1) as f64,
            sample_count: ranked.len(),
            total_weight: None,
        })
        .collect();
    let result = StrategyResult {
        stage1: Stage1::Responses(Vec::new()),
        stage2: Vec::new(),
        stage3: FinalAnswer::new(&Model::from("test/chair"), "answer"),
        metadata: StrategyMetadata::new(strategy, LabelMap::default(), aggregate),
    };
    let mut answer = AssistantMessage::from_result(result, Utc::now());
    answer.feedback = feedback;

    let mut conversation = Conversation::new(id, Utc::now());
    conversation.messages = vec![Message::user("question"), Message::assistant(answer)];
    conversation
}
