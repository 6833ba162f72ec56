//! The bounded input handed to a worker for one invocation.

use crate::conversation::message::{AuthorKind, Message};
use crate::core::ids::{GroupId, TurnId, WorkerId};
use crate::turn::entities::InvocationKind;
use serde::{Deserialize, Serialize};

/// One line of the conversation window shown to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub author: String,
    pub author_kind: AuthorKind,
    pub content: String,
}

impl From<&Message> for TranscriptLine {
    fn from(message: &Message) -> Self {
        Self {
            author: message.author_label().to_string(),
            author_kind: message.author_kind,
            content: message.content.clone(),
        }
    }
}

/// Another worker in the group, as described to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub worker_id: WorkerId,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Input for a single worker invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInput {
    pub group_id: GroupId,
    pub turn_id: TurnId,
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub role_prompt: String,
    pub invocation: InvocationKind,
    /// Author of the message that triggered the turn
    pub mentioned_by: Option<String>,
    pub transcript: Vec<TranscriptLine>,
    pub peers: Vec<Peer>,
    pub memory_context: Option<String>,
    pub max_output_tokens: u32,
    pub prefer_concise: bool,
}

impl WorkerInput {
    /// Minimal input with an empty transcript.
    pub fn new(
        group_id: GroupId,
        turn_id: TurnId,
        worker_id: WorkerId,
        invocation: InvocationKind,
    ) -> Self {
        Self {
            group_id,
            turn_id,
            worker_name: worker_id.to_string(),
            worker_id,
            role_prompt: String::new(),
            invocation,
            mentioned_by: None,
            transcript: Vec::new(),
            peers: Vec::new(),
            memory_context: None,
            max_output_tokens: 2000,
            prefer_concise: true,
        }
    }

    pub fn with_transcript(mut self, messages: &[Message]) -> Self {
        self.transcript = messages.iter().map(TranscriptLine::from).collect();
        self
    }

    pub fn is_may_respond(&self) -> bool {
        self.invocation == InvocationKind::MayRespond
    }
}
