//! Find-then-delete removal of bank content
//!
//! Removing by URL or hash is a two-step protocol: a find query resolves
//! zero or more content ids, then one delete is issued per id, strictly one
//! after another. The batch is not atomic. Deletes that succeeded stay
//! deleted when a later one fails, and resubmitting the same removal may
//! delete again whatever a concurrent writer re-added (at-least-once).
//! Callers needing atomicity must get it from the server.

use crate::core::validation::{
    parse_content_type, validate_hash, validate_signal_type, validate_url, ValidationError,
};
use crate::models::{ContentId, ContentType, FindContentQuery, RemoveContentRequest};
use serde::Serialize;
use thiserror::Error;

/// What the operator asked to remove
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalTarget {
    Url { url: String, content_type: ContentType },
    Hash { signal_type: String, signal_value: String },
    Id(ContentId),
}

impl RemovalTarget {
    pub fn from_request(request: &RemoveContentRequest) -> Result<Self, ValidationError> {
        match request {
            RemoveContentRequest::Url { url, content_type } => Ok(RemovalTarget::Url {
                url: validate_url(url)?,
                content_type: parse_content_type(content_type.as_deref())?,
            }),
            RemoveContentRequest::Hash {
                signal_type,
                signal_value,
            } => Ok(RemovalTarget::Hash {
                signal_type: validate_signal_type(signal_type)?,
                signal_value: validate_hash(signal_value)?,
            }),
            RemoveContentRequest::Id { content_id } => {
                let id = content_id.trim();
                if id.is_empty() {
                    return Err(ValidationError::MissingContentId);
                }
                Ok(RemovalTarget::Id(ContentId::new(id)))
            }
        }
    }

    /// Find query for indirect removal; `None` when ids are known already
    pub fn find_query(&self) -> Option<FindContentQuery> {
        match self {
            RemovalTarget::Url { url, content_type } => Some(FindContentQuery::Url {
                url: url.clone(),
                content_type: *content_type,
            }),
            RemovalTarget::Hash {
                signal_type,
                signal_value,
            } => Some(FindContentQuery::Signal {
                signal_type: signal_type.clone(),
                signal_value: signal_value.clone(),
            }),
            RemovalTarget::Id(_) => None,
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            RemovalTarget::Url { .. } => "No matching content found for the provided URL",
            RemovalTarget::Hash { .. } => "No matching content found for the provided hash",
            RemovalTarget::Id(_) => "No matching content found for the provided ID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemovalError {
    #[error("cannot {action} while {phase}")]
    IllegalTransition {
        action: &'static str,
        phase: &'static str,
    },
}

/// Where a removal batch currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalPhase {
    Idle,
    Finding,
    /// `next` is the index of the delete about to be issued
    Deleting { next: usize, of: usize },
    Done,
    NotFound,
}

impl RemovalPhase {
    fn name(&self) -> &'static str {
        match self {
            RemovalPhase::Idle => "idle",
            RemovalPhase::Finding => "finding",
            RemovalPhase::Deleting { .. } => "deleting",
            RemovalPhase::Done => "done",
            RemovalPhase::NotFound => "not found",
        }
    }
}

/// Per-id delete result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub content_id: ContentId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStatus {
    Removed,
    RemovalFailed,
}

/// Summary shown once every delete of the batch has been attempted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovalSummary {
    pub status: RemovalStatus,
    pub removed: usize,
    pub content_ids: Vec<ContentId>,
    pub results: Vec<DeleteOutcome>,
}

/// State machine for one removal request
///
/// `Idle -> Finding -> NotFound` when nothing matched, otherwise
/// `Finding -> Deleting{0..N} -> Done`. Direct removal by id goes
/// `Idle -> Deleting{0, 1}`.
#[derive(Debug, Clone)]
pub struct RemovalBatch {
    phase: RemovalPhase,
    content_ids: Vec<ContentId>,
    outcomes: Vec<DeleteOutcome>,
}

impl RemovalBatch {
    pub fn new() -> Self {
        Self {
            phase: RemovalPhase::Idle,
            content_ids: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn phase(&self) -> &RemovalPhase {
        &self.phase
    }

    fn illegal(&self, action: &'static str) -> RemovalError {
        RemovalError::IllegalTransition {
            action,
            phase: self.phase.name(),
        }
    }

    pub fn begin_find(&mut self) -> Result<(), RemovalError> {
        if self.phase != RemovalPhase::Idle {
            return Err(self.illegal("start a find"));
        }
        self.phase = RemovalPhase::Finding;
        Ok(())
    }

    /// Record the ids resolved by the find step
    pub fn found(&mut self, ids: Vec<ContentId>) -> Result<(), RemovalError> {
        if self.phase != RemovalPhase::Finding {
            return Err(self.illegal("accept find results"));
        }
        self.start_deleting(ids);
        Ok(())
    }

    /// Skip the find step for a known id
    pub fn direct(&mut self, id: ContentId) -> Result<(), RemovalError> {
        if self.phase != RemovalPhase::Idle {
            return Err(self.illegal("start a direct removal"));
        }
        self.start_deleting(vec![id]);
        Ok(())
    }

    fn start_deleting(&mut self, ids: Vec<ContentId>) {
        self.phase = if ids.is_empty() {
            RemovalPhase::NotFound
        } else {
            RemovalPhase::Deleting {
                next: 0,
                of: ids.len(),
            }
        };
        self.content_ids = ids;
    }

    /// Id of the delete to issue next, if the batch is deleting
    pub fn next_target(&self) -> Option<&ContentId> {
        match self.phase {
            RemovalPhase::Deleting { next, .. } => self.content_ids.get(next),
            _ => None,
        }
    }

    /// Record the result of the delete for [`Self::next_target`]
    pub fn record(&mut self, result: Result<Option<u64>, String>) -> Result<(), RemovalError> {
        let RemovalPhase::Deleting { next, of } = self.phase else {
            return Err(self.illegal("record a delete"));
        };
        let content_id = self.content_ids[next].clone();

        self.outcomes.push(match result {
            Ok(deleted) => DeleteOutcome {
                content_id,
                success: true,
                deleted,
                error: None,
            },
            Err(error) => DeleteOutcome {
                content_id,
                success: false,
                deleted: None,
                error: Some(error),
            },
        });

        self.phase = if next + 1 < of {
            RemovalPhase::Deleting { next: next + 1, of }
        } else {
            RemovalPhase::Done
        };
        Ok(())
    }

    pub fn summary(self) -> Result<RemovalSummary, RemovalError> {
        if self.phase != RemovalPhase::Done {
            return Err(self.illegal("summarize"));
        }
        let removed = self.outcomes.iter().filter(|o| o.success).count();
        Ok(RemovalSummary {
            status: if removed > 0 {
                RemovalStatus::Removed
            } else {
                RemovalStatus::RemovalFailed
            },
            removed,
            content_ids: self.content_ids,
            results: self.outcomes,
        })
    }
}

impl Default for RemovalBatch {
    fn default() -> Self {
        Self::new()
    }
}
