//! In-crate fakes for the pipeline's collaborators

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::llm::{CompletionClient, CompletionRequest, LlmError};
use crate::notes::Stage;
use crate::retrieval::{ContextRetriever, RetrievalError, RetrievalQuery, SourceSelector};

/// Which stage a request belongs to, judged by its system prompt
pub fn stage_of(request: &CompletionRequest) -> Stage {
    if request.system.contains("academic assistant") {
        Stage::Hyde
    } else if request.system.contains("extract topics") {
        Stage::TopicParsing
    } else if request.system.contains("university professor") {
        Stage::UnitNotes
    } else if request.system.contains("notes generator") {
        Stage::TopicNotes
    } else {
        Stage::RagNotes
    }
}

/// Value of the `Unit: ...` line in a unit notes prompt
pub fn unit_in_prompt(user: &str) -> Option<&str> {
    user.lines().find_map(|l| l.strip_prefix("Unit: ")).map(str::trim)
}

/// Scripted completion client
#[derive(Default)]
pub struct FakeCompletion {
    failing: HashSet<Stage>,
    replies: HashMap<Stage, String>,
    slow_unit: Option<(String, Duration)>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request of `stage` with a 503
    pub fn failing_on(mut self, stage: Stage) -> Self {
        self.failing.insert(stage);
        self
    }

    pub fn failing_always() -> Self {
        [
            Stage::Hyde,
            Stage::TopicParsing,
            Stage::UnitNotes,
            Stage::TopicNotes,
            Stage::RagNotes,
        ]
        .into_iter()
        .fold(Self::new(), |fake, stage| fake.failing_on(stage))
    }

    pub fn with_reply(mut self, stage: Stage, reply: impl Into<String>) -> Self {
        self.replies.insert(stage, reply.into());
        self
    }

    /// Delay unit notes for `unit` so later units finish first
    pub fn with_slow_unit(mut self, unit: impl Into<String>, delay: Duration) -> Self {
        self.slow_unit = Some((unit.into(), delay));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_for(&self, stage: Stage) -> Vec<CompletionRequest> {
        self.requests().into_iter().filter(|r| stage_of(r) == stage).collect()
    }
}

impl CompletionClient for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().push(request.clone());
        let stage = stage_of(request);
        let unit = unit_in_prompt(&request.user).map(str::to_string);

        if let (Some((slow, delay)), Some(unit)) = (&self.slow_unit, &unit) {
            if slow == unit {
                tokio::time::sleep(*delay).await;
            }
        }

        if self.failing.contains(&stage) {
            return Err(LlmError::Status {
                status: 503,
                body: format!("{} unavailable", stage.as_str()),
            });
        }
        if let Some(reply) = self.replies.get(&stage) {
            return Ok(reply.clone());
        }
        Ok(match stage {
            Stage::Hyde => "A hypothetical textbook passage.".to_string(),
            Stage::UnitNotes => format!("## Notes for {}", unit.unwrap_or_default()),
            Stage::TopicParsing => "[]".to_string(),
            _ => "# Topic notes".to_string(),
        })
    }
}

/// Canned retriever returning fixed text per source
#[derive(Default)]
pub struct FakeRetriever {
    contexts: HashMap<SourceSelector, String>,
    fail: bool,
    queries: Mutex<Vec<RetrievalQuery>>,
}

impl FakeRetriever {
    /// Returns empty context for every query
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_context(mut self, source: SourceSelector, text: impl Into<String>) -> Self {
        self.contexts.insert(source, text.into());
        self
    }

    pub fn queries(&self) -> Vec<RetrievalQuery> {
        self.queries.lock().clone()
    }
}

impl ContextRetriever for FakeRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<String, RetrievalError> {
        self.queries.lock().push(query.clone());
        if self.fail {
            return Err(RetrievalError::Backend("knowledge base offline".to_string()));
        }
        Ok(self.contexts.get(&query.source).cloned().unwrap_or_default())
    }
}
