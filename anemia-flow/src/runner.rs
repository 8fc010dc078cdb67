//! FlowRunner – convenience wrapper that executes exactly **one** graph step
//! for a session inside a tracing span carrying the session id.
//!
//! Use it from interactive callers that run one step per user edit and
//! want every log line of that step tied to the session. Call
//! [`Graph::execute_session`] directly when no span is wanted.

use std::sync::Arc;

use tracing::{Instrument, info, info_span};

use crate::{
    error::{GraphError, Result},
    graph::{ExecutionResult, Graph},
    session::Session,
};

/// High-level helper around [`Graph::execute_session`]
#[derive(Clone)]
pub struct FlowRunner {
    graph: Arc<Graph>,
}

impl FlowRunner {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Execute **exactly one** task for the session
    pub async fn run(&self, session: &mut Session) -> Result<ExecutionResult> {
        let span = info_span!(
            "flow_step",
            session_id = %session.id,
            graph_id = %self.graph.id,
            task_id = %session.current_task_id,
        );

        async {
            let result = self.graph.execute_session(session).await?;
            info!(
                status = ?result.status,
                next_action = ?result.next_action,
                next_task = %result.current_task_id,
                "step completed"
            );
            Ok::<_, GraphError>(result)
        }
        .instrument(span)
        .await
    }
}
