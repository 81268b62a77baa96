//! Finisher: reports a finished session's results to the workflow service.
//!
//! Delivery is best-effort and at most once: the walker hands out the payload a
//! single time, `dispatch_finish` sends it on a detached task, and a failure is only
//! logged. The session stays `Finished` either way.
//!
//! `FinishSink` is the seam for stronger delivery (e.g. an outbox table drained by a
//! worker) without touching the walker or the handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::session::models::FinishPayload;
use crate::workflow_client::{endpoints, WorkflowClient, WorkflowError};

#[async_trait]
pub trait FinishSink: Send + Sync {
    async fn deliver(&self, payload: &FinishPayload) -> Result<(), WorkflowError>;
}

/// Posts the payload to the workflow `interview-mcq-finish` webhook.
pub struct WorkflowFinishSink(pub WorkflowClient);

#[async_trait]
impl FinishSink for WorkflowFinishSink {
    async fn deliver(&self, payload: &FinishPayload) -> Result<(), WorkflowError> {
        self.0.post_json_unit(endpoints::MCQ_FINISH, payload).await
    }
}

/// Sends `payload` without blocking the caller. The handle is only awaited in tests.
pub fn dispatch_finish(sink: Arc<dyn FinishSink>, payload: FinishPayload) -> JoinHandle<()> {
    tokio::spawn(async move {
        match sink.deliver(&payload).await {
            Ok(()) => info!(
                "Finish results delivered for interview {} ({}/{} correct)",
                payload.interview_id, payload.correct_count, payload.total_questions
            ),
            Err(e) => warn!(
                "Finish results for interview {} were not delivered: {e}",
                payload.interview_id
            ),
        }
    })
}
