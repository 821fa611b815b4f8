use std::time::Duration;

use crate::domain::{ExecutionRequest, Supervision};
use crate::supervisor::traits::{SuperviseError, Supervisor};

/// Supervisor that returns a preset outcome after a fixed delay.
#[derive(Debug, Clone)]
pub struct SupervisorStub {
    result: Result<Supervision, SuperviseError>,
    delay: Duration,
}

impl SupervisorStub {
    pub fn new(result: Result<Supervision, SuperviseError>, delay: Duration) -> Self {
        Self { result, delay }
    }
}

#[async_trait::async_trait]
impl Supervisor for SupervisorStub {
    #[tracing::instrument]
    async fn supervise(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Supervision, SuperviseError> {
        tracing::debug!(
            "Start supervision: request={:?}, result={:?}",
            request,
            self.result
        );
        tokio::time::sleep(self.delay).await;

        self.result.clone()
    }
}
