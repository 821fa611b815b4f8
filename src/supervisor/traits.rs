use crate::domain::{ExecutionRequest, Supervision};

/// Harness-level failure to run the child at all. Distinct from every judged
/// outcome: it bypasses verdict resolution and maps straight to `ERR`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SuperviseError {
    #[error("failed to spawn judged process: {msg}")]
    Spawn { msg: String },
    #[error("failed waiting for judged process: {msg}")]
    Wait { msg: String },
}

/// Runs one judged child under enforcement and reports how it ended.
///
/// Implementations spawn the child with kernel ceilings installed, arm the
/// wall-clock deadline, wait, force-kill on deadline, and read the resource
/// counters once the child is gone. Exactly one of "child terminated" and
/// "deadline fired" is observed per invocation.
#[async_trait::async_trait]
pub trait Supervisor: std::fmt::Debug + Send + Sync {
    async fn supervise(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Supervision, SuperviseError>;
}
