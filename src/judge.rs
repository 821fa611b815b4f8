use crate::domain::{ExecutionRequest, ExecutionResult};
use crate::supervisor::traits::Supervisor;
use crate::verdict;

/// Runs one judged process start to finish and produces the single result.
///
/// A spawn failure does not abort the harness: it resolves to the `ERR`
/// verdict with sentinel zeroes, which is a complete, reportable outcome for
/// the orchestrator.
#[tracing::instrument(skip(supervisor))]
pub async fn judge(supervisor: &dyn Supervisor, request: &ExecutionRequest) -> ExecutionResult {
    match supervisor.supervise(request).await {
        Ok(supervision) => {
            let verdict = verdict::resolve(&supervision, &request.limits);
            tracing::debug!(?verdict, ?supervision, "judged");
            ExecutionResult {
                verdict,
                exit_code: supervision.exit_code,
                usage: supervision.usage,
            }
        }
        Err(err) => {
            tracing::error!(%err, "could not supervise judged process");
            ExecutionResult::spawn_failure()
        }
    }
}
