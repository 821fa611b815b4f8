use std::io;
use std::path::{Path, PathBuf};

use crate::domain::ExecutionResult;

/// Renders the result record. Field order is part of the contract.
pub fn render(result: &ExecutionResult) -> String {
    format!(
        "verdict: {}\nexitcode: {}\ntime: {}\nmemory: {}\n",
        result.verdict, result.exit_code, result.usage.cpu_time_ms, result.usage.memory_mib,
    )
}

/// Publishes the record at `destination` in one step: the full text lands in
/// a sibling `.partial` file which is then renamed over the destination, so a
/// reader never observes a torn record. Called at most once per invocation.
#[tracing::instrument]
pub async fn report(result: &ExecutionResult, destination: &Path) -> io::Result<()> {
    let staging = staging_path(destination);
    tokio::fs::write(&staging, render(result)).await?;
    tokio::fs::rename(&staging, destination).await?;
    tracing::debug!(destination = %destination.display(), "result record written");
    Ok(())
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .unwrap_or_default()
        .to_os_string();
    name.push(".partial");
    destination.with_file_name(name)
}
