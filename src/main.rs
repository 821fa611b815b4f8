use std::panic;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::supervisor::NativeSupervisor;

mod cli;
mod domain;
mod judge;
mod monitor;
mod report;
mod supervisor;
mod verdict;

#[cfg(all(test, unix))]
mod integration_test;

#[tokio::main]
#[tracing::instrument]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    set_panic_hook();

    let invocation = match cli::parse_invocation(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        // Malformed invocation: nothing to judge, so no record is written.
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
    };

    let supervisor = NativeSupervisor::new();
    let result = judge::judge(&supervisor, &invocation.request).await;

    if let Err(err) = report::report(&result, &invocation.destination).await {
        tracing::error!(
            %err,
            destination = %invocation.destination.display(),
            "failed to write result record"
        );
        return ExitCode::FAILURE;
    }

    // Judging completed; the verdict, ERR included, lives in the record.
    ExitCode::SUCCESS
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
