//! In-process scenarios against the native supervisor. Anything that asserts
//! on measured CPU or memory lives in `tests/harness.rs` instead, where every
//! scenario gets its own harness process and therefore its own child
//! accounting.

use crate::domain::{ExecutionLimits, ExecutionRequest, Verdict};
use crate::judge;
use crate::supervisor::NativeSupervisor;
use crate::supervisor::traits::{SuperviseError, Supervisor};

fn request(command: &[&str], limits: ExecutionLimits) -> ExecutionRequest {
    ExecutionRequest {
        command: command.iter().map(|s| s.to_string()).collect(),
        limits,
    }
}

fn lenient_limits() -> ExecutionLimits {
    ExecutionLimits {
        cpu_time_ms: 2000,
        memory_mib: 256,
        wall_time_ms: 5000,
    }
}

#[tokio::test]
async fn exit_code_is_propagated() {
    let supervisor = NativeSupervisor::new();
    let result = judge::judge(
        &supervisor,
        &request(&["/bin/sh", "-c", "exit 7"], lenient_limits()),
    )
    .await;

    assert_eq!(result.verdict, Verdict::Ok);
    assert_eq!(result.exit_code, 7);
}

#[tokio::test]
async fn fault_is_ok_with_negative_exit_code() {
    let supervisor = NativeSupervisor::new();
    let result = judge::judge(
        &supervisor,
        &request(&["/bin/sh", "-c", "kill -s SEGV $$"], lenient_limits()),
    )
    .await;

    assert_eq!(result.verdict, Verdict::Ok);
    assert_eq!(result.exit_code, -libc::SIGSEGV);
}

#[tokio::test]
async fn sleeper_hits_the_wall_clock_deadline() {
    let supervisor = NativeSupervisor::new();
    let limits = ExecutionLimits {
        cpu_time_ms: 2000,
        memory_mib: 256,
        wall_time_ms: 300,
    };
    let result = judge::judge(&supervisor, &request(&["sleep", "5"], limits)).await;

    assert_eq!(result.verdict, Verdict::RealTimeLimit);
    assert_eq!(result.exit_code, -libc::SIGKILL);
}

#[tokio::test]
async fn missing_executable_is_a_spawn_failure() {
    let supervisor = NativeSupervisor::new();
    let req = request(&["/definitely/not/a/binary"], lenient_limits());

    let supervision = supervisor.supervise(&req).await;
    assert!(matches!(supervision, Err(SuperviseError::Spawn { .. })));

    let result = judge::judge(&supervisor, &req).await;
    assert_eq!(result.verdict, Verdict::Error);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.usage.cpu_time_ms, 0);
    assert_eq!(result.usage.memory_mib, 0);
}
