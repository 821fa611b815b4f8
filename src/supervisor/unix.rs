use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::domain::{ExecutionRequest, Supervision, TerminationCause};
use crate::monitor;
use crate::supervisor::traits::{SuperviseError, Supervisor};

/// Judges processes with fork/exec, rlimits, and a timeout-bounded wait.
///
/// The kernel ceilings installed before exec are a circuit breaker, not the
/// judging threshold: CPU is capped at whole seconds (rounded up) and address
/// space at twice the memory limit. The verdict comes from measured usage.
#[derive(Debug, Default, Clone)]
pub struct NativeSupervisor;

impl NativeSupervisor {
    pub fn new() -> Self {
        NativeSupervisor
    }
}

#[async_trait::async_trait]
impl Supervisor for NativeSupervisor {
    #[tracing::instrument(skip(self))]
    async fn supervise(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Supervision, SuperviseError> {
        let limits = request.limits;
        let (program, args) = match request.command.split_first() {
            Some(split) => split,
            None => {
                return Err(SuperviseError::Spawn {
                    msg: "empty command line".to_string(),
                });
            }
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.kill_on_drop(true);

        let cpu_cap_secs = limits.cpu_time_ms.div_ceil(1000);
        let address_cap_bytes = limits.memory_mib.saturating_mul(2 * 1024 * 1024);
        // Runs in the child between fork and exec.
        unsafe {
            cmd.pre_exec(move || install_rlimits(cpu_cap_secs, address_cap_bytes));
        }

        let mut child = cmd.spawn().map_err(|e| SuperviseError::Spawn {
            msg: e.to_string(),
        })?;

        let wall = Duration::from_millis(limits.wall_time_ms);
        let (cause, status) = match timeout(wall, child.wait()).await {
            Ok(wait_result) => {
                let status = wait_result.map_err(|e| SuperviseError::Wait {
                    msg: e.to_string(),
                })?;
                (cause_of(&status), status)
            }
            Err(_) => {
                // The deadline fired with the child still unreaped. Kill
                // unconditionally, then reap; the timeout result alone
                // decides this branch.
                tracing::debug!("wall-clock deadline fired, killing child");
                if let Err(err) = child.kill().await {
                    tracing::warn!(%err, "kill after deadline failed");
                }
                let status = child.wait().await.map_err(|e| SuperviseError::Wait {
                    msg: e.to_string(),
                })?;
                (TerminationCause::DeadlineFired, status)
            }
        };

        let usage = monitor::unix::measure();
        tracing::debug!(?cause, ?status, ?usage, "child terminated");

        Ok(Supervision {
            cause,
            exit_code: exit_code_of(&status),
            usage,
        })
    }
}

fn cause_of(status: &ExitStatus) -> TerminationCause {
    match status.signal() {
        Some(libc::SIGXCPU) => TerminationCause::CpuExhausted,
        _ => TerminationCause::Exited,
    }
}

fn exit_code_of(status: &ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        // Terminated by a signal or fault; encode it as a negative id.
        None => -status.signal().unwrap_or(0),
    }
}

/// Installs the kernel ceilings in the child. Only the CPU soft limit is set
/// so the kernel delivers SIGXCPU, which the resolver reads as a CPU fault;
/// the address-space cap is hard on both bounds.
fn install_rlimits(cpu_cap_secs: u64, address_cap_bytes: u64) -> io::Result<()> {
    let cpu = libc::rlimit {
        rlim_cur: cpu_cap_secs,
        rlim_max: libc::RLIM_INFINITY,
    };
    // SAFETY: the rlimit structs are valid for the duration of each call.
    if unsafe { libc::setrlimit(libc::RLIMIT_CPU, &cpu) } != 0 {
        return Err(io::Error::last_os_error());
    }

    let address = libc::rlimit {
        rlim_cur: address_cap_bytes,
        rlim_max: address_cap_bytes,
    };
    if unsafe { libc::setrlimit(libc::RLIMIT_AS, &address) } != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exited(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    fn signaled(signal: i32) -> ExitStatus {
        ExitStatus::from_raw(signal)
    }

    #[test]
    fn normal_exit_keeps_its_code() {
        let status = exited(7);
        assert_eq!(cause_of(&status), TerminationCause::Exited);
        assert_eq!(exit_code_of(&status), 7);
    }

    #[test]
    fn signal_termination_is_negative() {
        let status = signaled(libc::SIGSEGV);
        assert_eq!(cause_of(&status), TerminationCause::Exited);
        assert_eq!(exit_code_of(&status), -libc::SIGSEGV);
    }

    #[test]
    fn sigxcpu_is_a_cpu_fault() {
        let status = signaled(libc::SIGXCPU);
        assert_eq!(cause_of(&status), TerminationCause::CpuExhausted);
        assert_eq!(exit_code_of(&status), -libc::SIGXCPU);
    }
}
