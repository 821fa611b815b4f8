use std::io;
use std::mem::{size_of, zeroed};
use std::os::windows::io::{AsRawHandle, BorrowedHandle, FromRawHandle, OwnedHandle, RawHandle};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::System::JobObjects::*;

use crate::domain::{ExecutionLimits, ExecutionRequest, Supervision, TerminationCause};
use crate::monitor;
use crate::supervisor::traits::{SuperviseError, Supervisor};

/// Judges processes with a job object for the kernel ceilings and a
/// timeout-bounded wait for the wall-clock deadline.
///
/// There is no CPU-fault signal on Windows; a child that the job's time cap
/// terminates is caught by the resolver's measured comparison instead.
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

        let job = create_job(&limits).map_err(|e| SuperviseError::Spawn {
            msg: e.to_string(),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| SuperviseError::Spawn {
            msg: e.to_string(),
        })?;

        // Duplicate the process handle up front: the accounting queries must
        // outlive the reap, which invalidates tokio's own handle.
        let raw = child.raw_handle().ok_or_else(|| SuperviseError::Spawn {
            msg: "child exited before its handle could be retained".to_string(),
        })?;
        // SAFETY: raw is a live process handle owned by `child`.
        let probe = unsafe { BorrowedHandle::borrow_raw(raw) }
            .try_clone_to_owned()
            .map_err(|e| SuperviseError::Spawn {
                msg: e.to_string(),
            })?;

        let assigned =
            unsafe { AssignProcessToJobObject(job.as_raw_handle() as HANDLE, raw as HANDLE) };
        if assigned == 0 {
            let err = io::Error::last_os_error();
            let _ = child.kill().await;
            return Err(SuperviseError::Spawn {
                msg: err.to_string(),
            });
        }

        let wall = Duration::from_millis(limits.wall_time_ms);
        let (cause, status) = match timeout(wall, child.wait()).await {
            Ok(wait_result) => {
                let status = wait_result.map_err(|e| SuperviseError::Wait {
                    msg: e.to_string(),
                })?;
                (TerminationCause::Exited, status)
            }
            Err(_) => {
                tracing::debug!("wall-clock deadline fired, terminating job");
                let terminated =
                    unsafe { TerminateJobObject(job.as_raw_handle() as HANDLE, 1) };
                if terminated == 0 {
                    // Fall back to the root process if the job refuses.
                    if let Err(err) = child.kill().await {
                        tracing::warn!(%err, "kill after deadline failed");
                    }
                }
                let status = child.wait().await.map_err(|e| SuperviseError::Wait {
                    msg: e.to_string(),
                })?;
                (TerminationCause::DeadlineFired, status)
            }
        };

        let usage = monitor::windows::measure(&probe);
        tracing::debug!(?cause, ?status, ?usage, "child terminated");

        Ok(Supervision {
            cause,
            exit_code: status.code().unwrap_or(0),
            usage,
        })
    }
}

/// Builds the job object carrying the kernel ceilings: twice the memory
/// limit, and the CPU cap rounded up to whole seconds (in 100 ns units).
fn create_job(limits: &ExecutionLimits) -> io::Result<OwnedHandle> {
    let raw_job = unsafe { CreateJobObjectW(std::ptr::null(), std::ptr::null()) };
    if raw_job.is_null() {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: raw_job is a freshly created job handle we now own.
    let job = unsafe { OwnedHandle::from_raw_handle(raw_job as RawHandle) };

    let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = unsafe { zeroed() };
    info.BasicLimitInformation.LimitFlags =
        JOB_OBJECT_LIMIT_PROCESS_MEMORY | JOB_OBJECT_LIMIT_PROCESS_TIME;
    info.ProcessMemoryLimit = limits.memory_mib.saturating_mul(2 * 1024 * 1024) as usize;
    info.BasicLimitInformation.PerProcessUserTimeLimit = limits
        .cpu_time_ms
        .div_ceil(1000)
        .saturating_mul(10_000_000)
        .min(i64::MAX as u64) as i64;

    let result = unsafe {
        SetInformationJobObject(
            job.as_raw_handle() as HANDLE,
            JobObjectExtendedLimitInformation,
            &mut info as *mut _ as *mut _,
            size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
        )
    };
    if result == 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(job)
}
