use std::fmt;

/// Hard numbers a judged process must stay under. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub cpu_time_ms: u64,
    pub memory_mib: u64,
    pub wall_time_ms: u64,
}

#[derive(Clone, Debug)]
pub struct ExecutionRequest {
    /// Judged command line; the first element is the executable path.
    pub command: Vec<String>,
    pub limits: ExecutionLimits,
}

/// The single categorical judging outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Error,
    Ok,
    TimeLimit,
    MemoryLimit,
    RealTimeLimit,
}

impl Verdict {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Verdict::Error => "ERR",
            Verdict::Ok => "OK",
            Verdict::TimeLimit => "TL",
            Verdict::MemoryLimit => "ML",
            Verdict::RealTimeLimit => "RL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Measured consumption. A metric the platform could not report is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub cpu_time_ms: u64,
    pub memory_mib: u64,
}

/// What ended the child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationCause {
    /// The child ended on its own, normally or on a fault.
    Exited,
    /// The kernel stopped the child for exhausting its CPU allowance.
    CpuExhausted,
    /// The wall-clock deadline fired and the supervisor killed the child.
    DeadlineFired,
}

/// The supervisor's account of one finished child.
#[derive(Clone, Copy, Debug)]
pub struct Supervision {
    pub cause: TerminationCause,
    /// Raw exit code; negative encodes "terminated by signal/fault N".
    pub exit_code: i32,
    pub usage: Usage,
}

#[derive(Clone, Copy, Debug)]
pub struct ExecutionResult {
    pub verdict: Verdict,
    pub exit_code: i32,
    pub usage: Usage,
}

impl ExecutionResult {
    /// The record reported when the child could not be started at all.
    /// The exit code is a sentinel: no process ever ran.
    pub fn spawn_failure() -> Self {
        ExecutionResult {
            verdict: Verdict::Error,
            exit_code: 0,
            usage: Usage::default(),
        }
    }
}
