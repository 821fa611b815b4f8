use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{ExecutionLimits, ExecutionRequest};

pub const USAGE: &str =
    "usage: judgerun <cpu-ms> <memory-mib> <wall-ms> <result-path> <command> [args...]";

#[derive(Clone, Debug)]
pub struct Invocation {
    /// Where the result record is published.
    pub destination: PathBuf,
    pub request: ExecutionRequest,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    #[error("not enough arguments")]
    NotEnoughArguments,
    #[error("{name} must be a positive integer, got {value:?}")]
    BadLimit { name: &'static str, value: String },
}

/// Parses everything after argv[0]. The order is fixed: the three limits,
/// the result path, then the judged command line verbatim.
pub fn parse_invocation<I>(args: I) -> Result<Invocation, InvocationError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();

    let cpu_time_ms = parse_limit("cpu time limit", args.next())?;
    let memory_mib = parse_limit("memory limit", args.next())?;
    let wall_time_ms = parse_limit("real time limit", args.next())?;
    let destination = args.next().ok_or(InvocationError::NotEnoughArguments)?;

    let command: Vec<String> = args.collect();
    if command.is_empty() {
        return Err(InvocationError::NotEnoughArguments);
    }

    Ok(Invocation {
        destination: PathBuf::from(destination),
        request: ExecutionRequest {
            command,
            limits: ExecutionLimits {
                cpu_time_ms,
                memory_mib,
                wall_time_ms,
            },
        },
    })
}

fn parse_limit(name: &'static str, raw: Option<String>) -> Result<u64, InvocationError> {
    let raw = raw.ok_or(InvocationError::NotEnoughArguments)?;
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(InvocationError::BadLimit { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_limits_destination_and_command() {
        let invocation =
            parse_invocation(args(&["1000", "256", "5000", "/tmp/result", "./solution", "--fast"]))
                .expect("invocation should parse");

        assert_eq!(invocation.destination, PathBuf::from("/tmp/result"));
        assert_eq!(
            invocation.request.limits,
            ExecutionLimits {
                cpu_time_ms: 1000,
                memory_mib: 256,
                wall_time_ms: 5000,
            }
        );
        assert_eq!(invocation.request.command, vec!["./solution", "--fast"]);
    }

    #[test]
    fn rejects_missing_command() {
        let result = parse_invocation(args(&["1000", "256", "5000", "/tmp/result"]));
        assert_eq!(result.unwrap_err(), InvocationError::NotEnoughArguments);
    }

    #[test]
    fn rejects_too_few_arguments() {
        let result = parse_invocation(args(&["1000", "256"]));
        assert_eq!(result.unwrap_err(), InvocationError::NotEnoughArguments);
    }

    #[test]
    fn rejects_zero_limit() {
        let result = parse_invocation(args(&["1000", "0", "5000", "/tmp/result", "./solution"]));
        assert!(matches!(
            result.unwrap_err(),
            InvocationError::BadLimit { name: "memory limit", .. }
        ));
    }

    #[test]
    fn rejects_garbage_limit() {
        let result = parse_invocation(args(&["fast", "256", "5000", "/tmp/result", "./solution"]));
        assert!(matches!(
            result.unwrap_err(),
            InvocationError::BadLimit { name: "cpu time limit", .. }
        ));
    }

    #[test]
    fn rejects_negative_limit() {
        let result = parse_invocation(args(&["1000", "256", "-1", "/tmp/result", "./solution"]));
        assert!(matches!(
            result.unwrap_err(),
            InvocationError::BadLimit { name: "real time limit", .. }
        ));
    }
}
