//! Reads the OS resource counters for the judged child.
//!
//! A failed counter read is logged and degrades that metric to zero; a usable
//! verdict may still follow from the termination cause alone, so measurement
//! never aborts the pipeline.

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;
