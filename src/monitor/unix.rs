use crate::domain::Usage;

/// Reads the accumulated child accounting for this process.
///
/// The harness reaps exactly one child in its lifetime, so the
/// `RUSAGE_CHILDREN` aggregate is that child's consumption: user plus system
/// CPU time, and the peak resident set (`ru_maxrss` is KiB on Linux). Must be
/// called after the child has been reaped.
pub fn measure() -> Usage {
    // SAFETY: a zeroed rusage is a valid out-parameter for getrusage.
    let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
    if unsafe { libc::getrusage(libc::RUSAGE_CHILDREN, &mut ru) } != 0 {
        let err = std::io::Error::last_os_error();
        tracing::error!(%err, "getrusage failed, reporting zero usage");
        return Usage::default();
    }

    Usage {
        cpu_time_ms: timeval_ms(ru.ru_utime) + timeval_ms(ru.ru_stime),
        memory_mib: ru.ru_maxrss.max(0) as u64 / 1024,
    }
}

fn timeval_ms(tv: libc::timeval) -> u64 {
    tv.tv_sec.max(0) as u64 * 1000 + tv.tv_usec.max(0) as u64 / 1000
}
