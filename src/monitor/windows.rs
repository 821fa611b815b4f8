use std::mem::{size_of, zeroed};
use std::os::windows::io::{AsRawHandle, OwnedHandle};

use windows_sys::Win32::Foundation::{FILETIME, HANDLE};
use windows_sys::Win32::System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows_sys::Win32::System::Threading::GetProcessTimes;

use crate::domain::Usage;

/// Reads CPU and peak-memory accounting from a process handle, which may
/// refer to an already-terminated process. Each failed query logs and
/// degrades its metric to zero.
pub fn measure(process: &OwnedHandle) -> Usage {
    let handle = process.as_raw_handle() as HANDLE;
    let mut usage = Usage::default();

    // SAFETY: zeroed FILETIMEs are valid out-parameters; handle stays alive
    // for the duration of the call.
    let mut creation: FILETIME = unsafe { zeroed() };
    let mut exit: FILETIME = unsafe { zeroed() };
    let mut kernel: FILETIME = unsafe { zeroed() };
    let mut user: FILETIME = unsafe { zeroed() };
    let ok = unsafe {
        GetProcessTimes(handle, &mut creation, &mut exit, &mut kernel, &mut user)
    };
    if ok != 0 {
        // FILETIME ticks are 100 ns.
        usage.cpu_time_ms = (filetime_ticks(&kernel) + filetime_ticks(&user)) / 10_000;
    } else {
        let err = std::io::Error::last_os_error();
        tracing::error!(%err, "GetProcessTimes failed, reporting zero cpu time");
    }

    let mut counters: PROCESS_MEMORY_COUNTERS = unsafe { zeroed() };
    counters.cb = size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    let ok = unsafe { GetProcessMemoryInfo(handle, &mut counters, counters.cb) };
    if ok != 0 {
        usage.memory_mib = counters.PeakWorkingSetSize as u64 / 1024 / 1024;
    } else {
        let err = std::io::Error::last_os_error();
        tracing::error!(%err, "GetProcessMemoryInfo failed, reporting zero memory");
    }

    usage
}

fn filetime_ticks(ft: &FILETIME) -> u64 {
    (ft.dwHighDateTime as u64) << 32 | ft.dwLowDateTime as u64
}
