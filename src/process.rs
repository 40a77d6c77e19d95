//! Kill a process, optionally together with all of its descendants.
//!
//! A process that does not exist is a reported outcome (`false`), never an
//! error. PID 0 and values that do not fit a positive `pid_t` are treated as
//! "not found", so a bad PID can never signal a whole process group.

use std::collections::BTreeMap;

use tracing::debug;

/// Result of one kill attempt.
#[cfg_attr(not(unix), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kill {
    Killed,
    NotFound,
    Failed(i32),
}

/// Kill the process `pid`. Returns `true` if the signal was delivered.
pub fn kill_process(pid: u32) -> bool {
    match send_kill(pid) {
        Kill::Killed => {
            println!("Process {pid} killed.");
            true
        }
        Kill::NotFound => {
            println!("Process {pid} not found.");
            false
        }
        Kill::Failed(errno) => {
            println!("Failed to kill process {pid}: {}", std::io::Error::from_raw_os_error(errno));
            false
        }
    }
}

/// Kill every descendant of `pid`, then `pid` itself.
///
/// The map holds one entry per PID that was targeted. If `pid` does not exist
/// the map is `{pid: false}`.
pub fn kill_process_and_children(pid: u32) -> BTreeMap<u32, bool> {
    let mut results = BTreeMap::new();

    if !is_alive(pid) {
        println!("Process {pid} not found.");
        results.insert(pid, false);
        return results;
    }

    // Deepest first, so no child gets re-parented to init before we reach it.
    for child in descendants(pid).into_iter().rev() {
        let outcome = send_kill(child);
        if let Kill::Failed(errno) = outcome {
            println!(
                "Failed to kill child process {child}: {}",
                std::io::Error::from_raw_os_error(errno)
            );
        }
        results.insert(child, outcome == Kill::Killed);
    }

    let outcome = send_kill(pid);
    if let Kill::Failed(errno) = outcome {
        println!("Failed to kill process {pid}: {}", std::io::Error::from_raw_os_error(errno));
    }
    results.insert(pid, outcome == Kill::Killed);

    debug!(pid, targeted = results.len(), "kill_process_and_children finished");
    results
}

/// All transitive children of `pid`, parents before their children.
/// Empty where the platform offers no process table.
pub fn descendants(pid: u32) -> Vec<u32> {
    let table = process_table();
    let mut out = Vec::new();
    let mut frontier = vec![pid];
    while let Some(parent) = frontier.pop() {
        for &(child, ppid) in &table {
            if ppid == parent && child != pid && !out.contains(&child) {
                out.push(child);
                frontier.push(child);
            }
        }
    }
    out
}

#[cfg(unix)]
fn as_pid(pid: u32) -> Option<libc::pid_t> {
    libc::pid_t::try_from(pid).ok().filter(|p| *p > 0)
}

#[cfg(unix)]
fn is_alive(pid: u32) -> bool {
    let Some(raw) = as_pid(pid) else {
        return false;
    };
    // Signal 0 only checks existence and permission.
    // SAFETY: kill(2) with a positive pid has no memory-safety preconditions.
    let rc = unsafe { libc::kill(raw, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(unix)]
fn send_kill(pid: u32) -> Kill {
    let Some(raw) = as_pid(pid) else {
        return Kill::NotFound;
    };
    // SAFETY: as above; `raw` is strictly positive.
    let rc = unsafe { libc::kill(raw, libc::SIGKILL) };
    if rc == 0 {
        return Kill::Killed;
    }
    match std::io::Error::last_os_error().raw_os_error() {
        Some(libc::ESRCH) => Kill::NotFound,
        Some(errno) => Kill::Failed(errno),
        None => Kill::Failed(0),
    }
}

#[cfg(not(unix))]
fn is_alive(_pid: u32) -> bool {
    false
}

#[cfg(not(unix))]
fn send_kill(_pid: u32) -> Kill {
    Kill::NotFound
}

/// `(pid, ppid)` for every process in `/proc`.
#[cfg(target_os = "linux")]
fn process_table() -> Vec<(u32, u32)> {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter_map(|pid| {
            let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
            parse_ppid(&stat).map(|ppid| (pid, ppid))
        })
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn process_table() -> Vec<(u32, u32)> {
    Vec::new()
}

/// Extract the parent PID from a `/proc/<pid>/stat` line. The command name
/// is parenthesised and may itself contain spaces or parentheses, so parsing
/// starts after the last `)`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_ppid(stat: &str) -> Option<u32> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    let _state = fields.next()?;
    fields.next()?.parse().ok()
}
