//! Process lifecycle management for child processes
//!
//! Installer commands (`apt-get`, `initdb`, `pg_ctl`) can run for minutes. If
//! pgprovision is interrupted while one of them runs, the child must not keep
//! going on its own.
//!
//! - Children are spawned in their own process group
//! - Every child PID is tracked in a global registry
//! - On parent exit (Drop, SIGINT/SIGTERM/SIGHUP, Ctrl+C) tracked children are
//!   terminated; on Unix they get SIGTERM, a grace period, then SIGKILL

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

/// Global registry of child process IDs
static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Registry tracking all spawned child processes
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    /// Whether cleanup has already been initiated (prevent double-cleanup)
    cleanup_initiated: bool,
}

impl ChildRegistry {
    /// Get or create the global child registry
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        tracing::debug!(pid, "registered child process");
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        tracing::debug!(pid, "unregistered child process");
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    /// Terminate all tracked child processes
    pub fn terminate_all(&mut self, grace_period: Duration) {
        if self.cleanup_initiated {
            tracing::debug!("cleanup already initiated, skipping");
            return;
        }
        self.cleanup_initiated = true;

        if self.pids.is_empty() {
            return;
        }

        tracing::info!("terminating {} child process(es)", self.pids.len());
        let pids: Vec<u32> = self.pids.iter().copied().collect();
        platform::terminate(&pids, grace_period);
        self.pids.clear();
    }
}

#[cfg(unix)]
mod platform {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;
    use std::time::{Duration, Instant};

    pub fn terminate(pids: &[u32], grace_period: Duration) {
        // Group signal first so grandchildren (dpkg under apt-get) see it too
        for &pid in pids {
            if let Err(e) = send_signal_to_group(pid, Signal::SIGTERM) {
                tracing::warn!("failed to SIGTERM process group {}: {}", pid, e);
                let _ = send_signal(pid, Signal::SIGTERM);
            }
        }

        let start = Instant::now();
        while start.elapsed() < grace_period {
            if pids.iter().all(|&pid| !is_process_alive(pid)) {
                tracing::info!("all child processes terminated gracefully");
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        for &pid in pids {
            if is_process_alive(pid) {
                tracing::warn!("process group {} did not terminate, sending SIGKILL", pid);
                if send_signal_to_group(pid, Signal::SIGKILL).is_err() {
                    let _ = send_signal(pid, Signal::SIGKILL);
                }
            }
        }
    }

    pub fn send_signal(pid: u32, signal: Signal) -> Result<(), nix::Error> {
        signal::kill(Pid::from_raw(pid as i32), signal)
    }

    fn send_signal_to_group(pgid: u32, signal: Signal) -> Result<(), nix::Error> {
        signal::kill(Pid::from_raw(-(pgid as i32)), signal)
    }

    /// Check if a process is still alive (not dead or zombie)
    pub fn is_process_alive(pid: u32) -> bool {
        if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
            return false;
        }

        // Field 3 of /proc/<pid>/stat is the state; Z and X are not running
        if let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            let fields: Vec<&str> = stat.split_whitespace().collect();
            if fields.len() > 2 {
                return !matches!(fields[2], "Z" | "X");
            }
        }

        true
    }
}

#[cfg(windows)]
mod platform {
    use std::process::{Command, Stdio};
    use std::time::Duration;

    pub fn terminate(pids: &[u32], _grace_period: Duration) {
        for &pid in pids {
            let status = Command::new("taskkill")
                .args(["/PID", &pid.to_string(), "/T", "/F"])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if let Err(e) = status {
                tracing::warn!("failed to run taskkill for {}: {}", pid, e);
            }
        }
    }
}

/// RAII guard that terminates all children on drop.
///
/// Held by `main` for the lifetime of a run.
pub struct ProcessGuard {
    registry: Arc<Mutex<ChildRegistry>>,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self {
            registry: ChildRegistry::global(),
        }
    }

    pub fn child_count(&self) -> usize {
        self.registry.lock().map(|r| r.count()).unwrap_or(0)
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        tracing::debug!("ProcessGuard dropped, initiating cleanup");
        if let Ok(mut registry) = self.registry.lock() {
            registry.terminate_all(Duration::from_secs(5));
        }
    }
}

/// Initialize global signal handlers for graceful shutdown
/// Handles SIGINT (Ctrl+C), SIGTERM, and SIGHUP
#[cfg(unix)]
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            tracing::info!("received signal {}, cleaning up", sig);
            if let Ok(mut registry) = ChildRegistry::global().lock() {
                registry.terminate_all(Duration::from_secs(3));
            }
            // 128 + signal number
            std::process::exit(128 + sig);
        }
    });

    Ok(())
}

/// Initialize the Ctrl+C handler for graceful shutdown
#[cfg(windows)]
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    ctrlc::set_handler(|| {
        tracing::info!("received Ctrl+C, cleaning up");
        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.terminate_all(Duration::from_secs(3));
        }
        std::process::exit(130);
    })
    .map_err(std::io::Error::other)
}

/// Extension trait for std::process::Command to set up process groups
pub trait CommandProcessGroup {
    /// Configure the command to run in its own process group
    fn in_new_process_group(&mut self) -> &mut Self;
}

#[cfg(unix)]
impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        // SAFETY: the closure only calls async-signal-safe functions
        unsafe {
            self.pre_exec(|| {
                nix::unistd::setpgid(nix::unistd::Pid::from_raw(0), nix::unistd::Pid::from_raw(0))
                    .map_err(std::io::Error::other)?;

                // Child dies with the parent
                #[cfg(target_os = "linux")]
                {
                    if nix::libc::prctl(nix::libc::PR_SET_PDEATHSIG, nix::libc::SIGTERM) == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                }

                Ok(())
            });
        }
        self
    }
}

#[cfg(windows)]
impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        self.creation_flags(CREATE_NEW_PROCESS_GROUP)
    }
}
