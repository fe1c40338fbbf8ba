//! process::interrupt
//!
//! SIGINT/SIGTERM handling that never leaves orphaned children.
//!
//! [`install`] starts a signal thread. The thread only records the request
//! and kills the child currently tracked, if any; it never exits the process.
//! The runner checks [`requested`] before spawning and right after tracking a
//! new child, so a signal that lands between `spawn` and [`track`] still
//! takes the child down. The dispatcher turns the request into exit code 130
//! once the current step has unwound, which lets an in-flight atomic write
//! finish or clean up its temp file.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Kill target of the child currently being waited on; 0 if none.
///
/// Uses `kill(2)` conventions: negative for a whole process group.
static ACTIVE_CHILD: AtomicI32 = AtomicI32::new(0);

/// Set once a signal has been received.
static REQUESTED: AtomicBool = AtomicBool::new(false);

/// Exit code used when the run is interrupted.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Whether an interrupt has been received.
pub fn requested() -> bool {
    REQUESTED.load(Ordering::SeqCst)
}

/// A spawned child and how far a kill has to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracked {
    pid: u32,
    own_group: bool,
}

impl Tracked {
    /// `own_group` is true when the child leads its own process group.
    pub fn new(pid: u32, own_group: bool) -> Self {
        Self { pid, own_group }
    }

    fn target(self) -> i32 {
        let pid = i32::try_from(self.pid).unwrap_or(0);
        if self.own_group {
            -pid
        } else {
            pid
        }
    }

    /// Kill the child, and its whole group when it leads one.
    pub fn terminate(self) {
        kill(self.target());
    }
}

/// Marks a child as active until dropped.
#[derive(Debug)]
pub struct ActiveChild {
    slot: &'static AtomicI32,
    target: i32,
}

impl Drop for ActiveChild {
    fn drop(&mut self) {
        let _ = self
            .slot
            .compare_exchange(self.target, 0, Ordering::SeqCst, Ordering::SeqCst);
    }
}

/// Record `child` as the one to kill on interrupt.
pub fn track(child: Tracked) -> ActiveChild {
    track_in(&ACTIVE_CHILD, child)
}

fn track_in(slot: &'static AtomicI32, child: Tracked) -> ActiveChild {
    let target = child.target();
    slot.store(target, Ordering::SeqCst);
    ActiveChild { slot, target }
}

/// Install the signal thread.
///
/// Safe to call more than once; later calls register additional listeners
/// that behave identically.
#[cfg(unix)]
pub fn install() -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use tracing::info;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    std::thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                REQUESTED.store(true, Ordering::SeqCst);
                let target = ACTIVE_CHILD.load(Ordering::SeqCst);
                info!(signal = sig, child = target, "received signal");
                kill(target);
            }
        })?;

    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn kill(target: i32) {
    if target == 0 || target == -1 {
        return;
    }
    // SAFETY: kill only sends a signal; a stale pid or group makes it return
    // an error, which is ignored.
    unsafe {
        libc::kill(target, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill(_target: i32) {}
