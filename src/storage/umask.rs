//! Scoped umask override
//!
//! The process umask is shared by every thread. A guard installs a mask, holds a
//! process-wide lock so overrides never interleave, and restores the previous mask
//! when dropped, including on early returns and unwinding.
//!
//! Code that creates files takes the same lock through [`hold`], so a cleared
//! mask is never observed outside the guard that installed it.

use std::sync::{Mutex, MutexGuard};

static UMASK_LOCK: Mutex<()> = Mutex::new(());

/// Holds the umask lock without changing the mask.
pub fn hold() -> MutexGuard<'static, ()> {
    UMASK_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restores the previous umask on drop.
pub struct UmaskGuard {
    previous: u32,
    _lock: MutexGuard<'static, ()>,
}

impl UmaskGuard {
    /// Clears the umask so requested modes are applied exactly.
    pub fn clear() -> Self {
        Self::install(0)
    }

    fn install(mask: u32) -> Self {
        let lock = hold();
        let previous = swap_umask(mask);
        Self {
            previous,
            _lock: lock,
        }
    }

    #[cfg(test)]
    fn previous(&self) -> u32 {
        self.previous
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        swap_umask(self.previous);
    }
}

/// Reads the current umask without leaving it altered.
#[cfg(test)]
pub(crate) fn current_umask() -> u32 {
    UmaskGuard::install(0).previous()
}

#[cfg(unix)]
fn swap_umask(mask: u32) -> u32 {
    // SAFETY: umask only swaps the process file mode creation mask and cannot fail.
    unsafe { libc::umask(mask as libc::mode_t) as u32 }
}

#[cfg(not(unix))]
fn swap_umask(_mask: u32) -> u32 {
    0
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_previous_mask() {
        let before = current_umask();
        {
            let guard = UmaskGuard::install(0o077);
            assert_eq!(guard.previous(), before);
        }
        assert_eq!(current_umask(), before);
    }

    #[test]
    fn test_guard_restores_on_unwind() {
        let before = current_umask();
        let result = std::panic::catch_unwind(|| {
            let _guard = UmaskGuard::clear();
            panic!("directory creation blew up");
        });
        assert!(result.is_err());
        assert_eq!(current_umask(), before);
    }

    #[test]
    fn test_hold_excludes_guards() {
        let held = hold();
        let (tx, rx) = std::sync::mpsc::channel();
        let waiter = std::thread::spawn(move || {
            let _guard = UmaskGuard::clear();
            tx.send(()).unwrap();
        });
        assert!(rx.recv_timeout(std::time::Duration::from_millis(100)).is_err());
        drop(held);
        rx.recv().unwrap();
        waiter.join().unwrap();
    }
}
