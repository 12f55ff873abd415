//! File system operations
//!
//! Raw OS calls used by the adapter: directory creation under a cleared umask,
//! locked writes, and permission bits.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::storage::umask::{self, UmaskGuard};

/// Controls how file contents are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFlags {
    /// Hold an exclusive advisory lock on the destination while writing.
    pub exclusive_lock: bool,
}

impl Default for WriteFlags {
    fn default() -> Self {
        Self {
            exclusive_lock: true,
        }
    }
}

/// Create a directory and any missing ancestors with exactly `mode`
pub fn create_directory(location: &Path, mode: u32) -> io::Result<()> {
    let _umask = UmaskGuard::clear();
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(location)
}

/// Create a directory unless it already exists
pub fn ensure_directory(location: &Path, mode: u32) -> io::Result<()> {
    if directory_exists(location) {
        return Ok(());
    }
    create_directory(location, mode)
}

/// Check if directory exists
pub fn directory_exists(location: &Path) -> bool {
    location.is_dir()
}

/// Write `contents` to `location`, replacing what was there. Returns the bytes written.
pub fn write_file(location: &Path, contents: &[u8], flags: WriteFlags) -> io::Result<u64> {
    let mut file = open_for_write(location, flags)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(contents.len() as u64)
}

/// Copy everything `source` yields into `location`. Returns the bytes written.
///
/// The destination handle is closed before returning; a failing final sync is
/// reported as an error.
pub fn write_stream(location: &Path, source: &mut dyn Read, flags: WriteFlags) -> io::Result<u64> {
    let mut file = open_for_write(location, flags)?;
    let written = io::copy(source, &mut file)?;
    file.flush()?;
    file.sync_all()?;
    Ok(written)
}

fn open_for_write(location: &Path, flags: WriteFlags) -> io::Result<File> {
    // With the lock requested, truncate only once it is held so a concurrent
    // writer never sees a half-truncated file.
    let file = {
        let _creating = umask::hold();
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(!flags.exclusive_lock)
            .open(location)?
    };
    if flags.exclusive_lock {
        file.lock()?;
        file.set_len(0)?;
    }
    Ok(file)
}

/// Permission bits of an entry
#[cfg(unix)]
pub fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
pub fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Apply permission bits to an entry
#[cfg(unix)]
pub fn set_permission_bits(location: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(location, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub fn set_permission_bits(location: &Path, mode: u32) -> io::Result<()> {
    let mut permissions = fs::metadata(location)?.permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(location, permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::TryLockError;
    use std::sync::mpsc;
    use std::thread;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_create_directory_applies_exact_mode() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("open/nested");
        create_directory(&dir, 0o777).unwrap();

        let mode = permission_bits(&fs::metadata(&dir).unwrap());
        assert_eq!(mode, 0o777);
        let parent = permission_bits(&fs::metadata(temp.path().join("open")).unwrap());
        assert_eq!(parent, 0o777);
    }

    #[test]
    fn test_ensure_directory_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        ensure_directory(&dir, 0o755).unwrap();
        ensure_directory(&dir, 0o755).unwrap();
        assert!(directory_exists(&dir));
    }

    #[test]
    fn test_write_file_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        for flags in [WriteFlags::default(), WriteFlags { exclusive_lock: false }] {
            fs::write(&file, b"a much longer previous body").unwrap();
            assert_eq!(write_file(&file, b"short", flags).unwrap(), 5);
            assert_eq!(fs::read(&file).unwrap(), b"short");
        }
    }

    /// Source that signals once it is first read and then waits to be released.
    struct Gate {
        started: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
        body: &'static [u8],
    }

    impl Read for Gate {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.body.is_empty() {
                return Ok(0);
            }
            let _ = self.started.send(());
            let _ = self.release.recv();
            let n = self.body.len().min(buf.len());
            buf[..n].copy_from_slice(&self.body[..n]);
            self.body = &self.body[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_exclusive_lock_is_held_while_writing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("locked.bin");

        for flags in [WriteFlags::default(), WriteFlags { exclusive_lock: false }] {
            let (started_tx, started_rx) = mpsc::channel();
            let (release_tx, release_rx) = mpsc::channel();
            let mut gate = Gate {
                started: started_tx,
                release: release_rx,
                body: b"gated",
            };

            thread::scope(|scope| {
                let writer = scope.spawn(|| write_stream(&file, &mut gate, flags));
                started_rx.recv().unwrap();

                let other = File::open(&file).unwrap();
                let attempt = other.try_lock();
                if flags.exclusive_lock {
                    assert!(matches!(attempt, Err(TryLockError::WouldBlock)));
                } else {
                    assert!(attempt.is_ok());
                    other.unlock().unwrap();
                }

                release_tx.send(()).unwrap();
                assert_eq!(writer.join().unwrap().unwrap(), 5);
                other.try_lock().unwrap();
            });
            assert_eq!(fs::read(&file).unwrap(), b"gated");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_writes_keep_umask_during_directory_creation() {
        let temp = TempDir::new().unwrap();
        let expected = 0o666 & !umask::current_umask();

        thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..300 {
                    create_directory(&temp.path().join(format!("dirs/{i}")), 0o755).unwrap();
                }
            });
            for i in 0..300 {
                let file = temp.path().join(format!("f{i}.txt"));
                write_file(&file, b"x", WriteFlags::default()).unwrap();
                let mode = permission_bits(&fs::metadata(&file).unwrap());
                assert_eq!(mode, expected, "f{i}.txt created with mode {mode:o}");
            }
        });
    }

    #[test]
    fn test_write_stream_copies_source() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("s.bin");
        let mut source: &[u8] = b"streamed";
        let written = write_stream(&file, &mut source, WriteFlags::default()).unwrap();
        assert_eq!(written, 8);
        assert_eq!(fs::read(&file).unwrap(), b"streamed");
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_bits_round_trip() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("p.txt");
        fs::write(&file, b"x").unwrap();
        set_permission_bits(&file, 0o640).unwrap();
        assert_eq!(permission_bits(&fs::metadata(&file).unwrap()), 0o640);
    }
}
