//! Public engine operations.
//!
//! Everything here is synchronous and blocking; callers run long transfers
//! off latency-sensitive threads themselves. Operations against different
//! paths may run concurrently from different threads — the engine holds no
//! shared state. The conflict probes below are check-then-act against other
//! processes mutating the same path; only the rename syscall itself is
//! atomic, and no engine-level locking is attempted.

mod info;
mod preserve;
mod transfer;

use std::ffi::OsString;
use std::path::Path;
use tracing::warn;

use crate::cancel::CancelToken;
use crate::errors::{ErrnoKind, FsError, SyscallError};
use crate::sys;

pub use info::stat;

/// Mode for `create_file`: rw for owner, group and other, before umask.
const CREATE_FILE_MODE: u32 = 0o666;
/// Mode for `create_directory`: rwx for owner, group and other, before umask.
const CREATE_DIRECTORY_MODE: u32 = 0o777;

/// Copy one filesystem entry (regular file, directory node, or symlink) to
/// `to`.
///
/// Regular-file content moves in chunks bounded by `notify_byte_count`; the
/// listener receives the monotone running byte total after each full
/// granularity step plus one final call covering any remainder. A
/// `notify_byte_count` of 0 disables intermediate notification. Cancellation
/// is observed once per chunk and surfaces as [`FsError::Interrupted`],
/// leaving the partial destination in place. Special files are refused with
/// [`FsError::CopySpecialFile`].
pub fn copy(
    from: &Path,
    to: &Path,
    overwrite: bool,
    notify_byte_count: u64,
    listener: Option<&mut dyn FnMut(u64)>,
    cancel: Option<&CancelToken>,
) -> Result<(), FsError> {
    transfer::transfer_entry(from, to, false, overwrite, notify_byte_count, listener, cancel)
}

/// Move one entry.
///
/// Attempts the conflict-checked atomic rename first. On *any* rename
/// failure — deliberately not just a cross-device error — falls back to a
/// copy with full attribute propagation followed by source deletion, so a
/// genuine rename problem can resurface later as a less specific copy error;
/// this matches historical file-manager behavior and is a known sharp edge.
/// Copy runs before delete: an interruption in between leaves two copies,
/// never zero.
pub fn move_entry(
    from: &Path,
    to: &Path,
    overwrite: bool,
    notify_byte_count: u64,
    listener: Option<&mut dyn FnMut(u64)>,
    cancel: Option<&CancelToken>,
) -> Result<(), FsError> {
    match rename_with_overwrite(from, to, overwrite) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(
                from = %from.display(),
                to = %to.display(),
                error = %e,
                "rename failed, falling back to copy+delete"
            );
            transfer::transfer_entry(from, to, true, overwrite, notify_byte_count, listener, cancel)?;
            delete(from)
        }
    }
}

/// Conflict-checked rename; overwriting an existing destination is refused.
pub fn rename(from: &Path, to: &Path) -> Result<(), FsError> {
    rename_with_overwrite(from, to, false).map_err(FsError::Rename)
}

/// Rename Guard. When overwrite is disallowed the destination is probed with
/// a non-following stat first, so the conflict does not depend on
/// OS-specific rename-onto-target behavior differing by entry type.
fn rename_with_overwrite(from: &Path, to: &Path, overwrite: bool) -> Result<(), SyscallError> {
    if !overwrite {
        match sys::lstat(to) {
            Ok(_) => return Err(SyscallError::from_raw_os_error("rename", libc::EEXIST)),
            Err(e) if e.kind() == ErrnoKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    sys::rename(from, to)
}

/// Create an empty regular file with mode 0666 (before umask); fails if the
/// path already exists.
pub fn create_file(path: &Path) -> Result<(), FsError> {
    // The descriptor is dropped immediately; creating the entry is the point.
    sys::create_file(path, false, CREATE_FILE_MODE)
        .map(drop)
        .map_err(FsError::CreateFile)
}

/// Create a directory with mode 0777 (before umask).
pub fn create_directory(path: &Path) -> Result<(), FsError> {
    sys::mkdir(path, CREATE_DIRECTORY_MODE).map_err(FsError::CreateDirectory)
}

/// Remove a single entry: a file, a symlink, or an empty directory. Never
/// recursive.
pub fn delete(path: &Path) -> Result<(), FsError> {
    sys::remove(path).map_err(FsError::Delete)
}

/// Immediate child names of a directory, in OS directory order (not sorted).
pub fn list_children(path: &Path) -> Result<Vec<OsString>, FsError> {
    sys::list_dir(path).map_err(FsError::List)
}
