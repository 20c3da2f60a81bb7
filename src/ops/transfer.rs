//! Transfer Engine.
//!
//! Copies exactly one filesystem entry to a destination: chunked content
//! transfer with progress and cooperative cancellation for regular files, an
//! equivalent node for directories and symlinks, and a refusal for special
//! files. After a successful transfer, attribute propagation runs as an
//! unconditional best-effort post-step.

use std::os::fd::OwnedFd;
use std::path::Path;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::errors::{ErrnoKind, FsError, SyscallError};
use crate::stat::FileType;
use crate::sys;

use super::preserve;

/// Internal chunk size when the caller disables progress notification, and
/// the cap for the read/write fallback buffer.
const DEFAULT_CHUNK: u64 = 1024 * 1024;

pub(crate) fn transfer_entry(
    from: &Path,
    to: &Path,
    for_move: bool,
    overwrite: bool,
    notify_byte_count: u64,
    listener: Option<&mut dyn FnMut(u64)>,
    cancel: Option<&CancelToken>,
) -> Result<(), FsError> {
    let from_st = sys::lstat(from).map_err(FsError::Copy)?;
    let mode = from_st.st_mode as u32;

    match FileType::from_mode(mode) {
        FileType::RegularFile => {
            copy_regular(from, to, mode, overwrite, notify_byte_count, listener, cancel)?;
        }
        FileType::Directory => copy_directory_node(to, mode, overwrite)?,
        FileType::SymbolicLink => copy_symlink_node(from, to, overwrite)?,
        _ => return Err(FsError::CopySpecialFile),
    }

    // Attribute failures are logged inside and never fail the transfer.
    preserve::propagate(from, to, &from_st, for_move);
    Ok(())
}

fn copy_regular(
    from: &Path,
    to: &Path,
    mode: u32,
    overwrite: bool,
    notify_byte_count: u64,
    mut listener: Option<&mut dyn FnMut(u64)>,
    cancel: Option<&CancelToken>,
) -> Result<(), FsError> {
    let from_fd = sys::open_read(from).map_err(FsError::Copy)?;
    let to_fd = sys::create_file(to, overwrite, mode & 0o7777).map_err(FsError::Copy)?;

    let chunk = if notify_byte_count == 0 {
        DEFAULT_CHUNK
    } else {
        notify_byte_count
    };
    let mut copied: u64 = 0;
    let mut unnotified: u64 = 0;
    let result = copy_loop(
        &from_fd,
        &to_fd,
        chunk,
        notify_byte_count,
        &mut copied,
        &mut unnotified,
        &mut listener,
        cancel,
    );
    // The last partial chunk is reported even when the loop exits early on an
    // error or a cancellation.
    if unnotified > 0 {
        if let Some(listener) = listener.as_mut() {
            listener(copied);
        }
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn copy_loop(
    from_fd: &OwnedFd,
    to_fd: &OwnedFd,
    chunk: u64,
    notify_byte_count: u64,
    copied: &mut u64,
    unnotified: &mut u64,
    listener: &mut Option<&mut dyn FnMut(u64)>,
    cancel: Option<&CancelToken>,
) -> Result<(), FsError> {
    // Allocated only once copy_file_range turns out to be unavailable.
    let mut rw_buf: Option<Vec<u8>> = None;
    loop {
        let sent = match &mut rw_buf {
            Some(buf) => sys::copy_chunk_rw(from_fd, to_fd, buf).map_err(FsError::Copy)?,
            None => match sys::copy_file_range_chunk(from_fd, to_fd, chunk) {
                Ok(n) => n,
                Err(e) if *copied == 0 && copy_range_unsupported(&e) => {
                    debug!(error = %e, "copy_file_range unavailable; using read/write");
                    rw_buf = Some(vec![0u8; chunk.min(DEFAULT_CHUNK) as usize]);
                    continue;
                }
                Err(e) => return Err(FsError::Copy(e)),
            },
        };
        if sent == 0 {
            return Ok(());
        }
        *copied += sent;
        *unnotified += sent;
        if notify_byte_count > 0 && *unnotified >= notify_byte_count {
            if let Some(listener) = listener.as_mut() {
                listener(*copied);
            }
            *unnotified = 0;
        }
        // Checked once per chunk; the partial destination stays in place and
        // cleanup is the caller's decision.
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(FsError::Interrupted);
        }
    }
}

fn copy_range_unsupported(e: &SyscallError) -> bool {
    matches!(
        e.os_error(),
        Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EPERM)
    )
}

fn copy_directory_node(to: &Path, mode: u32, overwrite: bool) -> Result<(), FsError> {
    match sys::mkdir(to, mode & 0o7777) {
        Ok(()) => Ok(()),
        Err(e) if overwrite && e.kind() == ErrnoKind::AlreadyExists => {
            replace_with_directory(to, mode).map_err(|retry| FsError::Copy(retry.with_suppressed(e)))
        }
        Err(e) => Err(FsError::Copy(e)),
    }
}

/// An existing directory satisfies a directory copy as-is; anything else is
/// removed and the mkdir retried once.
fn replace_with_directory(to: &Path, mode: u32) -> Result<(), SyscallError> {
    let to_st = sys::lstat(to)?;
    if FileType::from_mode(to_st.st_mode as u32) == FileType::Directory {
        return Ok(());
    }
    sys::remove(to)?;
    sys::mkdir(to, mode & 0o7777)
}

fn copy_symlink_node(from: &Path, to: &Path, overwrite: bool) -> Result<(), FsError> {
    let target = sys::readlink(from).map_err(FsError::Copy)?;
    match sys::symlink(&target, to) {
        Ok(()) => Ok(()),
        Err(e) if overwrite && e.kind() == ErrnoKind::AlreadyExists => {
            replace_with_symlink(&target, to).map_err(|retry| FsError::Copy(retry.with_suppressed(e)))
        }
        Err(e) => Err(FsError::Copy(e)),
    }
}

/// A directory is never replaced by a symlink; anything else is removed and
/// the symlink retried once.
fn replace_with_symlink(target: &Path, to: &Path) -> Result<(), SyscallError> {
    let to_st = sys::lstat(to)?;
    if FileType::from_mode(to_st.st_mode as u32) == FileType::Directory {
        return Err(SyscallError::from_raw_os_error("symlink", libc::EISDIR));
    }
    sys::remove(to)?;
    sys::symlink(target, to)
}
