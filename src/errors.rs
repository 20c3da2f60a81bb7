//! Typed error definitions for fs_entry.
//! Two layers: a syscall-level error that preserves the raw OS code and the
//! name of the failing call, and the domain error that crosses the crate
//! boundary with an enumerable operation kind.

use std::io;
use thiserror::Error;

/// Closed set of OS error conditions the engine branches on.
/// Raw errno values are mapped here, once, so the rest of the crate never
/// compares magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrnoKind {
    AlreadyExists,
    NotFound,
    IsADirectory,
    NotADirectory,
    DirectoryNotEmpty,
    CrossDevice,
    PermissionDenied,
    Other,
}

impl ErrnoKind {
    pub fn from_raw(code: i32) -> Self {
        match code {
            libc::EEXIST => Self::AlreadyExists,
            libc::ENOENT => Self::NotFound,
            libc::EISDIR => Self::IsADirectory,
            libc::ENOTDIR => Self::NotADirectory,
            libc::ENOTEMPTY => Self::DirectoryNotEmpty,
            libc::EXDEV => Self::CrossDevice,
            libc::EACCES | libc::EPERM => Self::PermissionDenied,
            _ => Self::Other,
        }
    }
}

/// A failed OS call: which operation failed, plus the underlying `io::Error`
/// with its raw code intact. `suppressed` keeps the first failure around when
/// a cleanup/retry path fails afterwards, so diagnostics see both.
#[derive(Debug, Error)]
#[error("{op}: {source}")]
pub struct SyscallError {
    op: &'static str,
    #[source]
    source: io::Error,
    suppressed: Option<Box<SyscallError>>,
}

impl SyscallError {
    pub(crate) fn new(op: &'static str, source: io::Error) -> Self {
        Self {
            op,
            source,
            suppressed: None,
        }
    }

    /// Capture errno immediately after a failed libc call.
    pub(crate) fn last_os_error(op: &'static str) -> Self {
        Self::new(op, io::Error::last_os_error())
    }

    /// Synthesize an error from a known errno value, e.g. the refused
    /// symlink-over-directory overwrite or the rename conflict probe.
    pub(crate) fn from_raw_os_error(op: &'static str, code: i32) -> Self {
        Self::new(op, io::Error::from_raw_os_error(code))
    }

    /// Attach the failure that triggered a retry whose own error is `self`.
    pub(crate) fn with_suppressed(mut self, earlier: SyscallError) -> Self {
        self.suppressed = Some(Box::new(earlier));
        self
    }

    /// Name of the failing OS call.
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Raw OS error code, when the failure originated from the OS.
    pub fn os_error(&self) -> Option<i32> {
        self.source.raw_os_error()
    }

    pub fn kind(&self) -> ErrnoKind {
        self.os_error().map_or(ErrnoKind::Other, ErrnoKind::from_raw)
    }

    /// Earlier failure preserved from a cleanup/retry path, if any.
    pub fn suppressed(&self) -> Option<&SyscallError> {
        self.suppressed.as_deref()
    }
}

/// Domain error crossing the engine boundary. Each variant names the
/// high-level operation that failed, so a presentation layer can pick a
/// user-facing message without inspecting OS codes.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("failed to read file information")]
    Information(#[source] SyscallError),

    #[error("failed to copy file")]
    Copy(#[source] SyscallError),

    /// Devices, FIFOs and sockets are not transferable by this engine.
    #[error("cannot copy special file")]
    CopySpecialFile,

    #[error("failed to create file")]
    CreateFile(#[source] SyscallError),

    #[error("failed to create directory")]
    CreateDirectory(#[source] SyscallError),

    #[error("failed to delete file")]
    Delete(#[source] SyscallError),

    #[error("failed to rename file")]
    Rename(#[source] SyscallError),

    #[error("failed to list directory")]
    List(#[source] SyscallError),

    /// Cooperative cancellation observed mid-transfer. Not an I/O failure;
    /// callers must branch on it before any generic error handling.
    #[error("operation interrupted")]
    Interrupted,
}

/// Enumerable kind for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    Information,
    Copy,
    CopySpecialFile,
    CreateFile,
    CreateDirectory,
    Delete,
    Rename,
    List,
    Interrupted,
}

impl FsError {
    pub fn kind(&self) -> FsErrorKind {
        match self {
            FsError::Information(_) => FsErrorKind::Information,
            FsError::Copy(_) => FsErrorKind::Copy,
            FsError::CopySpecialFile => FsErrorKind::CopySpecialFile,
            FsError::CreateFile(_) => FsErrorKind::CreateFile,
            FsError::CreateDirectory(_) => FsErrorKind::CreateDirectory,
            FsError::Delete(_) => FsErrorKind::Delete,
            FsError::Rename(_) => FsErrorKind::Rename,
            FsError::List(_) => FsErrorKind::List,
            FsError::Interrupted => FsErrorKind::Interrupted,
        }
    }

    /// The wrapped syscall failure, when there is one.
    pub fn syscall_error(&self) -> Option<&SyscallError> {
        match self {
            FsError::Information(e)
            | FsError::Copy(e)
            | FsError::CreateFile(e)
            | FsError::CreateDirectory(e)
            | FsError::Delete(e)
            | FsError::Rename(e)
            | FsError::List(e) => Some(e),
            FsError::CopySpecialFile | FsError::Interrupted => None,
        }
    }

    /// Raw OS code of the underlying syscall failure, when applicable.
    pub fn os_error(&self) -> Option<i32> {
        self.syscall_error().and_then(SyscallError::os_error)
    }
}
