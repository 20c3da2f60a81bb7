//! Core library for `fs-entry`.
//!
//! A low-level POSIX file-transfer and metadata engine operating on one
//! filesystem entry at a time: attribute snapshots ([`stat`]), single-entry
//! [`copy`] and [`move_entry`] with overwrite control, chunked progress and
//! cooperative cancellation, conflict-checked [`rename`], plus
//! create/delete/list primitives. Tree traversal is a caller responsibility
//! built by repeated invocation.
//!
//! All operations block the calling thread and hold no shared engine state;
//! fatal failures surface as [`FsError`] with an enumerable kind and the raw
//! OS error code, while post-transfer attribute propagation and name lookups
//! are best-effort and only logged (via `tracing`).
//!
//! ```no_run
//! use std::path::Path;
//! use fs_entry::{CancelToken, FsError};
//!
//! fn demo() -> Result<(), FsError> {
//!     let info = fs_entry::stat(Path::new("/etc/hosts"))?;
//!     println!("{:?} {} bytes", info.file_type, info.size);
//!
//!     let cancel = CancelToken::new();
//!     let mut report = |done: u64| eprintln!("{done} bytes copied");
//!     fs_entry::copy(
//!         Path::new("/etc/hosts"),
//!         Path::new("/tmp/hosts.bak"),
//!         true,
//!         1024 * 1024,
//!         Some(&mut report),
//!         Some(&cancel),
//!     )?;
//!     Ok(())
//! }
//! ```

#[cfg(not(unix))]
compile_error!("fs-entry only supports Unix targets");

mod cancel;
mod errors;
mod ops;
mod stat;
mod sys;

pub use cancel::CancelToken;
pub use errors::{ErrnoKind, FsError, FsErrorKind, SyscallError};
pub use ops::{copy, create_directory, create_file, delete, list_children, move_entry, rename, stat};
pub use stat::{FileMode, FileStat, FileType, Principal};
