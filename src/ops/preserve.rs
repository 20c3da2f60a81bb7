//! Attribute Preserver.
//!
//! Post-transfer propagation of ownership, mode, timestamps and extended
//! attributes. Every step is best-effort: the helpers return `Result` so the
//! non-fatal contract is visible in the type, and `propagate` logs and
//! discards each failure before moving on to the next step.

use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::warn;

use crate::errors::SyscallError;
use crate::stat::FileType;
use crate::sys;

/// Namespace of extended attributes writable by unprivileged users.
const USER_XATTR_PREFIX: &[u8] = b"user.";

/// Propagate source attributes onto a freshly transferred destination.
/// Steps run in a strict order: ownership before permissions, because
/// set-uid/set-gid/sticky restoration only holds once the owner is right and
/// a chown may clear those bits.
pub(crate) fn propagate(from: &Path, to: &Path, from_st: &libc::stat, for_move: bool) {
    if for_move {
        if let Err(e) = sys::lchown(to, from_st.st_uid, from_st.st_gid) {
            warn!(path = %to.display(), error = %e, "failed to preserve ownership");
        }
    }
    if FileType::from_mode(from_st.st_mode as u32) != FileType::SymbolicLink {
        if let Err(e) = sys::chmod(to, from_st.st_mode as u32 & 0o7777) {
            warn!(path = %to.display(), error = %e, "failed to preserve mode");
        }
    }
    if let Err(e) = restore_times(to, from_st, for_move) {
        warn!(path = %to.display(), error = %e, "failed to preserve timestamps");
    }
    copy_xattrs(from, to, for_move);
}

/// The modification time always carries over; the access time only on a
/// move, since a copy is itself a fresh access.
fn restore_times(to: &Path, from_st: &libc::stat, for_move: bool) -> Result<(), SyscallError> {
    let atime = for_move.then(|| timespec(from_st.st_atime as i64, from_st.st_atime_nsec as i64));
    sys::lutimens(
        to,
        atime,
        timespec(from_st.st_mtime as i64, from_st.st_mtime_nsec as i64),
    )
}

fn timespec(sec: i64, nsec: i64) -> libc::timespec {
    libc::timespec {
        tv_sec: sec as libc::time_t,
        tv_nsec: nsec as _,
    }
}

fn copy_xattrs(from: &Path, to: &Path, for_move: bool) {
    let names = match sys::list_xattrs(from) {
        Ok(names) => names,
        Err(e) => {
            warn!(path = %from.display(), error = %e, "failed to list extended attributes");
            return;
        }
    };
    for name in names {
        // A copy only replicates user-namespace attributes; a move carries
        // every namespace over.
        if !for_move && !name.as_bytes().starts_with(USER_XATTR_PREFIX) {
            continue;
        }
        let value = match sys::get_xattr(from, &name) {
            Ok(Some(value)) => value,
            Ok(None) => {
                // Listed but gone by read time; nothing to carry over.
                warn!(
                    path = %from.display(),
                    xattr = %name.to_string_lossy(),
                    "extended attribute vanished before it could be read"
                );
                continue;
            }
            Err(e) => {
                warn!(
                    path = %from.display(),
                    xattr = %name.to_string_lossy(),
                    error = %e,
                    "failed to read extended attribute"
                );
                continue;
            }
        };
        if let Err(e) = sys::set_xattr(to, &name, &value) {
            warn!(
                path = %to.display(),
                xattr = %name.to_string_lossy(),
                error = %e,
                "failed to set extended attribute"
            );
        }
    }
}
