//! Attribute Resolver.
//!
//! Builds the immutable [`FileStat`] snapshot for a path: non-following stat
//! first, then link target and following stat for symlinks, with best-effort
//! owner/group name resolution.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::errors::FsError;
use crate::stat::{FileMode, FileStat, FileType, Principal};
use crate::sys;

/// Query the full attributes of `path`.
///
/// The entry is always inspected with a non-following stat first. For a
/// symlink the link target is read (failure is fatal) and a following stat is
/// attempted; when the target is gone the snapshot keeps the link's own
/// metadata with `is_symlink_stat == false` and the target string retained.
/// Owner and group name lookups are independently best-effort: a file owned
/// by a deleted account is a valid state, so lookup failures are logged and
/// swallowed.
pub fn stat(path: &Path) -> Result<FileStat, FsError> {
    let mut st = sys::lstat(path).map_err(FsError::Information)?;

    let is_symbolic_link = FileType::from_mode(st.st_mode as u32) == FileType::SymbolicLink;
    let mut symbolic_link_target = None;
    let mut is_symlink_stat = false;
    if is_symbolic_link {
        symbolic_link_target = Some(sys::readlink(path).map_err(FsError::Information)?);
        match sys::stat(path) {
            Ok(target_st) => {
                st = target_st;
                is_symlink_stat = true;
            }
            Err(e) => {
                // Broken link: still presentable via the link's own metadata.
                warn!(
                    path = %path.display(),
                    error = %e,
                    "stat on symlink target failed; reporting the link itself"
                );
            }
        }
    }

    let owner = Principal {
        id: st.st_uid,
        name: owner_name(path, st.st_uid),
    };
    let group = Principal {
        id: st.st_gid,
        name: group_name(path, st.st_gid),
    };

    Ok(FileStat {
        is_symlink_stat,
        file_type: FileType::from_mode(st.st_mode as u32),
        mode: FileMode::from_mode(st.st_mode as u32),
        owner,
        group,
        size: st.st_size as u64,
        last_modification_time: timestamp(st.st_mtime as i64, st.st_mtime_nsec as i64),
        is_symbolic_link,
        symbolic_link_target,
    })
}

fn owner_name(path: &Path, uid: u32) -> Option<String> {
    match sys::user_name_by_uid(uid) {
        Ok(name) => name,
        Err(e) => {
            warn!(path = %path.display(), uid, error = %e, "owner name lookup failed");
            None
        }
    }
}

fn group_name(path: &Path, gid: u32) -> Option<String> {
    match sys::group_name_by_gid(gid) {
        Ok(name) => name,
        Err(e) => {
            warn!(path = %path.display(), gid, error = %e, "group name lookup failed");
            None
        }
    }
}

fn timestamp(sec: i64, nsec: i64) -> SystemTime {
    let nanos = nsec as u32;
    if sec >= 0 {
        UNIX_EPOCH + Duration::new(sec as u64, nanos)
    } else {
        // Pre-epoch timespec: seconds are rounded down, nanoseconds add back.
        UNIX_EPOCH - Duration::from_secs(sec.unsigned_abs()) + Duration::new(0, nanos)
    }
}
