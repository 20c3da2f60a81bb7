//! Syscall boundary.
//!
//! Thin typed wrappers around the OS calls the engine is built on. Every
//! wrapper names its operation and preserves the raw error code inside
//! [`SyscallError`]; nothing above this module touches errno directly.
//! Short reads/writes interrupted by signals are retried here so callers see
//! EINTR only when it is genuine.

use std::ffi::{CStr, CString, OsStr, OsString};
use std::io;
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use std::ptr;

use crate::errors::SyscallError;

fn cstr(op: &'static str, path: &Path) -> Result<CString, SyscallError> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        SyscallError::new(
            op,
            io::Error::new(io::ErrorKind::InvalidInput, "path contains an interior NUL byte"),
        )
    })
}

/// Non-following stat: reports a symlink itself.
pub(crate) fn lstat(path: &Path) -> Result<libc::stat, SyscallError> {
    let c = cstr("lstat", path)?;
    let mut buf = MaybeUninit::<libc::stat>::uninit();
    if unsafe { libc::lstat(c.as_ptr(), buf.as_mut_ptr()) } != 0 {
        return Err(SyscallError::last_os_error("lstat"));
    }
    Ok(unsafe { buf.assume_init() })
}

/// Following stat: resolves a symlink to its target.
pub(crate) fn stat(path: &Path) -> Result<libc::stat, SyscallError> {
    let c = cstr("stat", path)?;
    let mut buf = MaybeUninit::<libc::stat>::uninit();
    if unsafe { libc::stat(c.as_ptr(), buf.as_mut_ptr()) } != 0 {
        return Err(SyscallError::last_os_error("stat"));
    }
    Ok(unsafe { buf.assume_init() })
}

pub(crate) fn open_read(path: &Path) -> Result<OwnedFd, SyscallError> {
    let c = cstr("open", path)?;
    let fd = unsafe { libc::open(c.as_ptr(), libc::O_RDONLY | libc::O_CLOEXEC) };
    if fd < 0 {
        return Err(SyscallError::last_os_error("open"));
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Create a regular file for writing with the given permission bits as its
/// initial mode (still subject to the umask). Exclusive unless `overwrite`;
/// with `overwrite` an existing file is truncated. The returned `OwnedFd`
/// closes on every exit path.
pub(crate) fn create_file(path: &Path, overwrite: bool, mode: u32) -> Result<OwnedFd, SyscallError> {
    let c = cstr("open", path)?;
    let mut flags = libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC | libc::O_CLOEXEC;
    if !overwrite {
        flags |= libc::O_EXCL;
    }
    let fd = unsafe { libc::open(c.as_ptr(), flags, mode as libc::c_uint) };
    if fd < 0 {
        return Err(SyscallError::last_os_error("open"));
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// In-kernel bulk copy of up to `len` bytes between two regular-file
/// descriptors. Returns the number of bytes moved; 0 means EOF. Filesystems
/// that do not support it fail with ENOSYS/EINVAL/EXDEV/EPERM and the caller
/// falls back to [`copy_chunk_rw`].
#[cfg(target_os = "linux")]
pub(crate) fn copy_file_range_chunk(
    from: &OwnedFd,
    to: &OwnedFd,
    len: u64,
) -> Result<u64, SyscallError> {
    let want = usize::try_from(len).unwrap_or(usize::MAX);
    loop {
        let rc = unsafe {
            libc::copy_file_range(
                from.as_raw_fd(),
                ptr::null_mut(),
                to.as_raw_fd(),
                ptr::null_mut(),
                want,
                0,
            )
        };
        if rc >= 0 {
            return Ok(rc as u64);
        }
        let err = SyscallError::last_os_error("copy_file_range");
        if err.os_error() != Some(libc::EINTR) {
            return Err(err);
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn copy_file_range_chunk(
    _from: &OwnedFd,
    _to: &OwnedFd,
    _len: u64,
) -> Result<u64, SyscallError> {
    Err(SyscallError::from_raw_os_error("copy_file_range", libc::ENOSYS))
}

/// Userspace fallback chunk: one read into `buf` and a full write-out.
/// Returns the number of bytes moved; 0 means EOF.
pub(crate) fn copy_chunk_rw(
    from: &OwnedFd,
    to: &OwnedFd,
    buf: &mut [u8],
) -> Result<u64, SyscallError> {
    let n = loop {
        let rc = unsafe { libc::read(from.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
        if rc >= 0 {
            break rc as usize;
        }
        let err = SyscallError::last_os_error("read");
        if err.os_error() != Some(libc::EINTR) {
            return Err(err);
        }
    };
    let mut written = 0usize;
    while written < n {
        let rc = unsafe {
            libc::write(
                to.as_raw_fd(),
                buf[written..].as_ptr().cast(),
                n - written,
            )
        };
        if rc >= 0 {
            written += rc as usize;
            continue;
        }
        let err = SyscallError::last_os_error("write");
        if err.os_error() != Some(libc::EINTR) {
            return Err(err);
        }
    }
    Ok(n as u64)
}

pub(crate) fn mkdir(path: &Path, mode: u32) -> Result<(), SyscallError> {
    let c = cstr("mkdir", path)?;
    if unsafe { libc::mkdir(c.as_ptr(), mode as libc::mode_t) } != 0 {
        return Err(SyscallError::last_os_error("mkdir"));
    }
    Ok(())
}

pub(crate) fn symlink(target: &Path, link: &Path) -> Result<(), SyscallError> {
    let t = cstr("symlink", target)?;
    let l = cstr("symlink", link)?;
    if unsafe { libc::symlink(t.as_ptr(), l.as_ptr()) } != 0 {
        return Err(SyscallError::last_os_error("symlink"));
    }
    Ok(())
}

pub(crate) fn readlink(path: &Path) -> Result<PathBuf, SyscallError> {
    let c = cstr("readlink", path)?;
    let mut buf = vec![0u8; 256];
    loop {
        let rc = unsafe { libc::readlink(c.as_ptr(), buf.as_mut_ptr().cast(), buf.len()) };
        if rc < 0 {
            return Err(SyscallError::last_os_error("readlink"));
        }
        let n = rc as usize;
        // A full buffer may mean truncation; grow and retry.
        if n < buf.len() {
            buf.truncate(n);
            return Ok(PathBuf::from(OsString::from_vec(buf)));
        }
        let doubled = buf.len() * 2;
        buf.resize(doubled, 0);
    }
}

pub(crate) fn rename(from: &Path, to: &Path) -> Result<(), SyscallError> {
    let f = cstr("rename", from)?;
    let t = cstr("rename", to)?;
    if unsafe { libc::rename(f.as_ptr(), t.as_ptr()) } != 0 {
        return Err(SyscallError::last_os_error("rename"));
    }
    Ok(())
}

/// remove(3): unlinks a file or symlink, removes an empty directory.
pub(crate) fn remove(path: &Path) -> Result<(), SyscallError> {
    let c = cstr("remove", path)?;
    if unsafe { libc::remove(c.as_ptr()) } != 0 {
        return Err(SyscallError::last_os_error("remove"));
    }
    Ok(())
}

pub(crate) fn chmod(path: &Path, mode: u32) -> Result<(), SyscallError> {
    let c = cstr("chmod", path)?;
    if unsafe { libc::chmod(c.as_ptr(), mode as libc::mode_t) } != 0 {
        return Err(SyscallError::last_os_error("chmod"));
    }
    Ok(())
}

/// chown that does not follow symlinks, so a moved link keeps its own owner.
pub(crate) fn lchown(path: &Path, uid: u32, gid: u32) -> Result<(), SyscallError> {
    let c = cstr("lchown", path)?;
    if unsafe { libc::lchown(c.as_ptr(), uid as libc::uid_t, gid as libc::gid_t) } != 0 {
        return Err(SyscallError::last_os_error("lchown"));
    }
    Ok(())
}

/// Set timestamps without following symlinks. `atime == None` leaves the
/// access time untouched (UTIME_OMIT).
pub(crate) fn lutimens(
    path: &Path,
    atime: Option<libc::timespec>,
    mtime: libc::timespec,
) -> Result<(), SyscallError> {
    let c = cstr("utimensat", path)?;
    let times = [
        atime.unwrap_or(libc::timespec {
            tv_sec: 0,
            tv_nsec: libc::UTIME_OMIT,
        }),
        mtime,
    ];
    let rc = unsafe {
        libc::utimensat(
            libc::AT_FDCWD,
            c.as_ptr(),
            times.as_ptr(),
            libc::AT_SYMLINK_NOFOLLOW,
        )
    };
    if rc != 0 {
        return Err(SyscallError::last_os_error("utimensat"));
    }
    Ok(())
}

/// Immediate child names in whatever order the OS returns them.
pub(crate) fn list_dir(path: &Path) -> Result<Vec<OsString>, SyscallError> {
    let entries = std::fs::read_dir(path).map_err(|e| SyscallError::new("opendir", e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SyscallError::new("readdir", e))?;
        names.push(entry.file_name());
    }
    Ok(names)
}

/// Extended attribute names of the entry itself (symlinks not followed).
pub(crate) fn list_xattrs(path: &Path) -> Result<Vec<OsString>, SyscallError> {
    let names = xattr::list(path).map_err(|e| SyscallError::new("llistxattr", e))?;
    Ok(names.collect())
}

pub(crate) fn get_xattr(path: &Path, name: &OsStr) -> Result<Option<Vec<u8>>, SyscallError> {
    xattr::get(path, name).map_err(|e| SyscallError::new("lgetxattr", e))
}

pub(crate) fn set_xattr(path: &Path, name: &OsStr, value: &[u8]) -> Result<(), SyscallError> {
    xattr::set(path, name, value).map_err(|e| SyscallError::new("lsetxattr", e))
}

/// Account name for a uid. `Ok(None)` when no such account exists, which is
/// a legitimate state for a file owned by a deleted user.
pub(crate) fn user_name_by_uid(uid: u32) -> Result<Option<String>, SyscallError> {
    let mut buf = vec![0u8; 512];
    let mut pwd = MaybeUninit::<libc::passwd>::uninit();
    loop {
        let mut result: *mut libc::passwd = ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(
                uid as libc::uid_t,
                pwd.as_mut_ptr(),
                buf.as_mut_ptr().cast(),
                buf.len(),
                &mut result,
            )
        };
        if rc == 0 {
            if result.is_null() {
                return Ok(None);
            }
            let name = unsafe { CStr::from_ptr((*result).pw_name) };
            return Ok(Some(name.to_string_lossy().into_owned()));
        }
        if rc == libc::ERANGE {
            let doubled = buf.len() * 2;
            buf.resize(doubled, 0);
            continue;
        }
        return Err(SyscallError::new("getpwuid_r", io::Error::from_raw_os_error(rc)));
    }
}

/// Group name for a gid; same contract as [`user_name_by_uid`].
pub(crate) fn group_name_by_gid(gid: u32) -> Result<Option<String>, SyscallError> {
    let mut buf = vec![0u8; 512];
    let mut grp = MaybeUninit::<libc::group>::uninit();
    loop {
        let mut result: *mut libc::group = ptr::null_mut();
        let rc = unsafe {
            libc::getgrgid_r(
                gid as libc::gid_t,
                grp.as_mut_ptr(),
                buf.as_mut_ptr().cast(),
                buf.len(),
                &mut result,
            )
        };
        if rc == 0 {
            if result.is_null() {
                return Ok(None);
            }
            let name = unsafe { CStr::from_ptr((*result).gr_name) };
            return Ok(Some(name.to_string_lossy().into_owned()));
        }
        if rc == libc::ERANGE {
            let doubled = buf.len() * 2;
            buf.resize(doubled, 0);
            continue;
        }
        return Err(SyscallError::new("getgrgid_r", io::Error::from_raw_os_error(rc)));
    }
}
