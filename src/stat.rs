//! File types, permission bits and attribute snapshots.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// What kind of entry a raw mode value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Directory,
    CharacterDevice,
    BlockDevice,
    RegularFile,
    Fifo,
    SymbolicLink,
    Socket,
    /// Fallback for bit patterns no known format constant matches.
    Unknown,
}

impl FileType {
    /// Classify raw `st_mode` bits. Total and pure; only one format should
    /// ever match in practice, and the check order below is the tie-break
    /// contract if a filesystem ever reports an ambiguous mode.
    pub fn from_mode(mode: u32) -> Self {
        let fmt = mode & libc::S_IFMT as u32;
        if fmt == libc::S_IFDIR as u32 {
            FileType::Directory
        } else if fmt == libc::S_IFCHR as u32 {
            FileType::CharacterDevice
        } else if fmt == libc::S_IFBLK as u32 {
            FileType::BlockDevice
        } else if fmt == libc::S_IFREG as u32 {
            FileType::RegularFile
        } else if fmt == libc::S_IFIFO as u32 {
            FileType::Fifo
        } else if fmt == libc::S_IFLNK as u32 {
            FileType::SymbolicLink
        } else if fmt == libc::S_IFSOCK as u32 {
            FileType::Socket
        } else {
            FileType::Unknown
        }
    }
}

/// Permission bits of a mode value: rwx for owner/group/other plus
/// set-uid, set-gid and sticky.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    pub const SET_UID: FileMode = FileMode(0o4000);
    pub const SET_GID: FileMode = FileMode(0o2000);
    pub const STICKY: FileMode = FileMode(0o1000);
    pub const OWNER_READ: FileMode = FileMode(0o400);
    pub const OWNER_WRITE: FileMode = FileMode(0o200);
    pub const OWNER_EXECUTE: FileMode = FileMode(0o100);
    pub const GROUP_READ: FileMode = FileMode(0o040);
    pub const GROUP_WRITE: FileMode = FileMode(0o020);
    pub const GROUP_EXECUTE: FileMode = FileMode(0o010);
    pub const OTHERS_READ: FileMode = FileMode(0o004);
    pub const OTHERS_WRITE: FileMode = FileMode(0o002);
    pub const OTHERS_EXECUTE: FileMode = FileMode(0o001);

    /// Keep only the permission bits of a raw `st_mode`.
    pub fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: FileMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Debug for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileMode({:04o})", self.0)
    }
}

/// Owning user or group of an entry. Name resolution is best-effort; an
/// orphaned id (account since deleted) is a legitimate state and leaves
/// `name` empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: u32,
    pub name: Option<String>,
}

/// Immutable attribute snapshot of one filesystem entry, taken at call time.
///
/// For symlinks the snapshot describes the link target when the following
/// stat succeeded (`is_symlink_stat`), and the link itself otherwise (broken
/// link). `symbolic_link_target` is present exactly when `is_symbolic_link`
/// is true, independent of whether following the link worked.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStat {
    /// True when the metadata below was obtained by following a symlink.
    /// Implies `is_symbolic_link`.
    pub is_symlink_stat: bool,
    pub file_type: FileType,
    pub mode: FileMode,
    pub owner: Principal,
    pub group: Principal,
    pub size: u64,
    /// Modification time at second + nanosecond resolution.
    pub last_modification_time: SystemTime,
    /// True when the path itself is a symlink.
    pub is_symbolic_link: bool,
    pub symbolic_link_target: Option<PathBuf>,
}
