#![cfg(target_os = "linux")]

//! Exercises the copy+delete move fallback across real filesystem
//! boundaries. Uses /dev/shm (tmpfs) against the regular temp dir and skips
//! when the environment mounts both on the same device.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::PathBuf;

use filetime::FileTime;
use tempfile::{Builder, tempdir};

fn shm_dir() -> Option<tempfile::TempDir> {
    let shm = PathBuf::from("/dev/shm");
    if !shm.is_dir() {
        return None;
    }
    Builder::new().prefix("fs-entry-xdev").tempdir_in(shm).ok()
}

#[test]
fn move_falls_back_to_copy_across_devices() {
    let Some(shm) = shm_dir() else {
        eprintln!("skipping: no /dev/shm");
        return;
    };
    let td = tempdir().unwrap();
    let same_dev = fs::metadata(shm.path()).unwrap().dev() == fs::metadata(td.path()).unwrap().dev();
    if same_dev {
        eprintln!("skipping: temp dir and /dev/shm share a filesystem");
        return;
    }

    let from = shm.path().join("src.bin");
    let to = td.path().join("dst.bin");
    let data: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    fs::write(&from, &data).unwrap();
    fs::set_permissions(&from, fs::Permissions::from_mode(0o640)).unwrap();

    let mut totals: Vec<u64> = Vec::new();
    let mut listener = |done: u64| totals.push(done);
    fs_entry::move_entry(&from, &to, false, 16 * 1024, Some(&mut listener), None)
        .expect("cross-device move");

    assert!(!from.exists(), "source deleted after the fallback copy");
    assert_eq!(fs::read(&to).unwrap(), data);
    let meta = fs::metadata(&to).unwrap();
    assert_eq!(meta.permissions().mode() & 0o7777, 0o640);
    // The fallback streamed the content, so the listener saw progress.
    assert_eq!(totals.last().copied(), Some(data.len() as u64));
    assert!(totals.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn fallback_move_carries_user_xattrs() {
    let Some(shm) = shm_dir() else {
        eprintln!("skipping: no /dev/shm");
        return;
    };
    let td = tempdir().unwrap();
    if fs::metadata(shm.path()).unwrap().dev() == fs::metadata(td.path()).unwrap().dev() {
        eprintln!("skipping: temp dir and /dev/shm share a filesystem");
        return;
    }

    let from = shm.path().join("tagged.txt");
    let to = td.path().join("tagged.moved");
    fs::write(&from, b"tagged content").unwrap();
    if let Err(e) = xattr::set(&from, "user.provenance", b"shm") {
        eprintln!("skipping: user xattrs unsupported here ({e})");
        return;
    }

    fs_entry::move_entry(&from, &to, false, 4096, None, None).expect("cross-device move");
    assert!(!from.exists());
    let value = xattr::get(&to, "user.provenance").expect("read xattr from destination");
    assert_eq!(value.as_deref(), Some(b"shm".as_slice()));
}

#[test]
fn fallback_move_restores_access_time() {
    let Some(shm) = shm_dir() else {
        eprintln!("skipping: no /dev/shm");
        return;
    };
    let td = tempdir().unwrap();
    if fs::metadata(shm.path()).unwrap().dev() == fs::metadata(td.path()).unwrap().dev() {
        eprintln!("skipping: temp dir and /dev/shm share a filesystem");
        return;
    }

    let from = shm.path().join("aged.bin");
    let to = td.path().join("aged.moved");
    fs::write(&from, b"old enough to remember").unwrap();
    let atime = FileTime::from_unix_time(1_234_567_890, 0);
    let mtime = FileTime::from_unix_time(1_234_567_891, 0);
    filetime::set_file_times(&from, atime, mtime).unwrap();

    // The fallback copy reads the source, but the times restored on the
    // destination come from the pre-transfer snapshot.
    fs_entry::move_entry(&from, &to, false, 4096, None, None).expect("cross-device move");
    let meta = fs::metadata(&to).unwrap();
    assert_eq!(FileTime::from_last_access_time(&meta), atime);
    assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
}

#[test]
fn cross_device_symlink_move_recreates_the_link() {
    let Some(shm) = shm_dir() else {
        eprintln!("skipping: no /dev/shm");
        return;
    };
    let td = tempdir().unwrap();
    if fs::metadata(shm.path()).unwrap().dev() == fs::metadata(td.path()).unwrap().dev() {
        eprintln!("skipping: temp dir and /dev/shm share a filesystem");
        return;
    }

    let from = shm.path().join("link");
    let to = td.path().join("link.moved");
    std::os::unix::fs::symlink("relative/target", &from).unwrap();

    fs_entry::move_entry(&from, &to, false, 4096, None, None).expect("move symlink");
    assert!(fs::symlink_metadata(&from).is_err());
    assert_eq!(fs::read_link(&to).unwrap(), PathBuf::from("relative/target"));
}
