#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use filetime::FileTime;
use fs_entry::FsErrorKind;
use tempfile::tempdir;

#[test]
fn rename_moves_within_filesystem() {
    let td = tempdir().unwrap();
    let from = td.path().join("a.txt");
    let to = td.path().join("b.txt");
    fs::write(&from, b"payload").unwrap();

    fs_entry::rename(&from, &to).expect("rename");
    assert!(!from.exists());
    assert_eq!(fs::read(&to).unwrap(), b"payload");
}

#[test]
fn rename_onto_existing_path_conflicts_and_changes_nothing() {
    let td = tempdir().unwrap();
    let from = td.path().join("a.txt");
    let to = td.path().join("b.txt");
    fs::write(&from, b"source").unwrap();
    fs::write(&to, b"destination").unwrap();

    for _ in 0..2 {
        // Retrying without changes fails identically.
        let err = fs_entry::rename(&from, &to).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::Rename);
        assert_eq!(err.os_error(), Some(libc::EEXIST));
        assert_eq!(fs::read(&from).unwrap(), b"source");
        assert_eq!(fs::read(&to).unwrap(), b"destination");
    }
}

#[test]
fn rename_conflict_probe_sees_broken_symlinks() {
    let td = tempdir().unwrap();
    let from = td.path().join("a.txt");
    let to = td.path().join("dangling");
    fs::write(&from, b"source").unwrap();
    std::os::unix::fs::symlink(td.path().join("missing"), &to).unwrap();

    // A non-following probe counts a dangling link as an occupant.
    let err = fs_entry::rename(&from, &to).unwrap_err();
    assert_eq!(err.os_error(), Some(libc::EEXIST));
}

#[test]
fn rename_missing_source_fails() {
    let td = tempdir().unwrap();
    let err = fs_entry::rename(&td.path().join("nope"), &td.path().join("out")).unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::Rename);
    assert_eq!(err.os_error(), Some(libc::ENOENT));
}

#[test]
fn move_preserves_content_and_attributes() {
    let td = tempdir().unwrap();
    let from = td.path().join("src.bin");
    let to = td.path().join("moved.bin");
    fs::write(&from, b"move me").unwrap();
    fs::set_permissions(&from, fs::Permissions::from_mode(0o640)).unwrap();
    let mtime = FileTime::from_unix_time(1_400_000_000, 0);
    filetime::set_file_mtime(&from, mtime).unwrap();
    let before = fs_entry::stat(&from).unwrap();

    fs_entry::move_entry(&from, &to, false, 4096, None, None).expect("move");

    assert!(!from.exists(), "source gone after move");
    let after = fs_entry::stat(&to).unwrap();
    assert_eq!(after.file_type, before.file_type);
    assert_eq!(after.mode, before.mode);
    assert_eq!(after.size, before.size);
    assert_eq!(after.last_modification_time, before.last_modification_time);
    assert_eq!(fs::read(&to).unwrap(), b"move me");

    let err = fs_entry::stat(&from).unwrap_err();
    assert_eq!(err.os_error(), Some(libc::ENOENT));
}

#[test]
fn move_with_overwrite_replaces_destination() {
    let td = tempdir().unwrap();
    let from = td.path().join("src.txt");
    let to = td.path().join("dst.txt");
    fs::write(&from, b"new").unwrap();
    fs::write(&to, b"old").unwrap();

    fs_entry::move_entry(&from, &to, true, 4096, None, None).expect("overwriting move");
    assert!(!from.exists());
    assert_eq!(fs::read(&to).unwrap(), b"new");
}

#[test]
fn move_conflict_resurfaces_as_copy_error() {
    // Known sharp edge: the failed rename triggers the copy fallback, which
    // then reports the conflict as a copy error rather than a rename error.
    let td = tempdir().unwrap();
    let from = td.path().join("src.txt");
    let to = td.path().join("dst.txt");
    fs::write(&from, b"new").unwrap();
    fs::write(&to, b"old").unwrap();

    let err = fs_entry::move_entry(&from, &to, false, 4096, None, None).unwrap_err();
    assert_eq!(err.kind(), FsErrorKind::Copy);
    assert_eq!(err.os_error(), Some(libc::EEXIST));
    // Nothing was lost or replaced.
    assert_eq!(fs::read(&from).unwrap(), b"new");
    assert_eq!(fs::read(&to).unwrap(), b"old");
}

#[test]
fn move_of_directory_node_renames() {
    let td = tempdir().unwrap();
    let from = td.path().join("dir");
    let to = td.path().join("dir.moved");
    fs::create_dir(&from).unwrap();
    fs::write(from.join("child.txt"), b"inside").unwrap();

    fs_entry::move_entry(&from, &to, false, 4096, None, None).expect("move dir");
    assert!(!from.exists());
    assert_eq!(fs::read(to.join("child.txt")).unwrap(), b"inside");
}
