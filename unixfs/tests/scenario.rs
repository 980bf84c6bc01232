use std::fs;
use std::io::Write;

use unixfs::{FileSystem, FsError, InodeId};

#[test]
fn copy_through_a_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("fs.img");
    let host = dir.path().join("hosts");
    let out = dir.path().join("out");

    let mut hosts = fs::File::create(&host).unwrap();
    writeln!(hosts, "127.0.0.1\tlocalhost").unwrap();
    writeln!(hosts, "::1\tlocalhost ip6-localhost ip6-loopback").unwrap();
    drop(hosts);

    let mut volume = FileSystem::initialize(&image, 65536, 300).unwrap();
    assert_eq!(volume.cwd_inode(), InodeId::ROOT);
    assert_eq!(fs::metadata(&image).unwrap().len(), 65536 * 1024);

    volume.make_dir("a").unwrap();
    volume.change_dir("a").unwrap();
    volume.copy_in(&host, "hosts").unwrap();
    volume.copy_out("hosts", &out).unwrap();

    assert_eq!(fs::read(&host).unwrap(), fs::read(&out).unwrap());
    assert_eq!(volume.list().unwrap(), [".", "..", "hosts"]);
    assert_eq!(volume.cwd(), "/a");
    volume.close().unwrap();

    let mut volume = FileSystem::open(&image).unwrap();
    assert_eq!(volume.cwd_inode(), InodeId::ROOT);
    assert_eq!(volume.cwd(), "/");
    volume.change_dir("a").unwrap();
    assert_eq!(volume.list().unwrap(), [".", "..", "hosts"]);

    let mut content = Vec::new();
    volume.read_file("hosts", &mut content).unwrap();
    assert_eq!(content, fs::read(&host).unwrap());
}

#[test]
fn initialize_refuses_existing_image() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("fs.img");
    FileSystem::initialize(&image, 128, 32).unwrap().close().unwrap();

    assert!(matches!(
        FileSystem::initialize(&image, 128, 32),
        Err(FsError::AlreadyExists(_))
    ));
    assert!(FileSystem::open(&image).is_ok());
}

#[test]
fn bad_geometry_leaves_no_image() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("fs.img");

    assert!(matches!(
        FileSystem::initialize(&image, 8, 1000),
        Err(FsError::InvalidGeometry(_))
    ));
    assert!(!image.exists());
}

#[test]
fn missing_source_creates_no_target() {
    let dir = tempfile::tempdir().unwrap();
    let volume = FileSystem::initialize(dir.path().join("fs.img"), 128, 32).unwrap();
    let out = dir.path().join("out");

    assert!(matches!(volume.copy_out("nothing", &out), Err(FsError::NotFound(_))));
    assert!(!out.exists());
}
