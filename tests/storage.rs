mod common;

use std::fs;
use std::sync::Arc;

use common::{Fixture, test_config, unresolvable_tree};
use ftpjail::client::Session;
use ftpjail::config::StorageModeKind;
use ftpjail::server::ServerContext;
use ftpjail::storage::{PathResolver, ResolveTarget};
use ftpjail::transfer::MemoryChannel;
use sha2::{Digest, Sha256};

fn upload(fixture: &Fixture, session: &mut Session, line: &str, data: &[u8]) -> String {
    session.set_data_channel(Box::new(MemoryChannel::with_upload(data.to_vec())));
    fixture.run(session, line).message
}

fn download(fixture: &Fixture, session: &mut Session, line: &str) -> (String, Vec<u8>) {
    let channel = MemoryChannel::new();
    let sent = channel.sent();
    session.set_data_channel(Box::new(channel));
    let reply = fixture.run(session, line).message;
    let data = sent.lock().unwrap().clone();
    (reply, data)
}

#[test]
fn test_direct_mode_file_lifecycle() {
    let fixture = Fixture::direct();
    let mut session = fixture.login();

    assert_eq!(
        fixture.run(&mut session, "MKD docs").message,
        "257 \"/docs\" directory created\r\n"
    );
    assert_eq!(
        fixture.run(&mut session, "CWD docs").message,
        "250 CWD successful. \"/docs\" is current directory\r\n"
    );
    assert_eq!(fixture.code(&mut session, "TYPE I"), 200);

    let reply = upload(&fixture, &mut session, "STOR a.txt", b"hello\n");
    assert!(reply.starts_with("150 "));
    assert!(reply.ends_with("226 Transfer complete\r\n"));
    assert_eq!(fs::read(fixture.root.join("docs/a.txt")).unwrap(), b"hello\n");

    // The channel is consumed by the transfer.
    assert_eq!(fixture.code(&mut session, "STOR again.txt"), 425);

    assert_eq!(fixture.run(&mut session, "SIZE a.txt").message, "213 6\r\n");
    assert_eq!(fixture.run(&mut session, "SIZE /docs/a.txt").message, "213 6\r\n");

    let (reply, data) = download(&fixture, &mut session, "RETR a.txt");
    assert!(reply.ends_with("226 Transfer complete\r\n"));
    assert_eq!(data, b"hello\n");

    assert_eq!(fixture.code(&mut session, "REST 2"), 350);
    let (_, data) = download(&fixture, &mut session, "RETR a.txt");
    assert_eq!(data, b"llo\n");
    // The offset applies to one transfer only.
    let (_, data) = download(&fixture, &mut session, "RETR a.txt");
    assert_eq!(data, b"hello\n");

    let reply = upload(&fixture, &mut session, "APPE a.txt", b"world\n");
    assert!(reply.ends_with("226 Transfer complete\r\n"));
    assert_eq!(
        fs::read(fixture.root.join("docs/a.txt")).unwrap(),
        b"hello\nworld\n"
    );

    assert_eq!(fixture.code(&mut session, "RNFR a.txt"), 350);
    assert_eq!(fixture.code(&mut session, "RNTO /docs/b.txt"), 250);
    assert!(fixture.root.join("docs/b.txt").is_file());
    assert_eq!(fixture.code(&mut session, "RNTO c.txt"), 503);
    assert_eq!(fixture.code(&mut session, "RNFR missing.txt"), 550);

    assert_eq!(fixture.code(&mut session, "CDUP"), 250);
    assert_eq!(session.current_virtual_path(), "/");
    assert_eq!(fixture.code(&mut session, "RMD docs"), 550);
    assert_eq!(fixture.code(&mut session, "DELE docs/b.txt"), 250);
    assert_eq!(fixture.code(&mut session, "RMD docs"), 250);
    assert!(!fixture.root.join("docs").exists());
    assert_eq!(fixture.code(&mut session, "RMD /"), 550);
    assert!(fixture.root.exists());
}

#[test]
fn test_direct_mode_listings() {
    let fixture = Fixture::direct();
    fs::create_dir(fixture.root.join("sub")).unwrap();
    fs::write(fixture.root.join("a.txt"), b"abc").unwrap();
    let mut session = fixture.login();

    let (reply, data) = download(&fixture, &mut session, "LIST -la");
    assert!(reply.starts_with("150 "));
    let listing = String::from_utf8(data).unwrap();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("-rw-r--r--") && lines[0].ends_with(" a.txt"));
    assert!(lines[1].starts_with("drwxr-xr-x") && lines[1].ends_with(" sub"));

    let (_, data) = download(&fixture, &mut session, "NLST");
    assert_eq!(data, b"a.txt\r\nsub\r\n");

    let (_, data) = download(&fixture, &mut session, "MLSD /");
    let listing = String::from_utf8(data).unwrap();
    assert!(listing.contains("type=file;size=3;"));
    assert!(listing.contains("type=dir;"));

    let mlst = fixture.run(&mut session, "MLST a.txt").message;
    assert!(mlst.starts_with("250-Listing /a.txt\r\n"));
    assert!(mlst.contains(" type=file;size=3;"));
    assert!(mlst.ends_with("250 End\r\n"));

    let (reply, _) = download(&fixture, &mut session, "LIST nowhere");
    assert!(reply.starts_with("550"));
}

#[test]
fn test_modification_times() {
    let fixture = Fixture::direct();
    fs::write(fixture.root.join("a.txt"), b"abc").unwrap();
    let mut session = fixture.login();

    assert_eq!(
        fixture.run(&mut session, "MFMT 20200102030405 a.txt").message,
        "213 Modify=20200102030405; a.txt\r\n"
    );
    assert_eq!(
        fixture.run(&mut session, "MDTM a.txt").message,
        "213 20200102030405\r\n"
    );
    assert_eq!(fixture.code(&mut session, "MFMT yesterday a.txt"), 501);
    assert_eq!(fixture.code(&mut session, "MFMT 20200102030405"), 501);
    assert_eq!(fixture.code(&mut session, "MDTM missing.txt"), 550);
}

#[test]
fn test_hash_and_range() {
    let fixture = Fixture::direct();
    fs::write(fixture.root.join("data.bin"), b"abcdef").unwrap();
    let mut session = fixture.login();

    let full = hex::encode(Sha256::digest(b"abcdef"));
    assert_eq!(
        fixture.run(&mut session, "HASH data.bin").message,
        format!("213 SHA-256 0-6 {} /data.bin\r\n", full)
    );

    assert_eq!(fixture.code(&mut session, "RANG 0 3"), 350);
    let head = hex::encode(Sha256::digest(b"abc"));
    assert_eq!(
        fixture.run(&mut session, "HASH data.bin").message,
        format!("213 SHA-256 0-3 {} /data.bin\r\n", head)
    );

    assert_eq!(fixture.code(&mut session, "RANG 2 100"), 350);
    assert_eq!(fixture.code(&mut session, "RANG 1 0"), 350);
    assert_eq!(session.hash_range(), None);
    assert_eq!(fixture.code(&mut session, "RANG 5 2"), 501);
    assert_eq!(fixture.code(&mut session, "RANG x y"), 501);
}

#[test]
fn test_hash_range_past_end_of_file_is_refused() {
    let fixture = Fixture::direct();
    fs::write(fixture.root.join("data.bin"), b"abcdef").unwrap();
    let mut session = fixture.login();

    assert_eq!(fixture.code(&mut session, "RANG 100 200"), 350);
    assert_eq!(
        fixture.run(&mut session, "HASH data.bin").message,
        "550 Range 100-6 is outside /data.bin\r\n"
    );
    // The refused range is spent like any other.
    assert_eq!(session.hash_range(), None);
    assert_eq!(fixture.code(&mut session, "HASH data.bin"), 213);

    assert_eq!(fixture.code(&mut session, "RANG 6 10"), 350);
    assert_eq!(fixture.code(&mut session, "HASH data.bin"), 550);

    fs::write(fixture.root.join("empty.bin"), b"").unwrap();
    let empty = hex::encode(Sha256::digest(b""));
    assert_eq!(
        fixture.run(&mut session, "HASH empty.bin").message,
        format!("213 SHA-256 0-0 {} /empty.bin\r\n", empty)
    );
}

#[test]
fn test_direct_mode_escapes_are_denied() {
    let fixture = Fixture::direct();
    let outside = fixture.root.parent().unwrap().join("secret.txt");
    fs::write(&outside, b"top secret").unwrap();
    fs::create_dir(fixture.root.parent().unwrap().join("jail2")).unwrap();
    let mut session = fixture.login();

    for line in [
        "CWD ..",
        "CWD ../jail2",
        "CWD /../..",
        "CDUP",
        "SIZE ../secret.txt",
        "SIZE /../secret.txt",
        "DELE ../secret.txt",
        "RNFR ../secret.txt",
        "MKD ../evil",
        "SIZE /etc/../../../../etc/passwd",
    ] {
        assert_eq!(
            fixture.run(&mut session, line).message,
            "550 Permission denied\r\n",
            "{line}"
        );
    }
    assert_eq!(session.current_virtual_path(), "/");
    assert!(outside.exists());
    assert!(!fixture.root.parent().unwrap().join("evil").exists());

    // Absolute paths hang off the jail root rather than the host root.
    assert_eq!(fixture.code(&mut session, "SIZE /etc/passwd"), 550);
    let (reply, data) = download(&fixture, &mut session, "RETR ../secret.txt");
    assert_eq!(reply, "550 Permission denied\r\n");
    assert!(data.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlink_out_of_the_jail_is_denied() {
    let fixture = Fixture::direct();
    let outside = fixture.root.parent().unwrap().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::write(outside.join("loot.txt"), b"x").unwrap();
    std::os::unix::fs::symlink(&outside, fixture.root.join("door")).unwrap();
    std::os::unix::fs::symlink(fixture.root.join("gone"), fixture.root.join("dangling")).unwrap();
    let mut session = fixture.login();

    assert_eq!(fixture.code(&mut session, "CWD door"), 550);
    assert_eq!(fixture.code(&mut session, "SIZE door/loot.txt"), 550);
    let reply = upload(&fixture, &mut session, "STOR door/new.txt", b"x");
    assert_eq!(reply, "550 Permission denied\r\n");
    assert!(!outside.join("new.txt").exists());
    assert_eq!(fixture.code(&mut session, "SIZE dangling"), 550);
}

#[cfg(unix)]
#[test]
fn test_symlinks_inside_the_jail_act_on_the_link() {
    let fixture = Fixture::direct();
    fs::write(fixture.root.join("data.txt"), b"keep me").unwrap();
    fs::create_dir(fixture.root.join("real")).unwrap();
    fs::write(fixture.root.join("real/inner.txt"), b"x").unwrap();
    std::os::unix::fs::symlink(fixture.root.join("data.txt"), fixture.root.join("link")).unwrap();
    std::os::unix::fs::symlink(fixture.root.join("real"), fixture.root.join("alias")).unwrap();
    let mut session = fixture.login();

    // Reads still follow the link.
    assert_eq!(fixture.run(&mut session, "SIZE link").message, "213 7\r\n");

    assert_eq!(fixture.code(&mut session, "DELE link"), 250);
    assert!(fs::symlink_metadata(fixture.root.join("link")).is_err());
    assert_eq!(fs::read(fixture.root.join("data.txt")).unwrap(), b"keep me");

    assert_eq!(fixture.code(&mut session, "RNFR alias"), 350);
    assert_eq!(fixture.code(&mut session, "RNTO renamed"), 250);
    assert!(fixture.root.join("real/inner.txt").is_file());
    assert!(fs::symlink_metadata(fixture.root.join("alias")).is_err());
    let renamed = fs::symlink_metadata(fixture.root.join("renamed")).unwrap();
    assert!(renamed.file_type().is_symlink());

    // The client keeps the name it used.
    assert_eq!(fixture.code(&mut session, "CWD renamed"), 250);
    assert_eq!(session.current_virtual_path(), "/renamed");
    assert_eq!(fixture.code(&mut session, "CDUP"), 250);

    assert_eq!(fixture.code(&mut session, "RMD renamed"), 550);
    assert!(fixture.root.join("real").is_dir());
}

#[test]
fn test_resolution_leaves_session_untouched() {
    let fixture = Fixture::tree();
    fs::create_dir(fixture.storage.join("docs")).unwrap();
    let mut session = fixture.login();
    assert_eq!(fixture.code(&mut session, "CWD docs"), 250);

    for (param, target) in [
        ("a.txt", ResolveTarget::Entry),
        ("docs", ResolveTarget::Directory),
        ("../..", ResolveTarget::Directory),
        ("", ResolveTarget::Directory),
    ] {
        let first = PathResolver::resolve(&session, param, target);
        let second = PathResolver::resolve(&session, param, target);
        assert_eq!(first, second);
    }
    assert_eq!(session.current_virtual_path(), "/docs");
}

#[test]
fn test_tree_mode_file_lifecycle() {
    let fixture = Fixture::tree();
    let mut session = fixture.login();

    assert_eq!(
        fixture.run(&mut session, "MKD docs").message,
        "257 \"/docs\" directory created\r\n"
    );
    assert!(fixture.storage.join("docs").is_dir());

    assert_eq!(fixture.code(&mut session, "CWD docs"), 250);
    assert_eq!(session.current_virtual_path(), "/docs");
    // Repeating the directory the session sits in does not nest it.
    assert_eq!(fixture.code(&mut session, "CWD docs"), 250);
    assert_eq!(session.current_virtual_path(), "/docs");

    let reply = upload(&fixture, &mut session, "STOR a.txt", b"tree data");
    assert!(reply.ends_with("226 Transfer complete\r\n"));
    assert_eq!(fs::read(fixture.storage.join("docs/a.txt")).unwrap(), b"tree data");

    assert_eq!(fixture.code(&mut session, "MKD sub"), 257);
    assert!(fixture.storage.join("docs/sub").is_dir());
    upload(&fixture, &mut session, "STOR sub/b.txt", b"nested");
    assert_eq!(fs::read(fixture.storage.join("docs/sub/b.txt")).unwrap(), b"nested");

    assert_eq!(fixture.run(&mut session, "SIZE /docs/a.txt").message, "213 9\r\n");
    let (_, data) = download(&fixture, &mut session, "RETR a.txt");
    assert_eq!(data, b"tree data");

    let (_, data) = download(&fixture, &mut session, "NLST");
    assert_eq!(data, b"a.txt\r\nsub\r\n");

    assert_eq!(fixture.code(&mut session, "CDUP"), 250);
    assert_eq!(
        fixture.run(&mut session, "PWD").message,
        "257 \"/\" is current directory\r\n"
    );
}

#[test]
fn test_tree_mode_full_storage_path_short_circuits() {
    let fixture = Fixture::tree();
    fs::create_dir(fixture.storage.join("docs")).unwrap();
    let mut session = fixture.login();

    let line = format!("CWD {}/docs", fixture.storage.display());
    assert_eq!(fixture.code(&mut session, &line), 250);
    assert_eq!(session.current_virtual_path(), "/docs");
}

#[test]
fn test_tree_mode_stays_inside_the_tree() {
    let fixture = Fixture::tree();
    let mut session = fixture.login();

    // The parent of the mount is inside the jail but not inside the tree.
    for line in ["CDUP", "CWD ..", "CWD /../..", "MKD ../escape", "SIZE /../../../../etc/passwd"] {
        assert_eq!(
            fixture.run(&mut session, line).message,
            "550 Permission denied\r\n",
            "{line}"
        );
    }
    assert_eq!(session.current_virtual_path(), "/");
    assert!(!fixture.storage.parent().unwrap().join("escape").exists());
}

#[test]
fn test_tree_without_root_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let mut config = test_config(&root);
    config.storage_mode = StorageModeKind::Tree;
    let context = Arc::new(ServerContext::with_tree(config, Some(unresolvable_tree(&root))));

    let fixture = Fixture::direct();
    let mut session = Session::new(context, None);
    assert_eq!(fixture.code(&mut session, "USER alice"), 331);
    assert_eq!(fixture.code(&mut session, "PASS secret"), 230);

    for line in ["CWD /", "CWD docs", "SIZE a.txt", "MKD x", "LIST"] {
        assert_eq!(
            fixture.run(&mut session, line).message,
            "550 Permission denied\r\n",
            "{line}"
        );
    }
    assert!(!root.join("x").exists());
}
