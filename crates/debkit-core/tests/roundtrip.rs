//! End-to-end build tests: construct a package, parse the container back,
//! and verify every layer against the inputs.

use std::io::Read;

use flate2::read::GzDecoder;
use tempfile::tempdir;

use debkit_core::{BuildError, write_package_at};
use debkit_schema::{BuildTimestamp, FileEntry, PackageInfo};

fn demo_info() -> PackageInfo {
    PackageInfo {
        name: "demo".into(),
        version: "1.0".into(),
        section: "utils".into(),
        priority: "optional".into(),
        arch: "amd64".into(),
        maintainer: "Demo <demo@example.com>".into(),
        vendor: "Acme".into(),
        homepage: "https://example.com".into(),
        description: "A demonstration package".into(),
        replaces: String::new(),
        provides: String::new(),
        depends: vec!["libc".into()],
        conflicts: vec![],
    }
}

/// Minimal classic-ar reader: returns `(name, mtime, body)` per member.
fn parse_ar(bytes: &[u8]) -> Vec<(String, u64, Vec<u8>)> {
    assert_eq!(&bytes[..8], b"!<arch>\n", "missing ar magic");
    let mut pos = 8;
    let mut members = Vec::new();
    while pos < bytes.len() {
        let header = &bytes[pos..pos + 60];
        assert_eq!(&header[58..60], b"`\n", "bad header terminator");
        let name = std::str::from_utf8(&header[0..16])
            .unwrap()
            .trim_end()
            .to_string();
        let mtime: u64 = std::str::from_utf8(&header[16..28])
            .unwrap()
            .trim_end()
            .parse()
            .unwrap();
        let size: usize = std::str::from_utf8(&header[48..58])
            .unwrap()
            .trim_end()
            .parse()
            .unwrap();
        pos += 60;
        members.push((name, mtime, bytes[pos..pos + size].to_vec()));
        pos += size + size % 2;
    }
    members
}

fn untar(bytes: &[u8]) -> Vec<(String, u64, u64, Vec<u8>)> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut out = Vec::new();
    for e in archive.entries().unwrap() {
        let mut e = e.unwrap();
        let path = e.path().unwrap().to_string_lossy().into_owned();
        let size = e.header().size().unwrap();
        let mtime = e.header().mtime().unwrap();
        let mut body = Vec::new();
        e.read_to_end(&mut body).unwrap();
        out.push((path, size, mtime, body));
    }
    out
}

#[test]
fn scenario_single_file_package() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("f.txt");
    std::fs::write(&src, vec![0x5a; 4096]).unwrap();

    let files = vec![FileEntry::new(&src, "./usr/bin/f")];
    let ts = BuildTimestamp::from_secs(1_700_000_000);
    let mut out = Vec::new();
    write_package_at(&demo_info(), &files, ts, &mut out).unwrap();

    let members = parse_ar(&out);
    assert_eq!(members.len(), 3);

    let (name, mtime, body) = &members[0];
    assert_eq!(name, "debian-binary");
    assert_eq!(*mtime, ts.secs());
    assert_eq!(body, b"2.0\n");

    let (name, mtime, control_gz) = &members[1];
    assert_eq!(name, "control.tar.gz");
    assert_eq!(*mtime, ts.secs());
    let control_entries = untar(control_gz);
    assert_eq!(control_entries[0].0, "control");
    assert_eq!(control_entries[1].0, "md5sums");
    let control = String::from_utf8(control_entries[0].3.clone()).unwrap();
    assert!(control.contains("Package: demo\n"));
    assert!(control.contains("Installed-Size: 4\n"));
    assert!(control.contains("Depends: libc\n"));
    let md5sums = String::from_utf8(control_entries[1].3.clone()).unwrap();
    let lines: Vec<&str> = md5sums.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("  usr/bin/f"));

    let (name, mtime, data_gz) = &members[2];
    assert_eq!(name, "data.tar.gz");
    assert_eq!(*mtime, ts.secs());
    let data_entries = untar(data_gz);
    assert_eq!(data_entries.len(), 1);
    assert_eq!(data_entries[0].0, "./usr/bin/f");
    assert_eq!(data_entries[0].1, 4096);
    assert_eq!(data_entries[0].2, ts.secs());
}

#[test]
fn builds_are_byte_identical() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("lib.so");
    std::fs::write(&src, b"not really a shared object").unwrap();
    let files = vec![FileEntry::new(&src, "./usr/lib/lib.so")];
    let ts = BuildTimestamp::from_secs(1_234_567);

    let mut first = Vec::new();
    write_package_at(&demo_info(), &files, ts, &mut first).unwrap();
    let mut second = Vec::new();
    write_package_at(&demo_info(), &files, ts, &mut second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn gzip_headers_carry_the_build_timestamp() {
    let ts = BuildTimestamp::from_secs(1_600_000_000);
    let mut out = Vec::new();
    write_package_at(&demo_info(), &[], ts, &mut out).unwrap();

    for (name, _, body) in parse_ar(&out) {
        if name.ends_with(".tar.gz") {
            // gzip mtime is a little-endian u32 at offset 4
            let mtime = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
            assert_eq!(u64::from(mtime), ts.secs(), "gzip mtime in {name}");
        }
    }
}

#[test]
fn empty_file_set_reports_zero_installed_size() {
    let ts = BuildTimestamp::from_secs(10);
    let mut out = Vec::new();
    write_package_at(&demo_info(), &[], ts, &mut out).unwrap();

    let members = parse_ar(&out);
    let control_entries = untar(&members[1].2);
    let control = String::from_utf8(control_entries[0].3.clone()).unwrap();
    assert!(control.contains("Installed-Size: 0\n"));
    let md5sums = &control_entries[1].3;
    assert!(md5sums.is_empty());
    assert!(untar(&members[2].2).is_empty());
}

#[test]
fn wall_clock_build_parses() {
    let mut out = Vec::new();
    debkit_core::write_package(&demo_info(), &[], &mut out).unwrap();
    assert_eq!(parse_ar(&out).len(), 3);
}

#[test]
fn missing_source_fails_without_output() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("does-not-exist");
    let files = vec![FileEntry::new(&missing, "./usr/bin/ghost")];

    let mut out = Vec::new();
    let err = write_package_at(&demo_info(), &files, BuildTimestamp::from_secs(0), &mut out)
        .unwrap_err();
    assert!(matches!(err, BuildError::SourceRead { .. }));
    // The container stage never ran; the sink holds no bytes at all.
    assert!(out.is_empty());
}
