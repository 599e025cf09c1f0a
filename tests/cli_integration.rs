//! End-to-end runs of the `loctab` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn loctab(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loctab"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("binary must spawn")
}

fn assert_ok(out: &Output) {
    assert!(
        out.status.success(),
        "exit {:?}\nstderr: {}",
        out.status.code(),
        String::from_utf8_lossy(&out.stderr)
    );
}

fn write_fixture_tree(dir: &Path) {
    fs::write(
        dir.join("loc.ini"),
        "prefix=menu\ncsv=menu.csv\nprefix=dlg\ncsv=dialog.csv\n",
    )
    .unwrap();
    fs::write(
        dir.join("menu.csv"),
        "ID|Text|StageDir\nStart|Start Game|\nQuit|Quit Game|slow fade\n",
    )
    .unwrap();
    fs::write(
        dir.join("dialog.csv"),
        "ID|Text|StageDir\nHello_01|Well met!|\nBye_01|Farewell \\vfriend\\v|whisper\n",
    )
    .unwrap();
}

#[test]
fn no_arguments_prints_help_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = loctab(dir.path(), &[]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn version_and_help_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let out = loctab(dir.path(), &["--version"]);
    assert_ok(&out);
    assert!(String::from_utf8_lossy(&out.stdout).contains("loctab"));
    let out = loctab(dir.path(), &["--help"]);
    assert_ok(&out);
    assert!(String::from_utf8_lossy(&out.stdout).contains("--save-bin"));
}

#[test]
fn unknown_commands_fail_with_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let out = loctab(dir.path(), &["--frobnicate"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains(";fail:"));
}

#[test]
fn exit_ignores_everything_after_it() {
    let dir = tempfile::tempdir().unwrap();
    let out = loctab(dir.path(), &["--exit", "--frobnicate"]);
    assert_ok(&out);
}

#[test]
fn pack_then_unpack_round_trips_the_fixture_tree() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_tree(dir.path());

    // Pack: CSVs -> binary + map.
    let out = loctab(
        dir.path(),
        &[
            "--read-ini", "--read-csv", "--save-map", "--save-bin", "x64", "6",
            "w_strings.bin", "9", "*_Text;*_StageDir",
        ],
    );
    assert_ok(&out);
    assert!(dir.path().join("w_strings.bin").exists());
    assert!(dir.path().join("idnames.csv").exists());

    let menu_before = fs::read_to_string(dir.path().join("menu.csv")).unwrap();
    let dialog_before = fs::read_to_string(dir.path().join("dialog.csv")).unwrap();
    fs::remove_file(dir.path().join("menu.csv")).unwrap();
    fs::remove_file(dir.path().join("dialog.csv")).unwrap();

    // Unpack: map + ini + binary -> CSVs.
    let out = loctab(
        dir.path(),
        &["--read-map", "--read-ini", "--read-bin", "--save-csv"],
    );
    assert_ok(&out);

    let menu_after = fs::read_to_string(dir.path().join("menu.csv")).unwrap();
    let dialog_after = fs::read_to_string(dir.path().join("dialog.csv")).unwrap();

    // Row order follows descending key hashes, so compare as sets.
    let lines = |s: &str| {
        let mut v: Vec<String> = s.lines().map(str::to_owned).collect();
        v.sort();
        v
    };
    assert_eq!(lines(&menu_before), lines(&menu_after));
    assert_eq!(lines(&dialog_before), lines(&dialog_after));
}

#[test]
fn cross_endian_pack_is_readable_again() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_tree(dir.path());
    let out = loctab(
        dir.path(),
        &["--read-ini", "--read-csv", "--save-bin", "ps3"],
    );
    assert_ok(&out);
    let bytes = fs::read(dir.path().join("w_strings.bin")).unwrap();
    assert_eq!(&bytes[..5], b"GAR5\x10");

    // Endianness comes from the header, not from the command line.
    let out = loctab(dir.path(), &["--read-bin", "w_strings.bin", "--save-map", "out.map"]);
    assert_ok(&out);
}

#[test]
fn commands_validate_their_arguments() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_tree(dir.path());
    for args in [
        &["--save-bin", "amiga"][..],
        &["--save-bin", "pc", "4"],
        &["--save-bin", "pc", "6", "out.bin", "10"],
        &["--read-csv", "2"],
        &["--save-csv", "extra"],
        &["--version", "extra"],
    ] {
        let out = loctab(dir.path(), args);
        assert_eq!(out.status.code(), Some(1), "args {args:?} must fail");
    }
}

#[test]
fn clear_resets_state_between_commands() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_tree(dir.path());
    // After --clear the table is empty, so --save-bin writes an empty
    // container that reads back with zero columns.
    let out = loctab(
        dir.path(),
        &["--read-ini", "--read-csv", "--clear", "--save-bin", "pc", "5", "empty.bin"],
    );
    assert_ok(&out);
    let out = loctab(dir.path(), &["--read-bin", "empty.bin"]);
    assert_ok(&out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("column.count=0"));
    assert!(stdout.contains("string.count=0"));
}
