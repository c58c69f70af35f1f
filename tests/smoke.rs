//! End-to-end run of the `satchel` binary against a scratch save directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use satchel_testkit::ScratchDir;

fn satchel(save_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_satchel"))
        .arg("--config")
        .arg(save_dir.join("satchel.toml"))
        .arg("--save-dir")
        .arg(save_dir)
        .args(args)
        .output()
        .expect("failed to launch satchel")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn run_show_list_remove() {
    let scratch = ScratchDir::new("cli_smoke");
    let script = scratch.path().join("kit.txt");
    fs::write(
        &script,
        "give apple 6 10\ngive apple 6 10\nput sword 1 1 3\nsplit 0 2 4\n",
    )
    .unwrap();

    let run = satchel(
        scratch.path(),
        &["run", "bag", script.to_str().unwrap(), "--capacity", "4"],
    );
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    let out = stdout(&run);
    assert!(out.contains("Put 1× satchel:sword in slot 3"));
    assert!(out.contains("Saved bag"));
    assert!(scratch.path().join("inventory").join("bag.sav").is_file());

    let show = satchel(scratch.path(), &["show", "bag"]);
    assert!(show.status.success());
    // the missing config file is logged, but never on stdout
    assert!(String::from_utf8_lossy(&show.stderr).contains("Using defaults"));
    let lines: Vec<String> = stdout(&show).lines().map(str::to_owned).collect();
    assert_eq!(
        lines,
        vec![
            "bag: 4 slots",
            "  [0] satchel:apple 6/10",
            "  [1] satchel:apple 2/10",
            "  [2] satchel:apple 4/10",
            "  [3] satchel:sword 1/1",
        ]
    );

    // second run resumes the saved slots
    fs::write(&script, "remove 1\n").unwrap();
    let rerun = satchel(scratch.path(), &["run", "bag", script.to_str().unwrap()]);
    assert!(rerun.status.success());
    assert!(stdout(&rerun).contains("Removed 2× satchel:apple from slot 1"));

    let list = satchel(scratch.path(), &["list"]);
    assert_eq!(stdout(&list).trim(), "bag");

    let remove = satchel(scratch.path(), &["remove", "bag"]);
    assert!(remove.status.success());
    assert!(!satchel(scratch.path(), &["show", "bag"]).status.success());
}

#[test]
fn bad_script_reports_line() {
    let scratch = ScratchDir::new("cli_bad_script");
    let script = scratch.path().join("bad.txt");
    fs::write(&script, "give apple 1\nteleport 3\n").unwrap();

    let run = satchel(scratch.path(), &["run", "bag", script.to_str().unwrap()]);
    assert!(!run.status.success());
    assert!(String::from_utf8_lossy(&run.stderr).contains("line 2: Unknown command: teleport"));
    assert!(!scratch.path().join("inventory").join("bag.sav").exists());
}

#[test]
fn settings_file_controls_stacking() {
    let scratch = ScratchDir::new("cli_settings");
    let settings = scratch.path().join("settings.toml");
    let settings_arg = settings.to_str().unwrap();

    let init = satchel(scratch.path(), &["--settings", settings_arg, "init-config"]);
    assert!(init.status.success(), "{}", String::from_utf8_lossy(&init.stderr));
    assert!(scratch.path().join("satchel.toml").is_file());
    let written = fs::read_to_string(&settings).unwrap();
    assert!(written.contains("stacking_enabled = true"));

    fs::write(&settings, "stacking_enabled = false\n").unwrap();
    let script = scratch.path().join("apples.txt");
    fs::write(&script, "give apple 3 10\ngive apple 3 10\n").unwrap();
    let run = satchel(
        scratch.path(),
        &["--settings", settings_arg, "run", "crate", script.to_str().unwrap(), "--capacity", "3"],
    );
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));

    let show = satchel(scratch.path(), &["show", "crate"]);
    let lines: Vec<String> = stdout(&show).lines().map(str::to_owned).collect();
    assert_eq!(
        lines,
        vec![
            "crate: 3 slots",
            "  [0] satchel:apple 3/10",
            "  [1] satchel:apple 3/10",
            "  [2] -",
        ]
    );
}
