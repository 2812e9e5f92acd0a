//! End-to-end tests for the rvcheck binary.

use std::path::Path;
use std::process::{Command, Output};

const GOLDEN: &str = "\
0x00002000 (0x00000093) x1  0x00000000
0x00002004 (0x00112023) mem 0x00001000 0x00000001
0x00002008 (0x00a00513) x10 0x0000000a
";

const RTL_HEADER: &str = "\
PC          INST          TYPE ADDR        DATA          CYCLE
--------------------------------------------------------------
";

fn rvcheck(dir: &Path, args: &[&str]) -> Output {
    rvcheck_with_log(dir, args, "off")
}

fn rvcheck_with_log(dir: &Path, args: &[&str], rust_log: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rvcheck"))
        .current_dir(dir)
        .arg("--no-color")
        .args(args)
        .env("RUST_LOG", rust_log)
        .output()
        .expect("failed to run rvcheck")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn rtl_with_cycles(extra: &[&str]) -> String {
    let mut rtl = String::from(RTL_HEADER);
    rtl.push_str("0x0000_2000 (0x0000_0093) X1  0x0000_0000 5\n");
    rtl.push_str("0x0000_2004 (0x0011_2023) MEM 0x0000_1000 0x0000_0001 6\n");
    rtl.push_str("0x0000_2008 (0x00A0_0513) X10 0x0000_000A 7\n");
    for line in extra {
        rtl.push_str(line);
        rtl.push('\n');
    }
    rtl
}

#[test]
fn test_compare_pass_with_default_paths() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(dir.path(), "rtl_commit.log", &rtl_with_cycles(&[]));

    let output = rvcheck(dir.path(), &["compare"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("Comparing rtl_commit.log vs commit.log"), "{err}");
    assert!(err.contains("Verification Successful! Logs match. (3 instructions)"), "{err}");
}

#[test]
fn test_compare_single_instruction_wording() {
    let dir = tempfile::tempdir().unwrap();
    let record = "0x00002000 (0x00000093) x1  0x00000000\n";
    write(dir.path(), "commit.log", record);
    write(
        dir.path(),
        "rtl_commit.log",
        &format!("{record}0x00002004 (0x00000073) x0  0x00000000\n"),
    );

    let output = rvcheck(dir.path(), &["compare"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("RTL has 1 extra line. Analyzing..."), "{err}");
    assert!(err.contains("Ignored 1 trailing instruction (assumed"), "{err}");
    assert!(err.contains("Logs match. (1 instruction)"), "{err}");
}

#[test]
fn test_rust_log_enables_debug_output() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(dir.path(), "rtl_commit.log", GOLDEN);

    let output = rvcheck_with_log(dir.path(), &["compare"], "rvcheck=debug");
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("DEBUG"), "{err}");
    assert!(err.contains("read trace"), "{err}");

    let output = rvcheck_with_log(dir.path(), &["compare"], "rvcheck=info");
    assert!(!stderr(&output).contains("read trace"));
}

#[test]
fn test_verbose_flag_overrides_rust_log() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(dir.path(), "rtl_commit.log", GOLDEN);

    let output = rvcheck_with_log(dir.path(), &["-v", "compare"], "rvcheck=info");
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("read trace"), "{err}");
}

#[test]
fn test_compare_explicit_paths() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "gold.log", GOLDEN);
    write(dir.path(), "rtl.log", GOLDEN);

    let output = rvcheck(dir.path(), &["compare", "rtl.log", "gold.log"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn test_compare_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);

    let output = rvcheck(dir.path(), &["compare", "missing_rtl.log", "commit.log"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(err.contains("file not found: missing_rtl.log"), "{err}");
}

#[test]
fn test_compare_length_deficit() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(
        dir.path(),
        "rtl_commit.log",
        "0x00002000 (0x00000093) x1  0x00000000\n",
    );

    let output = rvcheck(dir.path(), &["compare"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(err.contains("RTL log stopped earlier than golden log."), "{err}");
    assert!(err.contains("RTL lines: 1, Golden lines: 3"), "{err}");
    assert!(err.contains("reason: length-deficit"), "{err}");
}

#[test]
fn test_compare_token_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(
        dir.path(),
        "rtl_commit.log",
        &rtl_with_cycles(&[]).replace("X10 0x0000_000A", "X10 0x0000_000B"),
    );

    let output = rvcheck(dir.path(), &["compare"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(err.contains("Mismatch at line 3"), "{err}");
    assert!(err.contains("Golden: 0x00002008 (0x00a00513) x10 0x0000000a"), "{err}");
    assert!(err.contains("RTL   : 0x00002008 (0x00a00513) x10 0x0000000b 7"), "{err}");
    assert!(err.contains("field 4: expected 0x0000000a, got 0x0000000b"), "{err}");
    assert!(err.contains("golden log line 3, RTL log line 5"), "{err}");
}

#[test]
fn test_compare_strict_fields() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(dir.path(), "rtl_commit.log", &rtl_with_cycles(&[]));

    let output = rvcheck(dir.path(), &["compare", "--strict-fields"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Mismatch at line 1"));
}

#[test]
fn test_compare_benign_trailing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(
        dir.path(),
        "rtl_commit.log",
        &rtl_with_cycles(&[
            "0x0000_200C (0x0000_0073) MEM 0x0000_3000 0x0000_0001 8",
            "0x0000_2010 (0x0000_006F) X0  0x0000_0000 9",
        ]),
    );

    let output = rvcheck(dir.path(), &["compare"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("RTL has 2 extra lines. Analyzing..."), "{err}");
    assert!(
        err.contains("Ignoring extra RTL commit: 0x0000200c (0x00000073) mem 0x00003000 0x00000001 8"),
        "{err}"
    );
    assert!(err.contains("Ignored 2 trailing instructions"), "{err}");
}

#[test]
fn test_compare_excess_trailing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    let extra: Vec<String> = (0..11)
        .map(|i| format!("0x{:08x} (0x00000013) x0 0x00000000", 0x3000 + i * 4))
        .collect();
    let extra: Vec<&str> = extra.iter().map(String::as_str).collect();
    write(dir.path(), "rtl_commit.log", &rtl_with_cycles(&extra));

    let output = rvcheck(dir.path(), &["compare"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1), "{err}");
    assert!(err.contains("RTL has too many extra lines (11)"), "{err}");
    assert!(err.contains("First extra line: 0x00003000 (0x00000013) x0 0x00000000"), "{err}");

    // A wider tolerance accepts the same tail.
    let output = rvcheck(dir.path(), &["compare", "--max-trailing", "11"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn test_convert_then_compare() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "spike.log",
        "\
core   0: 3 0x00001000 (0x00000297) x5  0x00001000
core   0: 3 0x00002000 (0x00000093) x1  0x00000000
core   0: 3 0x00002004 (0x00112023) mem 0x00001000 0x00000001
core   0: 3 0x00002006 (0x0000bfed)
core   0: 3 0x00002008 (0x00a00513) x10 0x0000000a
",
    );

    let output = rvcheck(dir.path(), &["convert", "spike.log"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("Converted spike.log to commit.log (start from PC 0x2000)"), "{err}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("commit.log")).unwrap(),
        GOLDEN
    );

    write(dir.path(), "rtl_commit.log", &rtl_with_cycles(&[]));
    let output = rvcheck(dir.path(), &["compare"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn test_convert_custom_output_and_threshold() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "spike.log",
        "core   0: 3 0x00001000 (0x00000297) x5  0x00001000\n",
    );

    let output = rvcheck(
        dir.path(),
        &["convert", "spike.log", "-o", "golden.log", "--boot-threshold", "0x1000"],
    );
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("golden.log")).unwrap(),
        "0x00001000 (0x00000297) x5  0x00001000\n"
    );
}

#[test]
fn test_convert_refuses_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let spike = "core   0: 3 0x00002000 (0x00000093) x1  0x00000000\n";
    write(dir.path(), "spike.log", spike);

    let output = rvcheck(dir.path(), &["convert", "spike.log", "-o", "spike.log"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1), "{err}");
    assert!(err.contains("output would overwrite input: spike.log"), "{err}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("spike.log")).unwrap(),
        spike
    );
}

#[test]
fn test_convert_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = rvcheck(dir.path(), &["convert", "spike.log"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("file not found: spike.log"));
}

#[test]
fn test_patch_default_file() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "main.S",
        "stack:\n    .rept 4999\n    .word 0\n    .endr\nmain:\n    ecall\n",
    );

    let output = rvcheck(dir.path(), &["patch"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("Replaced stack size: .rept 4999 -> 2000 (1 occurrence)"), "{err}");
    assert!(err.contains("Replaced instruction: ecall -> j SystemExit (1 occurrence)"), "{err}");
    assert!(err.contains("Patch applied."), "{err}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("main.S")).unwrap(),
        "stack:\n    .rept 2000\n    .word 0\n    .endr\nmain:\n    j SystemExit\n"
    );
}

#[test]
fn test_patch_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "prog.S", "main:\n    ret\n");

    let output = rvcheck(dir.path(), &["patch", "prog.S"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("'.rept 4999' not found."), "{err}");
    assert!(err.contains("'ecall' instruction not found."), "{err}");
    assert!(err.contains("No changes were needed."), "{err}");
}

#[test]
fn test_patch_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = rvcheck(dir.path(), &["patch"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("file not found: main.S"));
}

#[test]
fn test_metrics_summary() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "commit.log", GOLDEN);
    write(dir.path(), "rtl_commit.log", &rtl_with_cycles(&[]));

    let output = rvcheck(dir.path(), &["--metrics", "compare"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("## Metrics Summary"), "{stdout}");
    assert!(stdout.contains("rvcheck_records_total{trace=rtl}: 3"), "{stdout}");
    assert!(stdout.contains("rvcheck_lines_skipped_total{trace=rtl}: 2"), "{stdout}");
    assert!(stdout.contains("rvcheck_verdicts_total{result=pass}: 1"), "{stdout}");
}
