//! CLI end-to-end tests.
//!
//! These exercise the `pseudoc` binary: argument handling, the file
//! extension check, the pipeline error paths, and complete program runs
//! with piped stdin.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pseudoc() -> Command {
    Command::cargo_bin("pseudoc").expect("binary must build")
}

/// Writes a program into a temp dir and returns its path.
fn write_program(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("failed to write program");
    path
}

#[test]
fn test_no_arguments_prints_usage() {
    pseudoc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: pseudoc <filename>"));
}

#[test]
fn test_too_many_arguments_prints_usage() {
    pseudoc()
        .args(["a.pseudo", "b.pseudo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: pseudoc <filename>"));
}

#[test]
fn test_wrong_extension_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "program.txt", "OUTPUT 1");
    pseudoc()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains(".pseudo"));
}

#[test]
fn test_missing_file_is_reported() {
    pseudoc()
        .arg("no_such_file.pseudo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn test_arithmetic_program() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "arith.pseudo",
        "DECLARE a : INTEGER\nDECLARE b : INTEGER\na <- 1\nb <- 1\nOUTPUT a + b\nOUTPUT a - b\n",
    );
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq("2\n0\n"));
}

#[test]
fn test_while_loop_program() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "loop.pseudo",
        "DECLARE x : INTEGER\nx <- 0\nWHILE x < 3\nOUTPUT x\nx <- x + 1\nENDWHILE\n",
    );
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq("0\n1\n2\n"));
}

#[test]
fn test_recursive_function_program() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "fact.pseudo",
        "FUNCTION Fact(n : INTEGER) RETURNS INTEGER\nIF n = 0 THEN\nRETURN 1\nELSE\nRETURN n * Fact(n - 1)\nENDIF\nENDFUNCTION\nDECLARE r : INTEGER\nr <- Fact(5)\nOUTPUT r\n",
    );
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq("120\n"));
}

#[test]
fn test_two_dimensional_array_program() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "grid.pseudo",
        "DECLARE B : ARRAY[1:3, 1:3] OF INTEGER\nB[2, 2] <- 3\nOUTPUT B[2, 1]\nOUTPUT B[2, 2]\n",
    );
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq("0\n3\n"));
}

#[test]
fn test_pointer_round_trip_program() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "ptr.pseudo",
        "DECLARE x : INTEGER\nDECLARE p : ^INTEGER\nx <- 7\np <- ^x\nOUTPUT p^\np^ <- 100\nOUTPUT x\n",
    );
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq("7\n100\n"));
}

#[test]
fn test_string_intrinsics_program() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "strings.pseudo",
        "DECLARE s : STRING\ns <- \"ABCDEFGH\"\nOUTPUT RIGHT(s, 3)\nOUTPUT LENGTH(s)\nOUTPUT MID(s, 2, 3)\nOUTPUT \"Hello\" & \"!\"\n",
    );
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::eq("FGH\n8\nBCD\nHello!\n"));
}

#[test]
fn test_input_reads_stdin_and_prompts() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(
        &dir,
        "ask.pseudo",
        "DECLARE age : INTEGER\nINPUT age\nOUTPUT age + 1\n",
    );
    pseudoc()
        .arg(&path)
        .write_stdin("41\n")
        .assert()
        .success()
        .stdout(predicate::eq("Enter value for age: 42\n"));
}

#[test]
fn test_input_type_mismatch_fails() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "ask.pseudo", "DECLARE n : INTEGER\nINPUT n\n");
    pseudoc()
        .arg(&path)
        .write_stdin("not a number\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input error"));
}

#[test]
fn test_lex_error_exit() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "bad.pseudo", "OUTPUT @\n");
    pseudoc()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("lex error"));
}

#[test]
fn test_syntax_error_exit() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "bad.pseudo", "IF 1 = 1 THEN\nOUTPUT 1\n");
    pseudoc()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn test_runtime_error_exit() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "bad.pseudo", "OUTPUT ghost\n");
    pseudoc()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("name error"));
}

#[test]
fn test_emit_tokens() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "p.pseudo", "OUTPUT 1\n");
    pseudoc()
        .args(["--emit-tokens"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Keyword(Output)").and(predicate::str::contains("Number")));
}

#[test]
fn test_emit_ast() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "p.pseudo", "DECLARE x : INTEGER\n");
    pseudoc()
        .args(["--emit-ast"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Declare"));
}

#[test]
fn test_verbose_traces_phases() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "p.pseudo", "OUTPUT 1\n");
    pseudoc()
        .args(["--verbose"])
        .arg(&path)
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Lexing")
                .and(predicate::str::contains("Parsing"))
                .and(predicate::str::contains("Running")),
        );
}

#[test]
fn test_empty_program_succeeds_silently() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_program(&dir, "empty.pseudo", "");
    pseudoc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
