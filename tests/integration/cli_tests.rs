//! Command-line tests running the built binary

use std::process::{Command, Output};

use serde_json::Value;

use crate::common::{read_to_string, write_split_schema, TestContext};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rust-ddl-import"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run rust-ddl-import")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_parse_directory_links_across_files() {
    let ctx = TestContext::new();
    write_split_schema(&ctx);
    let dir = ctx.path("ddl");

    let json = stdout_json(&run(&["parse", dir.to_str().unwrap(), "--sequential-ids"]));

    let tables = json["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["id"], "t1");
    assert_eq!(tables[0]["name"], "customers");
    assert_eq!(tables[1]["name"], "orders");

    let rels = json["relationships"].as_array().unwrap();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0]["name"], "fk_orders_customer");
    assert_eq!(rels[0]["sourceTableId"], "t2");
    assert_eq!(rels[0]["targetTableId"], "t1");
}

#[test]
fn test_parse_separate_keys_output_by_path() {
    let ctx = TestContext::new();
    let (parent, child) = write_split_schema(&ctx);

    let json = stdout_json(&run(&[
        "parse",
        parent.to_str().unwrap(),
        child.to_str().unwrap(),
        "--separate",
        "--compact",
    ]));

    let by_path = json.as_object().unwrap();
    assert_eq!(by_path.len(), 2);
    let orders = &by_path[&child.display().to_string()];
    assert_eq!(orders["tables"][0]["name"], "orders");
    assert_eq!(orders["relationships"].as_array().unwrap().len(), 0);
}

#[test]
fn test_parse_writes_output_file() {
    let ctx = TestContext::new();
    let script = ctx.write("one.sql", "CREATE TABLE t (id NUMBER(10) PRIMARY KEY);");
    let out = ctx.path("model.json");

    let output = run(&[
        "parse",
        script.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--no-grammar",
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let json: Value = serde_json::from_str(&read_to_string(&out)).unwrap();
    assert_eq!(json["tables"][0]["columns"][0]["typeArgs"]["length"], 10);
}

#[test]
fn test_parse_compact_output_is_single_line() {
    let ctx = TestContext::new();
    let script = ctx.write("one.sql", "CREATE TABLE t (id NUMBER);");

    let output = run(&["parse", script.to_str().unwrap(), "--compact"]);
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.trim_end().lines().count(), 1);
}

#[test]
fn test_parse_missing_input_fails() {
    let ctx = TestContext::new();
    let missing = ctx.path("missing.sql");

    let output = run(&["parse", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("input not found"));
}

#[test]
fn test_parse_requires_an_input() {
    let output = run(&["parse"]);
    assert!(!output.status.success());
}
