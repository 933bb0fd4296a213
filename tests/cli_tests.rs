//! End-to-end tests of the readgo binary

mod support;

use support::{Workspace, chain_workspace, ring_workspace, run_cli, shapes_workspace};

#[test]
fn test_cli_help() {
    let ws = Workspace::empty();
    let output = run_cli(&["--help"], ws.path());

    assert_eq!(output.status, 0);
    assert!(output.stdout.contains("Usage:"));
    assert!(output.stdout.contains("validate"));
    assert!(output.stdout.contains("cycles"));
}

#[test]
fn test_cli_invalid_subcommand() {
    let ws = Workspace::empty();
    let output = run_cli(&["invalid-command"], ws.path());

    assert_ne!(output.status, 0);
    assert!(output.stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_cli_cycles_json() {
    let ws = ring_workspace();
    let output = run_cli(&["--json", "cycles", "./pkg1"], ws.path());

    assert_ne!(output.status, 0);
    let json_end = output.stdout.rfind('}').expect("JSON output") + 1;
    let value: serde_json::Value = serde_json::from_str(&output.stdout[..json_end]).unwrap();
    assert_eq!(value["has_circular_deps"], true);
    assert_eq!(
        value["circular_deps"],
        serde_json::json!(["pkg1 -> pkg2", "pkg2 -> pkg3", "pkg3 -> pkg1"])
    );
}

#[test]
fn test_cli_chain_passes() {
    let ws = chain_workspace();
    let output = run_cli(&["cycles", "./pkg1"], ws.path());

    assert_eq!(output.status, 0, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("No issues found"));
}

#[test]
fn test_cli_work_dir_and_level_flags() {
    let ws = shapes_workspace();
    let elsewhere = Workspace::empty();
    let output = run_cli(
        &[
            "--work-dir",
            ws.path_str(),
            "--level",
            "strict",
            "--sequential",
            "validate",
            "project",
        ],
        elsewhere.path(),
    );

    assert_eq!(output.status, 0, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("strict level"));
}

#[test]
fn test_cli_config_file_sets_level() {
    let ws = shapes_workspace();
    ws.write("readgo.yaml", "validation:\n  level: basic\n");
    let output = run_cli(&["validate", "file", "app/app.go"], ws.path());

    assert_eq!(output.status, 0, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("basic level"));
}

#[test]
fn test_cli_rejects_bad_arguments() {
    let ws = shapes_workspace();

    let output = run_cli(&["--level", "pedantic", "validate", "project"], ws.path());
    assert_ne!(output.status, 0);

    let output = run_cli(&["find", "type", "./shapes", "not.ident"], ws.path());
    assert_ne!(output.status, 0);
    assert!(output.stderr.contains("not a valid Go identifier"));

    let output = run_cli(&["--exclude", "[", "tree"], ws.path());
    assert_ne!(output.status, 0);
}

#[test]
fn test_cli_find_type_json() {
    let ws = shapes_workspace();
    let output = run_cli(&["--json", "find", "type", "./shapes", "Square"], ws.path());

    assert_eq!(output.status, 0, "stderr: {}", output.stderr);
    let value: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(value["name"], "Square");
    assert_eq!(value["package"], "testmod/shapes");
    assert_eq!(value["type"], "struct{Side float64}");
}

#[test]
fn test_cli_tree_and_read() {
    let ws = shapes_workspace();

    let output = run_cli(&["tree", "--file-type", "go"], ws.path());
    assert_eq!(output.status, 0, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("shapes.go"));
    assert!(!output.stdout.contains("go.mod"));

    let output = run_cli(&["read", "shapes/shapes.go", "--functions"], ws.path());
    assert_eq!(output.status, 0, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("Square.Area"));
    assert!(output.stdout.contains("NewSquare"));
}
