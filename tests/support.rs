//! Common test support utilities and fixtures
//!
//! Each workspace is a temporary Go module; helpers write its files and
//! build options pointing at it.

#![allow(dead_code)]

use readgo::config::AnalyzerOptions;
use readgo::validator::ValidationLevel;
use std::{fs, path::Path, process::Command};
use tempfile::TempDir;

/// Result of running the CLI binary
#[derive(Debug)]
pub struct CliOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A temporary Go module
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    /// Create a workspace whose `go.mod` declares `module`
    pub fn new(module: &str) -> Self {
        let ws = Self::empty();
        ws.write("go.mod", &format!("module {}\n\ngo 1.21\n", module));
        ws
    }

    /// Create a workspace without a `go.mod`
    pub fn empty() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        Self { root }
    }

    /// Write a file, creating parent directories
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn path_str(&self) -> &str {
        self.root.path().to_str().expect("Workspace path not UTF-8")
    }

    pub fn options(&self, level: ValidationLevel) -> AnalyzerOptions {
        AnalyzerOptions::builder()
            .with_work_dir(self.path())
            .with_validation_level(level)
            .build()
    }
}

/// `testmod` where pkg1 -> pkg2 -> pkg3 -> pkg1
pub fn ring_workspace() -> Workspace {
    let ws = Workspace::new("testmod");
    ws.write(
        "pkg1/pkg1.go",
        "package pkg1\n\nimport \"testmod/pkg2\"\n\nfunc One() int { return pkg2.Two() }\n",
    );
    ws.write(
        "pkg2/pkg2.go",
        "package pkg2\n\nimport \"testmod/pkg3\"\n\nfunc Two() int { return pkg3.Three() }\n",
    );
    ws.write(
        "pkg3/pkg3.go",
        "package pkg3\n\nimport \"testmod/pkg1\"\n\nfunc Three() int { return pkg1.One() }\n",
    );
    ws
}

/// `testmod` where pkg1 -> pkg2 -> pkg3 without a cycle
pub fn chain_workspace() -> Workspace {
    let ws = Workspace::new("testmod");
    ws.write(
        "pkg1/pkg1.go",
        "package pkg1\n\nimport \"testmod/pkg2\"\n\nfunc One() int { return pkg2.Two() }\n",
    );
    ws.write(
        "pkg2/pkg2.go",
        "package pkg2\n\nimport \"testmod/pkg3\"\n\nfunc Two() int { return pkg3.Three() }\n",
    );
    ws.write("pkg3/pkg3.go", "package pkg3\n\nfunc Three() int { return 3 }\n");
    ws
}

/// `testmod` with a shapes package used by an app package
pub fn shapes_workspace() -> Workspace {
    let ws = Workspace::new("testmod");
    ws.write(
        "shapes/shapes.go",
        r#"package shapes

// Shape has an area
type Shape interface {
	Area() float64
}

type Square struct {
	Side float64
}

func (s Square) Area() float64 {
	return s.Side * s.Side
}

func NewSquare(side float64) Square {
	return Square{Side: side}
}

var defaultSide = 1.0
"#,
    );
    ws.write(
        "app/app.go",
        r#"package app

import (
	"fmt"

	"testmod/shapes"
)

func Describe(s shapes.Shape) string {
	return fmt.Sprintf("%.2f", s.Area())
}
"#,
    );
    ws
}

/// `testmod` with one `heavy` package spread over `files` files
pub fn heavy_workspace(files: usize) -> Workspace {
    let ws = Workspace::new("testmod");
    for i in 0..files {
        ws.write(
            &format!("heavy/part{:04}.go", i),
            &format!(
                "package heavy\n\nimport \"strings\"\n\ntype Item{i} struct {{\n\tName string\n\tSize int\n}}\n\nfunc (it Item{i}) Label() string {{\n\treturn strings.ToUpper(it.Name)\n}}\n\nfunc Make{i}(name string) Item{i} {{\n\treturn Item{i}{{Name: name}}\n}}\n",
                i = i
            ),
        );
    }
    ws
}

/// Add `count` packages `gen/pNN`, each with a blank import and an empty function
pub fn add_generated_packages(ws: &Workspace, count: usize) {
    for i in 0..count {
        ws.write(
            &format!("gen/p{:02}/p.go", i),
            &format!(
                "package p{:02}\n\nimport _ \"embed\"\n\nfunc Empty() {{}}\n",
                i
            ),
        );
    }
}

/// Run the readgo binary with `args` in `cwd`
pub fn run_cli(args: &[&str], cwd: &Path) -> CliOutput {
    let output = Command::new(env!("CARGO_BIN_EXE_readgo"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute readgo");

    CliOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
