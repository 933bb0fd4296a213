//! `go.mod` parsing

use crate::constants::module::GO_MOD_FILE;
use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Line patterns, compiled once per parse
struct Patterns {
    module: Regex,
    go: Regex,
    require: Regex,
    replace: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        Ok(Self {
            module: Regex::new(r#"^module\s+"?([^\s"]+)"?$"#)?,
            go: Regex::new(r"^go\s+(\S+)$")?,
            require: Regex::new(r#"^"?([^\s"]+)"?\s+(\S+)$"#)?,
            replace: Regex::new(
                r#"^"?([^\s"]+)"?(?:\s+(\S+))?\s+=>\s+"?([^\s"]+)"?(?:\s+(\S+))?$"#,
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub old_path: String,
    pub old_version: Option<String>,
    pub new_path: String,
    pub new_version: Option<String>,
}

impl Replacement {
    /// Replacements pointing at a directory rather than another module
    pub fn is_local(&self) -> bool {
        self.new_path.starts_with("./")
            || self.new_path.starts_with("../")
            || Path::new(&self.new_path).is_absolute()
    }
}

/// Parsed contents of a `go.mod` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoMod {
    pub module: String,
    pub go_version: Option<String>,
    pub requires: Vec<Requirement>,
    pub replaces: Vec<Replacement>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

impl GoMod {
    /// Parse `go.mod` text
    pub fn parse(content: &str) -> Result<Self> {
        let patterns = Patterns::new()?;
        let mut gomod = GoMod::default();
        let mut block = Block::None;

        for (index, raw) in content.lines().enumerate() {
            let line = strip_comment(raw);
            let indirect = raw.contains("// indirect");
            if line.is_empty() {
                continue;
            }

            if block != Block::None {
                if line == ")" {
                    block = Block::None;
                    continue;
                }
                match block {
                    Block::Require => gomod.push_require(&patterns.require, line, indirect, index)?,
                    Block::Replace => gomod.push_replace(&patterns.replace, line, index)?,
                    _ => {}
                }
                continue;
            }

            let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            match directive {
                "module" => {
                    let captures = patterns
                        .module
                        .captures(line)
                        .with_context(|| format!("go.mod:{}: malformed module line", index + 1))?;
                    gomod.module = captures[1].to_string();
                }
                "go" => {
                    if let Some(captures) = patterns.go.captures(line) {
                        gomod.go_version = Some(captures[1].to_string());
                    }
                }
                "require" if rest == "(" => block = Block::Require,
                "require" => gomod.push_require(&patterns.require, rest, indirect, index)?,
                "replace" if rest == "(" => block = Block::Replace,
                "replace" => gomod.push_replace(&patterns.replace, rest, index)?,
                _ if rest == "(" => block = Block::Other,
                _ => {}
            }
        }

        if gomod.module.is_empty() {
            bail!("go.mod: no module directive found");
        }
        Ok(gomod)
    }

    /// Read and parse `dir/go.mod`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(GO_MOD_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn push_require(
        &mut self,
        pattern: &Regex,
        entry: &str,
        indirect: bool,
        index: usize,
    ) -> Result<()> {
        let captures = pattern
            .captures(entry)
            .with_context(|| format!("go.mod:{}: malformed require entry", index + 1))?;
        self.requires.push(Requirement {
            path: captures[1].to_string(),
            version: captures[2].to_string(),
            indirect,
        });
        Ok(())
    }

    fn push_replace(&mut self, pattern: &Regex, entry: &str, index: usize) -> Result<()> {
        let captures = pattern
            .captures(entry)
            .with_context(|| format!("go.mod:{}: malformed replace entry", index + 1))?;
        self.replaces.push(Replacement {
            old_path: captures[1].to_string(),
            old_version: captures.get(2).map(|m| m.as_str().to_string()),
            new_path: captures[3].to_string(),
            new_version: captures.get(4).map(|m| m.as_str().to_string()),
        });
        Ok(())
    }

    /// Whether an import path belongs to this module
    pub fn is_local(&self, import_path: &str) -> bool {
        is_within_module(&self.module, import_path)
    }

    /// The requirement providing `import_path`, by longest module-path prefix
    pub fn requirement_for(&self, import_path: &str) -> Option<&Requirement> {
        self.requires
            .iter()
            .filter(|req| is_within_module(&req.path, import_path))
            .max_by_key(|req| req.path.len())
    }

    /// The replacement applying to a module at a given version
    pub fn replacement_for(&self, module_path: &str, version: &str) -> Option<&Replacement> {
        self.replaces.iter().find(|rep| {
            rep.old_path == module_path
                && rep.old_version.as_deref().is_none_or(|v| v == version)
        })
    }
}

/// Whether `import_path` is `module` or a package beneath it
pub fn is_within_module(module: &str, import_path: &str) -> bool {
    !module.is_empty()
        && (import_path == module
            || import_path
                .strip_prefix(module)
                .is_some_and(|rest| rest.starts_with('/')))
}

/// Standard-library import paths have no dot in their first element
pub fn is_standard_library(import_path: &str) -> bool {
    let first = import_path.split('/').next().unwrap_or(import_path);
    !first.contains('.') && !first.is_empty()
}

/// Nearest directory at or above `start` holding a `go.mod`
pub fn find_module_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GO_MOD_FILE).is_file())
        .map(Path::to_path_buf)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => line[..index].trim(),
        None => line.trim(),
    }
}
