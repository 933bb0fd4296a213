//! Build [`GoFile`] summaries from tree-sitter syntax trees

use super::render::{
    children, field_children, interface_members, named_children, node_text, parameter_fields,
    position, render_type, signature_fields,
};
use super::{
    Diagnostic, FuncDecl, GoFile, ImportSpec, QualifiedRef, TypeDecl, TypeKind, UnusedLocal,
    ValueDecl, ValueKind,
};
use crate::utils::filters::{is_generated_source, is_test_file};
use anyhow::{Context, Result, anyhow};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Read and parse a Go file
pub fn parse_file(path: &Path) -> Result<GoFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_source(path, &String::from_utf8_lossy(&bytes))
}

/// Parse Go source into an owned summary
///
/// Syntax errors do not fail the call; they are recorded in
/// [`GoFile::syntax_errors`] and the rest of the file is still summarized.
pub fn parse_source(path: &Path, source: &str) -> Result<GoFile> {
    let tree = go_parser()?
        .parse(source, None)
        .ok_or_else(|| anyhow!("parser produced no syntax tree for {}", path.display()))?;
    let src = source.as_bytes();
    let root = tree.root_node();

    let mut file = GoFile {
        path: path.to_path_buf(),
        is_test: is_test_file(path),
        generated: is_generated_source(header(source)),
        build_ignored: has_ignore_constraint(source),
        ..GoFile::default()
    };

    collect_syntax_errors(root, src, &mut file.syntax_errors);

    for decl in named_children(root) {
        match decl.kind() {
            "package_clause" => {
                if let Some(name) = named_children(decl)
                    .into_iter()
                    .find(|c| c.kind() == "package_identifier")
                {
                    file.package = node_text(name, src).to_string();
                }
            }
            "import_declaration" => collect_imports(decl, src, &mut file.imports),
            "function_declaration" | "method_declaration" => {
                if let Some(func) = function_decl(decl, src) {
                    file.functions.push(func);
                }
            }
            "type_declaration" => collect_types(decl, src, &mut file.types),
            "var_declaration" => collect_values(decl, src, ValueKind::Var, &mut file.values),
            "const_declaration" => collect_values(decl, src, ValueKind::Const, &mut file.values),
            _ => {}
        }
    }

    if file.package.is_empty() && file.syntax_errors.is_empty() {
        file.syntax_errors.push(Diagnostic {
            message: "expected 'package', found 'EOF'".to_string(),
            line: 1,
            column: 1,
        });
    }

    for decl in named_children(root) {
        let locals = match decl.kind() {
            "function_declaration" | "method_declaration" => {
                let scope = FunctionScope::collect(decl, src);
                file.unused_locals.extend(scope.unused(decl, src));
                scope.names
            }
            _ => HashSet::new(),
        };
        collect_refs(decl, src, &locals, &mut file.refs);
    }

    file.qualifiers = file
        .refs
        .iter()
        .filter(|r| !r.shadowed)
        .map(|r| r.qualifier.clone())
        .collect();

    Ok(file)
}

fn go_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
    parser
        .set_language(&language)
        .context("Failed to load the Go grammar")?;
    Ok(parser)
}

/// Remove Go comments, keeping the line breaks of block comments
///
/// Comment markers inside string and rune literals are left alone.
pub fn strip_comments(source: &str) -> Result<String> {
    let tree = go_parser()?
        .parse(source, None)
        .ok_or_else(|| anyhow!("parser produced no syntax tree"))?;

    let mut ranges = Vec::new();
    collect_comment_ranges(tree.root_node(), &mut ranges);

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for (start, end) in ranges {
        out.push_str(&source[last..start]);
        out.extend(source[start..end].chars().filter(|c| *c == '\n'));
        last = end;
    }
    out.push_str(&source[last..]);
    Ok(out)
}

fn collect_comment_ranges(node: Node<'_>, out: &mut Vec<(usize, usize)>) {
    if node.kind() == "comment" {
        out.push((node.start_byte(), node.end_byte()));
        return;
    }
    for child in children(node) {
        collect_comment_ranges(child, out);
    }
}

/// Comments and blank lines ahead of the package clause
fn header(source: &str) -> &str {
    match source.find("\npackage ") {
        Some(end) => &source[..end],
        None if source.starts_with("package ") => "",
        None => source,
    }
}

fn has_ignore_constraint(source: &str) -> bool {
    header(source).lines().map(str::trim).any(|line| {
        line == "//go:build ignore" || line.starts_with("// +build ignore")
    })
}

fn collect_syntax_errors(node: Node<'_>, src: &[u8], out: &mut Vec<Diagnostic>) {
    if node.is_error() {
        let (line, column) = position(node);
        let token = node_text(node, src)
            .split_whitespace()
            .next()
            .unwrap_or("")
            .chars()
            .take(24)
            .collect::<String>();
        let message = if token.is_empty() {
            "syntax error: unexpected end of input".to_string()
        } else {
            format!("syntax error: unexpected {}", token)
        };
        out.push(Diagnostic {
            message,
            line,
            column,
        });
        return;
    }

    if node.is_missing() {
        let (line, column) = position(node);
        out.push(Diagnostic {
            message: format!("syntax error: missing {}", node.kind()),
            line,
            column,
        });
        return;
    }

    if !node.has_error() {
        return;
    }

    for child in children(node) {
        collect_syntax_errors(child, src, out);
    }
}

fn collect_imports(decl: Node<'_>, src: &[u8], out: &mut Vec<ImportSpec>) {
    for child in named_children(decl) {
        match child.kind() {
            "import_spec" => out.extend(import_spec(child, src)),
            "import_spec_list" => {
                for spec in named_children(child) {
                    if spec.kind() == "import_spec" {
                        out.extend(import_spec(spec, src));
                    }
                }
            }
            _ => {}
        }
    }
}

fn import_spec(spec: Node<'_>, src: &[u8]) -> Option<ImportSpec> {
    let path_node = spec.child_by_field_name("path")?;
    let path = node_text(path_node, src)
        .trim_matches(|c| c == '"' || c == '`')
        .to_string();
    if path.is_empty() {
        return None;
    }
    let (line, column) = position(spec);
    Some(ImportSpec {
        path,
        alias: spec
            .child_by_field_name("name")
            .map(|n| node_text(n, src).to_string()),
        line,
        column,
    })
}

fn function_decl(decl: Node<'_>, src: &[u8]) -> Option<FuncDecl> {
    let name = node_text(decl.child_by_field_name("name")?, src).to_string();
    let (params, results) = signature_fields(decl, src);

    let receiver_type = decl
        .child_by_field_name("receiver")
        .and_then(|list| {
            named_children(list)
                .into_iter()
                .find(|c| c.kind() == "parameter_declaration")
        })
        .and_then(|param| param.child_by_field_name("type"));
    let receiver = receiver_type.map(|ty| render_type(ty, src));
    let receiver_base = receiver.as_ref().map(|r| {
        let base = r.trim_start_matches('*');
        base.split('[').next().unwrap_or(base).trim().to_string()
    });

    let body = decl.child_by_field_name("body");
    let (line, column) = position(decl);

    Some(FuncDecl {
        name,
        receiver,
        receiver_base,
        params,
        results,
        line,
        column,
        end_line: decl.end_position().row + 1,
        has_body: body.is_some(),
        body_empty: body.is_some_and(is_empty_block),
    })
}

fn is_statement(node: &Node<'_>) -> bool {
    node.kind() != "comment"
}

/// A block with no statements; comments alone do not count
fn is_empty_block(block: Node<'_>) -> bool {
    named_children(block).into_iter().all(|child| {
        if child.kind() == "statement_list" {
            !named_children(child).iter().any(is_statement)
        } else {
            !is_statement(&child)
        }
    })
}

fn collect_types(decl: Node<'_>, src: &[u8], out: &mut Vec<TypeDecl>) {
    for spec in named_children(decl) {
        let is_alias = match spec.kind() {
            "type_spec" => false,
            "type_alias" => true,
            _ => continue,
        };
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };

        let kind = match ty.kind() {
            "struct_type" => TypeKind::Struct,
            "interface_type" => TypeKind::Interface,
            _ => TypeKind::Other,
        };
        let (methods, embeds) = if kind == TypeKind::Interface {
            interface_members(ty, src)
        } else {
            (Vec::new(), Vec::new())
        };
        let (line, column) = position(spec);

        out.push(TypeDecl {
            name: node_text(name, src).to_string(),
            kind,
            is_alias,
            underlying: render_type(ty, src),
            methods,
            embeds,
            line,
            column,
        });
    }
}

fn collect_values(decl: Node<'_>, src: &[u8], kind: ValueKind, out: &mut Vec<ValueDecl>) {
    for child in named_children(decl) {
        let child_kind = child.kind();
        if child_kind.ends_with("_spec_list") {
            collect_values(child, src, kind, out);
        } else if child_kind.ends_with("_spec") {
            let type_string = child
                .child_by_field_name("type")
                .map(|t| render_type(t, src));
            for name in field_children(child, "name") {
                let (line, column) = position(name);
                out.push(ValueDecl {
                    name: node_text(name, src).to_string(),
                    kind,
                    type_string: type_string.clone(),
                    line,
                    column,
                });
            }
        }
    }
}

/// Walk a declaration for `ident.Name` expressions and `pkg.Type` types
fn collect_refs(
    node: Node<'_>,
    src: &[u8],
    locals: &HashSet<String>,
    out: &mut Vec<QualifiedRef>,
) {
    let qualified = match node.kind() {
        "selector_expression" => node
            .child_by_field_name("operand")
            .filter(|operand| operand.kind() == "identifier")
            .zip(node.child_by_field_name("field")),
        "qualified_type" => node
            .child_by_field_name("package")
            .zip(node.child_by_field_name("name")),
        _ => None,
    };

    if let Some((qualifier, name)) = qualified {
        let qualifier = node_text(qualifier, src).to_string();
        let (line, column) = position(node);
        out.push(QualifiedRef {
            shadowed: locals.contains(&qualifier),
            qualifier,
            name: node_text(name, src).to_string(),
            line,
            column,
        });
    }

    for child in named_children(node) {
        collect_refs(child, src, locals, out);
    }
}

/// Names bound inside one function: receiver, parameters and locals
struct FunctionScope {
    name: String,
    names: HashSet<String>,
    /// Checked locals with their declaration sites, in source order
    declared: BTreeMap<String, Vec<(usize, usize)>>,
    order: Vec<String>,
}

impl FunctionScope {
    fn collect(decl: Node<'_>, src: &[u8]) -> Self {
        let mut scope = FunctionScope {
            name: decl
                .child_by_field_name("name")
                .map(|n| node_text(n, src).to_string())
                .unwrap_or_default(),
            names: HashSet::new(),
            declared: BTreeMap::new(),
            order: Vec::new(),
        };

        for field in ["receiver", "parameters", "result"] {
            if let Some(list) = decl.child_by_field_name(field) {
                if list.kind() == "parameter_list" {
                    scope.bind_params(list, src);
                }
            }
        }
        if let Some(body) = decl.child_by_field_name("body") {
            scope.walk(body, src);
        }
        scope
    }

    fn bind_params(&mut self, list: Node<'_>, src: &[u8]) {
        for field in parameter_fields(list, src) {
            if let Some(name) = field.name {
                self.names.insert(name);
            }
        }
    }

    fn declare(&mut self, ident: Node<'_>, src: &[u8]) {
        if ident.kind() != "identifier" {
            return;
        }
        let name = node_text(ident, src).to_string();
        if name == "_" {
            return;
        }
        self.names.insert(name.clone());
        let sites = self.declared.entry(name.clone()).or_default();
        if sites.is_empty() {
            self.order.push(name);
        }
        sites.push(position(ident));
    }

    fn walk(&mut self, node: Node<'_>, src: &[u8]) {
        match node.kind() {
            "short_var_declaration" => {
                if let Some(left) = node.child_by_field_name("left") {
                    for ident in named_children(left) {
                        self.declare(ident, src);
                    }
                }
            }
            "range_clause" => {
                let defines = children(node).iter().any(|c| c.kind() == ":=");
                if let (true, Some(left)) = (defines, node.child_by_field_name("left")) {
                    for ident in named_children(left) {
                        self.declare(ident, src);
                    }
                }
            }
            "var_spec" => {
                for ident in field_children(node, "name") {
                    self.declare(ident, src);
                }
            }
            "const_spec" => {
                for ident in field_children(node, "name") {
                    self.names.insert(node_text(ident, src).to_string());
                }
            }
            "func_literal" => {
                if let Some(list) = node.child_by_field_name("parameters") {
                    self.bind_params(list, src);
                }
            }
            _ => {}
        }

        for child in named_children(node) {
            self.walk(child, src);
        }
    }

    /// Locals whose identifier never appears outside their declaration sites
    fn unused(&self, decl: Node<'_>, src: &[u8]) -> Vec<UnusedLocal> {
        if self.order.is_empty() {
            return Vec::new();
        }
        let Some(body) = decl.child_by_field_name("body") else {
            return Vec::new();
        };

        let mut occurrences: BTreeMap<&str, usize> = BTreeMap::new();
        count_identifiers(body, src, &mut occurrences);

        self.order
            .iter()
            .filter_map(|name| {
                let sites = self.declared.get(name)?;
                let seen = occurrences.get(name.as_str()).copied().unwrap_or(0);
                if seen > sites.len() {
                    return None;
                }
                let (line, column) = sites[0];
                Some(UnusedLocal {
                    name: name.clone(),
                    function: self.name.clone(),
                    line,
                    column,
                })
            })
            .collect()
    }
}

fn count_identifiers<'s>(node: Node<'_>, src: &'s [u8], out: &mut BTreeMap<&'s str, usize>) {
    if node.kind() == "identifier" {
        *out.entry(node_text(node, src)).or_default() += 1;
        return;
    }
    for child in named_children(node) {
        count_identifiers(child, src, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{TypeKind, ValueKind};
    use std::path::PathBuf;

    fn parse(source: &str) -> GoFile {
        parse_source(&PathBuf::from("main.go"), source).unwrap()
    }

    const BASIC: &str = r#"package basic

import (
	"context"
	"fmt"
	_ "embed"
	str "strings"
)

// ComplexInterface has a few methods
type ComplexInterface interface {
	Method1(ctx context.Context, input string) (string, error)
	Method2(data []byte) error
	fmt.Stringer
}

type User struct {
	ID   int    `json:"id"`
	Name string
	*Options
}

type Options struct{}

type Result = map[string]int

const Version = "1.0"

var defaultUser, adminUser User

func NewUser(name string, ids ...int) *User {
	return &User{Name: str.TrimSpace(name)}
}

func (u *User) Greet(ctx context.Context) string {
	return fmt.Sprintf("hi %s", u.Name)
}

func noop() {
	// nothing yet
}
"#;

    #[test]
    fn test_parse_package_and_imports() {
        let file = parse(BASIC);
        assert_eq!(file.package, "basic");
        assert!(file.syntax_errors.is_empty());

        let paths: Vec<_> = file.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["context", "fmt", "embed", "strings"]);
        assert!(file.imports[2].is_blank());
        assert_eq!(file.imports[3].local_name(), "str");
        assert_eq!(file.imports[0].line, 4);
    }

    #[test]
    fn test_parse_types() {
        let file = parse(BASIC);
        let iface = file.types.iter().find(|t| t.name == "ComplexInterface").unwrap();
        assert_eq!(iface.kind, TypeKind::Interface);
        assert_eq!(iface.methods.len(), 2);
        assert_eq!(iface.embeds, vec!["fmt.Stringer".to_string()]);
        assert_eq!(
            iface.methods[0].signature(),
            "func(ctx context.Context, input string) (string, error)"
        );

        let user = file.types.iter().find(|t| t.name == "User").unwrap();
        assert_eq!(user.kind, TypeKind::Struct);
        assert_eq!(
            user.underlying,
            "struct{ID int `json:\"id\"`; Name string; *Options}"
        );

        let options = file.types.iter().find(|t| t.name == "Options").unwrap();
        assert_eq!(options.underlying, "struct{}");

        let result = file.types.iter().find(|t| t.name == "Result").unwrap();
        assert!(result.is_alias);
        assert_eq!(result.underlying, "map[string]int");
    }

    #[test]
    fn test_parse_functions() {
        let file = parse(BASIC);
        let new_user = file.functions.iter().find(|f| f.name == "NewUser").unwrap();
        assert!(!new_user.is_method());
        assert_eq!(new_user.signature(), "func(name string, ids ...int) *User");
        assert_eq!(new_user.param_types(), vec!["string", "...int"]);
        assert!(!new_user.body_empty);

        let greet = file.functions.iter().find(|f| f.name == "Greet").unwrap();
        assert_eq!(greet.receiver.as_deref(), Some("*User"));
        assert_eq!(greet.receiver_base.as_deref(), Some("User"));

        let noop = file.functions.iter().find(|f| f.name == "noop").unwrap();
        assert!(noop.body_empty);
        assert!(noop.end_line > noop.line);
    }

    #[test]
    fn test_parse_values() {
        let file = parse(BASIC);
        let names: Vec<_> = file.values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Version", "defaultUser", "adminUser"]);
        assert_eq!(file.values[0].kind, ValueKind::Const);
        assert_eq!(file.values[1].type_string.as_deref(), Some("User"));
    }

    #[test]
    fn test_qualified_refs() {
        let file = parse(BASIC);
        assert!(file.qualifiers.contains("fmt"));
        assert!(file.qualifiers.contains("context"));
        assert!(file.qualifiers.contains("str"));
        // u.Name is a selector on a receiver, not a package
        assert!(file.refs.iter().any(|r| r.qualifier == "u" && r.shadowed));
        assert!(!file.qualifiers.contains("u"));
    }

    #[test]
    fn test_syntax_errors_are_recorded() {
        let file = parse("package broken\n\nfunc main() {\n\tx := (1 + \n}\n");
        assert!(file.has_syntax_errors());
        assert!(file.syntax_errors[0].line >= 3);
        assert_eq!(file.package, "broken");
    }

    #[test]
    fn test_missing_package_clause() {
        let file = parse("");
        assert!(file.has_syntax_errors());
        assert!(file.syntax_errors[0].message.contains("expected 'package'"));
    }

    #[test]
    fn test_unused_locals() {
        let file = parse(
            r#"package main

func run() int {
	used := 1
	unused := 2
	for i, v := range []int{1} {
		_ = v
	}
	var later string
	later = "x"
	_, err := work()
	return used
}

func work() (int, error) { return 0, nil }
"#,
        );
        let names: Vec<_> = file.unused_locals.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["unused", "i", "err"]);
        assert!(file.unused_locals.iter().all(|u| u.function == "run"));
    }

    #[test]
    fn test_strip_comments() {
        let source = "package a\n\n// doc\nfunc F() string { /* one\ntwo */ return \"// kept\" }\n";
        let stripped = strip_comments(source).unwrap();
        assert_eq!(stripped, "package a\n\n\nfunc F() string { \n return \"// kept\" }\n");
    }

    #[test]
    fn test_build_ignore_and_generated() {
        let file = parse("//go:build ignore\n\npackage tools\n");
        assert!(file.build_ignored);

        let file = parse("// Code generated by mockgen. DO NOT EDIT.\n\npackage mocks\n");
        assert!(file.generated);
        assert!(!file.build_ignored);
    }

    #[test]
    fn test_header_stops_at_package_clause() {
        assert_eq!(header("// lead\n\npackage a\n//go:build ignore\n"), "// lead\n");
        assert_eq!(header("package a\n"), "");
        assert!(!parse("package a\n\n//go:build ignore\n").build_ignored);
    }
}
