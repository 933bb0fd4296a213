//! Rendering of type expressions and parameter lists

use super::{Field, MethodSig};
use tree_sitter::Node;

/// Source text of a node; empty when it is not valid UTF-8
pub fn node_text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// 1-based line and column of a node's start
pub fn position(node: Node<'_>) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render a type expression the way `go/types` prints it, as far as syntax allows
pub fn render_type(node: Node<'_>, src: &[u8]) -> String {
    match node.kind() {
        "struct_type" => render_struct(node, src),
        "interface_type" => {
            let (methods, embeds) = interface_members(node, src);
            let mut members = embeds;
            members.extend(
                methods
                    .iter()
                    .map(|m| format!("{}{}", m.name, &m.signature()["func".len()..])),
            );
            format!("interface{{{}}}", members.join("; "))
        }
        "pointer_type" => match first_named(node) {
            Some(inner) => format!("*{}", render_type(inner, src)),
            None => collapse_whitespace(node_text(node, src)),
        },
        "slice_type" => match node.child_by_field_name("element") {
            Some(element) => format!("[]{}", render_type(element, src)),
            None => collapse_whitespace(node_text(node, src)),
        },
        "array_type" => match (
            node.child_by_field_name("length"),
            node.child_by_field_name("element"),
        ) {
            (Some(length), Some(element)) => format!(
                "[{}]{}",
                collapse_whitespace(node_text(length, src)),
                render_type(element, src)
            ),
            _ => collapse_whitespace(node_text(node, src)),
        },
        "map_type" => match (
            node.child_by_field_name("key"),
            node.child_by_field_name("value"),
        ) {
            (Some(key), Some(value)) => format!(
                "map[{}]{}",
                render_type(key, src),
                render_type(value, src)
            ),
            _ => collapse_whitespace(node_text(node, src)),
        },
        "channel_type" => {
            let text = node_text(node, src);
            let prefix = if text.starts_with("<-") {
                "<-chan "
            } else if text.replace(' ', "").starts_with("chan<-") {
                "chan<- "
            } else {
                "chan "
            };
            match node.child_by_field_name("value") {
                Some(value) => format!("{}{}", prefix, render_type(value, src)),
                None => collapse_whitespace(text),
            }
        }
        "function_type" => {
            let (params, results) = signature_fields(node, src);
            format!("func{}", super::render_signature(&params, &results))
        }
        "parenthesized_type" => match first_named(node) {
            Some(inner) => render_type(inner, src),
            None => collapse_whitespace(node_text(node, src)),
        },
        _ => collapse_whitespace(node_text(node, src)),
    }
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() != "comment")
}

fn render_struct(node: Node<'_>, src: &[u8]) -> String {
    let mut fields = Vec::new();
    let list = named_children(node)
        .into_iter()
        .find(|c| c.kind() == "field_declaration_list");

    if let Some(list) = list {
        for decl in named_children(list) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let Some(ty) = decl.child_by_field_name("type") else {
                continue;
            };
            let tag = decl
                .child_by_field_name("tag")
                .map(|t| format!(" {}", node_text(t, src)))
                .unwrap_or_default();
            let names = field_children(decl, "name");

            if names.is_empty() {
                let star = children(decl).iter().any(|c| c.kind() == "*");
                let embedded = render_type(ty, src);
                fields.push(format!("{}{}{}", if star { "*" } else { "" }, embedded, tag));
            } else {
                let rendered = render_type(ty, src);
                for name in names {
                    fields.push(format!("{} {}{}", node_text(name, src), rendered, tag));
                }
            }
        }
    }

    format!("struct{{{}}}", fields.join("; "))
}

/// Methods and embedded elements of an interface type
pub fn interface_members(node: Node<'_>, src: &[u8]) -> (Vec<MethodSig>, Vec<String>) {
    let mut methods = Vec::new();
    let mut embeds = Vec::new();

    for member in named_children(node) {
        match member.kind() {
            "method_elem" | "method_spec" => {
                let Some(name) = member.child_by_field_name("name") else {
                    continue;
                };
                let (params, results) = signature_fields(member, src);
                methods.push(MethodSig {
                    name: node_text(name, src).to_string(),
                    params,
                    results,
                });
            }
            "comment" => {}
            _ => embeds.push(collapse_whitespace(node_text(member, src))),
        }
    }

    (methods, embeds)
}

/// Parameters and results of a node carrying `parameters` and `result` fields
pub fn signature_fields(node: Node<'_>, src: &[u8]) -> (Vec<Field>, Vec<Field>) {
    let params = node
        .child_by_field_name("parameters")
        .map(|list| parameter_fields(list, src))
        .unwrap_or_default();

    let results = match node.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => parameter_fields(result, src),
        Some(result) => vec![Field {
            name: None,
            type_string: render_type(result, src),
        }],
        None => Vec::new(),
    };

    (params, results)
}

/// Flatten a `parameter_list`; `a, b int` yields two fields
pub fn parameter_fields(list: Node<'_>, src: &[u8]) -> Vec<Field> {
    let mut fields = Vec::new();

    for param in named_children(list) {
        let variadic = match param.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let Some(ty) = param.child_by_field_name("type") else {
            continue;
        };
        let mut type_string = render_type(ty, src);
        if variadic {
            type_string = format!("...{}", type_string);
        }

        let names = field_children(param, "name");
        if names.is_empty() {
            fields.push(Field {
                name: None,
                type_string,
            });
        } else {
            for name in names {
                fields.push(Field {
                    name: Some(node_text(name, src).to_string()),
                    type_string: type_string.clone(),
                });
            }
        }
    }

    fields
}
