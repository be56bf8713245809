// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonical text rendering of expression trees.
//!
//! [`node_to_string`] is the inverse of parsing for the forms it covers:
//! rendering a finished tree and parsing the result yields an equivalent
//! tree. Composite expressions are parenthesized wholesale rather than by
//! precedence, which keeps the renderer trivially correct.
//!
//! Like every other tree walk in this crate, rendering is iterative (an
//! explicit work stack of nodes and text fragments), so error paths can
//! safely stringify arbitrarily deep subtrees.

use std::fmt::Write as _;

use crate::ast::{ArrowSignature, Node, NodeKind};
use crate::source_analysis::{ParenKind, Quote, POSTFIX_OPERATORS, PREFIX_OPERATORS};

/// One unit of pending rendering work.
enum Item<'a> {
    Node(&'a Node),
    Text(&'static str),
    Owned(String),
}

/// Renders a node back to Grapheme surface syntax.
#[must_use]
pub fn node_to_string(node: &Node) -> String {
    let mut out = String::new();
    let mut stack: Vec<Item<'_>> = vec![Item::Node(node)];

    while let Some(item) = stack.pop() {
        match item {
            Item::Text(text) => out.push_str(text),
            Item::Owned(text) => out.push_str(&text),
            Item::Node(node) => push_node(&mut stack, node),
        }
    }
    out
}

/// Pushes the rendering of `node` onto the stack (in reverse order).
fn push_node<'a>(stack: &mut Vec<Item<'a>>, node: &'a Node) {
    let mut items: Vec<Item<'a>> = Vec::new();
    render_into(&mut items, node);
    while let Some(item) = items.pop() {
        stack.push(item);
    }
}

/// Appends the items that render `node`, front to back.
fn render_into<'a>(items: &mut Vec<Item<'a>>, node: &'a Node) {
    match &node.kind {
        NodeKind::Number { value } => items.push(Item::Owned(value.to_string())),
        NodeKind::Variable { name } | NodeKind::TypeName { name } | NodeKind::FunctionName { name } => {
            items.push(Item::Owned(name.to_string()));
        }

        // A string renders from its own quote and contents; synthetic
        // strings (property names, chain operators) are bare.
        NodeKind::Str { contents, quote, .. } => {
            let rendered = match quote {
                Quote::Double => format!("\"{contents}\""),
                Quote::Single => format!("'{contents}'"),
                Quote::None => contents.to_string(),
            };
            items.push(Item::Owned(rendered));
        }

        NodeKind::Operator { op, children, .. } => render_operator(items, op, children),

        NodeKind::Function {
            name,
            paren_info,
            children,
        } => {
            if paren_info.vertical_bar && children.len() == 1 {
                items.push(Item::Text("|"));
                items.push(Item::Node(&children[0]));
                items.push(Item::Text("|"));
            } else {
                items.push(Item::Owned(format!("{name}(")));
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        items.push(Item::Text(", "));
                    }
                    items.push(Item::Node(child));
                }
                items.push(Item::Text(")"));
            }
        }

        NodeKind::ArrowFunction {
            signature,
            children,
            ..
        } => {
            items.push(Item::Owned(format!("({}", render_signature(signature))));
            items.push(Item::Text(" -> "));
            if let Some(body) = children.first() {
                items.push(Item::Node(body));
            }
            items.push(Item::Text(")"));
        }

        NodeKind::Group { children, paren } => {
            let (open, close) = match paren {
                Some(ParenKind::Bracket) => ("[", "]"),
                Some(ParenKind::Bar) => ("|", "|"),
                _ => ("(", ")"),
            };
            items.push(Item::Text(open));
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    items.push(Item::Text(" "));
                }
                items.push(Item::Node(child));
            }
            items.push(Item::Text(close));
        }

        NodeKind::TypeAnnotation { children } => {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    items.push(Item::Text(": "));
                }
                items.push(Item::Node(child));
            }
        }

        // Transient token kinds only show up when stringifying a tree
        // mid-pipeline (error paths); render their lexemes.
        NodeKind::Comma => items.push(Item::Text(",")),
        NodeKind::Colon => items.push(Item::Text(":")),
        NodeKind::Arrow => items.push(Item::Text("->")),
        NodeKind::OperatorToken { op, .. } => items.push(Item::Owned(op.to_string())),
        NodeKind::PropertyAccess { prop } => items.push(Item::Owned(format!(".{prop}"))),
        NodeKind::Paren { kind, opening, .. } => {
            items.push(Item::Owned(
                crate::source_analysis::bracket_char(*kind, *opening).to_string(),
            ));
        }
    }
}

fn render_operator<'a>(items: &mut Vec<Item<'a>>, op: &str, children: &'a [Node]) {
    match (op, children) {
        // Property access: `a.b`
        (".", [object, property]) => {
            items.push(Item::Node(object));
            items.push(Item::Text("."));
            items.push(Item::Node(property));
        }

        // Chained comparison: `(a < b < c)`
        ("cchain", _) => {
            items.push(Item::Text("("));
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    items.push(Item::Text(" "));
                }
                items.push(Item::Node(child));
            }
            items.push(Item::Text(")"));
        }

        // Prefix unary: `(-x)`
        (_, [operand]) if PREFIX_OPERATORS.contains(&op) => {
            items.push(Item::Text("("));
            items.push(Item::Owned(op.to_string()));
            items.push(Item::Node(operand));
            items.push(Item::Text(")"));
        }

        // Postfix unary: `(x!)`
        (_, [operand]) if POSTFIX_OPERATORS.contains(&op) => {
            items.push(Item::Text("("));
            items.push(Item::Node(operand));
            items.push(Item::Owned(op.to_string()));
            items.push(Item::Text(")"));
        }

        // Binary: `(a + b)`
        (_, [left, right]) => {
            items.push(Item::Text("("));
            items.push(Item::Node(left));
            items.push(Item::Owned(format!(" {op} ")));
            items.push(Item::Node(right));
            items.push(Item::Text(")"));
        }

        // Malformed arity; render what is there.
        _ => {
            items.push(Item::Owned(op.to_string()));
            items.push(Item::Text("("));
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    items.push(Item::Text(", "));
                }
                items.push(Item::Node(child));
            }
            items.push(Item::Text(")"));
        }
    }
}

/// Renders an arrow signature: `(x, y: int)` with an optional `: ret`
/// tail. Implicit parameter types stay unwritten.
fn render_signature(signature: &ArrowSignature) -> String {
    let mut out = String::from("(");
    for (i, (var, ty)) in signature.vars.iter().zip(&signature.types).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(var.name.as_str());
        if !ty.implicit {
            let _ = write!(out, ": {}", ty.name);
        }
    }
    out.push(')');
    if let Some(ret) = &signature.return_type {
        let _ = write!(out, ": {}", ret.name);
    }
    out
}
