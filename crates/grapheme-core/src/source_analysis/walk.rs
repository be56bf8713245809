// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Iterative tree traversal primitives.
//!
//! Every tree-rewriting pass in the builder runs on top of the two
//! functions here, and both use explicit heap-allocated frame stacks so
//! that a tree millions of levels deep cannot overflow the call stack:
//!
//! - [`visit`] walks a tree read-only, pre- or post-order, in either child
//!   direction, with an optional depth bound.
//! - [`rewrite`] threads ownership through the tree, applying a fallible
//!   transformation to every node either before its children are visited
//!   (pre-order) or after they have been rewritten (post-order).
//!
//! Trees are owned structures (`Node` owns `Vec<Node>`), so cycles cannot
//! be constructed and the walkers do not need to guard against them.

use crate::ast::Node;

/// When the callback fires relative to a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Parents before children.
    Pre,
    /// Children before parents.
    Post,
}

/// Which direction child lists are iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// First child first.
    LeftToRight,
    /// Last child first.
    RightToLeft,
}

/// Options for [`visit`].
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Callback order relative to children.
    pub order: Order,
    /// Child iteration direction.
    pub direction: Direction,
    /// Only invoke the callback on nodes that have a child list.
    pub only_nodes_with_children: bool,
    /// Do not descend past this depth (the root is depth 0).
    pub max_depth: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            order: Order::Pre,
            direction: Direction::LeftToRight,
            only_nodes_with_children: false,
            max_depth: None,
        }
    }
}

struct VisitFrame<'a> {
    node: &'a Node,
    next_child: usize,
}

/// Walks `root` iteratively, invoking `f(node, parent, depth)` on every
/// visited node. Returning `Err` aborts the walk.
pub fn visit<'a, E>(
    root: &'a Node,
    options: &WalkOptions,
    mut f: impl FnMut(&'a Node, Option<&'a Node>, usize) -> Result<(), E>,
) -> Result<(), E> {
    let wants = |node: &Node| !options.only_nodes_with_children || node.children().is_some();

    if options.order == Order::Pre && wants(root) {
        f(root, None, 0)?;
    }
    let mut stack = vec![VisitFrame {
        node: root,
        next_child: 0,
    }];

    loop {
        let depth = stack.len() - 1;
        let (node, next) = {
            let frame = stack.last().expect("visit stack cannot be empty");
            (frame.node, frame.next_child)
        };
        let children = node.children().unwrap_or(&[]);
        let may_descend = options.max_depth.map_or(true, |max| depth < max);

        if next < children.len() && may_descend {
            stack.last_mut().expect("just read").next_child += 1;
            let child = match options.direction {
                Direction::LeftToRight => &children[next],
                Direction::RightToLeft => &children[children.len() - 1 - next],
            };
            if options.order == Order::Pre && wants(child) {
                f(child, Some(node), depth + 1)?;
            }
            stack.push(VisitFrame {
                node: child,
                next_child: 0,
            });
            continue;
        }

        let frame = stack.pop().expect("visit stack cannot be empty");
        if options.order == Order::Post && wants(frame.node) {
            f(frame.node, stack.last().map(|fr| fr.node), depth)?;
        }
        if stack.is_empty() {
            return Ok(());
        }
    }
}

struct RewriteFrame {
    node: Node,
    pending: std::vec::IntoIter<Node>,
    done: Vec<Node>,
}

/// Rewrites a tree iteratively, passing every node through `f`.
///
/// With [`Order::Pre`], `f` sees each node before its (possibly replaced)
/// children are descended into; with [`Order::Post`], children have
/// already been rewritten when `f` receives the parent. Returning `Err`
/// aborts and drops the partially rewritten tree.
pub fn rewrite<E>(
    root: Node,
    order: Order,
    mut f: impl FnMut(Node) -> Result<Node, E>,
) -> Result<Node, E> {
    let mut stack: Vec<RewriteFrame> = Vec::new();
    let mut incoming = root;

    loop {
        if order == Order::Pre {
            incoming = f(incoming)?;
        }
        let mut node = incoming;
        let children = node.take_children();
        let done = Vec::with_capacity(children.len());
        stack.push(RewriteFrame {
            node,
            pending: children.into_iter(),
            done,
        });

        loop {
            let top = stack.last_mut().expect("rewrite stack cannot be empty");
            if let Some(next) = top.pending.next() {
                incoming = next;
                break;
            }

            let mut frame = stack.pop().expect("rewrite stack cannot be empty");
            frame.node.set_children(frame.done);
            let mut finished = frame.node;
            if order == Order::Post {
                finished = f(finished)?;
            }
            match stack.last_mut() {
                Some(parent) => parent.done.push(finished),
                None => return Ok(finished),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::source_analysis::Span;

    fn var(name: &str) -> Node {
        Node::new(NodeKind::Variable { name: name.into() }, Span::new(0, 1))
    }

    fn group(children: Vec<Node>) -> Node {
        Node::new(
            NodeKind::Group {
                paren: None,
                children,
            },
            Span::new(0, 1),
        )
    }

    /// `(a (b c)) d` as a two-level tree.
    fn sample() -> Node {
        group(vec![var("a"), group(vec![var("b"), var("c")]), var("d")])
    }

    fn names_visited(root: &Node, options: &WalkOptions) -> Vec<String> {
        let mut seen = Vec::new();
        visit::<()>(root, options, |node, _, _| {
            seen.push(match &node.kind {
                NodeKind::Variable { name } => name.to_string(),
                _ => "()".to_string(),
            });
            Ok(())
        })
        .unwrap();
        seen
    }

    #[test]
    fn preorder_left_to_right() {
        assert_eq!(
            names_visited(&sample(), &WalkOptions::default()),
            vec!["()", "a", "()", "b", "c", "d"]
        );
    }

    #[test]
    fn postorder_left_to_right() {
        let options = WalkOptions {
            order: Order::Post,
            ..WalkOptions::default()
        };
        assert_eq!(
            names_visited(&sample(), &options),
            vec!["a", "b", "c", "()", "d", "()"]
        );
    }

    #[test]
    fn preorder_right_to_left() {
        let options = WalkOptions {
            direction: Direction::RightToLeft,
            ..WalkOptions::default()
        };
        assert_eq!(
            names_visited(&sample(), &options),
            vec!["()", "d", "()", "c", "b", "a"]
        );
    }

    #[test]
    fn only_nodes_with_children_filters_leaves() {
        let options = WalkOptions {
            only_nodes_with_children: true,
            ..WalkOptions::default()
        };
        assert_eq!(names_visited(&sample(), &options), vec!["()", "()"]);
    }

    #[test]
    fn max_depth_stops_descent() {
        let options = WalkOptions {
            max_depth: Some(1),
            ..WalkOptions::default()
        };
        assert_eq!(
            names_visited(&sample(), &options),
            vec!["()", "a", "()", "d"]
        );
    }

    #[test]
    fn visit_reports_parent_and_depth() {
        visit::<()>(&sample(), &WalkOptions::default(), |node, parent, depth| {
            match &node.kind {
                NodeKind::Variable { .. } => {
                    assert!(parent.is_some());
                    assert!(depth == 1 || depth == 2);
                }
                NodeKind::Group { .. } if depth == 0 => assert!(parent.is_none()),
                _ => {}
            }
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn visit_short_circuits_on_error() {
        let mut count = 0;
        let result = visit(&sample(), &WalkOptions::default(), |_, _, _| {
            count += 1;
            if count == 3 { Err("stop") } else { Ok(()) }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(count, 3);
    }

    #[test]
    fn rewrite_postorder_transforms_leaves_first() {
        let renamed = rewrite::<()>(sample(), Order::Post, |mut node| {
            if let NodeKind::Variable { name } = &mut node.kind {
                *name = format!("{name}x").into();
            }
            Ok(node)
        })
        .unwrap();
        assert_eq!(
            names_visited(&renamed, &WalkOptions::default()),
            vec!["()", "ax", "()", "bx", "cx", "dx"]
        );
    }

    #[test]
    fn rewrite_preorder_sees_replaced_children() {
        // Pre-order replacement of the inner group's children is descended
        // into afterwards.
        let rewritten = rewrite::<()>(sample(), Order::Pre, |mut node| {
            if let NodeKind::Group { children, .. } = &mut node.kind {
                if children.len() == 2 {
                    *children = vec![var("z")];
                }
            }
            Ok(node)
        })
        .unwrap();
        assert_eq!(
            names_visited(&rewritten, &WalkOptions::default()),
            vec!["()", "a", "()", "z", "d"]
        );
    }

    #[test]
    fn deep_tree_walks_without_overflow() {
        let mut node = var("x");
        for _ in 0..200_000 {
            node = group(vec![node]);
        }
        let mut depth_seen = 0;
        visit::<()>(&node, &WalkOptions::default(), |_, _, depth| {
            depth_seen = depth_seen.max(depth);
            Ok(())
        })
        .unwrap();
        assert_eq!(depth_seen, 200_000);

        let rewritten = rewrite::<()>(node, Order::Post, Ok).unwrap();
        drop(rewritten);
    }
}
