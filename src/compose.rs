//! Tree-to-text rendering.
//!
//! Renders a tree through the catalog's operator templates, post-order, so
//! every operand is text before its parent substitutes it. The output is
//! diagnostic: it shows a human what a program computes, and nothing
//! downstream parses it back.

use crate::catalog::Catalog;
use crate::error::InvariantError;
use crate::tree::{Node, NodeId, Tree};

/// Render a tree as text.
///
/// Constants print in decimal, inputs print their catalog symbol, and
/// operator templates substitute `{0}`, `{1}`, ... with their rendered
/// operands in order. Stable for a given tree and catalog.
pub fn compose(tree: &Tree, catalog: &Catalog) -> Result<String, InvariantError> {
    render(tree, catalog, tree.root())
}

fn render(tree: &Tree, catalog: &Catalog, id: NodeId) -> Result<String, InvariantError> {
    let node = tree
        .node(id)
        .ok_or(InvariantError::DanglingNode { id: id.0 })?;

    match node {
        Node::Constant { value } => Ok(value.to_string()),
        Node::Input { input } => {
            let kind = catalog
                .input(*input)
                .ok_or(InvariantError::UnknownInput { index: *input })?;
            Ok(kind.symbol.clone())
        }
        Node::Operator { operator, operands } => {
            let op = catalog
                .operator(*operator)
                .ok_or(InvariantError::UnknownOperator { index: *operator })?;
            if operands.len() != op.arity {
                return Err(InvariantError::ArityMismatch {
                    opcode: op.opcode,
                    expected: op.arity,
                    found: operands.len(),
                });
            }

            let mut rendered = Vec::with_capacity(operands.len());
            for &child in operands {
                rendered.push(render(tree, catalog, child)?);
            }
            Ok(fill_template(&op.template, &rendered))
        }
    }
}

/// Substitute `{i}` placeholders with operand text.
///
/// Placeholders without a matching operand, and braces that do not form a
/// placeholder at all, pass through untouched.
fn fill_template(template: &str, operands: &[String]) -> String {
    let extra: usize = operands.iter().map(String::len).sum();
    let mut out = String::with_capacity(template.len() + extra);

    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        match tail[1..close].parse::<usize>() {
            Ok(i) if i < operands.len() => out.push_str(&operands[i]),
            _ => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InputKind, OpKind, Operator};

    #[test]
    fn test_compose_binary() {
        let catalog = Catalog::classic();
        let tree = Tree::new(
            vec![
                Node::Input { input: 0 },
                Node::Input { input: 1 },
                Node::Operator {
                    operator: 1,
                    operands: vec![NodeId(0), NodeId(1)],
                },
            ],
            NodeId(2),
        );
        assert_eq!(compose(&tree, &catalog).unwrap(), "(x + y)");
    }

    #[test]
    fn test_compose_nested() {
        let catalog = Catalog::classic();
        // ((x + 7) ^ y)
        let tree = Tree::new(
            vec![
                Node::Input { input: 0 },
                Node::Constant { value: 7 },
                Node::Operator {
                    operator: 1,
                    operands: vec![NodeId(0), NodeId(1)],
                },
                Node::Input { input: 1 },
                Node::Operator {
                    operator: 0,
                    operands: vec![NodeId(2), NodeId(3)],
                },
            ],
            NodeId(4),
        );
        assert_eq!(compose(&tree, &catalog).unwrap(), "((x + 7) ^ y)");
    }

    #[test]
    fn test_constants_render_in_decimal() {
        let catalog = Catalog::classic();
        let tree = Tree::new(
            vec![Node::Constant {
                value: u32::MAX,
            }],
            NodeId(0),
        );
        assert_eq!(compose(&tree, &catalog).unwrap(), "4294967295");
    }

    #[test]
    fn test_function_shaped_template() {
        let catalog = Catalog::new(
            "fn_style",
            vec![Operator {
                opcode: 0,
                kind: OpKind::Add,
                arity: 2,
                template: "sum({0}, {1})".to_string(),
            }],
            vec![InputKind {
                opcode: 1001,
                symbol: "u".to_string(),
            }],
        )
        .unwrap();

        let tree = Tree::new(
            vec![
                Node::Input { input: 0 },
                Node::Constant { value: 3 },
                Node::Operator {
                    operator: 0,
                    operands: vec![NodeId(0), NodeId(1)],
                },
            ],
            NodeId(2),
        );
        assert_eq!(compose(&tree, &catalog).unwrap(), "sum(u, 3)");
    }

    #[test]
    fn test_fill_template_passes_through_odd_braces() {
        let operands = vec!["a".to_string()];
        assert_eq!(fill_template("({0} ? {9})", &operands), "(a ? {9})");
        assert_eq!(fill_template("{x} {0}", &operands), "{x} a");
        assert_eq!(fill_template("open { brace", &operands), "open { brace");
    }

    #[test]
    fn test_compose_checks_references() {
        let catalog = Catalog::classic();
        let tree = Tree::new(vec![Node::Input { input: 7 }], NodeId(0));
        assert!(matches!(
            compose(&tree, &catalog),
            Err(InvariantError::UnknownInput { index: 7 })
        ));
    }
}
