//! Reference evaluation and instruction-stream interpretation.
//!
//! [`evaluate`] walks the tree directly and is the semantic ground truth.
//! [`interpret`] executes the compiled record stream against a memory-cell
//! vector, the way an external executor would, one coordinate at a time. The
//! two must agree bit for bit on every tree; the integration suite holds
//! them to that.
//!
//! All arithmetic is 32-bit with silent wraparound. Operands evaluate left
//! to right, every operand exactly once, and operators of arity above two
//! fold left. Input leaves map by catalog position: position 0 reads `x`,
//! 1 reads `y`, 2 reads `z`. A position with no coordinate is an invariant
//! breach and fails loudly rather than defaulting.

use crate::catalog::Catalog;
use crate::error::InvariantError;
use crate::program::{Program, Record};
use crate::tree::{Node, NodeId, Tree};

/// Evaluate a tree at one coordinate.
pub fn evaluate(
    tree: &Tree,
    catalog: &Catalog,
    x: u32,
    y: u32,
    z: u32,
) -> Result<u32, InvariantError> {
    eval_node(tree, catalog, tree.root(), x, y, z)
}

fn eval_node(
    tree: &Tree,
    catalog: &Catalog,
    id: NodeId,
    x: u32,
    y: u32,
    z: u32,
) -> Result<u32, InvariantError> {
    let node = tree
        .node(id)
        .ok_or(InvariantError::DanglingNode { id: id.0 })?;

    match node {
        Node::Constant { value } => Ok(*value),
        Node::Input { input } => {
            catalog
                .input(*input)
                .ok_or(InvariantError::UnknownInput { index: *input })?;
            coordinate(*input, x, y, z)
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
            let kind = op.kind;

            // Arity is at least 1 by catalog validation
            let mut value = eval_node(tree, catalog, operands[0], x, y, z)?;
            for &child in &operands[1..] {
                let rhs = eval_node(tree, catalog, child, x, y, z)?;
                value = kind.apply(value, rhs);
            }
            Ok(value)
        }
    }
}

/// Execute a compiled program at one coordinate.
///
/// Allocates `cell_count` zeroed memory cells, runs the records in stream
/// order, and returns the value of the final record's destination cell.
pub fn interpret(
    program: &Program,
    catalog: &Catalog,
    x: u32,
    y: u32,
    z: u32,
) -> Result<u32, InvariantError> {
    let mut cells = vec![0u32; program.cell_count() as usize];
    let mut result = None;

    for record in program.records(catalog) {
        let (dest, value) = match record? {
            Record::Constant { dest, value } => (dest, value),
            Record::Input { position, dest } => (dest, coordinate(position, x, y, z)?),
            Record::Operator {
                kind,
                dest,
                operands,
            } => {
                // Decoded operand counts equal the catalog arity, so >= 1
                let mut value = load(&cells, operands[0])?;
                for &cell in &operands[1..] {
                    value = kind.apply(value, load(&cells, cell)?);
                }
                (dest, value)
            }
        };

        let slot = cells
            .get_mut(dest as usize)
            .ok_or(InvariantError::CellOutOfRange { cell: dest })?;
        *slot = value;
        result = Some(value);
    }

    result.ok_or(InvariantError::EmptyProgram)
}

fn load(cells: &[u32], cell: u32) -> Result<u32, InvariantError> {
    cells
        .get(cell as usize)
        .copied()
        .ok_or(InvariantError::CellOutOfRange { cell })
}

/// Coordinate for an input kind's catalog position.
fn coordinate(position: usize, x: u32, y: u32, z: u32) -> Result<u32, InvariantError> {
    match position {
        0 => Ok(x),
        1 => Ok(y),
        2 => Ok(z),
        _ => Err(InvariantError::UnmappedInput { position }),
    }
}

/// Fold an evaluated value into a display channel byte.
#[inline]
pub fn channel(value: u32) -> u8 {
    (value % 256) as u8
}

/// Evaluate a tree's RGB bytes at a pixel, one channel per `z` in 0..3.
pub fn pixel(tree: &Tree, catalog: &Catalog, x: u32, y: u32) -> Result<[u8; 3], InvariantError> {
    let mut rgb = [0u8; 3];
    for (ch, out) in rgb.iter_mut().enumerate() {
        *out = channel(evaluate(tree, catalog, x, y, ch as u32)?);
    }
    Ok(rgb)
}
