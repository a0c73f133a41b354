//! Post-order compilation of trees into instruction streams.
//!
//! The walk is depth-first, operands left to right, one record per node, so
//! every operand's result lands in a memory cell before the record that
//! consumes it. Destination cells come from a per-run counter starting at
//! zero; since each record allocates exactly one, cells are dense and the
//! final record always owns the highest cell. Record layouts are documented
//! with [`Program`](crate::program::Program).

use crate::catalog::{Catalog, CONSTANT_OPCODE};
use crate::error::InvariantError;
use crate::program::Program;
use crate::tree::{Node, NodeId, Tree};

/// Compile a tree against its catalog.
///
/// Identical input produces byte-identical output. Nodes referencing
/// missing catalog entries, dangling node ids, and operand lists that do
/// not match the operator's arity are invariant breaches.
pub fn compile(tree: &Tree, catalog: &Catalog) -> Result<Program, InvariantError> {
    let mut compiler = Compiler {
        words: Vec::with_capacity(tree.len() * 3),
        next_cell: 0,
    };
    compiler.emit_node(tree, catalog, tree.root())?;
    Ok(Program::new(compiler.words, compiler.next_cell))
}

struct Compiler {
    words: Vec<u32>,
    next_cell: u32,
}

impl Compiler {
    fn alloc_cell(&mut self) -> u32 {
        let cell = self.next_cell;
        self.next_cell += 1;
        cell
    }

    /// Emit the subtree rooted at `id`; returns the cell holding its result.
    fn emit_node(
        &mut self,
        tree: &Tree,
        catalog: &Catalog,
        id: NodeId,
    ) -> Result<u32, InvariantError> {
        let node = tree
            .node(id)
            .ok_or(InvariantError::DanglingNode { id: id.0 })?;

        match node {
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
                let opcode = op.opcode;

                let mut cells = Vec::with_capacity(operands.len());
                for &child in operands {
                    cells.push(self.emit_node(tree, catalog, child)?);
                }

                let dest = self.alloc_cell();
                self.words.push(opcode);
                self.words.push(dest);
                self.words.extend_from_slice(&cells);
                Ok(dest)
            }
            Node::Constant { value } => {
                let dest = self.alloc_cell();
                self.words
                    .extend_from_slice(&[CONSTANT_OPCODE, dest, *value]);
                Ok(dest)
            }
            Node::Input { input } => {
                let kind = catalog
                    .input(*input)
                    .ok_or(InvariantError::UnknownInput { index: *input })?;
                let dest = self.alloc_cell();
                self.words.extend_from_slice(&[kind.opcode, dest]);
                Ok(dest)
            }
        }
    }
}
