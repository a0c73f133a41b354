//! Compiled instruction-stream artifact.
//!
//! A [`Program`] is a flat `u32` word stream plus the memory-cell count an
//! executor must allocate. Three record shapes share the stream,
//! discriminated by opcode range: operator records `[opcode, dest,
//! operand-cells...]` with the opcode below 1000 and the operand count fixed
//! by the catalog arity; constant records `[1000, dest, literal]`; and input
//! records `[opcode, dest]` with the opcode above 1000 naming an input kind.
//! The stream itself carries no lengths, so decoding needs the catalog the
//! program was compiled against.
//!
//! [`Program::records`] is the single decoding path; the interpreter and the
//! disassembler both sit on top of it.

use crate::catalog::{Catalog, OpKind, CONSTANT_OPCODE};
use crate::error::InvariantError;

/// A compiled expression program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    words: Vec<u32>,
    cell_count: u32,
}

impl Program {
    pub(crate) fn new(words: Vec<u32>, cell_count: u32) -> Self {
        Self { words, cell_count }
    }

    /// Raw instruction words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of instruction words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of memory cells an executor must allocate.
    pub fn cell_count(&self) -> u32 {
        self.cell_count
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Byte view of the word stream, in native byte order.
    ///
    /// This is the form handed to an external executor's buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    /// Short BLAKE3 content hash of the word stream.
    ///
    /// Stable identity for display and deduplication: same words, same
    /// digest.
    pub fn digest(&self) -> String {
        let hex = blake3::hash(self.as_bytes()).to_hex();
        hex[..16].to_string()
    }

    /// Iterate the decoded records, in stream order.
    ///
    /// Yields an error (and stops) on the first unknown opcode or truncated
    /// record.
    pub fn records<'a>(&'a self, catalog: &'a Catalog) -> Records<'a> {
        Records {
            words: &self.words,
            catalog,
            cursor: 0,
        }
    }

    /// Render the record stream one line per record.
    pub fn disassemble(&self, catalog: &Catalog) -> Result<String, InvariantError> {
        let mut out = String::new();
        for record in self.records(catalog) {
            match record? {
                Record::Operator {
                    kind,
                    dest,
                    operands,
                } => {
                    out.push_str(&format!("c{} <- {}", dest, kind));
                    for cell in operands {
                        out.push_str(&format!(" c{}", cell));
                    }
                    out.push('\n');
                }
                Record::Constant { dest, value } => {
                    out.push_str(&format!("c{} <- {}\n", dest, value));
                }
                Record::Input { position, dest } => {
                    let kind = catalog
                        .input(position)
                        .ok_or(InvariantError::UnknownInput { index: position })?;
                    out.push_str(&format!("c{} <- {}\n", dest, kind.symbol));
                }
            }
        }
        Ok(out)
    }
}

// ─── Record decoding ──────────────────────────────────────────────

/// One decoded instruction record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Record<'a> {
    /// Apply `kind` to the values in `operands`, store into `dest`.
    Operator {
        kind: OpKind,
        dest: u32,
        operands: &'a [u32],
    },
    /// Store `value` into `dest`.
    Constant { dest: u32, value: u32 },
    /// Store the coordinate at catalog input `position` into `dest`.
    Input { position: usize, dest: u32 },
}

impl Record<'_> {
    /// Destination cell of this record.
    pub fn dest(&self) -> u32 {
        match self {
            Record::Operator { dest, .. }
            | Record::Constant { dest, .. }
            | Record::Input { dest, .. } => *dest,
        }
    }
}

/// Iterator over a program's records. Stops after the first decode error.
pub struct Records<'a> {
    words: &'a [u32],
    catalog: &'a Catalog,
    cursor: usize,
}

impl<'a> Records<'a> {
    fn decode(&mut self, opcode: u32) -> Result<Record<'a>, InvariantError> {
        if opcode == CONSTANT_OPCODE {
            let words = self.take(3, opcode)?;
            Ok(Record::Constant {
                dest: words[1],
                value: words[2],
            })
        } else if opcode < CONSTANT_OPCODE {
            let op = self
                .catalog
                .operator_by_opcode(opcode)
                .ok_or(InvariantError::UnknownOpcode { opcode })?;
            let (kind, arity) = (op.kind, op.arity);
            let words = self.take(2 + arity, opcode)?;
            Ok(Record::Operator {
                kind,
                dest: words[1],
                operands: &words[2..],
            })
        } else {
            let position = self
                .catalog
                .input_position(opcode)
                .ok_or(InvariantError::UnknownOpcode { opcode })?;
            let words = self.take(2, opcode)?;
            Ok(Record::Input {
                position,
                dest: words[1],
            })
        }
    }

    fn take(&mut self, len: usize, opcode: u32) -> Result<&'a [u32], InvariantError> {
        let words = self.words;
        let end = self.cursor + len;
        if end > words.len() {
            return Err(InvariantError::TruncatedRecord { opcode });
        }
        let slice = &words[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, InvariantError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.words.len() {
            return None;
        }
        let opcode = self.words[self.cursor];
        let result = self.decode(opcode);
        if result.is_err() {
            // Poisoned stream: resynchronizing is not possible without lengths
            self.cursor = self.words.len();
        }
        Some(result)
    }
}
