//! Operator and input catalogs ("styles").
//!
//! A style names the raw material synthesis draws from: the operators a tree
//! may apply and the input kinds a leaf may read. Styles are data, not code:
//! the built-in [`Catalog::classic`] covers the usual bitwise/arithmetic set,
//! and custom styles load from small TOML files resolved by name.
//!
//! Opcode ranges are the wire contract. Operator opcodes sit below the
//! reserved constant opcode (1000), input opcodes sit above it, and no opcode
//! repeats; the instruction-stream decoder relies on exactly this split.

use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

/// Reserved opcode marking a constant record.
///
/// Operator opcodes must stay below it, input opcodes above it.
pub const CONSTANT_OPCODE: u32 = 1000;

// ─── Operators ────────────────────────────────────────────────────

/// Arithmetic rule an operator applies to its operands.
///
/// All arithmetic is 32-bit with silent wraparound; overflow is part of the
/// semantics, never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Xor,
    Add,
    Mul,
    Or,
    And,
    Sub,
}

impl OpKind {
    /// Combine two values under this rule.
    ///
    /// Operators with arity above 2 fold left over their operands with this.
    #[inline]
    pub fn apply(self, lhs: u32, rhs: u32) -> u32 {
        match self {
            OpKind::Xor => lhs ^ rhs,
            OpKind::Add => lhs.wrapping_add(rhs),
            OpKind::Mul => lhs.wrapping_mul(rhs),
            OpKind::Or => lhs | rhs,
            OpKind::And => lhs & rhs,
            OpKind::Sub => lhs.wrapping_sub(rhs),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "xor" => Some(OpKind::Xor),
            "add" => Some(OpKind::Add),
            "mul" => Some(OpKind::Mul),
            "or" => Some(OpKind::Or),
            "and" => Some(OpKind::And),
            "sub" => Some(OpKind::Sub),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            OpKind::Xor => "xor",
            OpKind::Add => "add",
            OpKind::Mul => "mul",
            OpKind::Or => "or",
            OpKind::And => "and",
            OpKind::Sub => "sub",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One operator a synthesized tree may apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    /// Wire opcode, below [`CONSTANT_OPCODE`].
    pub opcode: u32,
    /// Arithmetic rule.
    pub kind: OpKind,
    /// Number of operands, at least 1.
    pub arity: usize,
    /// Text template with `{0}`, `{1}`, ... operand placeholders.
    pub template: String,
}

/// One input kind a leaf may read (a coordinate of the output point).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputKind {
    /// Wire opcode, above [`CONSTANT_OPCODE`].
    pub opcode: u32,
    /// Symbol used when rendering trees as text.
    pub symbol: String,
}

// ─── Catalog ──────────────────────────────────────────────────────

/// A validated style: the operators and input kinds available to synthesis.
///
/// Construction checks the opcode-range contract once, so every later
/// catalog lookup failure is an invariant breach rather than a config issue.
#[derive(Clone, Debug)]
pub struct Catalog {
    name: String,
    operators: Vec<Operator>,
    inputs: Vec<InputKind>,
}

impl Catalog {
    /// Validate and build a catalog.
    pub fn new(
        name: impl Into<String>,
        operators: Vec<Operator>,
        inputs: Vec<InputKind>,
    ) -> Result<Self, ConfigError> {
        if operators.is_empty() {
            return Err(ConfigError::NoOperators);
        }
        if inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        let mut seen = Vec::with_capacity(operators.len() + inputs.len());
        for op in &operators {
            if op.arity == 0 {
                return Err(ConfigError::ZeroArity { opcode: op.opcode });
            }
            if op.opcode >= CONSTANT_OPCODE {
                return Err(ConfigError::OperatorOpcodeReserved { opcode: op.opcode });
            }
            if seen.contains(&op.opcode) {
                return Err(ConfigError::DuplicateOpcode { opcode: op.opcode });
            }
            seen.push(op.opcode);
        }
        for input in &inputs {
            if input.opcode <= CONSTANT_OPCODE {
                return Err(ConfigError::InputOpcodeReserved {
                    opcode: input.opcode,
                });
            }
            if seen.contains(&input.opcode) {
                return Err(ConfigError::DuplicateOpcode {
                    opcode: input.opcode,
                });
            }
            seen.push(input.opcode);
        }

        Ok(Self {
            name: name.into(),
            operators,
            inputs,
        })
    }

    /// Built-in style: six binary operators over three spatial inputs.
    pub fn classic() -> Self {
        let binary = |opcode: u32, kind: OpKind, symbol: &str| Operator {
            opcode,
            kind,
            arity: 2,
            template: format!("({{0}} {} {{1}})", symbol),
        };
        Self {
            name: "classic".to_string(),
            operators: vec![
                binary(0, OpKind::Xor, "^"),
                binary(1, OpKind::Add, "+"),
                binary(2, OpKind::Mul, "*"),
                binary(3, OpKind::Or, "|"),
                binary(4, OpKind::And, "&"),
                binary(5, OpKind::Sub, "-"),
            ],
            inputs: vec![
                InputKind {
                    opcode: 1001,
                    symbol: "x".to_string(),
                },
                InputKind {
                    opcode: 1002,
                    symbol: "y".to_string(),
                },
                InputKind {
                    opcode: 1003,
                    symbol: "z".to_string(),
                },
            ],
        }
    }

    /// Style name, for display.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All operators, in catalog order.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// All input kinds, in catalog order.
    ///
    /// Position in this list is what the evaluator maps to a coordinate.
    pub fn inputs(&self) -> &[InputKind] {
        &self.inputs
    }

    /// Operator at a catalog position.
    pub fn operator(&self, index: usize) -> Option<&Operator> {
        self.operators.get(index)
    }

    /// Input kind at a catalog position.
    pub fn input(&self, index: usize) -> Option<&InputKind> {
        self.inputs.get(index)
    }

    /// Operator carrying a wire opcode.
    pub fn operator_by_opcode(&self, opcode: u32) -> Option<&Operator> {
        self.operators.iter().find(|op| op.opcode == opcode)
    }

    /// Catalog position of the input kind carrying a wire opcode.
    pub fn input_position(&self, opcode: u32) -> Option<usize> {
        self.inputs.iter().position(|input| input.opcode == opcode)
    }

    /// Load a style from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StyleFile {
            path: path.to_path_buf(),
            message: format!("cannot read style file: {}", e),
        })?;
        Self::parse_toml(&content, path)
    }

    /// Resolve a style by name: the built-in `classic`, else
    /// `styles/{name}.toml` next to the executable or under the working
    /// directory.
    pub fn resolve(name: &str) -> Result<Self, ConfigError> {
        // Reject path traversal
        if name.contains('/') || name.contains('\\') || name.contains("..") || name.starts_with('.')
        {
            return Err(ConfigError::InvalidStyleName {
                name: name.to_string(),
            });
        }

        if name == "classic" {
            return Ok(Self::classic());
        }

        let filename = format!("styles/{}.toml", name);

        // Next to the executable, climbing a few levels for dev layouts
        if let Ok(exe) = std::env::current_exe() {
            let mut dir = exe.parent();
            for _ in 0..3 {
                let Some(d) = dir else { break };
                let candidate = d.join(&filename);
                if candidate.exists() {
                    return Self::load(&candidate);
                }
                dir = d.parent();
            }
        }

        // Working directory
        let cwd_path = std::path::PathBuf::from(&filename);
        if cwd_path.exists() {
            return Self::load(&cwd_path);
        }

        Err(ConfigError::UnknownStyle {
            name: name.to_string(),
        })
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let err = |msg: String| ConfigError::StyleFile {
            path: path.to_path_buf(),
            message: msg,
        };

        #[derive(Default)]
        struct OperatorDraft {
            opcode: Option<u32>,
            kind: Option<OpKind>,
            arity: Option<usize>,
            template: Option<String>,
        }

        #[derive(Default)]
        struct InputDraft {
            opcode: Option<u32>,
            symbol: Option<String>,
        }

        enum Section {
            None,
            Style,
            Operator(OperatorDraft),
            Input(InputDraft),
        }

        let mut name = String::new();
        let mut operators: Vec<Operator> = Vec::new();
        let mut inputs: Vec<InputKind> = Vec::new();
        let mut section = Section::None;

        let mut flush = |section: &mut Section| -> Result<(), ConfigError> {
            match std::mem::replace(section, Section::None) {
                Section::Operator(draft) => {
                    operators.push(Operator {
                        opcode: draft
                            .opcode
                            .ok_or_else(|| err("operator is missing 'opcode'".to_string()))?,
                        kind: draft
                            .kind
                            .ok_or_else(|| err("operator is missing 'kind'".to_string()))?,
                        arity: draft
                            .arity
                            .ok_or_else(|| err("operator is missing 'arity'".to_string()))?,
                        template: draft
                            .template
                            .ok_or_else(|| err("operator is missing 'template'".to_string()))?,
                    });
                }
                Section::Input(draft) => {
                    inputs.push(InputKind {
                        opcode: draft
                            .opcode
                            .ok_or_else(|| err("input is missing 'opcode'".to_string()))?,
                        symbol: draft
                            .symbol
                            .ok_or_else(|| err("input is missing 'symbol'".to_string()))?,
                    });
                }
                Section::None | Section::Style => {}
            }
            Ok(())
        };

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with("[[") && trimmed.ends_with("]]") {
                flush(&mut section)?;
                section = match trimmed[2..trimmed.len() - 2].trim() {
                    "operator" => Section::Operator(OperatorDraft::default()),
                    "input" => Section::Input(InputDraft::default()),
                    other => return Err(err(format!("unknown table '[[{}]]'", other))),
                };
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                flush(&mut section)?;
                section = match trimmed[1..trimmed.len() - 1].trim() {
                    "style" => Section::Style,
                    other => return Err(err(format!("unknown section '[{}]'", other))),
                };
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(err(format!("expected 'key = value', found '{}'", trimmed)));
            };
            let key = key.trim();
            let value = value.trim();
            let unquoted = value.trim_matches('"');

            match &mut section {
                Section::Style => {
                    if key == "name" {
                        name = unquoted.to_string();
                    }
                }
                Section::Operator(draft) => match key {
                    "opcode" => {
                        draft.opcode = Some(
                            value
                                .parse()
                                .map_err(|_| err(format!("invalid operator opcode: {}", value)))?,
                        );
                    }
                    "kind" => {
                        draft.kind = Some(OpKind::from_name(unquoted).ok_or_else(|| {
                            err(format!(
                                "unknown operator kind '{}' (expected xor, add, mul, or, and, sub)",
                                unquoted
                            ))
                        })?);
                    }
                    "arity" => {
                        draft.arity = Some(
                            value
                                .parse()
                                .map_err(|_| err(format!("invalid operator arity: {}", value)))?,
                        );
                    }
                    "template" => draft.template = Some(unquoted.to_string()),
                    _ => {} // ignore unknown keys
                },
                Section::Input(draft) => match key {
                    "opcode" => {
                        draft.opcode = Some(
                            value
                                .parse()
                                .map_err(|_| err(format!("invalid input opcode: {}", value)))?,
                        );
                    }
                    "symbol" => draft.symbol = Some(unquoted.to_string()),
                    _ => {}
                },
                Section::None => {
                    return Err(err(format!("'{}' appears outside any section", trimmed)));
                }
            }
        }
        flush(&mut section)?;

        if name.is_empty() {
            return Err(err("missing style.name".to_string()));
        }
        Self::new(name, operators, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_layout() {
        let catalog = Catalog::classic();
        assert_eq!(catalog.name(), "classic");
        assert_eq!(catalog.operators().len(), 6);
        assert_eq!(catalog.inputs().len(), 3);

        let opcodes: Vec<u32> = catalog.operators().iter().map(|op| op.opcode).collect();
        assert_eq!(opcodes, vec![0, 1, 2, 3, 4, 5]);
        assert!(catalog.operators().iter().all(|op| op.arity == 2));

        assert_eq!(catalog.inputs()[0].opcode, 1001);
        assert_eq!(catalog.inputs()[0].symbol, "x");
        assert_eq!(catalog.inputs()[2].opcode, 1003);
        assert_eq!(catalog.inputs()[2].symbol, "z");
    }

    #[test]
    fn test_classic_validates() {
        let classic = Catalog::classic();
        let rebuilt = Catalog::new(
            "classic",
            classic.operators().to_vec(),
            classic.inputs().to_vec(),
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_apply_wraps() {
        assert_eq!(OpKind::Add.apply(u32::MAX, 1), 0);
        assert_eq!(OpKind::Sub.apply(5, 10), u32::MAX - 4);
        assert_eq!(OpKind::Mul.apply(1 << 31, 2), 0);
        assert_eq!(OpKind::Xor.apply(0b1100, 0b1010), 0b0110);
        assert_eq!(OpKind::Or.apply(0b1100, 0b1010), 0b1110);
        assert_eq!(OpKind::And.apply(0b1100, 0b1010), 0b1000);
    }

    #[test]
    fn test_new_rejects_empty_sections() {
        let classic = Catalog::classic();
        assert!(matches!(
            Catalog::new("t", vec![], classic.inputs().to_vec()),
            Err(ConfigError::NoOperators)
        ));
        assert!(matches!(
            Catalog::new("t", classic.operators().to_vec(), vec![]),
            Err(ConfigError::NoInputs)
        ));
    }

    #[test]
    fn test_new_rejects_zero_arity() {
        let result = Catalog::new(
            "t",
            vec![Operator {
                opcode: 0,
                kind: OpKind::Xor,
                arity: 0,
                template: String::new(),
            }],
            Catalog::classic().inputs().to_vec(),
        );
        assert!(matches!(result, Err(ConfigError::ZeroArity { opcode: 0 })));
    }

    #[test]
    fn test_new_rejects_opcode_range_violations() {
        let inputs = Catalog::classic().inputs().to_vec();
        let op = |opcode| Operator {
            opcode,
            kind: OpKind::Xor,
            arity: 2,
            template: "({0} ^ {1})".to_string(),
        };

        // Operator inside the reserved range
        assert!(matches!(
            Catalog::new("t", vec![op(CONSTANT_OPCODE)], inputs.clone()),
            Err(ConfigError::OperatorOpcodeReserved { .. })
        ));

        // Input at or below the reserved opcode
        let result = Catalog::new(
            "t",
            vec![op(0)],
            vec![InputKind {
                opcode: CONSTANT_OPCODE,
                symbol: "x".to_string(),
            }],
        );
        assert!(matches!(
            result,
            Err(ConfigError::InputOpcodeReserved { .. })
        ));

        // Duplicate opcode
        assert!(matches!(
            Catalog::new("t", vec![op(3), op(3)], inputs),
            Err(ConfigError::DuplicateOpcode { opcode: 3 })
        ));
    }

    #[test]
    fn test_resolve_classic() {
        let catalog = Catalog::resolve("classic").unwrap();
        assert_eq!(catalog.name(), "classic");
        assert_eq!(catalog.operators().len(), 6);
    }

    #[test]
    fn test_resolve_rejects_path_traversal() {
        assert!(Catalog::resolve("../etc/passwd").is_err());
        assert!(Catalog::resolve("./sneaky").is_err());
        assert!(Catalog::resolve("foo/bar").is_err());
        assert!(Catalog::resolve(".hidden").is_err());
    }

    #[test]
    fn test_resolve_unknown_style() {
        assert!(matches!(
            Catalog::resolve("no_such_style"),
            Err(ConfigError::UnknownStyle { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            r#"
[style]
name = "tiny"

[[operator]]
opcode = 7
kind = "add"
arity = 3
template = "({0} + {1} + {2})"

[[input]]
opcode = 1001
symbol = "u"

[[input]]
opcode = 1002
symbol = "v"
"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.name(), "tiny");
        assert_eq!(catalog.operators().len(), 1);
        assert_eq!(catalog.operators()[0].opcode, 7);
        assert_eq!(catalog.operators()[0].kind, OpKind::Add);
        assert_eq!(catalog.operators()[0].arity, 3);
        assert_eq!(catalog.inputs().len(), 2);
        assert_eq!(catalog.inputs()[1].symbol, "v");
    }

    #[test]
    fn test_load_rejects_incomplete_operator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "[style]\nname = \"bad\"\n\n[[operator]]\nopcode = 0\nkind = \"xor\"\n",
        )
        .unwrap();

        let result = Catalog::load(&path);
        assert!(matches!(result, Err(ConfigError::StyleFile { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "[style]\nname = \"bad\"\n\n[[operator]]\nopcode = 0\nkind = \"pow\"\narity = 2\ntemplate = \"t\"\n",
        )
        .unwrap();

        let result = Catalog::load(&path);
        assert!(matches!(result, Err(ConfigError::StyleFile { .. })));
    }

    #[test]
    fn test_lookup_by_opcode() {
        let catalog = Catalog::classic();
        assert_eq!(catalog.operator_by_opcode(5).unwrap().kind, OpKind::Sub);
        assert!(catalog.operator_by_opcode(99).is_none());
        assert_eq!(catalog.input_position(1002), Some(1));
        assert_eq!(catalog.input_position(2000), None);
    }
}
