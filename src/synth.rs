//! Random expression-tree synthesis.
//!
//! Trees grow in two phases. Phase one places exactly the requested number of
//! operator nodes: each step picks an operator from the catalog, then an open
//! node from the worklist, then one of that node's unfilled operand slots,
//! and attaches a fresh operator node there. Phase two sweeps the remaining
//! open slots in worklist order and binds each to a leaf: a coin decides
//! constant versus input, constants draw from the full 32-bit range, inputs
//! pick a catalog kind uniformly.
//!
//! The draw order above is the reproducibility contract. One seed, one tree;
//! the worklist preserves insertion order, including on removal, because the
//! positions of later picks depend on it.

use crate::catalog::Catalog;
use crate::error::{ConfigError, Error, InvariantError};
use crate::rng::RngStream;
use crate::tree::{Node, NodeId, Tree};

/// Probability that an open slot becomes a constant rather than an input.
const LEAF_CONSTANT_PROBABILITY: f64 = 0.5;

/// An operator node under construction: slots fill as children attach.
struct Draft {
    operator: usize,
    operands: Vec<Option<NodeId>>,
}

impl Draft {
    fn new(operator: usize, arity: usize) -> Self {
        Self {
            operator,
            operands: vec![None; arity],
        }
    }

    fn open_slot_indices(&self) -> Vec<usize> {
        self.operands
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn is_full(&self) -> bool {
        self.operands.iter().all(|slot| slot.is_some())
    }
}

/// Synthesize a random tree with exactly `node_count` operator nodes.
///
/// The root is the first operator placed. Every operand slot ends up bound;
/// a slot escaping both phases is reported as an invariant breach rather
/// than silently defaulted.
pub fn synthesize(
    catalog: &Catalog,
    rng: &mut RngStream,
    node_count: u32,
) -> Result<Tree, Error> {
    if node_count == 0 {
        return Err(ConfigError::ZeroNodeCount.into());
    }

    let operators = catalog.operators();

    // Phase one: operator placement.
    let root_operator = rng.index(operators.len());
    let mut drafts = vec![Draft::new(root_operator, operators[root_operator].arity)];
    let mut open: Vec<usize> = vec![0];

    for _ in 1..node_count {
        let operator = rng.index(operators.len());
        let parent_pos = rng.index(open.len());
        let parent = open[parent_pos];

        // Members of `open` always have at least one unfilled slot
        let slots = drafts[parent].open_slot_indices();
        let slot = slots[rng.index(slots.len())];

        let child = NodeId(drafts.len() as u32);
        drafts[parent].operands[slot] = Some(child);
        if drafts[parent].is_full() {
            open.remove(parent_pos);
        }

        drafts.push(Draft::new(operator, operators[operator].arity));
        open.push(drafts.len() - 1);
    }

    // Phase two: bind every remaining open slot to a leaf.
    let leaf_base = drafts.len();
    let mut leaves: Vec<Node> = Vec::new();
    for &draft_index in &open {
        for slot in drafts[draft_index].open_slot_indices() {
            let id = NodeId((leaf_base + leaves.len()) as u32);
            let leaf = if rng.chance(LEAF_CONSTANT_PROBABILITY) {
                Node::Constant {
                    value: rng.next_u32(),
                }
            } else {
                Node::Input {
                    input: rng.index(catalog.inputs().len()),
                }
            };
            leaves.push(leaf);
            drafts[draft_index].operands[slot] = Some(id);
        }
    }

    // Finalize: every slot must be bound by now.
    let mut nodes = Vec::with_capacity(drafts.len() + leaves.len());
    for draft in drafts {
        let mut operands = Vec::with_capacity(draft.operands.len());
        for slot in draft.operands {
            operands.push(slot.ok_or(InvariantError::UnboundSlot)?);
        }
        nodes.push(Node::Operator {
            operator: draft.operator,
            operands,
        });
    }
    nodes.extend(leaves);

    Ok(Tree::new(nodes, NodeId(0)))
}
