//! Generation orchestration: seed in, text and program out.
//!
//! One generation is one full pipeline run: derive a random stream,
//! synthesize a tree, render its text, compile its program. The tree itself
//! is scratch and dropped at the end; what survives is the composed text
//! (for display) and the compiled program (for the executor). Batches run
//! their generations in parallel, each on an independently derived stream,
//! so results are deterministic in content and order no matter how they
//! were scheduled.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::compile::compile;
use crate::compose::compose;
use crate::error::{Error, InvariantError};
use crate::eval::{channel, interpret};
use crate::program::Program;
use crate::rng::RngStream;
use crate::synth::synthesize;

/// One finished generation.
#[derive(Clone, Debug)]
pub struct Generation {
    /// Seed that reproduces this generation on its own.
    pub seed: u64,
    /// Composed expression text.
    pub text: String,
    /// Compiled instruction stream.
    pub program: Program,
}

impl Generation {
    /// RGB bytes of this generation's program at a pixel.
    ///
    /// Runs the interpreter once per channel with `z` as the channel index,
    /// folding each result to a byte.
    pub fn pixel(&self, catalog: &Catalog, x: u32, y: u32) -> Result<[u8; 3], InvariantError> {
        let mut rgb = [0u8; 3];
        for (ch, out) in rgb.iter_mut().enumerate() {
            *out = channel(interpret(&self.program, catalog, x, y, ch as u32)?);
        }
        Ok(rgb)
    }
}

/// Run one generation from a seed.
pub fn generate(catalog: &Catalog, seed: u64, node_count: u32) -> Result<Generation, Error> {
    let mut rng = RngStream::new(seed);
    let tree = synthesize(catalog, &mut rng, node_count)?;
    let text = compose(&tree, catalog)?;
    let program = compile(&tree, catalog)?;

    debug!(
        seed,
        nodes = tree.len(),
        words = program.word_count(),
        cells = program.cell_count(),
        "generated program"
    );

    Ok(Generation {
        seed,
        text,
        program,
    })
}

/// Run `count` independent generations under one parent seed.
///
/// Generation `i` draws from the substream derived for index `i`, so each
/// result depends only on `(seed, i)`. The returned vector is in index
/// order.
pub fn generate_batch(
    catalog: &Catalog,
    seed: u64,
    node_count: u32,
    count: usize,
) -> Result<Vec<Generation>, Error> {
    let generations = (0..count)
        .into_par_iter()
        .map(|i| {
            let stream = RngStream::derive(seed, i as u64);
            generate(catalog, stream.state(), node_count)
        })
        .collect::<Result<Vec<_>, Error>>()?;

    info!(count = generations.len(), seed, "generated batch");
    Ok(generations)
}
