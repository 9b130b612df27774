//! Degree-constrained wiring.

use rand::{Rng, seq::SliceRandom};

use crate::error::GenerationError;
use crate::graph::{Graph, NodeId};

/// Draws a target degree per node from `candidates`.
///
/// With `variable` unset a single degree is drawn for the whole graph. An odd
/// degree sum is made even by lowering the largest target by one.
pub(super) fn draw_degree_sequence<R: Rng + ?Sized>(
    node_count: usize,
    candidates: &[usize],
    variable: bool,
    rng: &mut R,
) -> Vec<usize> {
    let mut sequence: Vec<usize> = if variable {
        (0..node_count)
            .map(|_| candidates.choose(rng).copied().unwrap_or(0))
            .collect()
    } else {
        let degree = candidates.choose(rng).copied().unwrap_or(0);
        vec![degree; node_count]
    };
    if sequence.iter().sum::<usize>() % 2 == 1 {
        if let Some(largest) = sequence.iter_mut().max() {
            *largest -= 1;
        }
    }
    sequence
}

/// Realises `sequence` as a simple graph with Havel-Hakimi.
///
/// Nodes are visited in a shuffled order so ties between equal degrees do not
/// always favour low identifiers.
pub(super) fn wire_degree_sequence<R: Rng + ?Sized>(
    sequence: &[usize],
    rng: &mut R,
) -> Result<Graph, GenerationError> {
    let node_count = sequence.len();
    let not_graphical = || GenerationError::DegreeSequenceNotGraphical {
        nodes: node_count,
        degree_sum: sequence.iter().sum(),
    };

    let mut remaining: Vec<(usize, usize)> = sequence.iter().copied().zip(0..).collect();
    remaining.shuffle(rng);

    let mut graph = Graph::with_nodes(node_count);
    loop {
        remaining.sort_by(|a, b| b.0.cmp(&a.0));
        let Some(&(degree, node)) = remaining.first() else {
            break;
        };
        if degree == 0 {
            break;
        }
        remaining.remove(0);
        if degree > remaining.len() {
            return Err(not_graphical());
        }
        for entry in remaining.iter_mut().take(degree) {
            if entry.0 == 0 {
                return Err(not_graphical());
            }
            entry.0 -= 1;
            graph.add_edge(NodeId::new(node), NodeId::new(entry.1));
        }
    }
    Ok(graph)
}
