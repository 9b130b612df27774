//! Random graph models: Erdos-Renyi and Barabasi-Albert.

use rand::{Rng, seq::SliceRandom};

use crate::graph::{Graph, NodeId};

/// Connects each unordered pair independently with probability `p`.
pub(super) fn erdos_renyi_probability<R: Rng + ?Sized>(
    node_count: usize,
    p: f64,
    rng: &mut R,
) -> Graph {
    let mut graph = Graph::with_nodes(node_count);
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            if rng.gen_bool(p) {
                graph.add_edge(NodeId::new(i), NodeId::new(j));
            }
        }
    }
    graph
}

/// Draws exactly `edge_budget` distinct edges uniformly at random.
///
/// The budget is capped at the number of available pairs.
pub(super) fn erdos_renyi_edges<R: Rng + ?Sized>(
    node_count: usize,
    edge_budget: usize,
    rng: &mut R,
) -> Graph {
    let mut pairs: Vec<(usize, usize)> = (0..node_count)
        .flat_map(|i| ((i + 1)..node_count).map(move |j| (i, j)))
        .collect();
    let take = edge_budget.min(pairs.len());
    let (chosen, _) = pairs.partial_shuffle(rng, take);
    let mut graph = Graph::with_nodes(node_count);
    for &(i, j) in chosen.iter() {
        graph.add_edge(NodeId::new(i), NodeId::new(j));
    }
    graph
}

/// Grows a scale-free graph by linear preferential attachment.
///
/// Starts from a complete graph on `attachments + 1` nodes; each later node
/// links to `attachments` distinct earlier nodes chosen with probability
/// proportional to their degree.
pub(super) fn barabasi_albert<R: Rng + ?Sized>(
    node_count: usize,
    attachments: usize,
    rng: &mut R,
) -> Graph {
    let mut graph = Graph::with_nodes(node_count);
    let mut degrees = vec![0_usize; node_count];
    let seed_nodes = (attachments + 1).min(node_count);

    for i in 0..seed_nodes {
        for j in (i + 1)..seed_nodes {
            graph.add_edge(NodeId::new(i), NodeId::new(j));
            bump(&mut degrees, i);
            bump(&mut degrees, j);
        }
    }

    for new_node in seed_nodes..node_count {
        let mut attached = Vec::with_capacity(attachments);
        for _ in 0..attachments.min(new_node) {
            let earlier = degrees.get(..new_node).unwrap_or_default();
            let Some(target) = select_by_degree(rng, earlier, &attached) else {
                break;
            };
            graph.add_edge(NodeId::new(new_node), NodeId::new(target));
            bump(&mut degrees, new_node);
            bump(&mut degrees, target);
            attached.push(target);
        }
    }
    graph
}

fn bump(degrees: &mut [usize], node: usize) {
    if let Some(degree) = degrees.get_mut(node) {
        *degree += 1;
    }
}

/// Selects an index with probability proportional to its degree.
///
/// Isolated nodes weigh as degree one. Returns `None` when every index is
/// excluded.
fn select_by_degree<R: Rng + ?Sized>(
    rng: &mut R,
    degrees: &[usize],
    exclude: &[usize],
) -> Option<usize> {
    let weight = |(index, degree): (usize, &usize)| {
        if exclude.contains(&index) {
            0
        } else {
            (*degree).max(1)
        }
    };
    let total: usize = degrees.iter().enumerate().map(weight).sum();
    if total == 0 {
        return None;
    }
    let mut threshold = rng.gen_range(0..total);
    for (index, degree) in degrees.iter().enumerate() {
        let w = weight((index, degree));
        if threshold < w {
            return Some(index);
        }
        threshold -= w;
    }
    None
}
