// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request ancestor closure graph.
//!
//! The graph is an arena: nodes live in a flat vector and parent links are
//! integer indices into it. Each distinct unit id yields exactly one node,
//! so paths converging on a shared ancestor share its node by construction.
//! The arena is built fresh for one computation and discarded with it;
//! nothing here is persisted.

use std::collections::{HashMap, HashSet};

use fonds_core::{UnitId, UnitProjection};
use fonds_store::UnitStore;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use petgraph::algo::toposort;
use petgraph::prelude::DiGraphMap;
use tracing::debug;

use crate::config::ComputeConfig;
use crate::error::ComputeError;

pub type NodeIdx = usize;

#[derive(Clone, Debug)]
pub struct UnitNode {
    pub unit: UnitProjection,
    pub parents: Vec<NodeIdx>,
}

#[derive(Clone, Debug, Default)]
pub struct UnitGraph {
    nodes: Vec<UnitNode>,
    index: HashMap<UnitId, NodeIdx>,
}

impl UnitGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &UnitId) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIdx) -> &UnitNode {
        &self.nodes[idx]
    }

    /// Insert a projection, deduplicated by id. Parent links are resolved
    /// later, once the whole closure is present.
    fn insert(&mut self, unit: UnitProjection) -> NodeIdx {
        if let Some(idx) = self.index.get(&unit.id) {
            return *idx;
        }
        let idx = self.nodes.len();
        self.index.insert(unit.id.clone(), idx);
        self.nodes.push(UnitNode {
            unit,
            parents: Vec::new(),
        });
        idx
    }

    fn link_parents(&mut self) -> Result<(), ComputeError> {
        for idx in 0..self.nodes.len() {
            let mut parents = Vec::with_capacity(self.nodes[idx].unit.direct_parent_ids.len());
            for parent_id in &self.nodes[idx].unit.direct_parent_ids {
                let parent_idx = self.index.get(parent_id).copied().ok_or_else(|| {
                    ComputeError::MissingAncestor {
                        child: self.nodes[idx].unit.id.clone(),
                        ancestor: parent_id.clone(),
                    }
                })?;
                parents.push(parent_idx);
            }
            self.nodes[idx].parents = parents;
        }
        Ok(())
    }

    /// Node indices in topological, root-first order.
    pub fn topological_order(&self) -> Result<Vec<NodeIdx>, ComputeError> {
        let mut graph: DiGraphMap<NodeIdx, ()> = DiGraphMap::new();
        for idx in 0..self.nodes.len() {
            graph.add_node(idx);
            for &parent in &self.nodes[idx].parents {
                graph.add_edge(parent, idx, ());
            }
        }

        toposort(&graph, None).map_err(|cycle| {
            ComputeError::CyclicHierarchy(self.node(cycle.node_id()).unit.id.clone())
        })
    }
}

/// Expand the target units into their full ancestor closure.
///
/// The targets arrive already fetched, carrying the store's denormalized
/// transitive ancestor id lists. Every referenced id not yet resolved is
/// fetched level by level: the pages of one level run concurrently up to
/// the configured limit, levels themselves are strictly sequential. An id
/// the store cannot resolve aborts the computation with a data-integrity
/// fault.
pub async fn build_closure<S>(
    targets: &[UnitProjection],
    store: &S,
    config: &ComputeConfig,
) -> Result<UnitGraph, ComputeError>
where
    S: UnitStore,
{
    let page_size = config.fetch_page_size.max(1);
    let concurrency = config.fetch_concurrency.max(1);

    let mut graph = UnitGraph::default();
    // Referenced-but-unresolved ids, each mapped to the first unit which
    // referenced it (for the fault message).
    let mut referenced_by: HashMap<UnitId, UnitId> = HashMap::new();
    let mut frontier: Vec<UnitId> = Vec::new();

    for target in targets {
        graph.insert(target.clone());
    }
    for target in targets {
        collect_references(target, &graph, &mut referenced_by, &mut frontier);
    }

    let mut level = 0;
    while !frontier.is_empty() {
        debug!(level, unresolved = frontier.len(), "fetching closure level");

        // All pages of one level are fetched before the next level is
        // expanded, with at most `concurrency` store calls in flight.
        let pages: Vec<Vec<UnitProjection>> =
            stream::iter(frontier.chunks(page_size).map(|page| store.units_by_ids(page)))
                .buffer_unordered(concurrency)
                .try_collect()
                .await?;

        let fetched: Vec<UnitProjection> = pages.into_iter().flatten().collect();
        let fetched_ids: HashSet<&UnitId> = fetched.iter().map(|unit| &unit.id).collect();
        for id in &frontier {
            if !fetched_ids.contains(id) {
                let child = referenced_by
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.clone());
                return Err(ComputeError::MissingAncestor {
                    child,
                    ancestor: id.clone(),
                });
            }
        }

        frontier.clear();
        for unit in &fetched {
            graph.insert(unit.clone());
        }
        for unit in &fetched {
            collect_references(unit, &graph, &mut referenced_by, &mut frontier);
        }

        level += 1;
    }

    graph.link_parents()?;
    Ok(graph)
}

fn collect_references(
    unit: &UnitProjection,
    graph: &UnitGraph,
    referenced_by: &mut HashMap<UnitId, UnitId>,
    frontier: &mut Vec<UnitId>,
) {
    for referenced in unit
        .direct_parent_ids
        .iter()
        .chain(&unit.denormalized_ancestor_ids)
    {
        if graph.contains(referenced) || referenced_by.contains_key(referenced) {
            continue;
        }
        referenced_by.insert(referenced.clone(), unit.id.clone());
        frontier.push(referenced.clone());
    }
}
