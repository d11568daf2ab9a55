//! The expression search: a pruned frontier over the source step graph.
//!
//! Search nodes live in an arena indexed by integer ids; parent links are
//! ids, never references, so pruning can physically free abandoned chains
//! while the frontier still exists. After every batch the frontier keeps
//! only the cheapest node per graph state, and every parent chain that no
//! surviving node references is released back to the arena.

use std::collections::HashMap;

use crate::cancel::CancelToken;
use crate::chart::{Lane, Position};
use crate::express::cost::{MineHints, StepContext, step_cost};
use crate::express::{Batch, ExpressError, ParseMode};
use crate::graph::moves::{FootAction, MoveLabel};
use crate::graph::state::AttachState;
use crate::graph::{ActedLanes, NodeId, StepGraph};
use crate::pad::PadModel;

/// One element of the winning path: the move taken, the source lanes it
/// acted on, and where.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathStep {
    pub position: Position,
    pub label: MoveLabel,
    pub lanes: ActedLanes,
}

#[derive(Debug, Clone)]
struct SearchNode {
    graph_node: NodeId,
    parent: Option<u32>,
    children: u32,
    cost: u64,
    step: Option<PathStep>,
    ctx: StepContext,
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Option<SearchNode>>,
    free: Vec<u32>,
}

impl Arena {
    fn alloc(&mut self, node: SearchNode) -> u32 {
        if let Some(parent) = node.parent {
            self.node_mut(parent).children += 1;
        }
        match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                (self.nodes.len() - 1) as u32
            }
        }
    }

    fn node(&self, id: u32) -> &SearchNode {
        self.nodes[id as usize].as_ref().expect("live arena node")
    }

    fn node_mut(&mut self, id: u32) -> &mut SearchNode {
        self.nodes[id as usize].as_mut().expect("live arena node")
    }

    /// Frees `id` and then every ancestor left without children.
    fn release_chain(&mut self, id: u32) {
        let mut current = Some(id);
        while let Some(id) = current {
            if self.node(id).children > 0 {
                break;
            }
            let parent = self.nodes[id as usize].take().expect("live arena node").parent;
            self.free.push(id);
            if let Some(parent) = parent {
                self.node_mut(parent).children -= 1;
            }
            current = parent;
        }
    }

    /// Frees `id` alone, deferring ancestor cleanup to `release_chain`.
    fn release_one(&mut self, id: u32) {
        let node = self.nodes[id as usize].take().expect("live arena node");
        debug_assert_eq!(node.children, 0);
        if let Some(parent) = node.parent {
            self.node_mut(parent).children -= 1;
        }
        self.free.push(id);
    }
}

/// Persistent per-lane hold state, updated batch by batch.
fn apply_batch_to_tags(tags: &mut [Option<AttachState>], batch: &Batch) {
    for &lane in &batch.releases {
        tags[usize::from(lane)] = None;
    }
    for &(lane, action) in &batch.steps {
        tags[usize::from(lane)] = match action {
            FootAction::Hold => Some(AttachState::Held),
            FootAction::Roll => Some(AttachState::Rolling),
            _ => None,
        };
    }
}

fn holds_consistent(
    state: &crate::graph::state::BodyState,
    tags: &[Option<AttachState>],
) -> bool {
    let mut held = 0usize;
    for (lane, attach) in state.held_lanes() {
        if tags[usize::from(lane)] != Some(attach) {
            return false;
        }
        held += 1;
    }
    held == tags.iter().filter(|tag| tag.is_some()).count()
}

fn lanes_match(label: &MoveLabel, lanes: &ActedLanes, batch: &Batch) -> bool {
    let mut releases: Vec<Lane> = batch.releases.clone();
    let mut steps: Vec<(Lane, FootAction)> = batch.steps.clone();
    for (foot, slot, entry) in label.entries() {
        let Some(lane) = lanes[foot.index()][slot] else {
            return false;
        };
        if entry.action.is_release() {
            let Some(found) = releases.iter().position(|&needed| needed == lane) else {
                return false;
            };
            releases.swap_remove(found);
        } else {
            let Some(found) = steps
                .iter()
                .position(|&needed| needed == (lane, entry.action))
            else {
                return false;
            };
            steps.swap_remove(found);
        }
    }
    releases.is_empty() && steps.is_empty()
}

pub(crate) fn run(
    pad: &PadModel,
    graph: &StepGraph,
    batches: &[Batch],
    mode: ParseMode,
    cancel: Option<&CancelToken>,
) -> Result<Vec<PathStep>, ExpressError> {
    let num_lanes = pad.num_arrows();
    let mut tags: Vec<Option<AttachState>> = vec![None; num_lanes];
    let mut last_mine: Vec<Option<Position>> = vec![None; num_lanes];
    let mut last_release: Vec<Option<Position>> = vec![None; num_lanes];

    let mut arena = Arena::default();
    let root = arena.alloc(SearchNode {
        graph_node: graph.root(),
        parent: None,
        children: 0,
        cost: 0,
        step: None,
        ctx: StepContext::default(),
    });
    let mut frontier: Vec<u32> = vec![root];

    for batch in batches {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ExpressError::Cancelled);
        }
        // Releases clear hint state before the mines of this position
        // refresh it; both happen before steps are considered.
        for &lane in &batch.releases {
            last_release[usize::from(lane)] = Some(batch.position);
        }
        for &lane in &batch.mines {
            last_mine[usize::from(lane)] = Some(batch.position);
        }
        if batch.releases.is_empty() && batch.steps.is_empty() {
            continue;
        }
        apply_batch_to_tags(&mut tags, batch);
        let hints = MineHints {
            last_mine: &last_mine,
            last_release: &last_release,
        };

        let mut next: Vec<u32> = Vec::new();
        let mut by_graph_node: HashMap<NodeId, usize> = HashMap::new();
        for &node_id in &frontier {
            let (parent_cost, parent_graph, parent_ctx) = {
                let node = arena.node(node_id);
                (node.cost, node.graph_node, node.ctx)
            };
            let parent_state = *graph.state(parent_graph);
            for (label, links) in graph.moves_sorted(parent_graph) {
                if label.total_arrows() != batch.releases.len() + batch.steps.len() {
                    continue;
                }
                for link in links {
                    if !lanes_match(label, &link.lanes, batch) {
                        continue;
                    }
                    let dest_state = graph.state(link.dest);
                    if !holds_consistent(dest_state, &tags) {
                        continue;
                    }
                    let cost = parent_cost
                        + step_cost(pad, mode, &parent_state, label, &link.lanes, &parent_ctx, &hints);
                    match by_graph_node.get(&link.dest) {
                        Some(&slot) => {
                            let existing = next[slot];
                            if cost < arena.node(existing).cost {
                                arena.release_one(existing);
                                let fresh = arena.alloc(SearchNode {
                                    graph_node: link.dest,
                                    parent: Some(node_id),
                                    children: 0,
                                    cost,
                                    step: Some(PathStep {
                                        position: batch.position,
                                        label: *label,
                                        lanes: link.lanes,
                                    }),
                                    ctx: parent_ctx.after(label),
                                });
                                next[slot] = fresh;
                            }
                        }
                        None => {
                            let fresh = arena.alloc(SearchNode {
                                graph_node: link.dest,
                                parent: Some(node_id),
                                children: 0,
                                cost,
                                step: Some(PathStep {
                                    position: batch.position,
                                    label: *label,
                                    lanes: link.lanes,
                                }),
                                ctx: parent_ctx.after(label),
                            });
                            by_graph_node.insert(link.dest, next.len());
                            next.push(fresh);
                        }
                    }
                }
            }
        }
        if next.is_empty() {
            return Err(ExpressError::NoPathway {
                measure: batch.position.measure(),
            });
        }
        // Release every abandoned branch of the old frontier.
        for &node_id in &frontier {
            if arena.node(node_id).children == 0 {
                arena.release_chain(node_id);
            }
        }
        frontier = next;
    }

    // Keep the cheapest leaf (first wins ties) and unwind its chain.
    let best = frontier
        .iter()
        .copied()
        .min_by_key(|&id| arena.node(id).cost)
        .expect("frontier is never empty");
    let mut path = Vec::new();
    let mut current = Some(best);
    while let Some(id) = current {
        let node = arena.node(id);
        if let Some(step) = node.step {
            path.push(step);
        }
        current = node.parent;
    }
    path.reverse();
    Ok(path)
}
