//! The step graph: every reachable body state and every labeled move.
//!
//! Nodes are [`BodyState`]s interned in an arena and addressed by
//! [`NodeId`]; edges are [`MoveLabel`]s, each carrying the concrete lanes it
//! acts on and a destination node. The graph is built once per
//! [`PadModel`](crate::pad::PadModel) via [`StepGraph::build`], is immutable
//! afterwards, and can be cached on disk in the `.fsg` format (see
//! [`persist`]).
//!
//! Queries never fail: asking for the links of an unknown label yields an
//! empty slice.

mod build;
pub mod moves;
pub mod persist;
pub mod state;

use std::collections::HashMap;

use crate::chart::Lane;
use crate::graph::moves::MoveLabel;
use crate::graph::state::{BodyState, NUM_FEET, PORTIONS_PER_FOOT};
use crate::pad::PadModel;

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The lanes acted on by one edge, aligned slot-for-slot with the label's
/// entries.
pub type ActedLanes = [[Option<Lane>; PORTIONS_PER_FOOT]; NUM_FEET];

/// One destination of a labeled move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Link {
    /// The lanes the move acts on.
    pub lanes: ActedLanes,
    /// The resulting body state.
    pub dest: NodeId,
}

#[derive(Debug, Clone)]
struct Node {
    state: BodyState,
    links: HashMap<MoveLabel, Vec<Link>>,
}

/// The reachability graph over body states for one pad.
#[derive(Debug, Clone)]
pub struct StepGraph {
    nodes: Vec<Node>,
    index: HashMap<BodyState, NodeId>,
    num_arrows: u8,
}

impl StepGraph {
    /// Builds the graph for `pad` by breadth-first expansion from the
    /// uncommitted root. Construction is infallible for a valid pad.
    #[must_use]
    pub fn build(pad: &PadModel) -> StepGraph {
        build::build(pad)
    }

    pub(crate) fn with_capacity(num_arrows: u8) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            num_arrows,
        }
    }

    pub(crate) fn intern(&mut self, state: BodyState) -> (NodeId, bool) {
        if let Some(&id) = self.index.get(&state) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            state,
            links: HashMap::new(),
        });
        self.index.insert(state, id);
        (id, true)
    }

    pub(crate) fn add_link(&mut self, from: NodeId, label: MoveLabel, link: Link) {
        let links = self.nodes[from.index()].links.entry(label).or_default();
        if !links.contains(&link) {
            links.push(link);
        }
    }

    /// The root node: the uncommitted stance.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of arrows of the pad this graph was built for.
    #[must_use]
    pub fn num_arrows(&self) -> u8 {
        self.num_arrows
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The body state of `id`.
    #[must_use]
    pub fn state(&self, id: NodeId) -> &BodyState {
        &self.nodes[id.index()].state
    }

    /// Looks up the node for a body state, if it is reachable.
    #[must_use]
    pub fn node_id(&self, state: &BodyState) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    /// All node ids, in deterministic build order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(|index| NodeId(index as u32))
    }

    /// The destinations of `label` out of `id`. Unknown labels yield an
    /// empty slice.
    #[must_use]
    pub fn links(&self, id: NodeId, label: &MoveLabel) -> &[Link] {
        self.nodes[id.index()]
            .links
            .get(label)
            .map_or(&[], Vec::as_slice)
    }

    /// Every labeled move out of `id`, in arbitrary order.
    pub fn moves_from(&self, id: NodeId) -> impl Iterator<Item = (&MoveLabel, &[Link])> {
        self.nodes[id.index()]
            .links
            .iter()
            .map(|(label, links)| (label, links.as_slice()))
    }

    /// Every labeled move out of `id`, deterministically ordered with the
    /// left foot's entries ranked first. The searches iterate this so that
    /// equal-cost ties break the same way on every run.
    #[must_use]
    pub fn moves_sorted(&self, id: NodeId) -> Vec<(&MoveLabel, &[Link])> {
        let mut moves: Vec<_> = self.moves_from(id).collect();
        moves.sort_by_key(|(label, _)| label.ordering_key());
        moves
    }
}

impl PartialEq for StepGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.num_arrows != other.num_arrows || self.nodes.len() != other.nodes.len() {
            return false;
        }
        self.nodes.iter().zip(&other.nodes).all(|(a, b)| {
            if a.state != b.state || a.links.len() != b.links.len() {
                return false;
            }
            a.links.iter().all(|(label, links)| {
                b.links.get(label).is_some_and(|other_links| {
                    let mut mine = links.clone();
                    let mut theirs = other_links.clone();
                    mine.sort();
                    theirs.sort();
                    mine == theirs
                })
            })
        })
    }
}

impl Eq for StepGraph {}
