//! Binary caching of step graphs (`.fsg`).
//!
//! Building a graph is pure but not free; drivers cache it next to the pad
//! definition and reload it on startup. The format is versioned and ordered
//! deterministically (nodes in build order, labels sorted), so a graph
//! written and loaded with the same pad compares structurally equal to the
//! freshly built one. Load failures are recoverable: the caller rebuilds.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::graph::moves::{FootAction, FootStep, MoveLabel, StepType};
use crate::graph::state::{AttachState, BodyState, Foot, FootAttachment, NUM_FEET, PORTIONS_PER_FOOT};
use crate::graph::{ActedLanes, Link, NodeId, StepGraph};
use crate::pad::PadModel;

/// File magic of the `.fsg` format.
pub const MAGIC: [u8; 4] = *b"FSGR";
/// Current format version.
pub const VERSION: u32 = 1;

const NO_LANE: u8 = 0xFF;
const NO_ENTRY: u8 = 0xFF;

/// A failure to load (or write) a persisted graph.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphPersistError {
    /// Underlying I/O failure.
    #[error("graph persistence i/o error: {0}")]
    Io(#[from] io::Error),
    /// The file does not start with the `.fsg` magic.
    #[error("not a step graph file")]
    BadMagic,
    /// The file was written by an unsupported format version.
    #[error("unsupported step graph version {found} (expected {VERSION})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
    },
    /// The graph was built for a pad with a different arrow count.
    #[error("step graph was built for {found} arrows, pad has {expected}")]
    ArrowCountMismatch {
        /// Arrows of the pad passed to the loader.
        expected: usize,
        /// Arrows recorded in the file.
        found: usize,
    },
    /// The file is structurally damaged.
    #[error("corrupt step graph file: {0}")]
    Corrupt(&'static str),
}

impl StepGraph {
    /// Writes the graph to `sink` in the `.fsg` format.
    ///
    /// # Errors
    ///
    /// Returns [`GraphPersistError::Io`] on write failures.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<(), GraphPersistError> {
        sink.write_all(&MAGIC)?;
        sink.write_all(&VERSION.to_le_bytes())?;
        sink.write_all(&(u16::from(self.num_arrows())).to_le_bytes())?;
        sink.write_all(&(self.node_count() as u32).to_le_bytes())?;
        for id in self.node_ids() {
            write_state(sink, self.state(id))?;
        }
        for id in self.node_ids() {
            let moves = self.moves_sorted(id);
            sink.write_all(&(moves.len() as u32).to_le_bytes())?;
            for (label, links) in moves {
                write_label(sink, label)?;
                sink.write_all(&(links.len() as u32).to_le_bytes())?;
                for link in links {
                    write_lanes(sink, &link.lanes)?;
                    sink.write_all(&(link.dest.index() as u32).to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    /// Loads a graph previously written with [`StepGraph::write_to`].
    ///
    /// # Errors
    ///
    /// Returns a [`GraphPersistError`] on I/O failure, a foreign or
    /// damaged file, a version mismatch, or an arrow count that does not
    /// match `pad`.
    pub fn read_from<R: Read>(source: &mut R, pad: &PadModel) -> Result<StepGraph, GraphPersistError> {
        let mut magic = [0u8; 4];
        source.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(GraphPersistError::BadMagic);
        }
        let version = read_u32(source)?;
        if version != VERSION {
            return Err(GraphPersistError::UnsupportedVersion { found: version });
        }
        let num_arrows = usize::from(read_u16(source)?);
        if num_arrows != pad.num_arrows() {
            return Err(GraphPersistError::ArrowCountMismatch {
                expected: pad.num_arrows(),
                found: num_arrows,
            });
        }
        let node_count = read_u32(source)? as usize;

        let mut graph = StepGraph::with_capacity(num_arrows as u8);
        for _ in 0..node_count {
            let state = read_state(source, num_arrows)?;
            let (_, fresh) = graph.intern(state);
            if !fresh {
                return Err(GraphPersistError::Corrupt("duplicate node state"));
            }
        }
        if node_count == 0 || !graph.state(graph.root()).is_uncommitted() {
            return Err(GraphPersistError::Corrupt("missing uncommitted root"));
        }
        for index in 0..node_count {
            let id = NodeId(index as u32);
            let label_count = read_u32(source)? as usize;
            for _ in 0..label_count {
                let label = read_label(source)?;
                let link_count = read_u32(source)? as usize;
                for _ in 0..link_count {
                    let lanes = read_lanes(source, num_arrows)?;
                    let dest = read_u32(source)? as usize;
                    if dest >= node_count {
                        return Err(GraphPersistError::Corrupt("link destination out of range"));
                    }
                    graph.add_link(
                        id,
                        label,
                        Link {
                            lanes,
                            dest: NodeId(dest as u32),
                        },
                    );
                }
            }
        }
        Ok(graph)
    }
}

fn write_state<W: Write>(sink: &mut W, state: &BodyState) -> Result<(), GraphPersistError> {
    for foot in Foot::ALL {
        for slot in state.foot_slots(foot) {
            match slot.committed() {
                Some((lane, attach)) => {
                    sink.write_all(&[lane, encode_attach(attach)])?;
                }
                None => sink.write_all(&[NO_LANE, 0])?,
            }
        }
    }
    Ok(())
}

fn read_state<R: Read>(source: &mut R, num_arrows: usize) -> Result<BodyState, GraphPersistError> {
    let mut slots = [[FootAttachment::FREE; PORTIONS_PER_FOOT]; NUM_FEET];
    for foot in &mut slots {
        for slot in foot.iter_mut() {
            let mut pair = [0u8; 2];
            source.read_exact(&mut pair)?;
            if pair[0] != NO_LANE {
                if usize::from(pair[0]) >= num_arrows {
                    return Err(GraphPersistError::Corrupt("state lane out of range"));
                }
                *slot = FootAttachment::on(pair[0], decode_attach(pair[1])?);
            }
        }
    }
    Ok(BodyState::new(slots))
}

fn write_label<W: Write>(sink: &mut W, label: &MoveLabel) -> Result<(), GraphPersistError> {
    for foot in Foot::ALL {
        for entry in label.foot_entries(foot) {
            match entry {
                Some(step) => sink.write_all(&[
                    step.step.discriminant(),
                    step.action.discriminant(),
                ])?,
                None => sink.write_all(&[NO_ENTRY, 0])?,
            }
        }
    }
    Ok(())
}

fn read_label<R: Read>(source: &mut R) -> Result<MoveLabel, GraphPersistError> {
    let mut per_foot = [[None; PORTIONS_PER_FOOT]; NUM_FEET];
    for foot in &mut per_foot {
        for slot in foot.iter_mut() {
            let mut pair = [0u8; 2];
            source.read_exact(&mut pair)?;
            if pair[0] != NO_ENTRY {
                let step = StepType::from_discriminant(pair[0])
                    .ok_or(GraphPersistError::Corrupt("unknown step type"))?;
                let action = FootAction::from_discriminant(pair[1])
                    .ok_or(GraphPersistError::Corrupt("unknown foot action"))?;
                *slot = Some(FootStep::new(step, action));
            }
        }
    }
    let left = MoveLabel::from_foot(Foot::Left, per_foot[0]);
    let right = MoveLabel::from_foot(Foot::Right, per_foot[1]);
    Ok(match (per_foot[0][0].is_some(), per_foot[1][0].is_some()) {
        (true, true) => MoveLabel::merged(left, right),
        (_, true) => right,
        _ => left,
    })
}

fn write_lanes<W: Write>(sink: &mut W, lanes: &ActedLanes) -> Result<(), GraphPersistError> {
    for foot in lanes {
        for lane in foot {
            sink.write_all(&[lane.unwrap_or(NO_LANE)])?;
        }
    }
    Ok(())
}

fn read_lanes<R: Read>(source: &mut R, num_arrows: usize) -> Result<ActedLanes, GraphPersistError> {
    let mut lanes: ActedLanes = [[None; PORTIONS_PER_FOOT]; NUM_FEET];
    for foot in &mut lanes {
        for lane in foot.iter_mut() {
            let mut byte = [0u8; 1];
            source.read_exact(&mut byte)?;
            if byte[0] != NO_LANE {
                if usize::from(byte[0]) >= num_arrows {
                    return Err(GraphPersistError::Corrupt("link lane out of range"));
                }
                *lane = Some(byte[0]);
            }
        }
    }
    Ok(lanes)
}

const fn encode_attach(attach: AttachState) -> u8 {
    match attach {
        AttachState::Resting => 0,
        AttachState::Held => 1,
        AttachState::Rolling => 2,
    }
}

fn decode_attach(value: u8) -> Result<AttachState, GraphPersistError> {
    match value {
        0 => Ok(AttachState::Resting),
        1 => Ok(AttachState::Held),
        2 => Ok(AttachState::Rolling),
        _ => Err(GraphPersistError::Corrupt("unknown attachment state")),
    }
}

fn read_u32<R: Read>(source: &mut R) -> Result<u32, GraphPersistError> {
    let mut bytes = [0u8; 4];
    source.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_u16<R: Read>(source: &mut R) -> Result<u16, GraphPersistError> {
    let mut bytes = [0u8; 2];
    source.read_exact(&mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}
