//! Tiled layout of a rooted state space.
//!
//! The layout is recomputed from scratch for every snapshot in four passes: a
//! breadth-first spanning tree picks the canonical predecessor of every node, Kahn's
//! algorithm orders the tree, a reverse pass reserves rows for each subtree and a final
//! breadth-first pass assigns tiles. Edges that are not tree edges are drawn as
//! references and take up a single row at their source.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::debug;

use crate::engine::{NodeId, StateSpace};

mod placement;
mod spanning;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile {
    pub column: i64,
    pub row: i64,
}

impl Tile {
    pub const ORIGIN: Tile = Tile { column: 0, row: 0 };

    pub fn new(column: i64, row: i64) -> Self {
        Self { column, row }
    }

    /// The tile `columns` to the right and `rows` below, clamped to the grid.
    pub fn offset(self, columns: i64, rows: u64) -> Self {
        Self {
            column: self.column.saturating_add(columns),
            row: self
                .row
                .saturating_add(i64::try_from(rows).unwrap_or(i64::MAX)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutInfo {
    pub predecessor: Option<NodeId>,
    pub reserve: u64,
    pub tile: Option<Tile>,
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self {
            predecessor: None,
            reserve: 1,
            tile: None,
        }
    }
}

/// Column -> row -> node lookup used for hit testing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileMap {
    columns: BTreeMap<i64, BTreeMap<i64, NodeId>>,
}

impl TileMap {
    fn insert(&mut self, tile: Tile, node_id: NodeId) -> Option<NodeId> {
        self.columns
            .entry(tile.column)
            .or_default()
            .insert(tile.row, node_id)
    }

    pub fn get(&self, tile: Tile) -> Option<&NodeId> {
        self.columns.get(&tile.column)?.get(&tile.row)
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(BTreeMap::len).sum()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("the state space has no root node {root}")]
    MissingRoot { root: NodeId },
    #[error("node {from} refers to unknown node {to}")]
    DanglingEdge { from: NodeId, to: NodeId },
}

/// Rows taken by one outgoing edge: the whole subtree for the canonical edge of the
/// successor, a single row for a reference.
pub fn row_advance(canonical: bool, successor_reserve: u64) -> u64 {
    if canonical { successor_reserve } else { 1 }
}

/// Placement of one non-self outgoing edge relative to its source tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuccessorSlot<'a> {
    pub successor: &'a NodeId,
    pub row: u64,
    pub canonical: bool,
    pub advance: u64,
}

/// Walks `outgoing` in order, skipping self-edges, and stacks the edges row by row with
/// [`row_advance`]. Shared by reservation, placement and drawing. Rows saturate, since
/// duplicate tree edges count their subtree once per copy.
fn successor_slots<'a>(
    infos: &'a HashMap<NodeId, LayoutInfo>,
    source: &'a NodeId,
    outgoing: &'a [NodeId],
) -> impl Iterator<Item = SuccessorSlot<'a>> + 'a {
    let mut row = 0u64;
    outgoing
        .iter()
        .filter(move |successor| *successor != source)
        .map(move |successor| {
            let info = infos.get(successor);
            let canonical = info.and_then(|info| info.predecessor.as_ref()) == Some(source);
            let advance = row_advance(canonical, info.map_or(1, |info| info.reserve));
            let slot = SuccessorSlot {
                successor,
                row,
                canonical,
                advance,
            };
            row = row.saturating_add(advance);
            slot
        })
}

#[derive(Clone, Debug, Default)]
pub struct Layout {
    infos: HashMap<NodeId, LayoutInfo>,
    order: Vec<NodeId>,
    tiles: TileMap,
}

impl Layout {
    pub fn compute(space: &StateSpace) -> Result<Self, LayoutError> {
        let root = NodeId::root();
        validate(space, &root)?;

        let tree = spanning::discover(space, &root);
        let order = spanning::topological_order(&root, &tree);

        let mut infos = space
            .nodes
            .keys()
            .map(|node_id| (node_id.clone(), LayoutInfo::default()))
            .collect::<HashMap<_, _>>();
        for (node_id, predecessor_id) in tree.predecessors {
            infos.entry(node_id).or_default().predecessor = Some(predecessor_id);
        }

        placement::reserve_rows(space, &order, &mut infos);
        let tiles = placement::place_tiles(space, &root, &mut infos);

        debug!(
            nodes = space.node_count(),
            reachable = order.len(),
            tiles = tiles.len(),
            "computed state space layout"
        );

        Ok(Self {
            infos,
            order,
            tiles,
        })
    }

    pub fn info(&self, node_id: &NodeId) -> Option<&LayoutInfo> {
        self.infos.get(node_id)
    }

    pub fn tile(&self, node_id: &NodeId) -> Option<Tile> {
        self.info(node_id).and_then(|info| info.tile)
    }

    pub fn predecessor(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.info(node_id).and_then(|info| info.predecessor.as_ref())
    }

    pub fn reserve(&self, node_id: &NodeId) -> u64 {
        self.info(node_id).map_or(1, |info| info.reserve)
    }

    pub fn is_canonical(&self, source: &NodeId, target: &NodeId) -> bool {
        self.predecessor(target) == Some(source)
    }

    /// Reachable nodes, each after its canonical predecessor.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    pub fn successor_slots<'a>(
        &'a self,
        source: &'a NodeId,
        outgoing: &'a [NodeId],
    ) -> impl Iterator<Item = SuccessorSlot<'a>> + 'a {
        successor_slots(&self.infos, source, outgoing)
    }
}

fn validate(space: &StateSpace, root: &NodeId) -> Result<(), LayoutError> {
    if space.node(root).is_none() {
        return Err(LayoutError::MissingRoot { root: root.clone() });
    }

    for (node_id, node) in &space.nodes {
        for other_id in node.outgoing.iter().chain(node.incoming.iter()) {
            if !space.nodes.contains_key(other_id) {
                return Err(LayoutError::DanglingEdge {
                    from: node_id.clone(),
                    to: other_id.clone(),
                });
            }
        }
    }

    Ok(())
}
