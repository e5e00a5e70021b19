use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::engine::{NodeId, StateSpace};

use super::{LayoutInfo, Tile, TileMap, successor_slots};

/// Fills in `reserve` for every node of `order`, last to first, so that canonical
/// successors are always finished before the node that owns them.
pub(super) fn reserve_rows(
    space: &StateSpace,
    order: &[NodeId],
    infos: &mut HashMap<NodeId, LayoutInfo>,
) {
    for node_id in order.iter().rev() {
        let Some(node) = space.node(node_id) else {
            continue;
        };

        let predecessor_reserve = node
            .incoming
            .iter()
            .filter(|predecessor_id| *predecessor_id != node_id)
            .collect::<HashSet<_>>()
            .len() as u64;

        let successor_reserve = successor_slots(infos, node_id, &node.outgoing)
            .fold(0u64, |rows, slot| rows.saturating_add(slot.advance));

        infos.entry(node_id.clone()).or_default().reserve =
            predecessor_reserve.max(successor_reserve).max(1);
    }
}

/// Assigns tiles breadth-first from the root, stacking successors by their reserved rows.
pub(super) fn place_tiles(
    space: &StateSpace,
    root: &NodeId,
    infos: &mut HashMap<NodeId, LayoutInfo>,
) -> TileMap {
    let mut tiles = TileMap::default();
    let mut queue = VecDeque::new();

    let root_tile = Tile::ORIGIN;
    infos.entry(root.clone()).or_default().tile = Some(root_tile);
    tiles.insert(root_tile, root.clone());
    queue.push_back(root.clone());

    while let Some(node_id) = queue.pop_front() {
        let Some(node) = space.node(&node_id) else {
            continue;
        };
        let Some(node_tile) = infos.get(&node_id).and_then(|info| info.tile) else {
            continue;
        };

        let slots = successor_slots(infos, &node_id, &node.outgoing)
            .map(|slot| (slot.successor.clone(), slot.row, slot.canonical))
            .collect::<Vec<_>>();

        let canonical_successors = slots
            .iter()
            .filter(|(_, _, canonical)| *canonical)
            .map(|(successor_id, _, _)| successor_id)
            .collect::<HashSet<_>>()
            .len();

        for (successor_id, row, canonical) in slots {
            if !canonical
                || infos
                    .get(&successor_id)
                    .is_some_and(|info| info.tile.is_some())
            {
                continue;
            }

            // Move the successor one column further when its incoming references
            // would otherwise share a column with this node's outgoing staging line.
            let has_sibling_reference = space.node(&successor_id).is_some_and(|successor| {
                successor
                    .incoming
                    .iter()
                    .any(|sibling_id| *sibling_id != node_id && *sibling_id != successor_id)
            });
            let column_offset = if canonical_successors > 1 && has_sibling_reference {
                2
            } else {
                1
            };

            let tile = node_tile.offset(column_offset, row);
            if let Some(previous) = tiles.insert(tile, successor_id.clone()) {
                warn!(
                    tile = ?tile,
                    node = %successor_id,
                    previous = %previous,
                    "tile collision while placing node"
                );
            }
            infos.entry(successor_id.clone()).or_default().tile = Some(tile);
            queue.push_back(successor_id);
        }
    }

    tiles
}
