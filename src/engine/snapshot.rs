use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a state-space node as handed out by the engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub const ROOT: &'static str = "0";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(Self::ROOT.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitvectorField {
    pub bit_width: u32,
    pub zeros: u64,
    pub ones: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayElement {
    pub zeros: u64,
    pub ones: u64,
}

/// Array of bitvectors stored as runs: each key is the first index of a run of equal elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayField {
    pub bit_width: u32,
    pub bit_length: u32,
    pub runs: BTreeMap<u64, ArrayElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Bitvector(BitvectorField),
    Array(ArrayField),
}

/// Raw two-flag panic status; see [`crate::ternary::decode_panic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanicFlags {
    pub zero: bool,
    pub one: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub outgoing: Vec<NodeId>,
    pub incoming: Vec<NodeId>,
    pub fields: BTreeMap<String, Field>,
    pub panic: Option<PanicFlags>,
}

impl Node {
    pub fn has_self_loop(&self, id: &NodeId) -> bool {
        self.outgoing.iter().any(|successor| successor == id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StateSpace {
    pub nodes: BTreeMap<NodeId, Node>,
}

impl StateSpace {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.outgoing.len()).sum()
    }
}

/// One full replacement of the engine's view of the verification.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub exec_name: String,
    pub state_space: StateSpace,
}

#[cfg(test)]
pub(crate) mod test_graph {
    use super::*;

    /// Builds a state space from `(source, target)` edge pairs, keeping edge order and
    /// deriving `incoming` the way the engine reports it.
    pub(crate) fn from_edges(node_ids: &[&str], edges: &[(&str, &str)]) -> StateSpace {
        let mut nodes: BTreeMap<NodeId, Node> = node_ids
            .iter()
            .map(|id| (NodeId::from(*id), Node::default()))
            .collect();

        for (source, target) in edges {
            nodes
                .entry(NodeId::from(*source))
                .or_default()
                .outgoing
                .push(NodeId::from(*target));
            let incoming = &mut nodes.entry(NodeId::from(*target)).or_default().incoming;
            if !incoming.iter().any(|id| id.as_str() == *source) {
                incoming.push(NodeId::from(*source));
            }
        }

        StateSpace { nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::test_graph::from_edges;
    use super::*;

    #[test]
    fn counts_duplicate_and_self_edges() {
        let space = from_edges(&["0", "1"], &[("0", "1"), ("0", "1"), ("0", "0")]);

        assert_eq!(space.node_count(), 2);
        assert_eq!(space.edge_count(), 3);
        let root = space.node(&NodeId::root()).expect("root exists");
        assert!(root.has_self_loop(&NodeId::root()));
        assert_eq!(root.incoming, vec![NodeId::root()]);
    }
}
