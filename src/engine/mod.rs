mod client;
mod parse;
mod snapshot;

pub use client::{EngineClient, EngineRequest};
pub use snapshot::{
    ArrayElement, ArrayField, BitvectorField, Field, Node, NodeId, PanicFlags, Snapshot,
    StateSpace,
};

#[cfg(test)]
pub(crate) use snapshot::test_graph;
