use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::snapshot::{
    ArrayElement, ArrayField, BitvectorField, Field, Node, NodeId, PanicFlags, Snapshot,
    StateSpace,
};

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    exec_name: String,
    state_space: RawStateSpace,
}

#[derive(Debug, Deserialize)]
struct RawStateSpace {
    #[serde(default)]
    nodes: HashMap<String, RawNode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Text(String),
    Number(u64),
}

impl RawNodeId {
    fn into_node_id(self) -> NodeId {
        match self {
            Self::Text(text) => NodeId::new(text),
            Self::Number(number) => NodeId::new(number.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    outgoing: Vec<RawNodeId>,
    #[serde(default)]
    incoming: Vec<RawNodeId>,
    #[serde(default)]
    fields: BTreeMap<String, RawField>,
    #[serde(default)]
    panic: Option<RawPanic>,
}

#[derive(Debug, Deserialize)]
struct RawPanic {
    zero: bool,
    one: bool,
}

#[derive(Debug, Deserialize)]
enum RawField {
    Bitvector(RawBitvector),
    Array(RawArray),
}

#[derive(Debug, Deserialize)]
struct RawBitvector {
    bit_width: u32,
    zeros: u64,
    ones: u64,
}

#[derive(Debug, Deserialize)]
struct RawArray {
    bit_width: u32,
    bit_length: u32,
    #[serde(default)]
    inner: BTreeMap<String, RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    zeros: u64,
    ones: u64,
}

pub(super) fn parse_snapshot(raw: &str) -> Result<Snapshot> {
    let parsed: RawSnapshot =
        serde_json::from_str(raw).context("invalid snapshot JSON from engine")?;

    let mut nodes = BTreeMap::new();
    for (raw_id, raw_node) in parsed.state_space.nodes {
        let node = normalize_node(raw_node)
            .with_context(|| format!("invalid description of node {raw_id}"))?;
        nodes.insert(NodeId::new(raw_id), node);
    }

    Ok(Snapshot {
        exec_name: parsed.exec_name,
        state_space: StateSpace { nodes },
    })
}

fn normalize_node(raw: RawNode) -> Result<Node> {
    let outgoing = raw
        .outgoing
        .into_iter()
        .map(RawNodeId::into_node_id)
        .collect();

    let mut seen = HashSet::new();
    let incoming = raw
        .incoming
        .into_iter()
        .map(RawNodeId::into_node_id)
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let mut fields = BTreeMap::new();
    for (name, raw_field) in raw.fields {
        let field =
            normalize_field(raw_field).with_context(|| format!("invalid field {name}"))?;
        fields.insert(name, field);
    }

    Ok(Node {
        outgoing,
        incoming,
        fields,
        panic: raw.panic.map(|panic| PanicFlags {
            zero: panic.zero,
            one: panic.one,
        }),
    })
}

fn normalize_field(raw: RawField) -> Result<Field> {
    match raw {
        RawField::Bitvector(bitvector) => Ok(Field::Bitvector(BitvectorField {
            bit_width: bitvector.bit_width,
            zeros: bitvector.zeros,
            ones: bitvector.ones,
        })),
        RawField::Array(array) => {
            if array.bit_length > u64::BITS {
                return Err(anyhow!(
                    "array index width {} exceeds {} bits",
                    array.bit_length,
                    u64::BITS
                ));
            }

            let mut runs = BTreeMap::new();
            for (index, element) in array.inner {
                let index = index
                    .parse::<u64>()
                    .with_context(|| format!("array run index {index:?} is not an integer"))?;
                runs.insert(
                    index,
                    ArrayElement {
                        zeros: element.zeros,
                        ones: element.ones,
                    },
                );
            }

            Ok(Field::Array(ArrayField {
                bit_width: array.bit_width,
                bit_length: array.bit_length,
                runs,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "exec_name": "counter",
        "state_space": {
            "nodes": {
                "0": { "outgoing": [1, "1", "0"], "incoming": ["0"], "fields": {} },
                "1": {
                    "outgoing": [],
                    "incoming": ["0", "0"],
                    "fields": {
                        "value": { "Bitvector": { "bit_width": 3, "zeros": 2, "ones": 5 } },
                        "mem": { "Array": { "bit_width": 2, "bit_length": 2,
                                 "inner": { "0": { "zeros": 3, "ones": 0 }, "2": { "zeros": 0, "ones": 3 } } } }
                    },
                    "panic": { "zero": true, "one": false }
                }
            }
        }
    }"#;

    #[test]
    fn parses_mixed_id_forms_and_keeps_outgoing_order() {
        let snapshot = parse_snapshot(SAMPLE).expect("sample parses");
        assert_eq!(snapshot.exec_name, "counter");

        let root = snapshot
            .state_space
            .node(&NodeId::root())
            .expect("root exists");
        let outgoing = root.outgoing.iter().map(NodeId::as_str).collect::<Vec<_>>();
        assert_eq!(outgoing, ["1", "1", "0"]);
    }

    #[test]
    fn deduplicates_incoming() {
        let snapshot = parse_snapshot(SAMPLE).expect("sample parses");
        let node = snapshot
            .state_space
            .node(&NodeId::from("1"))
            .expect("node 1 exists");

        assert_eq!(node.incoming, vec![NodeId::root()]);
        assert_eq!(
            node.panic,
            Some(PanicFlags {
                zero: true,
                one: false
            })
        );
    }

    #[test]
    fn parses_array_runs() {
        let snapshot = parse_snapshot(SAMPLE).expect("sample parses");
        let node = snapshot
            .state_space
            .node(&NodeId::from("1"))
            .expect("node 1 exists");

        let Some(Field::Array(array)) = node.fields.get("mem") else {
            panic!("mem should be an array field");
        };
        assert_eq!(array.runs.keys().copied().collect::<Vec<_>>(), [0, 2]);
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert!(parse_snapshot("not json").is_err());
        assert!(parse_snapshot(r#"{"exec_name": "x"}"#).is_err());

        let bad_index = r#"{"state_space": {"nodes": {"0": {"fields": {
            "mem": {"Array": {"bit_width": 1, "bit_length": 1, "inner": {"a": {"zeros": 1, "ones": 0}}}}
        }}}}}"#;
        assert!(parse_snapshot(bad_index).is_err());
    }
}
