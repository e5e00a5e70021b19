use std::fmt;

use crate::engine::{ArrayField, BitvectorField, Field, Node, NodeId};
use crate::ternary::{decode_panic, decode_ternary};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// The engine reported a combination that has no three-valued meaning.
    Unrepresentable,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Unrepresentable => f.write_str("unrepresentable"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRow {
    pub name: String,
    pub value: FieldValue,
    pub emphasized: bool,
}

impl FieldRow {
    fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
            emphasized: false,
        }
    }

    fn emphasized(mut self) -> Self {
        self.emphasized = true;
        self
    }
}

pub fn node_rows(node_id: &NodeId, node: &Node) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("id", FieldValue::Text(node_id.to_string())).emphasized(),
        FieldRow::new("panic", panic_value(node)).emphasized(),
    ];

    for (name, field) in &node.fields {
        match field {
            Field::Bitvector(bitvector) => {
                rows.push(FieldRow::new(name.as_str(), bitvector_value(*bitvector)));
            }
            Field::Array(array) => array_rows(name, array, &mut rows),
        }
    }

    rows
}

pub fn panic_value(node: &Node) -> FieldValue {
    match node.panic {
        None => FieldValue::Text("(none)".to_owned()),
        Some(flags) => match decode_panic(flags) {
            Ok(value) => FieldValue::Text(value.to_string()),
            Err(_) => FieldValue::Unrepresentable,
        },
    }
}

fn bitvector_value(bitvector: BitvectorField) -> FieldValue {
    match decode_ternary(bitvector.ones, bitvector.zeros, bitvector.bit_width) {
        Ok(bits) => FieldValue::Text(format!("\"{bits}\"")),
        Err(_) => FieldValue::Unrepresentable,
    }
}

/// Expands run-encoded array elements into `name[i]` / `name[i..=j]` rows.
fn array_rows(name: &str, array: &ArrayField, rows: &mut Vec<FieldRow>) {
    let last_index = if array.bit_length >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << array.bit_length) - 1
    };

    let mut runs = array.runs.iter().peekable();
    while let Some((&start, element)) = runs.next() {
        let end = match runs.peek() {
            Some(&(&next_start, _)) => next_start.saturating_sub(1),
            None => last_index,
        };

        let row_name = if start == end {
            format!("{name}[{start}]")
        } else {
            format!("{name}[{start}..={end}]")
        };
        let value = bitvector_value(BitvectorField {
            bit_width: array.bit_width,
            zeros: element.zeros,
            ones: element.ones,
        });
        rows.push(FieldRow::new(row_name, value));
    }
}
