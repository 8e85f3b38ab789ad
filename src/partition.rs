//! Row partitioning by multi-column key tuples.
//!
//! Rows are routed through a trie of depth K (one level per key column).
//! A leaf is created the first time its key tuple is seen and is assigned
//! the next group id, so groups come out in discovery order: the order in
//! which distinct tuples first appear when scanning rows from 0 upward.

use std::collections::HashMap;

use crate::frame::Value;
use crate::{Error, Result};

/// Hashable, type-tagged form of a [`Value`] used as a trie key.
///
/// Values of different variants never compare equal, so the number `1` and
/// the string `"1"` are distinct keys. Numbers are compared by bit pattern
/// after folding `-0.0` into `0.0` and every NaN into one canonical NaN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Null,
    Bool(bool),
    Number(u64),
    String(String),
}

impl From<&Value> for KeyValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => KeyValue::Null,
            Value::Bool(value) => KeyValue::Bool(*value),
            Value::Number(value) => KeyValue::Number(canonical_bits(*value)),
            Value::String(value) => KeyValue::String(value.clone()),
        }
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

#[derive(Default)]
struct TrieNode {
    children: HashMap<KeyValue, TrieNode>,
    group: Option<usize>,
}

/// Group row indices by equal key tuples.
///
/// `columns[k][i]` is the k-th key component of row `i`. The returned groups
/// form an exact partition of `0..L`; indices inside a group are ascending.
///
/// # Errors
///
/// - `Error::NoKeyColumns`: `columns` is empty
/// - `Error::RaggedKeyColumns`: key columns differ in length
pub fn partition(columns: &[&[Value]]) -> Result<Vec<Vec<usize>>> {
    let Some(first) = columns.first() else {
        return Err(Error::NoKeyColumns);
    };
    let len = first.len();
    for (column, values) in columns.iter().enumerate() {
        if values.len() != len {
            return Err(Error::RaggedKeyColumns {
                column,
                expected: len,
                actual: values.len(),
            });
        }
    }

    let mut root = TrieNode::default();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for row in 0..len {
        let mut node = &mut root;
        for column in columns {
            node = node.children.entry(KeyValue::from(&column[row])).or_default();
        }
        let group = match node.group {
            Some(group) => group,
            None => {
                let group = groups.len();
                groups.push(Vec::new());
                node.group = Some(group);
                group
            }
        };
        groups[group].push(row);
    }

    log::trace!(
        "partitioned {len} rows over {} key columns into {} groups",
        columns.len(),
        groups.len()
    );
    Ok(groups)
}
