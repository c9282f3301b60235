//! Decoder for the tagged clauses of the query IR
//!
//! Clauses are JSON arrays whose first element is the operator:
//!
//! ```text
//! ["field", 1100, {"base-type": "type/Integer"}]   field reference by id
//! ["field", "TOTAL", {"base-type": "type/Float"}]  field reference by name
//! ["aggregation", 0]                               aggregation reference
//! ["=", ["field", 1100, null], 3]                  comparison
//! ["and", [...], [...], [...]]                     logical
//! ```
//!
//! Decoding never mutates; rewriting code matches on [`Clause`] and then
//! edits the node it decoded.

use dashmig_schema::{CardId, ColumnId, TableId};
use serde_json::Value;

/// Binary comparison operators accepted in filters
pub const COMPARISON_OPERATORS: &[&str] = &[
    "=",
    "!=",
    "<",
    ">",
    "<=",
    ">=",
    "<=>",
    "starts-with",
    "ends-with",
    "contains",
    "does-not-contain",
];

/// N-ary logical operators accepted in filters
pub const LOGICAL_OPERATORS: &[&str] = &["and", "or"];

const CARD_PREFIX: &str = "card__";

/// What a field reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// Column by id
    Id(ColumnId),
    /// Column by name (native queries, nested questions)
    Name(String),
    /// Anything else in the id slot
    Unknown,
}

/// One decoded clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `["field", id-or-name, options]`
    FieldRef(FieldTarget),
    /// `["aggregation", index]`
    AggregationRef(u64),
    /// Comparison with its operand count
    Comparison {
        /// Operator, trimmed
        operator: String,
        /// Number of operands
        arity: usize,
    },
    /// Logical connective with its operand count
    Logical {
        /// Operator, trimmed
        operator: String,
        /// Number of operands
        arity: usize,
    },
    /// Literal: anything that is not an operator array
    Constant,
    /// Operator array with an unknown operator
    Other(String),
}

impl Clause {
    /// Decode `node`
    #[must_use]
    pub fn decode(node: &Value) -> Self {
        let Some(items) = node.as_array() else {
            return Clause::Constant;
        };
        let Some(operator) = items.first().and_then(Value::as_str).map(str::trim) else {
            return Clause::Constant;
        };
        let arity = items.len() - 1;
        match operator {
            "field" => Clause::FieldRef(match items.get(1) {
                Some(Value::String(name)) => FieldTarget::Name(name.clone()),
                Some(id) => ColumnId::from_json(id).map_or(FieldTarget::Unknown, FieldTarget::Id),
                None => FieldTarget::Unknown,
            }),
            "aggregation" => match items.get(1).and_then(Value::as_u64) {
                Some(index) => Clause::AggregationRef(index),
                None => Clause::Other(operator.to_string()),
            },
            op if COMPARISON_OPERATORS.contains(&op) => Clause::Comparison {
                operator: op.to_string(),
                arity,
            },
            op if LOGICAL_OPERATORS.contains(&op) => Clause::Logical {
                operator: op.to_string(),
                arity,
            },
            op => Clause::Other(op.to_string()),
        }
    }

    /// Is this a field reference?
    #[inline]
    #[must_use]
    pub fn is_field_ref(&self) -> bool {
        matches!(self, Clause::FieldRef(_))
    }
}

/// Decoded `source-table` of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTable {
    /// Table by id
    Table(TableId),
    /// Another card, as `"card__<id>"`
    Card(CardId),
    /// Anything else (rendered as JSON)
    Unknown(String),
}

impl SourceTable {
    /// Decode a `source-table` value
    #[must_use]
    pub fn decode(value: &Value) -> Self {
        if let Some(table) = TableId::from_json(value) {
            return SourceTable::Table(table);
        }
        value
            .as_str()
            .and_then(|s| s.strip_prefix(CARD_PREFIX))
            .and_then(|id| id.parse::<CardId>().ok())
            .map_or_else(|| SourceTable::Unknown(value.to_string()), SourceTable::Card)
    }

    /// Encode back to JSON
    #[must_use]
    pub fn encode(&self) -> Value {
        match self {
            SourceTable::Table(table) => Value::from(*table),
            SourceTable::Card(card) => Value::String(format!("{CARD_PREFIX}{card}")),
            SourceTable::Unknown(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_field_refs() {
        assert_eq!(
            Clause::decode(&json!(["field", 12, null])),
            Clause::FieldRef(FieldTarget::Id(ColumnId(12)))
        );
        assert_eq!(
            Clause::decode(&json!(["field", "TOTAL", {"base-type": "type/Float"}])),
            Clause::FieldRef(FieldTarget::Name("TOTAL".to_string()))
        );
        assert_eq!(Clause::decode(&json!(["field"])), Clause::FieldRef(FieldTarget::Unknown));
    }

    #[test]
    fn decodes_operators() {
        assert_eq!(
            Clause::decode(&json!([" = ", ["field", 1, null], 3])),
            Clause::Comparison {
                operator: "=".to_string(),
                arity: 2
            }
        );
        assert_eq!(
            Clause::decode(&json!(["or", 1, 2, 3])),
            Clause::Logical {
                operator: "or".to_string(),
                arity: 3
            }
        );
        assert_eq!(Clause::decode(&json!(["between", 1, 2, 3])), Clause::Other("between".to_string()));
        assert_eq!(Clause::decode(&json!(["aggregation", 0])), Clause::AggregationRef(0));
    }

    #[test]
    fn decodes_constants() {
        assert_eq!(Clause::decode(&json!(3)), Clause::Constant);
        assert_eq!(Clause::decode(&json!("CA")), Clause::Constant);
        assert_eq!(Clause::decode(&json!([1, 2])), Clause::Constant);
    }

    #[test]
    fn source_tables() {
        assert_eq!(SourceTable::decode(&json!(10)), SourceTable::Table(TableId(10)));
        assert_eq!(SourceTable::decode(&json!("card__12")), SourceTable::Card(CardId(12)));
        assert_eq!(
            SourceTable::decode(&json!("cards__12")),
            SourceTable::Unknown("\"cards__12\"".to_string())
        );
        assert_eq!(SourceTable::Card(CardId(112)).encode(), json!("card__112"));
        assert_eq!(SourceTable::decode(&json!(-1)).encode(), json!(-1));
    }
}
