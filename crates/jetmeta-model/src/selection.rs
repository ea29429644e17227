//! Row selection predicates.
//!
//! The original workflow passed an opaque cut-expression string down to the
//! tree reader. Here the predicate is an explicit comparison against one
//! scalar field so that every reader applies exactly the same semantics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator for a [`Selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A row filter of the form `field <op> value`, applied to a scalar field.
///
/// Rows where the field value is non-finite never pass the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Scalar field the predicate reads.
    pub field: String,
    /// Comparison operator.
    pub op: CmpOp,
    /// Right-hand-side constant.
    pub value: f64,
}

impl Selection {
    /// Evaluates the predicate against one row's field value.
    pub fn matches(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self.op {
            CmpOp::Eq => value == self.value,
            CmpOp::Ne => value != self.value,
            CmpOp::Lt => value < self.value,
            CmpOp::Le => value <= self.value,
            CmpOp::Gt => value > self.value,
            CmpOp::Ge => value >= self.value,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.as_str(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_basic_comparisons() {
        let sel = Selection {
            field: "fj_pt".to_string(),
            op: CmpOp::Ge,
            value: 200.0,
        };
        assert!(sel.matches(200.0));
        assert!(sel.matches(350.5));
        assert!(!sel.matches(199.9));
    }

    #[test]
    fn non_finite_never_passes() {
        let sel = Selection {
            field: "fj_pt".to_string(),
            op: CmpOp::Ne,
            value: 0.0,
        };
        assert!(!sel.matches(f64::NAN));
        assert!(!sel.matches(f64::INFINITY));
    }

    #[test]
    fn serializes_with_snake_case_op() {
        let sel = Selection {
            field: "fj_pt".to_string(),
            op: CmpOp::Gt,
            value: 1.0,
        };
        let json = serde_json::to_string(&sel).expect("serialize selection");
        assert!(json.contains("\"gt\""));
    }
}
