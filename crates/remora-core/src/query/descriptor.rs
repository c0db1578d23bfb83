//! Query descriptor: the compiled form of a declarative query
//!
//! A `QueryDescriptor` is protocol-agnostic; `serialize::to_query_string`
//! turns it into the literal query string for a given flavor.

use remora_core_types::Value;

/// Comparison operator on a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// Protocol operator keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
        }
    }
}

/// Predicate tree node
///
/// Comparison and string-match leaves joined by conjunction/disjunction.
/// Anything a caller cannot express here has no server-side form by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Scalar comparison: `field op value`
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// String containment match
    Contains { field: String, value: String },
    /// String prefix match
    StartsWith { field: String, value: String },
    /// Conjunction of sub-predicates
    And(Vec<Predicate>),
    /// Disjunction of sub-predicates
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Ne,
            value: value.into(),
        }
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Gt,
            value: value.into(),
        }
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Ge,
            value: value.into(),
        }
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Lt,
            value: value.into(),
        }
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Le,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::StartsWith {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// Visit every field name referenced by this predicate tree
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::Contains { field, .. }
            | Predicate::StartsWith { field, .. } => out.push(field),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }
}

/// Sort direction for an ordering key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Protocol keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// One ordering key; later keys in the list act as tie-breakers
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Compiled query state for one collection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDescriptor {
    /// Predicate tree, if any
    pub filter: Option<Predicate>,

    /// Projection field set (empty means all fields)
    pub select: Vec<String>,

    /// Navigation properties to expand inline
    pub expand: Vec<String>,

    /// Ordering key list; later keys are tie-breakers
    pub order_by: Vec<OrderKey>,

    /// Page-size hint (`$top`)
    pub top: Option<u32>,

    /// Client-side skip count - never serialized, applied after
    /// materialization
    pub skip: Option<u32>,
}

impl QueryDescriptor {
    /// True when no operator has been applied
    pub fn is_empty(&self) -> bool {
        self.filter.is_none()
            && self.select.is_empty()
            && self.expand.is_empty()
            && self.order_by.is_empty()
            && self.top.is_none()
            && self.skip.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_fields_walks_the_tree() {
        let p = Predicate::and(vec![
            Predicate::eq("Status", 1i64),
            Predicate::or(vec![
                Predicate::starts_with("Title", "A"),
                Predicate::contains("Title", "draft"),
            ]),
        ]);
        assert_eq!(p.fields(), vec!["Status", "Title", "Title"]);
    }

    #[test]
    fn test_default_descriptor_is_empty() {
        assert!(QueryDescriptor::default().is_empty());

        let q = QueryDescriptor {
            top: Some(5),
            ..Default::default()
        };
        assert!(!q.is_empty());
    }

    #[test]
    fn test_compare_op_keywords() {
        assert_eq!(CompareOp::Eq.as_str(), "eq");
        assert_eq!(CompareOp::Le.as_str(), "le");
    }
}
