//! Operator names accepted in filter objects.
//!
//! The table is built once on first use and never changes afterwards, so
//! lookups can run concurrently from any number of requests.

use crate::error::FilterError;
use crate::predicate::CompareOp;
use std::collections::HashMap;
use std::sync::OnceLock;

static REGISTRY: OnceLock<OperatorRegistry> = OnceLock::new();

/// How many inputs an operator is applied to: the field, then optionally the
/// argument, then optionally the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary = 1,
    Binary = 2,
    Ternary = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    IsNull,
    IsNotNull,
    Compare(CompareOp),
    Like,
    ILike,
    NotLike,
    In,
    NotIn,
    /// Related row (to-one) matches a nested filter.
    Has,
    /// At least one related row (to-many) matches a nested filter.
    Any,
}

impl Operator {
    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull => Arity::Unary,
            Operator::Has | Operator::Any => Arity::Ternary,
            _ => Arity::Binary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDefinition {
    pub name: &'static str,
    pub operator: Operator,
    pub arity: Arity,
}

#[derive(Debug)]
pub struct OperatorRegistry {
    by_name: HashMap<&'static str, OperatorDefinition>,
}

impl OperatorRegistry {
    fn standard() -> Self {
        let mut registry = Self {
            by_name: HashMap::new(),
        };
        registry.register(&["is_null"], Operator::IsNull);
        registry.register(&["is_not_null"], Operator::IsNotNull);
        registry.register(&["==", "eq"], Operator::Compare(CompareOp::Eq));
        registry.register(&["!=", "ne"], Operator::Compare(CompareOp::Ne));
        registry.register(&[">", "gt"], Operator::Compare(CompareOp::Gt));
        registry.register(&["<", "lt"], Operator::Compare(CompareOp::Lt));
        registry.register(&[">=", "ge"], Operator::Compare(CompareOp::Ge));
        registry.register(&["<=", "le"], Operator::Compare(CompareOp::Le));
        registry.register(&["like"], Operator::Like);
        registry.register(&["ilike"], Operator::ILike);
        registry.register(&["not_like"], Operator::NotLike);
        registry.register(&["in"], Operator::In);
        registry.register(&["not_in"], Operator::NotIn);
        registry.register(&["has"], Operator::Has);
        registry.register(&["any"], Operator::Any);
        registry
    }

    fn register(&mut self, names: &[&'static str], operator: Operator) {
        for &name in names {
            self.by_name.insert(
                name,
                OperatorDefinition {
                    name,
                    operator,
                    arity: operator.arity(),
                },
            );
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&OperatorDefinition, FilterError> {
        self.by_name
            .get(name)
            .ok_or_else(|| FilterError::UnknownOperator(name.to_string()))
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Process-wide read-only operator table.
pub fn registry() -> &'static OperatorRegistry {
    REGISTRY.get_or_init(OperatorRegistry::standard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_share_an_operator() {
        let reg = registry();
        assert_eq!(
            reg.lookup("==").unwrap().operator,
            reg.lookup("eq").unwrap().operator
        );
        assert_eq!(
            reg.lookup(">=").unwrap().operator,
            Operator::Compare(CompareOp::Ge)
        );
        assert_eq!(reg.lookup("ge").unwrap().name, "ge");
    }

    #[test]
    fn test_arities() {
        let reg = registry();
        assert_eq!(reg.lookup("is_null").unwrap().arity, Arity::Unary);
        assert_eq!(reg.lookup("is_not_null").unwrap().arity, Arity::Unary);
        for name in ["eq", "ne", "gt", "lt", "ge", "le", "like", "ilike", "not_like", "in", "not_in"] {
            assert_eq!(reg.lookup(name).unwrap().arity, Arity::Binary, "{}", name);
        }
        assert_eq!(reg.lookup("has").unwrap().arity, Arity::Ternary);
        assert_eq!(reg.lookup("any").unwrap().arity, Arity::Ternary);
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            registry().lookup("equals"),
            Err(FilterError::UnknownOperator("equals".to_string()))
        );
        // Names are matched exactly.
        assert!(registry().lookup("EQ").is_err());
    }

    #[test]
    fn test_registry_is_shared() {
        assert!(std::ptr::eq(registry(), registry()));
        assert_eq!(registry().names().len(), 21);
    }
}
