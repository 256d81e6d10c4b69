//! Translates client-supplied JSON filter lists into ordered, parameterised
//! queries.
//!
//! A search is a flat conjunction of filters such as
//! `{"name": "price", "op": "ge", "val": 20000}`. Each filter is checked
//! against a [`Model`], bound to an operator from the shared [`registry`],
//! and the resulting predicates are AND-ed together. Results are always
//! ordered by the model's primary key so repeated searches return rows in
//! the same order.

mod builder;
mod compiler;
mod error;
mod filter;
mod model;
mod predicate;
mod registry;
mod value;

pub use builder::{search, search_descriptors, CompiledQuery, QuerySet};
pub use compiler::{compile, MAX_IN_VALUES, MAX_NESTING_DEPTH};
pub use error::{ErrorClass, FilterError};
pub use filter::FilterDescriptor;
pub use model::{Cardinality, Field, FieldKind, FieldType, Model, Relation, Schema};
pub use predicate::{like_pattern_to_regex, ColumnRef, CompareOp, Predicate};
pub use registry::{registry, Arity, Operator, OperatorDefinition, OperatorRegistry};
pub use value::{convert_value, parse_timestamp, SqlValue, TIMESTAMP_FORMAT};
