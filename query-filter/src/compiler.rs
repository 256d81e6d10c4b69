use crate::error::FilterError;
use crate::filter::FilterDescriptor;
use crate::model::{Cardinality, Field, FieldType, Model};
use crate::predicate::{ColumnRef, Predicate};
use crate::registry::{registry, Arity, Operator, OperatorDefinition};
use crate::value::{convert_value, json_kind};
use serde_json::Value;

/// Deepest `has`/`any` nesting accepted in a single filter.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Largest sequence accepted by `in`/`not_in`. Every element becomes a bind
/// parameter.
pub const MAX_IN_VALUES: usize = 1000;

/// Binds the descriptor's operator to its field and argument. Nothing is
/// executed; the returned predicate is rendered by the query builder.
pub fn compile(model: &dyn Model, descriptor: &FilterDescriptor) -> Result<Predicate, FilterError> {
    compile_in_scope(model, descriptor, 0)
}

fn compile_in_scope(
    model: &dyn Model,
    descriptor: &FilterDescriptor,
    scope: usize,
) -> Result<Predicate, FilterError> {
    let definition = registry().lookup(&descriptor.operator)?;

    // `parse` already checked the name, so a miss here means the model changed
    // underneath us.
    let field = model.field(&descriptor.field_name).ok_or_else(|| {
        FilterError::Internal(format!(
            "field \"{}\" is not defined on {}",
            descriptor.field_name,
            model.table()
        ))
    })?;

    match definition.arity {
        Arity::Unary => {
            if descriptor.argument.is_some() || descriptor.other_field.is_some() {
                return Err(FilterError::UnexpectedArgument(definition.name.to_string()));
            }
            let (column, _) = column_of(field, definition, scope)?;
            Ok(match definition.operator {
                Operator::IsNull => Predicate::IsNull(column),
                _ => Predicate::IsNotNull(column),
            })
        }
        Arity::Binary => {
            if let Some(other_field) = &descriptor.other_field {
                return compare_fields(model, field, definition, descriptor, other_field, scope);
            }
            let argument = descriptor
                .argument
                .as_ref()
                .ok_or(FilterError::ComparisonToNull)?;
            apply_binary(field, definition, argument, scope)
        }
        Arity::Ternary => {
            if descriptor.other_field.is_some() {
                return Err(FilterError::invalid_argument(
                    field.name,
                    definition.name,
                    "\"field\" cannot be combined with a nested filter",
                ));
            }
            let argument = descriptor
                .argument
                .as_ref()
                .ok_or(FilterError::ComparisonToNull)?;
            apply_ternary(field, definition, argument, &descriptor.field_name, scope)
        }
    }
}

fn column_of(
    field: &Field,
    definition: &OperatorDefinition,
    scope: usize,
) -> Result<(ColumnRef, FieldType), FilterError> {
    field
        .as_column()
        .map(|(column, field_type)| (ColumnRef::new(scope, column), field_type))
        .ok_or_else(|| {
            FilterError::invalid_argument(
                field.name,
                definition.name,
                format!("\"{}\" is a relationship; use has or any", field.name),
            )
        })
}

fn apply_binary(
    field: &Field,
    definition: &OperatorDefinition,
    argument: &Value,
    scope: usize,
) -> Result<Predicate, FilterError> {
    let (column, field_type) = column_of(field, definition, scope)?;
    let invalid = |reason: String| FilterError::invalid_argument(field.name, definition.name, reason);

    match definition.operator {
        Operator::Compare(op) => Ok(Predicate::Compare {
            column,
            op,
            value: convert_value(argument, field_type).map_err(invalid)?,
        }),
        Operator::Like | Operator::ILike | Operator::NotLike => {
            if field_type != FieldType::Text {
                return Err(invalid("pattern operators apply to text fields only".to_string()));
            }
            let pattern = argument.as_str().ok_or_else(|| {
                invalid(format!("expected a pattern string, got {}", json_kind(argument)))
            })?;
            Ok(Predicate::Like {
                column,
                pattern: pattern.to_string(),
                case_insensitive: definition.operator == Operator::ILike,
                negated: definition.operator == Operator::NotLike,
            })
        }
        Operator::In | Operator::NotIn => {
            let items = argument.as_array().ok_or_else(|| {
                invalid(format!("expected an array, got {}", json_kind(argument)))
            })?;
            if items.len() > MAX_IN_VALUES {
                return Err(invalid(format!(
                    "sequence has {} values, at most {} are allowed",
                    items.len(),
                    MAX_IN_VALUES
                )));
            }
            let values = items
                .iter()
                .map(|item| {
                    if item.is_null() {
                        return Err(invalid(
                            "sequence contains null; use is_null instead".to_string(),
                        ));
                    }
                    convert_value(item, field_type).map_err(&invalid)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::In {
                column,
                values,
                negated: definition.operator == Operator::NotIn,
            })
        }
        _ => Err(FilterError::Internal(format!(
            "operator \"{}\" registered with the wrong arity",
            definition.name
        ))),
    }
}

fn compare_fields(
    model: &dyn Model,
    field: &Field,
    definition: &OperatorDefinition,
    descriptor: &FilterDescriptor,
    other_field: &str,
    scope: usize,
) -> Result<Predicate, FilterError> {
    let Operator::Compare(op) = definition.operator else {
        return Err(FilterError::invalid_argument(
            field.name,
            definition.name,
            "\"field\" is only supported by comparison operators",
        ));
    };
    if descriptor.argument.is_some() {
        return Err(FilterError::invalid_argument(
            field.name,
            definition.name,
            "supply either \"val\" or \"field\", not both",
        ));
    }
    let other = model
        .field(other_field)
        .ok_or_else(|| FilterError::UnknownField(other_field.to_string()))?;
    let (left, _) = column_of(field, definition, scope)?;
    let (right, _) = column_of(other, definition, scope)?;
    Ok(Predicate::CompareColumns { left, op, right })
}

fn apply_ternary(
    field: &Field,
    definition: &OperatorDefinition,
    argument: &Value,
    field_name: &str,
    scope: usize,
) -> Result<Predicate, FilterError> {
    let invalid = |reason: String| FilterError::invalid_argument(field_name, definition.name, reason);

    let relation = field
        .as_relation()
        .ok_or_else(|| invalid(format!("\"{}\" is not a relationship", field_name)))?;
    match (definition.operator, relation.cardinality) {
        (Operator::Has, Cardinality::One) | (Operator::Any, Cardinality::Many) => {}
        (Operator::Has, Cardinality::Many) => {
            return Err(invalid(format!("\"{}\" is a to-many relationship; use any", field_name)))
        }
        (Operator::Any, Cardinality::One) => {
            return Err(invalid(format!("\"{}\" is a to-one relationship; use has", field_name)))
        }
        _ => {
            return Err(FilterError::Internal(format!(
                "operator \"{}\" registered with the wrong arity",
                definition.name
            )))
        }
    }

    if !argument.is_object() {
        return Err(invalid(format!(
            "expected a nested filter object, got {}",
            json_kind(argument)
        )));
    }
    let inner_scope = scope + 1;
    if inner_scope > MAX_NESTING_DEPTH {
        return Err(invalid(format!(
            "filters may be nested at most {} levels deep",
            MAX_NESTING_DEPTH
        )));
    }

    let nested = FilterDescriptor::parse(relation.target, argument)?;
    let condition = compile_in_scope(relation.target, &nested, inner_scope)?;

    Ok(Predicate::Exists {
        table: relation.target.table(),
        scope: inner_scope,
        inner_column: ColumnRef::new(inner_scope, relation.remote_column),
        outer_column: ColumnRef::new(scope, relation.local_column),
        condition: Box::new(condition),
    })
}
