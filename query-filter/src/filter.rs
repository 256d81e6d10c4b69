use crate::error::FilterError;
use crate::model::Model;
use crate::value::json_kind;
use serde_json::Value;

/// One client-supplied filter clause, checked against the model's fields.
///
/// Built from objects shaped like `{"name": "price", "op": "ge", "val": 20000}`.
/// The optional `"field"` key names a second field to compare against
/// instead of `"val"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    pub field_name: String,
    pub operator: String,
    pub argument: Option<Value>,
    pub other_field: Option<String>,
}

impl FilterDescriptor {
    pub fn new(field_name: &str, operator: &str, argument: Option<Value>) -> Self {
        Self {
            field_name: field_name.to_string(),
            operator: operator.to_string(),
            argument,
            other_field: None,
        }
    }

    pub fn with_other_field(mut self, other_field: &str) -> Self {
        self.other_field = Some(other_field.to_string());
        self
    }

    /// Parses a raw filter object. Only the field name is validated here;
    /// the operator and argument are checked during compilation.
    pub fn parse(model: &dyn Model, raw: &Value) -> Result<Self, FilterError> {
        let object = raw.as_object().ok_or_else(|| {
            FilterError::MalformedFilter(format!("expected an object, got {}", json_kind(raw)))
        })?;

        let field_name = match object.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(FilterError::MalformedFilter(format!(
                    "\"name\" must be a string, got {}",
                    json_kind(other)
                )))
            }
            None => {
                return Err(FilterError::MalformedFilter(
                    "missing \"name\"".to_string(),
                ))
            }
        };
        if !model.has_field(&field_name) {
            return Err(FilterError::UnknownField(field_name));
        }

        let operator = match object.get("op") {
            Some(Value::String(op)) => op.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => {
                return Err(FilterError::MalformedFilter(format!(
                    "\"op\" must be a string, got {}",
                    json_kind(other)
                )))
            }
        };

        let other_field = match object.get("field") {
            Some(Value::String(field)) => Some(field.clone()),
            None | Some(Value::Null) => None,
            Some(other) => {
                return Err(FilterError::MalformedFilter(format!(
                    "\"field\" must be a string, got {}",
                    json_kind(other)
                )))
            }
        };

        // An explicit JSON null is the same as leaving the argument out.
        let argument = object.get("val").filter(|v| !v.is_null()).cloned();

        Ok(Self {
            field_name,
            operator,
            argument,
            other_field,
        })
    }

    /// Parses every element of a raw filter list, stopping at the first error.
    pub fn parse_all(model: &dyn Model, raw: &[Value]) -> Result<Vec<Self>, FilterError> {
        raw.iter().map(|f| Self::parse(model, f)).collect()
    }
}
