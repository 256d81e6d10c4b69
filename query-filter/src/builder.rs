use crate::compiler::compile;
use crate::error::FilterError;
use crate::filter::FilterDescriptor;
use crate::model::Model;
use crate::predicate::{ColumnRef, Predicate};
use crate::value::SqlValue;
use serde_json::Value;

/// Rows of one table, optionally pre-restricted by the caller (for example to
/// a single author's books) before client filters are applied.
#[derive(Debug, Clone)]
pub struct QuerySet {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub predicates: Vec<Predicate>,
}

impl QuerySet {
    /// Every row of `model`, selecting all of its columns.
    pub fn all(model: &dyn Model) -> Self {
        Self {
            table: model.table(),
            columns: model.columns(),
            predicates: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    /// Conjunction of the base set's and the client's predicates, if any.
    pub predicate: Option<Predicate>,
    /// Ascending sort keys, always the full primary key.
    pub order_by: Vec<ColumnRef>,
}

impl CompiledQuery {
    /// Renders a `SELECT` with `?` placeholders and the values to bind, in order.
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let columns = self
            .columns
            .iter()
            .map(|c| ColumnRef::new(0, c).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM {} AS t0", columns, self.table);
        let mut binds = Vec::new();

        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            predicate.write_sql(&mut sql, &mut binds);
        }

        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|c| format!("{} ASC", c))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        (sql, binds)
    }
}

/// Applies raw client filters to `base`. `None` and an empty list both yield
/// the unfiltered set. The first bad filter aborts the whole search.
pub fn search(
    base: QuerySet,
    model: &dyn Model,
    filters: Option<&[Value]>,
) -> Result<CompiledQuery, FilterError> {
    let descriptors = match filters {
        Some(raw) => FilterDescriptor::parse_all(model, raw).inspect_err(|e| {
            tracing::debug!(table = model.table(), cause = e.cause(), "rejected filter: {}", e)
        })?,
        None => Vec::new(),
    };
    search_descriptors(base, model, &descriptors)
}

/// Like [`search`], for filters that were already parsed.
pub fn search_descriptors(
    base: QuerySet,
    model: &dyn Model,
    descriptors: &[FilterDescriptor],
) -> Result<CompiledQuery, FilterError> {
    let mut predicates = base.predicates;
    for descriptor in descriptors {
        let predicate = compile(model, descriptor).inspect_err(|e| {
            tracing::debug!(
                table = model.table(),
                field = %descriptor.field_name,
                op = %descriptor.operator,
                cause = e.cause(),
                "rejected filter: {}",
                e
            )
        })?;
        predicates.push(predicate);
    }

    let order_by = model
        .primary_key_fields()?
        .into_iter()
        .map(|column| ColumnRef::new(0, column))
        .collect();

    let query = CompiledQuery {
        table: base.table,
        columns: base.columns,
        predicate: if predicates.is_empty() {
            None
        } else {
            Some(Predicate::and(predicates))
        },
        order_by,
    };

    tracing::debug!(
        table = query.table,
        filters = descriptors.len(),
        sql = %query.to_sql().0,
        "compiled search query"
    );
    Ok(query)
}
