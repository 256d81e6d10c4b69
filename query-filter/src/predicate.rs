use crate::value::SqlValue;

/// A column of the table bound at query level `scope` (rendered as `t{scope}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub scope: usize,
    pub column: &'static str,
}

impl ColumnRef {
    pub fn new(scope: usize, column: &'static str) -> Self {
        Self { scope, column }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}.{}", self.scope, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

/// Unevaluated boolean condition over one or more columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IsNull(ColumnRef),
    IsNotNull(ColumnRef),
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: SqlValue,
    },
    CompareColumns {
        left: ColumnRef,
        op: CompareOp,
        right: ColumnRef,
    },
    Like {
        column: ColumnRef,
        pattern: String,
        case_insensitive: bool,
        negated: bool,
    },
    In {
        column: ColumnRef,
        values: Vec<SqlValue>,
        negated: bool,
    },
    /// Correlated subquery: some row of `table` (aliased at `scope`) joined on
    /// `inner_column = outer_column` satisfies `condition`.
    Exists {
        table: &'static str,
        scope: usize,
        inner_column: ColumnRef,
        outer_column: ColumnRef,
        condition: Box<Predicate>,
    },
    And(Vec<Predicate>),
}

impl Predicate {
    /// Conjoins predicates, flattening nested conjunctions. A single predicate
    /// is returned as is.
    pub fn and(predicates: Vec<Predicate>) -> Predicate {
        let mut flat = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            match predicate {
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Predicate::And(flat)
        }
    }

    /// Appends this predicate's SQL to `sql` and its bind values to `binds`.
    pub fn write_sql(&self, sql: &mut String, binds: &mut Vec<SqlValue>) {
        match self {
            Predicate::IsNull(column) => sql.push_str(&format!("{} IS NULL", column)),
            Predicate::IsNotNull(column) => sql.push_str(&format!("{} IS NOT NULL", column)),
            Predicate::Compare { column, op, value } => {
                sql.push_str(&format!("{} {} ?", column, op.sql()));
                binds.push(value.clone());
            }
            Predicate::CompareColumns { left, op, right } => {
                sql.push_str(&format!("{} {} {}", left, op.sql(), right))
            }
            Predicate::Like {
                column,
                pattern,
                case_insensitive,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                if *case_insensitive {
                    // Needs the REGEXP function registered on the connection.
                    sql.push_str(&format!(
                        "({} IS NOT NULL AND {} {}REGEXP ?)",
                        column, column, not
                    ));
                    binds.push(SqlValue::Text(like_pattern_to_regex(pattern)));
                } else {
                    sql.push_str(&format!("{} {}LIKE ?", column, not));
                    binds.push(SqlValue::Text(pattern.clone()));
                }
            }
            Predicate::In {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    // Nothing is a member of the empty set.
                    sql.push_str(if *negated { "1 = 1" } else { "1 = 0" });
                    return;
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                let not = if *negated { "NOT " } else { "" };
                sql.push_str(&format!("{} {}IN ({})", column, not, placeholders));
                binds.extend(values.iter().cloned());
            }
            Predicate::Exists {
                table,
                scope,
                inner_column,
                outer_column,
                condition,
            } => {
                sql.push_str(&format!(
                    "EXISTS (SELECT 1 FROM {} AS t{} WHERE {} = {} AND ",
                    table, scope, inner_column, outer_column
                ));
                condition.write_sql(sql, binds);
                sql.push(')');
            }
            Predicate::And(predicates) => {
                if predicates.is_empty() {
                    sql.push_str("1 = 1");
                    return;
                }
                for (i, predicate) in predicates.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" AND ");
                    }
                    let grouped = matches!(predicate, Predicate::And(_));
                    if grouped {
                        sql.push('(');
                    }
                    predicate.write_sql(sql, binds);
                    if grouped {
                        sql.push(')');
                    }
                }
            }
        }
    }

    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        self.write_sql(&mut sql, &mut binds);
        (sql, binds)
    }
}

/// Translates a LIKE pattern into an anchored regular expression that folds
/// case for all of Unicode. `%` matches any run of characters, `_` exactly one.
pub fn like_pattern_to_regex(pattern: &str) -> String {
    let mut out = String::from("(?is)^");
    let mut literal = String::new();
    for ch in pattern.chars() {
        let wildcard = match ch {
            '%' => ".*",
            '_' => ".",
            _ => {
                literal.push(ch);
                continue;
            }
        };
        out.push_str(&regex::escape(&literal));
        literal.clear();
        out.push_str(wildcard);
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}
