//! Incremental SELECT builder

use super::{SqlParams, SqlValue, Statement};

/// Builds a single SELECT statement clause by clause
///
/// Fragments passed to `column`, `join`, `filter`, `group_by` and `order_by`
/// must be fixed SQL text. Request values go through `bind`, `between`,
/// `having_between` and `paginate`, which allocate placeholders.
#[derive(Debug, Default)]
pub struct SelectBuilder {
    ctes: Vec<String>,
    columns: Vec<String>,
    from: String,
    joins: Vec<String>,
    conditions: Vec<String>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    limit: Option<String>,
    offset: Option<String>,
    params: SqlParams,
}

impl SelectBuilder {
    pub fn new(from: &str) -> Self {
        Self {
            from: from.to_string(),
            ..Default::default()
        }
    }

    /// Add a `WITH name AS (body)` common table expression
    pub fn with_cte(mut self, name: &str, body: &str) -> Self {
        self.ctes.push(format!("{} AS (\n{}\n)", name, body));
        self
    }

    pub fn column(mut self, expr: &str) -> Self {
        self.columns.push(expr.to_string());
        self
    }

    /// Add a full join clause, e.g. `LEFT JOIN t ON ...`
    pub fn join(mut self, clause: &str) -> Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Bind a value and return its placeholder for use in a custom fragment
    pub fn bind(&mut self, value: impl Into<SqlValue>) -> String {
        self.params.push(value)
    }

    /// Add a WHERE condition (ANDed with the others)
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Add `expr BETWEEN $a AND $b`
    pub fn between(
        mut self,
        expr: &str,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> Self {
        let low = self.params.push(low);
        let high = self.params.push(high);
        self.conditions
            .push(format!("{} BETWEEN {} AND {}", expr, low, high));
        self
    }

    /// Add `(a OR b OR ...)`; an empty list adds nothing
    pub fn any_of(mut self, conditions: &[&str]) -> Self {
        if !conditions.is_empty() {
            self.conditions
                .push(format!("({})", conditions.join(" OR ")));
        }
        self
    }

    pub fn group_by(mut self, expr: &str) -> Self {
        self.group_by.push(expr.to_string());
        self
    }

    /// Add `HAVING expr BETWEEN $a AND $b`
    pub fn having_between(
        mut self,
        expr: &str,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> Self {
        let low = self.params.push(low);
        let high = self.params.push(high);
        self.having
            .push(format!("{} BETWEEN {} AND {}", expr, low, high));
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by.push(expr.to_string());
        self
    }

    /// Bound `LIMIT`
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(self.params.push(limit));
        self
    }

    /// Bound `LIMIT` and `OFFSET`
    pub fn paginate(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(self.params.push(limit));
        self.offset = Some(self.params.push(offset));
        self
    }

    pub fn build(self) -> Statement {
        let mut sql = String::new();

        if !self.ctes.is_empty() {
            sql.push_str("WITH ");
            sql.push_str(&self.ctes.join(",\n"));
            sql.push('\n');
        }

        sql.push_str("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str("\nFROM ");
        sql.push_str(&self.from);

        for join in &self.joins {
            sql.push('\n');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&self.conditions.join("\n  AND "));
        }
        if !self.group_by.is_empty() {
            sql.push_str("\nGROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.having.is_empty() {
            sql.push_str("\nHAVING ");
            sql.push_str(&self.having.join(" AND "));
        }
        if !self.order_by.is_empty() {
            sql.push_str("\nORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = &self.limit {
            sql.push_str("\nLIMIT ");
            sql.push_str(limit);
        }
        if let Some(offset) = &self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(offset);
        }

        Statement::with_params(sql, self.params)
    }
}
