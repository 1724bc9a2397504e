//! Composable SELECT scopes.
//!
//! A [`Scope`] is an immutable-from-the-caller's-perspective description of
//! a SQL SELECT over a known entity: projection, filters, joins, ordering,
//! and limits. Chainable methods consume `self` and return the modified
//! scope; [`Scope::render`] produces the final PostgreSQL text.
//!
//! The compiler builds correlated child scopes whose filters reference the
//! parent table *by name* (never a bound value) — that column reference is
//! what makes the subquery re-evaluate per outer row.

use crate::value::Value;

/// A column ordering direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The column to order by.
    pub column: String,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl OrderBy {
    /// Creates an ascending order.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creates a descending order.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// A composable representation of a SQL SELECT with a known target entity.
///
/// # Examples
///
/// ```
/// use nestql_query::{Scope, Value};
///
/// let scope = Scope::new("Post", "posts")
///     .filter_eq("published", Value::from(true))
///     .limit(10);
/// assert_eq!(
///     scope.render(),
///     "SELECT * FROM \"posts\" WHERE \"posts\".\"published\" = TRUE LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Scope {
    entity: String,
    table: String,
    select: Option<String>,
    filters: Vec<String>,
    joins: Vec<String>,
    order_by: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Scope {
    /// Creates a scope over the given entity and table.
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            select: None,
            filters: Vec::new(),
            joins: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Returns the entity name this scope selects from.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the table name this scope selects from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the explicit projection, if one has been set.
    pub fn select_clause(&self) -> Option<&str> {
        self.select.as_deref()
    }

    /// Replaces the projection with the given column-list text.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Appends a raw predicate. Predicates are ANDed together.
    #[must_use]
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    /// Appends an equality predicate against an inlined literal.
    ///
    /// The column is qualified with this scope's table; the value is
    /// rendered via [`Value::to_sql_literal`] (NULL becomes `IS NULL`).
    #[must_use]
    pub fn filter_eq(self, column: &str, value: Value) -> Self {
        let lhs = format!(
            "{}.{}",
            quote_identifier(&self.table),
            quote_identifier(column)
        );
        let predicate = if value.is_null() {
            format!("{lhs} IS NULL")
        } else {
            format!("{lhs} = {}", value.to_sql_literal())
        };
        self.filter(predicate)
    }

    /// Appends a raw join clause (e.g. `INNER JOIN "t" ON ...`).
    #[must_use]
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Appends an ordering.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Renders this scope as a SQL SELECT statement.
    pub fn render(&self) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(self.select.as_deref().unwrap_or("*"));
        sql.push_str(" FROM ");
        sql.push_str(&quote_identifier(&self.table));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let orders: Vec<String> = self
                .order_by
                .iter()
                .map(|o| {
                    let dir = if o.descending { " DESC" } else { " ASC" };
                    format!("{}{dir}", quote_column_expr(&o.column))
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }
}

/// Quotes an identifier for PostgreSQL, doubling embedded quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a caller-supplied column expression.
///
/// Bare identifiers are quoted; anything already quoted, qualified, or
/// containing a function call passes through verbatim.
pub(crate) fn quote_column_expr(column: &str) -> String {
    if column.contains('"') || column.contains('.') || column.contains('(') {
        column.to_string()
    } else {
        quote_identifier(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Rendering ────────────────────────────────────────────────────

    #[test]
    fn test_render_bare() {
        assert_eq!(Scope::new("Post", "posts").render(), "SELECT * FROM \"posts\"");
    }

    #[test]
    fn test_render_with_select() {
        let scope = Scope::new("Post", "posts").select("\"posts\".\"id\", \"posts\".\"title\"");
        assert_eq!(
            scope.render(),
            "SELECT \"posts\".\"id\", \"posts\".\"title\" FROM \"posts\""
        );
    }

    #[test]
    fn test_render_filters_anded() {
        let scope = Scope::new("Post", "posts")
            .filter("\"posts\".\"published\" = TRUE")
            .filter("\"posts\".\"author_id\" = 3");
        assert_eq!(
            scope.render(),
            "SELECT * FROM \"posts\" WHERE \"posts\".\"published\" = TRUE AND \"posts\".\"author_id\" = 3"
        );
    }

    #[test]
    fn test_filter_eq_inlines_literal() {
        let scope = Scope::new("Post", "posts").filter_eq("title", Value::from("O'Brien"));
        assert_eq!(
            scope.render(),
            "SELECT * FROM \"posts\" WHERE \"posts\".\"title\" = 'O''Brien'"
        );
    }

    #[test]
    fn test_filter_eq_null() {
        let scope = Scope::new("Post", "posts").filter_eq("deleted_at", Value::Null);
        assert_eq!(
            scope.render(),
            "SELECT * FROM \"posts\" WHERE \"posts\".\"deleted_at\" IS NULL"
        );
    }

    #[test]
    fn test_render_join_before_where() {
        let scope = Scope::new("Tag", "tags")
            .join("INNER JOIN \"posts_tags\" ON \"tags\".\"id\" = \"posts_tags\".\"tag_id\"")
            .filter("\"posts_tags\".\"post_id\" = \"posts\".\"id\"");
        assert_eq!(
            scope.render(),
            "SELECT * FROM \"tags\" INNER JOIN \"posts_tags\" ON \"tags\".\"id\" = \"posts_tags\".\"tag_id\" WHERE \"posts_tags\".\"post_id\" = \"posts\".\"id\""
        );
    }

    #[test]
    fn test_render_order_limit_offset() {
        let scope = Scope::new("Post", "posts")
            .order_by(OrderBy::desc("created_at"))
            .order_by(OrderBy::asc("id"))
            .limit(10)
            .offset(20);
        assert_eq!(
            scope.render(),
            "SELECT * FROM \"posts\" ORDER BY \"created_at\" DESC, \"id\" ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_render_qualified_order_passthrough() {
        let scope = Scope::new("Post", "posts").order_by(OrderBy::asc("\"posts\".\"id\""));
        assert_eq!(
            scope.render(),
            "SELECT * FROM \"posts\" ORDER BY \"posts\".\"id\" ASC"
        );
    }

    #[test]
    fn test_select_replaces_projection() {
        let scope = Scope::new("Post", "posts").select("\"id\"").select("\"title\"");
        assert_eq!(scope.render(), "SELECT \"title\" FROM \"posts\"");
    }

    // ── Quoting helpers ──────────────────────────────────────────────

    #[test]
    fn test_quote_identifier_doubles_quotes() {
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_quote_column_expr() {
        assert_eq!(quote_column_expr("body"), "\"body\"");
        assert_eq!(quote_column_expr("\"body\""), "\"body\"");
        assert_eq!(quote_column_expr("posts.id"), "posts.id");
        assert_eq!(quote_column_expr("lower(title)"), "lower(title)");
    }
}
