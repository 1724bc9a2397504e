//! The recursive query compiler.
//!
//! [`QueryCompiler`] turns a (base scope, inclusion tree) pair into one
//! SELECT statement whose column list mixes the entity's plain columns
//! with correlated scalar subqueries, one per requested association. Each
//! subquery produces either a single JSON object (`row_to_json`, to-one
//! kinds) or a JSON array (`array_to_json(coalesce(array_agg(...), '{}'))`,
//! to-many kinds, never SQL null), and is itself compiled by recursing into
//! the association's own inclusion subtree.
//!
//! Compilation is a pure function of its inputs: no I/O, no shared state,
//! no execution. The compiler holds only its schema provider and the
//! optional depth guard.

use tracing::{debug, trace};

use nestql_core::{NestqlError, NestqlResult};

use crate::include::{IncludeKey, IncludeNode};
use crate::schema::{Association, AssociationKind, Entity, SchemaProvider};
use crate::scope::{quote_column_expr, Scope};

/// Compiles read specifications against a schema provider.
///
/// The provider and any limits are passed explicitly at construction; the
/// compiler keeps no other state and may be reused across compilations.
///
/// # Examples
///
/// ```
/// use nestql_query::{Entity, IncludeNode, QueryCompiler, Schema};
///
/// let mut schema = Schema::new();
/// schema.register(Entity::new("Post").columns(["id", "title"]));
///
/// let compiler = QueryCompiler::new(&schema);
/// let sql = compiler
///     .compile_sql(&schema.scope("Post").unwrap(), &IncludeNode::new())
///     .unwrap();
/// assert_eq!(sql, "SELECT \"posts\".\"id\", \"posts\".\"title\" FROM \"posts\"");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a, P: SchemaProvider + ?Sized> {
    provider: &'a P,
    max_depth: Option<usize>,
}

impl<'a, P: SchemaProvider + ?Sized> QueryCompiler<'a, P> {
    /// Creates a compiler over the given schema provider. Recursion is
    /// unguarded by default; see [`Self::with_max_depth`] for callers
    /// that accept untrusted inclusion trees.
    pub const fn new(provider: &'a P) -> Self {
        Self {
            provider,
            max_depth: None,
        }
    }

    /// Opts into a recursion depth limit. The root node is depth 0; a
    /// tree deeper than `depth` fails with
    /// [`NestqlError::DepthLimitExceeded`].
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Compiles `(scope, node)` into a new scope whose projection embeds
    /// the requested associations.
    ///
    /// The returned scope keeps the base scope's filters, ordering, and
    /// limits, so callers may compose further before rendering.
    pub fn compile(&self, scope: &Scope, node: &IncludeNode) -> NestqlResult<Scope> {
        let span = nestql_core::logging::compile_span(scope.entity());
        let _guard = span.enter();
        self.compile_at(scope, node, 0)
    }

    /// Compiles and renders in one step.
    pub fn compile_sql(&self, scope: &Scope, node: &IncludeNode) -> NestqlResult<String> {
        Ok(self.compile(scope, node)?.render())
    }

    fn compile_at(&self, scope: &Scope, node: &IncludeNode, depth: usize) -> NestqlResult<Scope> {
        if let Some(max) = self.max_depth {
            if depth > max {
                return Err(NestqlError::DepthLimitExceeded(max));
            }
        }

        let mut columns = self.base_columns(scope, node)?;
        debug!(
            entity = scope.entity(),
            depth,
            associations = node.children().len(),
            "compiling read query"
        );

        for (key, child_node) in node.children() {
            let (child_scope, alias, to_many) = match key {
                IncludeKey::Raw(raw) => (raw.scope().clone(), raw.alias(), true),
                IncludeKey::Association(name) => {
                    let entity = self.provider.entity(scope.entity())?;
                    let association = self.provider.association(entity, name)?;
                    let child = self.correlated_scope(scope, entity, association)?;
                    (child, name.clone(), association.kind().is_to_many())
                }
            };
            trace!(alias = alias.as_str(), to_many, "embedding association");

            let inner = self.compile_at(&child_scope, child_node, depth + 1)?.render();
            let subquery = if to_many {
                array_subquery(&inner)
            } else {
                row_subquery(&inner)
            };
            columns.push(format!(
                "({subquery}) AS {}",
                self.provider.quote_identifier(&alias)
            ));
        }

        Ok(scope.clone().select(columns.join(", ")))
    }

    /// Determines the plain-column part of the projection: the node's
    /// explicit columns if present, else the scope's own projection (set
    /// only on raw relations), else every column of the entity, fully
    /// qualified and quoted. Only the last path consults the schema, so
    /// a raw relation with a baked-in projection compiles even when its
    /// entity is not registered.
    fn base_columns(&self, scope: &Scope, node: &IncludeNode) -> NestqlResult<Vec<String>> {
        if let Some(explicit) = node.column_list() {
            return Ok(explicit.iter().map(|c| quote_column_expr(c)).collect());
        }
        if let Some(projection) = scope.select_clause() {
            return Ok(vec![projection.to_string()]);
        }
        let entity = self.provider.entity(scope.entity())?;
        let table = self.provider.quote_table_name(entity);
        Ok(self
            .provider
            .columns(entity)
            .iter()
            .map(|c| format!("{table}.{}", self.provider.quote_identifier(c.name())))
            .collect())
    }

    /// Builds the child scope for an association, filtered so it fetches
    /// only rows related to the parent. Correlation predicates reference
    /// the parent table by name, which is what makes the subquery
    /// re-evaluate per outer row.
    fn correlated_scope(
        &self,
        parent: &Scope,
        parent_entity: &Entity,
        association: &Association,
    ) -> NestqlResult<Scope> {
        let target = self.provider.entity(association.target())?;
        let child = Scope::new(target.name(), target.table());

        let parent_table = self.provider.quote_identifier(parent.table());
        let child_table = self.provider.quote_table_name(target);
        let q = |name: &str| self.provider.quote_identifier(name);

        let child = match association.kind() {
            AssociationKind::BelongsTo => child.filter(format!(
                "{child_table}.{} = {parent_table}.{}",
                q(self.provider.primary_key(target)),
                q(association.foreign_key())
            )),
            AssociationKind::HasOne | AssociationKind::HasMany => child.filter(format!(
                "{child_table}.{} = {parent_table}.{}",
                q(association.foreign_key()),
                q(self.provider.primary_key(parent_entity))
            )),
            AssociationKind::HasAndBelongsToMany => {
                let join = association.join_table().ok_or_else(|| {
                    NestqlError::MissingJoinTable {
                        entity: parent_entity.name().to_string(),
                        name: association.name().to_string(),
                    }
                })?;
                let join_table = q(&join.table);
                child
                    .join(format!(
                        "INNER JOIN {join_table} ON {child_table}.{} = {join_table}.{}",
                        q(self.provider.primary_key(target)),
                        q(&join.association_foreign_key)
                    ))
                    .filter(format!(
                        "{join_table}.{} = {parent_table}.{}",
                        q(&join.foreign_key),
                        q(self.provider.primary_key(parent_entity))
                    ))
            }
        };
        Ok(child)
    }
}

/// Wraps a compiled child query as a scalar subquery returning at most one
/// JSON object. No LIMIT is imposed; a non-unique correlation surfaces as
/// the database's scalar-subquery cardinality error at execution time.
fn row_subquery(inner: &str) -> String {
    format!("SELECT row_to_json(t) FROM ({inner}) t")
}

/// Wraps a compiled child query as a scalar subquery returning a JSON
/// array of objects; zero matching rows yield `[]`, never SQL null.
fn array_subquery(inner: &str) -> String {
    format!("SELECT array_to_json(coalesce(array_agg(row_to_json(t)), '{{}}')) FROM ({inner}) t")
}
