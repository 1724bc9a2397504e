//! Entity and association metadata.
//!
//! The compiler never inspects a live database; everything it knows about
//! the relational shape comes through the [`SchemaProvider`] trait. The
//! in-memory [`Schema`] registry is the default provider, populated either
//! programmatically via the [`Entity`] builder or from a declarative file
//! via [`crate::schema_loader`].

use nestql_core::utils::text::{pluralize, underscore};
use nestql_core::{NestqlError, NestqlResult};

use crate::scope::Scope;

/// A named column on an entity's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
}

impl Column {
    /// Creates a column with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The relational kind of an association.
///
/// A closed set: resolution classifies once, and every downstream choice
/// (which correlated-scope builder, row vs array JSON shape) is keyed off
/// this enum rather than repeated metadata inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// To-one where the *parent* holds the foreign key.
    BelongsTo,
    /// To-one where the *child* holds the foreign key.
    HasOne,
    /// To-many via a foreign key on the child table.
    HasMany,
    /// To-many mediated by a join table holding two foreign keys.
    HasAndBelongsToMany,
}

impl AssociationKind {
    /// Whether this kind embeds as a JSON array (vs a single object).
    pub const fn is_to_many(self) -> bool {
        matches!(self, Self::HasMany | Self::HasAndBelongsToMany)
    }

    /// Classifies a kind string from a schema definition.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "belongs_to" => Some(Self::BelongsTo),
            "has_one" => Some(Self::HasOne),
            "has_many" => Some(Self::HasMany),
            "has_and_belongs_to_many" => Some(Self::HasAndBelongsToMany),
            _ => None,
        }
    }

    /// Returns the canonical kind string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BelongsTo => "belongs_to",
            Self::HasOne => "has_one",
            Self::HasMany => "has_many",
            Self::HasAndBelongsToMany => "has_and_belongs_to_many",
        }
    }
}

/// Join-table metadata for a many-to-many association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    /// The join table's name.
    pub table: String,
    /// The column referencing the owning entity's primary key.
    pub foreign_key: String,
    /// The column referencing the target entity's primary key.
    pub association_foreign_key: String,
}

/// A declared association between two entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    name: String,
    kind: AssociationKind,
    target: String,
    foreign_key: String,
    join_table: Option<JoinTable>,
}

impl Association {
    /// Creates an association with explicit metadata.
    pub fn new(
        name: impl Into<String>,
        kind: AssociationKind,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            foreign_key: foreign_key.into(),
            join_table: None,
        }
    }

    /// Attaches join-table metadata (many-to-many only).
    #[must_use]
    pub fn with_join_table(mut self, join_table: JoinTable) -> Self {
        self.join_table = Some(join_table);
        self
    }

    /// Returns the association name (the key used in inclusion trees).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the relational kind.
    pub const fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// Returns the target entity name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the correlating foreign-key column.
    ///
    /// For `BelongsTo` this column lives on the owner's table; for
    /// `HasOne`/`HasMany` it lives on the target's table.
    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    /// Returns the join-table metadata, if any.
    pub const fn join_table(&self) -> Option<&JoinTable> {
        self.join_table.as_ref()
    }
}

/// A named relation: table, columns, primary key, and declared associations.
///
/// Built with a chainable API in the same spirit as a model `Meta` block:
///
/// ```
/// use nestql_query::Entity;
///
/// let post = Entity::new("Post")
///     .columns(["id", "title", "author_id"])
///     .belongs_to("author", "Author")
///     .has_many("comments", "Comment");
/// assert_eq!(post.table(), "posts");
/// assert_eq!(post.primary_key(), "id");
/// ```
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    table: String,
    primary_key: String,
    columns: Vec<Column>,
    associations: Vec<Association>,
}

impl Entity {
    /// Creates an entity. The table name defaults to the pluralized,
    /// underscored entity name and the primary key to `id`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = pluralize(&underscore(&name));
        Self {
            name,
            table,
            primary_key: "id".to_string(),
            columns: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Overrides the table name.
    #[must_use]
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Overrides the primary-key column.
    #[must_use]
    pub fn primary_key_column(mut self, pk: impl Into<String>) -> Self {
        self.primary_key = pk.into();
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(Column::new(name));
        self
    }

    /// Appends several columns, preserving order.
    #[must_use]
    pub fn columns<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.columns.extend(names.into_iter().map(Column::new));
        self
    }

    /// Declares a belongs-to association. The foreign key (on this
    /// entity's own table) defaults to `<name>_id`.
    #[must_use]
    pub fn belongs_to(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        let fk = format!("{}_id", underscore(&name));
        self.associations
            .push(Association::new(name, AssociationKind::BelongsTo, target, fk));
        self
    }

    /// Declares a has-one association. The foreign key (on the target's
    /// table) defaults to `<underscored owner>_id`.
    #[must_use]
    pub fn has_one(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let fk = format!("{}_id", underscore(&self.name));
        self.associations
            .push(Association::new(name, AssociationKind::HasOne, target, fk));
        self
    }

    /// Declares a has-many association. The foreign key (on the target's
    /// table) defaults to `<underscored owner>_id`.
    #[must_use]
    pub fn has_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let fk = format!("{}_id", underscore(&self.name));
        self.associations
            .push(Association::new(name, AssociationKind::HasMany, target, fk));
        self
    }

    /// Declares a has-and-belongs-to-many association through the given
    /// join table. Both join-table foreign keys default to the
    /// underscored entity names suffixed with `_id`.
    #[must_use]
    pub fn has_and_belongs_to_many(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        join_table: impl Into<String>,
    ) -> Self {
        let target = target.into();
        let fk = format!("{}_id", underscore(&self.name));
        let association_fk = format!("{}_id", underscore(&target));
        self.associations.push(
            Association::new(
                name,
                AssociationKind::HasAndBelongsToMany,
                target,
                fk.clone(),
            )
            .with_join_table(JoinTable {
                table: join_table.into(),
                foreign_key: fk,
                association_foreign_key: association_fk,
            }),
        );
        self
    }

    /// Appends a fully specified association.
    #[must_use]
    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Returns the entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the database table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the primary-key column name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the declared columns in order.
    pub fn column_defs(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the declared associations in order.
    pub fn association_defs(&self) -> &[Association] {
        &self.associations
    }

    /// Looks up an association by name.
    pub fn association_named(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name == name)
    }
}

/// The narrow seam between the compiler and whatever owns the relational
/// metadata. [`Schema`] is the in-memory implementation; an adapter over a
/// live connection's reflection data would implement the same trait.
pub trait SchemaProvider {
    /// Looks up an entity by name.
    fn entity(&self, name: &str) -> NestqlResult<&Entity>;

    /// Returns the entity's columns in declaration order.
    fn columns<'s>(&'s self, entity: &'s Entity) -> &'s [Column] {
        entity.column_defs()
    }

    /// Returns the entity's declared associations in declaration order.
    fn associations<'s>(&'s self, entity: &'s Entity) -> &'s [Association] {
        entity.association_defs()
    }

    /// Resolves a named association on an entity.
    fn association<'s>(&'s self, entity: &'s Entity, name: &str) -> NestqlResult<&'s Association> {
        entity
            .association_named(name)
            .ok_or_else(|| NestqlError::unknown_association(entity.name(), name))
    }

    /// Returns the entity's primary-key column name.
    fn primary_key<'s>(&'s self, entity: &'s Entity) -> &'s str {
        entity.primary_key()
    }

    /// Quotes an identifier for PostgreSQL (embedded quotes doubled).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quotes an entity's table name.
    fn quote_table_name(&self, entity: &Entity) -> String {
        self.quote_identifier(entity.table())
    }
}

/// An in-memory entity registry.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: Vec<Entity>,
}

impl Schema {
    /// Creates an empty schema.
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Registers an entity. A re-registered name replaces the earlier
    /// definition.
    pub fn register(&mut self, entity: Entity) -> &mut Self {
        if let Some(existing) = self
            .entities
            .iter_mut()
            .find(|e| e.name() == entity.name())
        {
            *existing = entity;
        } else {
            self.entities.push(entity);
        }
        self
    }

    /// Returns all registered entities in registration order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Builds a base [`Scope`] over the named entity.
    pub fn scope(&self, entity_name: &str) -> NestqlResult<Scope> {
        let entity = self.entity(entity_name)?;
        Ok(Scope::new(entity.name(), entity.table()))
    }
}

impl SchemaProvider for Schema {
    fn entity(&self, name: &str) -> NestqlResult<&Entity> {
        self.entities
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| NestqlError::UnknownEntity(name.to_string()))
    }
}
