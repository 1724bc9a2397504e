//! Schema loading from declarative definition files.
//!
//! A schema can be described in TOML or JSON and deserialized into the
//! in-memory [`Schema`] registry. Defaults follow the usual relational
//! conventions: table names are pluralized/underscored entity names,
//! primary keys are `id`, foreign keys are `<name>_id`, and join tables
//! are the two underscored table names joined in lexical order.
//!
//! ## Example definition (TOML)
//!
//! ```toml
//! [[entities]]
//! name = "Post"
//! columns = ["id", "title", "author_id"]
//!
//! [[entities.associations]]
//! name = "author"
//! kind = "belongs_to"
//! target = "Author"
//!
//! [[entities]]
//! name = "Author"
//! columns = ["id", "name"]
//! ```
//!
//! An association `kind` outside the supported set fails with
//! [`NestqlError::UnsupportedAssociationKind`] at load time, not at
//! compile time.

use std::path::Path;

use serde::Deserialize;

use nestql_core::utils::text::{pluralize, underscore};
use nestql_core::{NestqlError, NestqlResult};

use crate::schema::{Association, AssociationKind, Entity, JoinTable, Schema};

/// The root of a declarative schema definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDef {
    /// The entities to register, in order.
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

/// One entity in a schema definition.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDef {
    /// The entity name (e.g. "Post").
    pub name: String,
    /// Table name; defaults to the pluralized, underscored entity name.
    #[serde(default)]
    pub table: Option<String>,
    /// Primary-key column; defaults to `id`.
    #[serde(default)]
    pub primary_key: Option<String>,
    /// Column names in order.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Declared associations.
    #[serde(default)]
    pub associations: Vec<AssociationDef>,
}

/// One association in a schema definition.
#[derive(Debug, Clone, Deserialize)]
pub struct AssociationDef {
    /// The association name (the key used in inclusion trees).
    pub name: String,
    /// The relational kind string: `belongs_to`, `has_one`, `has_many`,
    /// or `has_and_belongs_to_many`.
    pub kind: String,
    /// The target entity name.
    pub target: String,
    /// The correlating foreign key; defaulted by kind when absent.
    #[serde(default)]
    pub foreign_key: Option<String>,
    /// Join-table name (many-to-many only); defaulted when absent.
    #[serde(default)]
    pub join_table: Option<String>,
    /// Join-table column referencing the target (many-to-many only).
    #[serde(default)]
    pub association_foreign_key: Option<String>,
}

impl SchemaDef {
    /// Builds the in-memory [`Schema`] from this definition.
    pub fn build(self) -> NestqlResult<Schema> {
        let mut schema = Schema::new();
        for entity_def in self.entities {
            schema.register(build_entity(entity_def)?);
        }
        Ok(schema)
    }
}

fn build_entity(def: EntityDef) -> NestqlResult<Entity> {
    let owner = def.name.clone();
    let mut entity = Entity::new(def.name);
    if let Some(table) = def.table {
        entity = entity.table_name(table);
    }
    if let Some(pk) = def.primary_key {
        entity = entity.primary_key_column(pk);
    }
    entity = entity.columns(def.columns);

    // Table-name overrides apply before this point so join-table
    // defaults see the final name.
    let owner_table = entity.table().to_string();
    for assoc_def in def.associations {
        entity = entity.association(build_association(&owner, &owner_table, assoc_def)?);
    }
    Ok(entity)
}

fn build_association(
    owner: &str,
    owner_table: &str,
    def: AssociationDef,
) -> NestqlResult<Association> {
    let Some(kind) = AssociationKind::parse(&def.kind) else {
        return Err(NestqlError::unsupported_kind(owner, def.name, def.kind));
    };

    let foreign_key = def.foreign_key.unwrap_or_else(|| match kind {
        AssociationKind::BelongsTo => format!("{}_id", underscore(&def.name)),
        _ => format!("{}_id", underscore(owner)),
    });

    let mut association = Association::new(def.name, kind, def.target.clone(), foreign_key.clone());
    if kind == AssociationKind::HasAndBelongsToMany {
        let target_table = pluralize(&underscore(&def.target));
        let join_table = def.join_table.unwrap_or_else(|| {
            let mut tables = [owner_table.to_string(), target_table];
            tables.sort();
            tables.join("_")
        });
        let association_foreign_key = def
            .association_foreign_key
            .unwrap_or_else(|| format!("{}_id", underscore(&def.target)));
        association = association.with_join_table(JoinTable {
            table: join_table,
            foreign_key,
            association_foreign_key,
        });
    }
    Ok(association)
}

/// Loads a schema from a TOML string.
pub fn from_toml_str(toml_str: &str) -> NestqlResult<Schema> {
    let def: SchemaDef = toml::from_str(toml_str)
        .map_err(|e| NestqlError::ConfigurationError(format!("Failed to parse TOML schema: {e}")))?;
    def.build()
}

/// Loads a schema from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> NestqlResult<Schema> {
    let content = std::fs::read_to_string(path.as_ref())?;
    from_toml_str(&content)
}

/// Loads a schema from a JSON string.
pub fn from_json_str(json_str: &str) -> NestqlResult<Schema> {
    let def: SchemaDef = serde_json::from_str(json_str)
        .map_err(|e| NestqlError::ConfigurationError(format!("Failed to parse JSON schema: {e}")))?;
    def.build()
}

/// Loads a schema from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> NestqlResult<Schema> {
    let content = std::fs::read_to_string(path.as_ref())?;
    from_json_str(&content)
}
