//! # nestql-query
//!
//! Compiles a declarative read specification — a base [`Scope`] over a root
//! entity plus a nested tree of associations to embed — into a single
//! PostgreSQL SELECT statement that returns each root row as a JSON document
//! with its related rows nested inside. One statement per object graph; no
//! query-per-association fan-out.
//!
//! ## Modules
//!
//! - [`schema`] - Entity/association metadata and the [`SchemaProvider`] seam
//! - [`schema_loader`] - Declarative TOML/JSON schema definitions
//! - [`scope`] - Composable SELECT scopes that render to SQL text
//! - [`include`] - The inclusion surface and its normalized tree
//! - [`compiler`] - The recursive query compiler
//! - [`value`] - Backend-agnostic values for inlined filter literals
//!
//! ## Example
//!
//! ```
//! use nestql_query::{Entity, IncludeNode, QueryCompiler, Schema};
//!
//! let mut schema = Schema::new();
//! schema.register(
//!     Entity::new("Post")
//!         .columns(["id", "title"])
//!         .has_many("comments", "Comment"),
//! );
//! schema.register(Entity::new("Comment").columns(["id", "post_id", "body"]));
//!
//! let include = IncludeNode::new().include(
//!     "comments",
//!     IncludeNode::new().columns(["body"]),
//! );
//! let compiler = QueryCompiler::new(&schema);
//! let sql = compiler
//!     .compile_sql(&schema.scope("Post").unwrap(), &include)
//!     .unwrap();
//! assert!(sql.starts_with("SELECT \"posts\".\"id\""));
//! ```

pub mod compiler;
pub mod include;
pub mod schema;
pub mod schema_loader;
pub mod scope;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use compiler::QueryCompiler;
pub use include::{Include, IncludeKey, IncludeNode, RawRelation};
pub use schema::{Association, AssociationKind, Column, Entity, JoinTable, Schema, SchemaProvider};
pub use scope::{OrderBy, Scope};
pub use value::Value;
