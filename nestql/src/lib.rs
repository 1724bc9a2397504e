//! # nestql
//!
//! Compile nested read specifications into single PostgreSQL queries that
//! return rows as JSON documents, with associations embedded via correlated
//! `row_to_json` / `array_to_json` subqueries — no N+1, no application-side
//! stitching.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `nestql` to get everything, or depend on
//! individual crates for finer-grained control.
//!
//! ## Quick start
//!
//! ```
//! use nestql::{Entity, IncludeNode, QueryCompiler, Schema};
//!
//! let mut schema = Schema::new();
//! schema.register(
//!     Entity::new("Post")
//!         .columns(["id", "title"])
//!         .has_many("comments", "Comment"),
//! );
//! schema.register(Entity::new("Comment").columns(["id", "post_id", "body"]));
//!
//! let compiler = QueryCompiler::new(&schema);
//! let node = IncludeNode::new()
//!     .include("comments", IncludeNode::new().columns(["body"]));
//! let sql = compiler
//!     .compile_sql(&schema.scope("Post").unwrap(), &node)
//!     .unwrap();
//! assert!(sql.starts_with("SELECT \"posts\".\"id\""));
//! ```

/// Core types: errors, logging setup, and text utilities.
pub use nestql_core as core;

/// Schema registry, inclusion trees, scopes, and the query compiler.
pub use nestql_query as query;

pub use nestql_core::{NestqlError, NestqlResult};
pub use nestql_query::{
    Association, AssociationKind, Column, Entity, Include, IncludeKey, IncludeNode, JoinTable,
    OrderBy, QueryCompiler, RawRelation, Schema, SchemaProvider, Scope, Value,
};
