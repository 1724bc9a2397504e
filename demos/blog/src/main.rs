//! # nestql Blog Demo
//!
//! A small blog schema compiled into single-query JSON SELECTs:
//!
//! - **Schema**: `Post`, `Author`, `Comment`, and `Tag` entities with all
//!   four association kinds, declared programmatically or loaded from TOML
//! - **Inclusion trees**: column selection, nesting, and raw relations
//! - **Compilation**: every example becomes exactly one PostgreSQL query
//!
//! ## Running
//!
//! ```bash
//! cargo run --package blog-demo
//! ```
//!
//! Each section prints a short label and the SQL it produces. Nothing is
//! executed against a database.

use nestql::core::logging::setup_logging;
use nestql::query::schema_loader;
use nestql::{
    Entity, IncludeNode, NestqlResult, OrderBy, QueryCompiler, RawRelation, Schema, Scope, Value,
};

fn main() -> NestqlResult<()> {
    setup_logging("info", true);

    // Load the schema from TOML when a definition file is present,
    // otherwise build it in code.
    let schema = if std::path::Path::new("blog_schema.toml").exists() {
        tracing::info!("Loading schema from blog_schema.toml");
        schema_loader::from_toml_file("blog_schema.toml")?
    } else {
        blog_schema()
    };
    tracing::info!(entities = schema.entities().len(), "Blog schema ready");

    let compiler = QueryCompiler::new(&schema);

    demonstrate_flat_query(&compiler, &schema)?;
    demonstrate_nested_embedding(&compiler, &schema)?;
    demonstrate_many_to_many(&compiler, &schema)?;
    demonstrate_raw_relation(&compiler, &schema)?;
    demonstrate_filtered_scope(&compiler, &schema)?;

    Ok(())
}

fn blog_schema() -> Schema {
    let mut schema = Schema::new();
    schema.register(
        Entity::new("Post")
            .columns(["id", "title", "body", "author_id", "published"])
            .belongs_to("author", "Author")
            .has_many("comments", "Comment")
            .has_and_belongs_to_many("tags", "Tag", "posts_tags"),
    );
    schema.register(
        Entity::new("Author")
            .columns(["id", "name", "email"])
            .has_many("posts", "Post"),
    );
    schema.register(
        Entity::new("Comment")
            .columns(["id", "post_id", "body", "created_at"])
            .belongs_to("post", "Post"),
    );
    schema.register(Entity::new("Tag").columns(["id", "name"]));
    schema
}

/// A plain projection with no embedding.
fn demonstrate_flat_query(
    compiler: &QueryCompiler<'_, Schema>,
    schema: &Schema,
) -> NestqlResult<()> {
    let node = IncludeNode::new().columns(["id", "title"]);
    let sql = compiler.compile_sql(&schema.scope("Post")?, &node)?;
    println!("-- posts, two columns\n{sql}\n");
    Ok(())
}

/// One level of nesting: each post embeds its author as a JSON object and
/// its comments as a JSON array.
fn demonstrate_nested_embedding(
    compiler: &QueryCompiler<'_, Schema>,
    schema: &Schema,
) -> NestqlResult<()> {
    let node = IncludeNode::new()
        .columns(["id", "title"])
        .with("author")
        .include(
            "comments",
            IncludeNode::new().columns(["body", "created_at"]),
        );
    let sql = compiler.compile_sql(&schema.scope("Post")?, &node)?;
    println!("-- posts with embedded author object and comments array\n{sql}\n");
    Ok(())
}

/// Many-to-many through a join table.
fn demonstrate_many_to_many(
    compiler: &QueryCompiler<'_, Schema>,
    schema: &Schema,
) -> NestqlResult<()> {
    let node = IncludeNode::new()
        .columns(["id", "title"])
        .include("tags", IncludeNode::new().columns(["name"]));
    let sql = compiler.compile_sql(&schema.scope("Post")?, &node)?;
    println!("-- posts with tags via posts_tags\n{sql}\n");
    Ok(())
}

/// A caller-built query embedded as a pseudo-association. The correlation
/// to the outer row is written directly into the raw scope's filter.
fn demonstrate_raw_relation(
    compiler: &QueryCompiler<'_, Schema>,
    schema: &Schema,
) -> NestqlResult<()> {
    let recent = Scope::new("Comment", "comments")
        .select("\"comments\".\"body\"")
        .filter("\"comments\".\"post_id\" = \"posts\".\"id\"")
        .order_by(OrderBy::desc("created_at"))
        .limit(3);
    let node = IncludeNode::new().columns(["id", "title"]).include_raw(
        RawRelation::new(recent).with_alias("recent_comments"),
        IncludeNode::new(),
    );
    let sql = compiler.compile_sql(&schema.scope("Post")?, &node)?;
    println!("-- posts with the three most recent comments\n{sql}\n");
    Ok(())
}

/// Base-scope filters and ordering survive compilation untouched.
fn demonstrate_filtered_scope(
    compiler: &QueryCompiler<'_, Schema>,
    schema: &Schema,
) -> NestqlResult<()> {
    let scope = schema
        .scope("Post")?
        .filter_eq("published", Value::from(true))
        .order_by(OrderBy::desc("id"))
        .limit(10);
    let node = IncludeNode::new().columns(["id", "title"]).with("comments");
    let sql = compiler.compile_sql(&scope, &node)?;
    println!("-- published posts, newest first, with comments\n{sql}\n");
    Ok(())
}
