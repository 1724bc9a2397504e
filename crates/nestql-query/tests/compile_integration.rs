//! Integration tests for the schema -> inclusion tree -> SQL pipeline.
//!
//! These tests exercise the complete compilation pipeline, covering:
//! 1. Whole-statement output for each association kind
//! 2. Deep nesting and mixed trees
//! 3. Loose inclusion shapes normalized at the boundary
//! 4. Schemas loaded from declarative definitions
//! 5. Error reporting before any SQL is produced

use nestql_query::schema_loader;
use nestql_query::{
    Entity, Include, IncludeNode, OrderBy, QueryCompiler, RawRelation, Schema, Scope, Value,
};

// ============================================================================
// Shared helpers
// ============================================================================

/// The blog schema: four entities covering all four association kinds.
fn blog_schema() -> Schema {
    let mut schema = Schema::new();
    schema.register(
        Entity::new("Post")
            .columns(["id", "title", "body", "author_id"])
            .belongs_to("author", "Author")
            .has_many("comments", "Comment")
            .has_and_belongs_to_many("tags", "Tag", "posts_tags"),
    );
    schema.register(
        Entity::new("Author")
            .columns(["id", "name"])
            .has_many("posts", "Post")
            .has_one("profile", "Profile"),
    );
    schema.register(
        Entity::new("Comment")
            .columns(["id", "post_id", "author_id", "body"])
            .belongs_to("author", "Author"),
    );
    schema.register(Entity::new("Profile").columns(["id", "author_id", "bio"]));
    schema.register(Entity::new("Tag").columns(["id", "name"]));
    schema
}

fn compile_post(node: &IncludeNode) -> String {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema);
    compiler
        .compile_sql(&schema.scope("Post").unwrap(), node)
        .unwrap()
}

// ============================================================================
// Whole-statement output
// ============================================================================

#[test]
fn test_minimal_embedding_statement() {
    let mut schema = Schema::new();
    schema.register(
        Entity::new("Post")
            .columns(["id", "title"])
            .has_many("comments", "Comment"),
    );
    schema.register(Entity::new("Comment").columns(["id", "post_id", "body"]));

    let compiler = QueryCompiler::new(&schema);
    let node = IncludeNode::new().include("comments", IncludeNode::new().columns(["body"]));
    let sql = compiler
        .compile_sql(&schema.scope("Post").unwrap(), &node)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT \"posts\".\"id\", \"posts\".\"title\", \
         (SELECT array_to_json(coalesce(array_agg(row_to_json(t)), '{}')) \
         FROM (SELECT \"body\" FROM \"comments\" \
         WHERE \"comments\".\"post_id\" = \"posts\".\"id\") t) AS \"comments\" \
         FROM \"posts\""
    );
}

#[test]
fn test_single_statement_with_all_four_kinds() {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema);
    let node = IncludeNode::new()
        .columns(["id"])
        .include("author", IncludeNode::new().columns(["name"]).with("profile"))
        .include("comments", IncludeNode::new().columns(["body"]))
        .include("tags", IncludeNode::new().columns(["name"]));
    let sql = compiler
        .compile_sql(&schema.scope("Post").unwrap(), &node)
        .unwrap();

    // One outer SELECT, three top-level correlated columns, one nested.
    assert!(sql.starts_with("SELECT \"id\", (SELECT row_to_json(t)"));
    assert!(sql.ends_with("FROM \"posts\""));
    assert_eq!(sql.matches("AS \"author\"").count(), 1);
    assert_eq!(sql.matches("AS \"profile\"").count(), 1);
    assert_eq!(sql.matches("AS \"comments\"").count(), 1);
    assert_eq!(sql.matches("AS \"tags\"").count(), 1);
    assert!(sql.contains("\"profiles\".\"author_id\" = \"authors\".\"id\""));
    assert!(sql.contains("INNER JOIN \"posts_tags\""));
}

#[test]
fn test_three_level_nesting_correlates_each_level_to_its_parent() {
    // post → comments → author → profile
    let sql = compile_post(&IncludeNode::new().columns(["id"]).include(
        "comments",
        IncludeNode::new().columns(["body"]).include(
            "author",
            IncludeNode::new().columns(["name"]).include(
                "profile",
                IncludeNode::new().columns(["bio"]),
            ),
        ),
    ));
    assert!(sql.contains("\"comments\".\"post_id\" = \"posts\".\"id\""));
    assert!(sql.contains("\"authors\".\"id\" = \"comments\".\"author_id\""));
    assert!(sql.contains("\"profiles\".\"author_id\" = \"authors\".\"id\""));
}

#[test]
fn test_to_many_embeds_coalesce_to_empty_array() {
    let sql = compile_post(&IncludeNode::new().columns(["id"]).with("comments"));
    assert!(sql.contains("coalesce(array_agg(row_to_json(t)), '{}')"));
}

#[test]
fn test_to_one_embeds_without_aggregation() {
    let sql = compile_post(&IncludeNode::new().columns(["id"]).with("author"));
    assert!(sql.contains("(SELECT row_to_json(t) FROM"));
    assert!(!sql.contains("array_agg"));
}

// ============================================================================
// Scope composition
// ============================================================================

#[test]
fn test_compiled_scope_composes_further() {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema);
    let node = IncludeNode::new().columns(["id", "title"]).with("comments");
    let compiled = compiler
        .compile(&schema.scope("Post").unwrap(), &node)
        .unwrap();

    // The embedding lives in the projection; filters added afterwards
    // apply to the outer query only.
    let sql = compiled
        .filter_eq("id", Value::from(42_i64))
        .order_by(OrderBy::asc("title"))
        .render();
    assert!(sql.contains("AS \"comments\""));
    assert!(sql.ends_with("WHERE \"posts\".\"id\" = 42 ORDER BY \"title\" ASC"));
}

#[test]
fn test_base_scope_pagination_survives() {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema);
    let scope = schema.scope("Post").unwrap().limit(5).offset(10);
    let sql = compiler
        .compile_sql(&scope, &IncludeNode::new().columns(["id"]))
        .unwrap();
    assert_eq!(sql, "SELECT \"id\" FROM \"posts\" LIMIT 5 OFFSET 10");
}

// ============================================================================
// Loose inclusion shapes
// ============================================================================

#[test]
fn test_name_list_shape_equals_builder_shape() {
    let from_list = Include::from(vec!["author", "comments"]).normalize();
    let from_builder = IncludeNode::new().with("author").with("comments");
    assert_eq!(compile_post(&from_list), compile_post(&from_builder));
}

#[test]
fn test_mixed_shape_with_nested_options() {
    let node = Include::Many(vec![
        Include::from("author"),
        Include::Node(
            "comments".into(),
            IncludeNode::new().columns(["body"]).with("author"),
        ),
    ])
    .normalize();
    let sql = compile_post(&node);
    assert_eq!(sql.matches("AS \"author\"").count(), 2);
    assert!(sql.contains("SELECT \"body\", (SELECT row_to_json(t)"));
}

#[test]
fn test_raw_relation_with_ordering_and_limit() {
    let recent = Scope::new("Comment", "comments")
        .select("\"comments\".\"body\"")
        .filter("\"comments\".\"post_id\" = \"posts\".\"id\"")
        .order_by(OrderBy::desc("id"))
        .limit(3);
    let node = IncludeNode::new().columns(["id"]).include_raw(
        RawRelation::new(recent).with_alias("recent_comments"),
        IncludeNode::new(),
    );
    let sql = compile_post(&node);
    assert!(sql.contains(
        "(SELECT \"comments\".\"body\" FROM \"comments\" \
         WHERE \"comments\".\"post_id\" = \"posts\".\"id\" \
         ORDER BY \"id\" DESC LIMIT 3) t) AS \"recent_comments\""
    ));
}

// ============================================================================
// Declarative schemas
// ============================================================================

#[test]
fn test_toml_schema_produces_same_sql_as_programmatic() {
    let loaded = schema_loader::from_toml_str(
        r#"
        [[entities]]
        name = "Post"
        columns = ["id", "title", "body", "author_id"]

        [[entities.associations]]
        name = "author"
        kind = "belongs_to"
        target = "Author"

        [[entities.associations]]
        name = "comments"
        kind = "has_many"
        target = "Comment"

        [[entities.associations]]
        name = "tags"
        kind = "has_and_belongs_to_many"
        target = "Tag"

        [[entities]]
        name = "Author"
        columns = ["id", "name"]

        [[entities]]
        name = "Comment"
        columns = ["id", "post_id", "author_id", "body"]

        [[entities]]
        name = "Tag"
        columns = ["id", "name"]
        "#,
    )
    .unwrap();

    let node = IncludeNode::new()
        .columns(["id"])
        .with("author")
        .with("comments")
        .with("tags");

    let from_toml = QueryCompiler::new(&loaded)
        .compile_sql(&loaded.scope("Post").unwrap(), &node)
        .unwrap();
    let programmatic = compile_post(&node);
    assert_eq!(from_toml, programmatic);
}

// ============================================================================
// Error reporting
// ============================================================================

#[test]
fn test_unknown_association_names_entity_and_association() {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema);
    let err = compiler
        .compile(&schema.scope("Post").unwrap(), &IncludeNode::new().with("likes"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown association 'likes' on entity 'Post'");
}

#[test]
fn test_unknown_nested_association_reports_inner_entity() {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema);
    let node = IncludeNode::new().include("comments", IncludeNode::new().with("likes"));
    let err = compiler
        .compile(&schema.scope("Post").unwrap(), &node)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown association 'likes' on entity 'Comment'"
    );
}

#[test]
fn test_unknown_target_entity() {
    let mut schema = Schema::new();
    schema.register(
        Entity::new("Post")
            .columns(["id"])
            .has_many("comments", "Comment"),
    );
    let compiler = QueryCompiler::new(&schema);
    let err = compiler
        .compile(&schema.scope("Post").unwrap(), &IncludeNode::new().with("comments"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown entity: Comment");
}

#[test]
fn test_depth_guard_names_the_limit() {
    let schema = blog_schema();
    let compiler = QueryCompiler::new(&schema).with_max_depth(1);
    let node = IncludeNode::new().include(
        "comments",
        IncludeNode::new().include("author", IncludeNode::new().with("posts")),
    );
    let err = compiler
        .compile(&schema.scope("Post").unwrap(), &node)
        .unwrap_err();
    assert_eq!(err.to_string(), "Inclusion tree exceeds maximum depth of 1");
}
