//! The inclusion surface and its normalized tree.
//!
//! Callers can describe what to embed in several loose shapes — nothing, a
//! single association name, an ordered mix of names and name→options
//! pairs, or a raw relation — via [`Include`]. All shapes are normalized
//! at the boundary into one [`IncludeNode`] tree; the compiler consumes
//! only the tree. Children keep their declaration order so compiled SQL is
//! deterministic.

use nestql_core::utils::text::{pluralize, underscore};

use crate::scope::Scope;

/// A caller-supplied, already-built query treated as a pseudo-association.
///
/// The relation's correlation (if any) is baked into its scope; the
/// compiler skips resolution and embeds it as a JSON array under the
/// explicit alias, or under the pluralized, underscored entity name.
#[derive(Debug, Clone)]
pub struct RawRelation {
    scope: Scope,
    alias: Option<String>,
}

impl RawRelation {
    /// Wraps a scope as a pseudo-association.
    pub const fn new(scope: Scope) -> Self {
        Self { scope, alias: None }
    }

    /// Sets an explicit alias for the embedded column.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the underlying scope.
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the alias: explicit if set, otherwise derived from the
    /// scope's entity name.
    pub fn alias(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| pluralize(&underscore(self.scope.entity())))
    }
}

/// The key of an inclusion-tree entry.
#[derive(Debug, Clone)]
pub enum IncludeKey {
    /// A schema-declared association, resolved by name.
    Association(String),
    /// A caller-supplied raw relation; resolution is skipped.
    Raw(RawRelation),
}

/// A node in the normalized inclusion tree.
///
/// Holds an optional explicit column list (absent means "all columns of
/// the entity") and the ordered child associations to embed. Nodes are
/// read-only inputs to the compiler; nothing mutates them in place.
#[derive(Debug, Clone, Default)]
pub struct IncludeNode {
    columns: Option<Vec<String>>,
    children: Vec<(IncludeKey, IncludeNode)>,
}

impl IncludeNode {
    /// Creates an empty node: all columns, no associations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit column list for this node's entity.
    #[must_use]
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Embeds a named association with the given child options.
    #[must_use]
    pub fn include(mut self, name: impl Into<String>, node: Self) -> Self {
        self.children
            .push((IncludeKey::Association(name.into()), node));
        self
    }

    /// Embeds a named association with default options (all columns, no
    /// further nesting).
    #[must_use]
    pub fn with(self, name: impl Into<String>) -> Self {
        self.include(name, Self::new())
    }

    /// Embeds a raw relation with the given child options.
    #[must_use]
    pub fn include_raw(mut self, raw: RawRelation, node: Self) -> Self {
        self.children.push((IncludeKey::Raw(raw), node));
        self
    }

    /// Returns the explicit column list, if any.
    pub fn column_list(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Returns the ordered child entries.
    pub fn children(&self) -> &[(IncludeKey, Self)] {
        &self.children
    }

    /// Returns `true` if this node embeds no associations.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The loose inclusion shapes accepted at the API boundary.
///
/// # Examples
///
/// ```
/// use nestql_query::{Include, IncludeNode};
///
/// // A single name.
/// let node = Include::from("comments").normalize();
/// assert_eq!(node.children().len(), 1);
///
/// // An ordered mix of names and name→options pairs.
/// let node = Include::Many(vec![
///     Include::from("author"),
///     Include::Node("comments".into(), IncludeNode::new().columns(["body"])),
/// ])
/// .normalize();
/// assert_eq!(node.children().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub enum Include {
    /// Embed nothing.
    None,
    /// A single association name with default options.
    Name(String),
    /// An ordered sequence of inclusions, merged in order.
    Many(Vec<Include>),
    /// An association name paired with explicit child options.
    Node(String, IncludeNode),
    /// A raw relation with default options.
    Raw(RawRelation),
}

impl Include {
    /// Normalizes this shape into an [`IncludeNode`] tree.
    pub fn normalize(self) -> IncludeNode {
        let mut node = IncludeNode::new();
        self.fold_into(&mut node);
        node
    }

    fn fold_into(self, node: &mut IncludeNode) {
        match self {
            Self::None => {}
            Self::Name(name) => {
                node.children
                    .push((IncludeKey::Association(name), IncludeNode::new()));
            }
            Self::Many(entries) => {
                for entry in entries {
                    entry.fold_into(node);
                }
            }
            Self::Node(name, child) => {
                node.children.push((IncludeKey::Association(name), child));
            }
            Self::Raw(raw) => {
                node.children
                    .push((IncludeKey::Raw(raw), IncludeNode::new()));
            }
        }
    }
}

impl From<&str> for Include {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Include {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Vec<&str>> for Include {
    fn from(names: Vec<&str>) -> Self {
        Self::Many(names.into_iter().map(Include::from).collect())
    }
}

impl From<RawRelation> for Include {
    fn from(raw: RawRelation) -> Self {
        Self::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(node: &IncludeNode) -> Vec<String> {
        node.children()
            .iter()
            .map(|(key, _)| match key {
                IncludeKey::Association(name) => name.clone(),
                IncludeKey::Raw(raw) => raw.alias(),
            })
            .collect()
    }

    // ── Normalization shapes ─────────────────────────────────────────

    #[test]
    fn test_normalize_none() {
        let node = Include::None.normalize();
        assert!(node.is_leaf());
        assert!(node.column_list().is_none());
    }

    #[test]
    fn test_normalize_single_name() {
        let node = Include::from("comments").normalize();
        assert_eq!(names(&node), vec!["comments"]);
    }

    #[test]
    fn test_normalize_sequence_keeps_order() {
        let node = Include::from(vec!["author", "comments", "tags"]).normalize();
        assert_eq!(names(&node), vec!["author", "comments", "tags"]);
    }

    #[test]
    fn test_normalize_mixed_sequence() {
        let node = Include::Many(vec![
            Include::from("author"),
            Include::Node(
                "comments".into(),
                IncludeNode::new().columns(["body"]).with("author"),
            ),
        ])
        .normalize();
        assert_eq!(names(&node), vec!["author", "comments"]);
        let (_, comments) = &node.children()[1];
        assert_eq!(comments.column_list(), Some(&["body".to_string()][..]));
        assert_eq!(names(comments), vec!["author"]);
    }

    #[test]
    fn test_normalize_nested_many() {
        let node = Include::Many(vec![
            Include::Many(vec![Include::from("a"), Include::from("b")]),
            Include::from("c"),
        ])
        .normalize();
        assert_eq!(names(&node), vec!["a", "b", "c"]);
    }

    // ── Raw relations ────────────────────────────────────────────────

    #[test]
    fn test_raw_relation_derived_alias() {
        let raw = RawRelation::new(Scope::new("FeaturedPost", "posts"));
        assert_eq!(raw.alias(), "featured_posts");
    }

    #[test]
    fn test_raw_relation_explicit_alias() {
        let raw = RawRelation::new(Scope::new("Post", "posts")).with_alias("pinned");
        assert_eq!(raw.alias(), "pinned");
    }

    #[test]
    fn test_normalize_raw() {
        let raw = RawRelation::new(Scope::new("Post", "posts"));
        let node = Include::from(raw).normalize();
        assert_eq!(names(&node), vec!["posts"]);
        assert!(matches!(node.children()[0].0, IncludeKey::Raw(_)));
    }

    // ── Builder ──────────────────────────────────────────────────────

    #[test]
    fn test_builder_orders_children() {
        let node = IncludeNode::new()
            .with("author")
            .include("comments", IncludeNode::new().columns(["body"]));
        assert_eq!(names(&node), vec!["author", "comments"]);
        assert!(!node.is_leaf());
    }
}
