//! Logging integration for nestql.
//!
//! Provides a helper for installing a [`tracing`]-based subscriber and for
//! creating per-compilation spans. Compilation itself is pure and fast, so
//! logging is aimed at debugging the SQL a given inclusion tree produces.

/// Sets up the global tracing subscriber.
///
/// `filter` follows the `tracing_subscriber::EnvFilter` syntax (e.g.
/// "debug", "nestql_query=trace"). With `pretty` set a human-readable
/// format is used; otherwise output is structured JSON.
///
/// Installation is best-effort: if a subscriber is already set, the call
/// is a no-op.
pub fn setup_logging(filter: &str, pretty: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if pretty {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span covering one compilation of a root entity.
///
/// # Examples
///
/// ```
/// use nestql_core::logging::compile_span;
///
/// let span = compile_span("Post");
/// let _guard = span.enter();
/// tracing::debug!("compiling");
/// ```
pub fn compile_span(entity: &str) -> tracing::Span {
    tracing::debug_span!("compile", entity = entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_span_enterable() {
        let span = compile_span("Post");
        let _guard = span.enter();
        tracing::debug!("inside span");
    }

    #[test]
    fn test_setup_logging_is_idempotent() {
        setup_logging("info", true);
        setup_logging("debug", false);
    }
}
