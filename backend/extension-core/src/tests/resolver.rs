use crate::error::{HandlerError, ResolveError};
use crate::processor::Request;
use crate::resolver::{
    Handler, HandlerContext, HandlerOutcome, UriFragments, VersionedClientResolver,
    build_base_uri,
};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

struct TaggedHandler(&'static str);

#[async_trait]
impl Handler for TaggedHandler {
    async fn handle(
        &self,
        _ctx: &HandlerContext,
        _request: &Request,
    ) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::ok(vec![json!(self.0)]))
    }
}

fn handler(tag: &'static str) -> Arc<dyn Handler> {
    Arc::new(TaggedHandler(tag))
}

/// **VALUE**: Repeated resolution of the same version yields the same handler.
///
/// **BUG THIS CATCHES**: Would catch the resolver constructing a fresh
/// handler per call, dropping any connection pool the handler holds.
#[test]
fn given_registered_version_when_resolved_twice_then_same_handler() {
    // GIVEN
    let resolver =
        VersionedClientResolver::new([("35.0", handler("v35")), ("36.0", handler("v36"))])
            .unwrap();

    // WHEN
    let first = resolver.resolve("35.0").unwrap();
    let second = resolver.resolve("35.0").unwrap();

    // THEN
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &resolver.resolve("36.0").unwrap()));
}

/// **VALUE**: Lookup is exact; there is no nearest-version fallback.
///
/// **BUG THIS CATCHES**: Would catch "35" or "35.0.1" silently hitting the
/// 35.0 handler, whose behaviour clients of other versions do not expect.
#[test]
fn given_unregistered_version_when_resolved_then_unsupported_lists_versions() {
    // GIVEN
    let resolver =
        VersionedClientResolver::new([("36.0", handler("v36")), ("35.0", handler("v35"))])
            .unwrap();

    // WHEN/THEN
    for version in ["35", "35.0.1", "9.9", ""] {
        match resolver.resolve(version) {
            Err(ResolveError::UnsupportedVersion {
                requested,
                supported,
                ..
            }) => {
                assert_eq!(requested, version);
                assert_eq!(supported, vec!["35.0".to_string(), "36.0".to_string()]);
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("{version} should not resolve"),
        }
    }
}

#[test]
fn given_duplicate_registration_when_building_then_rejected() {
    let result = VersionedClientResolver::builder()
        .register("35.0", handler("a"))
        .and_then(|builder| builder.register("35.0", handler("b")));

    assert!(matches!(result, Err(ResolveError::DuplicateVersion { .. })));
}

#[test]
fn given_blank_version_when_registering_then_rejected() {
    let result = VersionedClientResolver::builder().register("  ", handler("a"));

    assert!(matches!(result, Err(ResolveError::EmptyVersion { .. })));
}

#[test]
fn given_empty_resolver_when_queried_then_reports_nothing() {
    let resolver = VersionedClientResolver::default();

    assert!(resolver.is_empty());
    assert!(resolver.supported_versions().is_empty());
    assert!(resolver.resolve("35.0").is_err());
}

/// **VALUE**: Base URIs never contain doubled or trailing slashes.
///
/// **BUG THIS CATCHES**: Would catch `https://host/api//cse/35.0/` which some
/// platform front ends answer with 404.
#[test]
fn given_fragments_with_slashes_when_building_base_uri_then_normalised() {
    assert_eq!(
        build_base_uri("https://vcd.example.com/api/", "/cse/", "35.0"),
        "https://vcd.example.com/api/cse/35.0"
    );
    assert_eq!(
        build_base_uri("https://vcd.example.com/api", "", "35.0"),
        "https://vcd.example.com/api/35.0"
    );

    let fragments = UriFragments::new("https://vcd.example.com/api", "cse");
    assert_eq!(
        handler("x").base_uri(&fragments, "36.0"),
        "https://vcd.example.com/api/cse/36.0"
    );
}
