//! Unit tests for path resolution and the per-layer rules.

use std::path::PathBuf;

use rstest::rstest;

use super::*;

fn segments(path: &str) -> Vec<String> {
    path.split("::").map(str::to_owned).collect()
}

fn breaches_in(file: &str, text: &str) -> Vec<Breach> {
    match check_sources(&[SourceFile::new(file, text)]) {
        Ok(()) => Vec::new(),
        Err(LintError::Violations(violations)) => {
            violations.into_iter().map(|violation| violation.breach).collect()
        }
        Err(other) => panic!("unexpected lint error: {other}"),
    }
}

#[rstest]
#[case("crate::outbound::memory", Resolved::Layer(Layer::Outbound))]
#[case("super::super::inbound::http", Resolved::Layer(Layer::Inbound))]
#[case("self::domain", Resolved::Layer(Layer::Domain))]
#[case("abroad::outbound::persistence", Resolved::Layer(Layer::Outbound))]
#[case("outbound::archive", Resolved::Layer(Layer::Outbound))]
#[case("crate::middleware::Trace", Resolved::Elsewhere)]
#[case("super::define_port_error", Resolved::Elsewhere)]
#[case("diesel::prelude", Resolved::Crate("diesel"))]
#[case("Error::conflict", Resolved::Crate("Error"))]
fn paths_resolve_to_layers_or_crates(#[case] path: &str, #[case] expected: Resolved<'static>) {
    let path = segments(path);
    assert_eq!(resolve(&path), expected);
}

#[rstest]
#[case(Layer::Domain, Layer::Domain, true)]
#[case(Layer::Domain, Layer::Inbound, false)]
#[case(Layer::Domain, Layer::Outbound, false)]
#[case(Layer::Inbound, Layer::Domain, true)]
#[case(Layer::Inbound, Layer::Outbound, false)]
#[case(Layer::Outbound, Layer::Domain, true)]
#[case(Layer::Outbound, Layer::Inbound, false)]
fn layer_table(#[case] from: Layer, #[case] to: Layer, #[case] allowed: bool) {
    assert_eq!(from.may_name(to), allowed);
}

#[rstest]
#[case(Layer::Domain, CrateGroup::ApiDocs, false)]
#[case(Layer::Inbound, CrateGroup::ActixStack, true)]
#[case(Layer::Inbound, CrateGroup::ApiDocs, true)]
#[case(Layer::Inbound, CrateGroup::Database, false)]
#[case(Layer::Inbound, CrateGroup::OutboundIo, false)]
#[case(Layer::Outbound, CrateGroup::Database, true)]
#[case(Layer::Outbound, CrateGroup::OutboundIo, true)]
#[case(Layer::Outbound, CrateGroup::ActixStack, false)]
fn crate_table(#[case] layer: Layer, #[case] group: CrateGroup, #[case] allowed: bool) {
    assert_eq!(layer.may_use(group), allowed);
}

#[test]
fn grouped_imports_are_checked_leaf_by_leaf() {
    let found = breaches_in(
        "inbound/http/documents.rs",
        "use crate::{domain::StorageKey, outbound::storage::InMemoryObjectStorage};",
    );
    assert_eq!(
        found,
        vec![Breach::Layer {
            from: Layer::Inbound,
            to: Layer::Outbound
        }]
    );
}

#[test]
fn inline_paths_count_as_much_as_imports() {
    let found = breaches_in(
        "domain/document_service.rs",
        "fn archive() { let _ = zip::CompressionMethod::Deflated; }",
    );
    assert_eq!(
        found,
        vec![Breach::Crate {
            layer: Layer::Domain,
            krate: "zip".to_owned()
        }]
    );
}

#[test]
fn repeated_breaches_collapse_per_file() {
    let found = breaches_in(
        "domain/document_service.rs",
        "use zip::ZipWriter; fn a() { let _ = zip::ZipWriter::new(()); } fn b() { let _ = zip::write::SimpleFileOptions::default(); }",
    );
    assert_eq!(found.len(), 1, "breaches: {found:?}");
}

#[test]
fn renamed_imports_keep_their_origin() {
    let found = breaches_in(
        "outbound/storage/http_storage.rs",
        "use actix_web::HttpResponse as Reply; fn f() {}",
    );
    assert_eq!(
        found,
        vec![Breach::Crate {
            layer: Layer::Outbound,
            krate: "actix_web".to_owned()
        }]
    );
}

#[test]
fn wiring_modules_cannot_be_linted() {
    let result = check_sources(&[SourceFile::new("server/mod.rs", "fn main() {}")]);
    assert!(matches!(result, Err(LintError::Unlintable { .. })));
}

#[test]
fn unparsable_files_are_reported() {
    let result = check_sources(&[SourceFile::new("domain/broken.rs", "fn (")]);
    assert!(matches!(result, Err(LintError::Unlintable { .. })));
}

#[test]
fn violation_messages_name_file_and_boundary() {
    let violation = Violation {
        file: PathBuf::from("inbound/http/auth.rs"),
        breach: Breach::Crate {
            layer: Layer::Inbound,
            krate: "reqwest".to_owned(),
        },
    };
    assert_eq!(
        violation.to_string(),
        "inbound/http/auth.rs: inbound module must not depend on external crate `reqwest`"
    );
}
