//! Book and keyspace existence validation.
//!
//! The schema settings name the storage keyspace and an optional default
//! book; individual boxes may override the book. A missing keyspace is a
//! run-level error that skips book checks entirely; a missing book is
//! recorded against the referencing resource without marking it Invalid.

use crate::core::context::ValidationContext;
use crate::core::error::{Issue, IssueKind};
use crate::core::resource::{ResourceIndex, SettingsResource};
use crate::external::StorageClient;
use indexmap::IndexMap;

/// Validate every referenced book against the storage service.
pub fn validate_books(
    index: &ResourceIndex,
    settings: &SettingsResource,
    storage: &dyn StorageClient,
    ctx: &mut ValidationContext,
) {
    let keyspace = &settings.keyspace;
    match storage.keyspace_exists(keyspace) {
        Ok(true) => {}
        Ok(false) => {
            ctx.report_mut().add_exception(format!(
                "Specified keyspace \"{keyspace}\" is not present in storage. Can't proceed with book validation"
            ));
            return;
        }
        Err(error) => {
            ctx.report_mut()
                .add_exception(format!("Failed to check keyspace \"{keyspace}\": {error}"));
            return;
        }
    }

    for (resource, book) in books_by_resource(index, settings) {
        match storage.book_exists(keyspace, book) {
            Ok(true) => {}
            Ok(false) => {
                ctx.report_mut().add_book_issue(
                    resource,
                    Issue::Resource {
                        kind: IssueKind::Reference,
                        name: resource.to_string(),
                        message: format!("Specified book \"{book}\" is not present in storage"),
                    },
                );
            }
            Err(error) => {
                ctx.report_mut()
                    .add_exception(format!("Failed to check book \"{book}\": {error}"));
            }
        }
    }
}

fn books_by_resource<'a>(
    index: &'a ResourceIndex,
    settings: &'a SettingsResource,
) -> IndexMap<&'a str, &'a str> {
    let mut books = IndexMap::new();
    if let Some(default_book) = settings.default_book.as_deref() {
        books.insert(settings.name.as_str(), default_book);
    }
    for resource in index.boxes() {
        if let Some(book) = resource.spec.book_name.as_deref() {
            books.insert(resource.name.as_str(), book);
        }
    }
    books
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::{BoxResource, BoxSpec};
    use crate::external::StaticStorageClient;

    fn settings(keyspace: &str, default_book: Option<&str>) -> SettingsResource {
        SettingsResource {
            name: "schema-settings".to_string(),
            keyspace: keyspace.to_string(),
            default_book: default_book.map(ToString::to_string),
        }
    }

    fn box_with_book(name: &str, book: &str) -> BoxResource {
        let spec = BoxSpec {
            book_name: Some(book.to_string()),
            ..Default::default()
        };
        BoxResource::new(name, spec)
    }

    #[test]
    fn test_missing_keyspace_skips_book_checks() {
        let mut index = ResourceIndex::new();
        index.insert_box(box_with_book("act", "book1"));
        let storage = StaticStorageClient::empty();
        let mut ctx = ValidationContext::new();

        validate_books(&index, &settings("ghost", None), &storage, &mut ctx);

        assert_eq!(ctx.report().exceptions().len(), 1);
        assert!(ctx.report().exceptions()[0].contains("\"ghost\""));
        assert!(ctx.report().book_issues_for("act").is_empty());
    }

    #[test]
    fn test_missing_book_reported_per_resource() {
        let mut index = ResourceIndex::new();
        index.insert_box(box_with_book("act", "ghost-book"));
        index.insert_box(box_with_book("check1", "book1"));
        let storage = StaticStorageClient::empty().with_keyspace("schema", ["book1", "default"]);
        let mut ctx = ValidationContext::new();

        validate_books(&index, &settings("schema", Some("default")), &storage, &mut ctx);

        let act_issues = ctx.report().book_issues_for("act");
        assert_eq!(act_issues.len(), 1);
        assert!(act_issues[0].message().contains("ghost-book"));
        assert!(ctx.report().book_issues_for("check1").is_empty());
        // A missing book flags the run but not the resource status.
        assert!(!ctx.is_valid());
        assert!(ctx.resource("act").is_none());
    }

    #[test]
    fn test_default_book_checked_under_settings_name() {
        let index = ResourceIndex::new();
        let storage = StaticStorageClient::empty().with_keyspace("schema", ["other"]);
        let mut ctx = ValidationContext::new();

        validate_books(&index, &settings("schema", Some("missing")), &storage, &mut ctx);

        assert_eq!(ctx.report().book_issues_for("schema-settings").len(), 1);
    }
}
