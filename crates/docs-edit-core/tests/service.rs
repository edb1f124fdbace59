use docs_edit_core::{
    BatchRequest, DocsService, EditError, ServiceSettings, UpdateOutcome,
};
use docs_markdown::{EditOperation, TextRange};
use docs_test_support::{test_settings, MemoryStore, ROOT_FOLDER};
use pretty_assertions::assert_eq;

fn service(store: &MemoryStore) -> DocsService<&MemoryStore> {
    DocsService::new(store, test_settings())
}

#[test]
fn create_doc_in_root_folder() {
    let store = MemoryStore::new();
    let created = service(&store)
        .create_doc("Plan", "# Plan\n- **ship** it", None)
        .expect("create");

    assert_eq!(created.title, "Plan");
    assert_eq!(
        created.url,
        format!("https://docs.google.com/document/d/{}/edit", created.id)
    );

    let doc = store.document(&created.id).expect("document");
    assert_eq!(doc.parent, ROOT_FOLDER);
    assert_eq!(doc.body, "Plan\nship it\n");
    assert_eq!(
        store.calls(),
        vec![
            format!("create_document {ROOT_FOLDER} Plan"),
            format!("batch_update {} 4", created.id),
        ]
    );
}

#[test]
fn create_doc_reuses_existing_subfolder() {
    let store = MemoryStore::new();
    let folder = store.add_folder(ROOT_FOLDER, "Specs");

    let created = service(&store)
        .create_doc("Spec", "Body", Some("Specs"))
        .expect("create");

    assert_eq!(store.document(&created.id).expect("doc").parent, folder);
    assert_eq!(store.folders().len(), 1);
    assert!(!store.calls().iter().any(|call| call.starts_with("create_folder")));
}

#[test]
fn blank_subfolder_means_root() {
    let store = MemoryStore::new();
    let created = service(&store)
        .create_doc("Notes", "Body", Some("  "))
        .expect("create");

    assert_eq!(store.document(&created.id).expect("doc").parent, ROOT_FOLDER);
    assert!(store.folders().is_empty());
}

#[test]
fn create_doc_with_empty_content_sends_no_batch() {
    let store = MemoryStore::new();
    let created = service(&store).create_doc("Empty", "", None).expect("create");

    assert!(store.document(&created.id).expect("doc").batches.is_empty());
    assert!(!store.calls().iter().any(|call| call.starts_with("batch_update")));
}

#[test]
fn create_doc_requires_title() {
    let store = MemoryStore::new();
    let err = service(&store).create_doc(" ", "Body", None).unwrap_err();

    assert!(matches!(err, EditError::InvalidArguments(_)));
    assert!(store.calls().is_empty());
}

#[test]
fn oversized_content_is_rejected_before_any_call() {
    let store = MemoryStore::new();
    let settings = ServiceSettings {
        max_content_chars: 5,
        ..test_settings()
    };
    let service = DocsService::new(&store, settings);

    let err = service.create_doc("Big", "123456", None).unwrap_err();

    match err {
        EditError::ContentTooLarge { limit, actual } => {
            assert_eq!(limit, 5);
            assert_eq!(actual, 6);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.calls().is_empty());
}

#[test]
fn missing_root_folder_is_a_configuration_error() {
    let store = MemoryStore::new();
    let service = DocsService::new(&store, ServiceSettings::default());

    let err = service.list_docs(None).unwrap_err();

    assert!(matches!(err, EditError::Configuration(_)));
    assert_eq!(err.to_string(), "DRIVE_FOLDER_ID is required");
}

#[test]
fn update_doc_deletes_then_inserts() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "Old\n", None);

    let outcome = service(&store)
        .update_doc(&id, "## New", false)
        .expect("update");

    assert_eq!(
        outcome,
        UpdateOutcome {
            document_id: id.clone(),
            requests: 3,
            diff: None,
        }
    );

    let doc = store.document(&id).expect("doc");
    assert_eq!(doc.body, "New\n");
    assert_eq!(
        doc.batches[0][0],
        BatchRequest::DeleteContentRange {
            range: TextRange::new(1, 5)
        }
    );
    assert_eq!(
        doc.batches[0][1],
        BatchRequest::Edit(EditOperation::InsertText {
            at_offset: 1,
            text: "New\n".to_string()
        })
    );
}

#[test]
fn update_empty_doc_skips_delete() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "", None);

    let outcome = service(&store)
        .update_doc(&id, "Fresh", false)
        .expect("update");

    assert_eq!(outcome.requests, 1);
    let doc = store.document(&id).expect("doc");
    assert!(matches!(
        doc.batches[0][0],
        BatchRequest::Edit(EditOperation::InsertText { .. })
    ));
    assert_eq!(doc.body, "Fresh\n");
}

#[test]
fn update_accepts_document_urls() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "", None);
    let url = format!("https://docs.google.com/document/d/{id}/edit#heading=h.1");

    let outcome = service(&store).update_doc(&url, "Body", false).expect("update");

    assert_eq!(outcome.document_id, id);
}

#[test]
fn dry_run_reports_diff_without_writing() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "Old\n", None);

    let outcome = service(&store)
        .update_doc(&id, "New\n", true)
        .expect("dry run");

    assert_eq!(outcome.requests, 2);
    let diff = outcome.diff.expect("diff");
    assert!(diff.contains(&format!("--- a/{id}")));
    assert!(diff.contains("-Old"));
    assert!(diff.contains("+New"));
    assert!(store.document(&id).expect("doc").batches.is_empty());
}

#[test]
fn dry_run_with_identical_content_has_no_diff() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "Same\n", None);

    let outcome = service(&store)
        .update_doc(&id, "Same\n", true)
        .expect("dry run");

    assert_eq!(outcome.diff, None);
    assert!(store.document(&id).expect("doc").batches.is_empty());
}

#[test]
fn update_unknown_document_is_not_found() {
    let store = MemoryStore::new();
    let err = service(&store)
        .update_doc("missing", "Body", false)
        .unwrap_err();

    assert!(matches!(err, EditError::NotFound(_)));
}

#[test]
fn read_doc_converts_export() {
    let store = MemoryStore::new();
    let id = store.add_document(
        ROOT_FOLDER,
        "Notes",
        "",
        Some("<p>Ship <strong>now</strong> via <a href=\"https://example.com\">the portal</a></p>"),
    );

    let markdown = service(&store).read_doc(&id).expect("read");

    assert!(markdown.contains("**now**"));
    assert!(markdown.contains("the portal"));
    assert!(!markdown.contains("example.com"));
}

#[test]
fn list_docs_newest_first() {
    let store = MemoryStore::new();
    store.add_document(ROOT_FOLDER, "Older", "", None);
    store.add_document(ROOT_FOLDER, "Newer", "", None);
    let folder = store.add_folder(ROOT_FOLDER, "Archive");
    store.add_document(&folder, "Archived", "", None);

    let names: Vec<_> = service(&store)
        .list_docs(None)
        .expect("list")
        .into_iter()
        .map(|doc| doc.name)
        .collect();
    assert_eq!(names, vec!["Newer", "Older"]);

    let archived = service(&store).list_docs(Some("Archive")).expect("list");
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].name, "Archived");
}

#[test]
fn reply_requires_text() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "", None);

    let err = service(&store)
        .reply_to_comment(&id, "c1", "   ")
        .unwrap_err();

    assert!(matches!(err, EditError::InvalidArguments(_)));
    assert!(!store.calls().iter().any(|call| call.starts_with("create_reply")));
}

#[test]
fn resolve_unknown_comment_is_not_found() {
    let store = MemoryStore::new();
    let id = store.add_document(ROOT_FOLDER, "Notes", "", None);

    let err = service(&store).resolve_comment(&id, "c9").unwrap_err();

    assert!(matches!(err, EditError::NotFound(_)));
}
