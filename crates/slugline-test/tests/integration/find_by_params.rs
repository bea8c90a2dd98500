//! Integration tests for resolving records from path parameters.

use slugline_test::core::record::Record;

use super::helpers::{ServiceError, TestEngine, params, slug_of};

#[test_log::test(tokio::test)]
async fn unscoped_by_own_slug() {
    let t = TestEngine::new();
    let _other = t.item("Other").await;
    let item = t.item("Simple Name").await;

    let found = t
        .engine
        .find_by_params("item", &params(&[("item", "simple-name")]))
        .await
        .expect("item found");
    assert_eq!(found.id(), item.id());
}

#[test_log::test(tokio::test)]
async fn unscoped_without_own_slug_is_not_found() {
    let t = TestEngine::new();
    let _item = t.item("Name").await;

    let err = t
        .engine
        .find_by_params("item", &params(&[]))
        .await
        .expect_err("nothing addressed");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

/// The parent slug selects which of several equally slugged children is meant.
#[test_log::test(tokio::test)]
async fn association_scope() {
    let t = TestEngine::new();
    let item1 = t.item("First").await;
    let item2 = t.item("Second").await;
    let _sub1 = t.sub_item("Name", &item1).await;
    let sub2 = t.sub_item("Name", &item2).await;

    let found = t
        .engine
        .find_by_params(
            "sub_item",
            &params(&[("item", "second"), ("sub_item", "name")]),
        )
        .await
        .expect("sub_item found");
    assert_eq!(found.id(), sub2.id());
}

/// Without its own slug a child resolves to some child of the parent.
#[test_log::test(tokio::test)]
async fn association_scope_without_own_slug() {
    let t = TestEngine::new();
    let item1 = t.item("First").await;
    let item2 = t.item("Second").await;
    let _sub1 = t.sub_item("Name", &item1).await;
    let sub2 = t.sub_item("Other", &item2).await;

    let found = t
        .engine
        .find_by_params("sub_item", &params(&[("item", "second")]))
        .await
        .expect("some child of the parent");
    assert_eq!(found.id(), sub2.id());
}

#[test_log::test(tokio::test)]
async fn association_scope_parent_without_children() {
    let t = TestEngine::new();
    let _item = t.item("Lonely").await;

    let err = t
        .engine
        .find_by_params("sub_item", &params(&[("item", "lonely")]))
        .await
        .expect_err("no children");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test_log::test(tokio::test)]
async fn missing_parent_is_not_found() {
    let t = TestEngine::new();
    let item = t.item("Item").await;
    let _sub = t.sub_item("Name", &item).await;

    let err = t
        .engine
        .find_by_params(
            "sub_item",
            &params(&[("item", "missing"), ("sub_item", "name")]),
        )
        .await
        .expect_err("parent does not exist");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

/// A slug from another scope does not match.
#[test_log::test(tokio::test)]
async fn slug_of_another_scope_is_not_found() {
    let t = TestEngine::new();
    let item1 = t.item("First").await;
    let _item2 = t.item("Second").await;
    let _sub = t.sub_item("Name", &item1).await;

    let err = t
        .engine
        .find_by_params(
            "sub_item",
            &params(&[("item", "second"), ("sub_item", "name")]),
        )
        .await
        .expect_err("name lives under first");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test_log::test(tokio::test)]
async fn value_scope() {
    let t = TestEngine::new();
    let _item1 = t.name_item("Name", Some("Scope1")).await;
    let item2 = t.name_item("Name", Some("Scope2")).await;

    let found = t
        .engine
        .find_by_params(
            "name_item",
            &params(&[("scope", "Scope2"), ("name_item", "name")]),
        )
        .await
        .expect("name_item found");
    assert_eq!(found.id(), item2.id());
}

/// An absent scope value addresses the records whose scope is NULL.
#[test_log::test(tokio::test)]
async fn value_scope_absent_matches_null() {
    let t = TestEngine::new();
    let _scoped = t.name_item("Name", Some("Scope1")).await;
    let unscoped = t.name_item("Name", None).await;

    let found = t
        .engine
        .find_by_params("name_item", &params(&[("name_item", "name")]))
        .await
        .expect("NULL-scoped name_item found");
    assert_eq!(found.id(), unscoped.id());
}

#[test_log::test(tokio::test)]
async fn value_scope_without_own_slug() {
    let t = TestEngine::new();
    let _other = t.name_item("Name", Some("Scope1")).await;
    let in_scope = t.name_item("Other", Some("Scope2")).await;

    let found = t
        .engine
        .find_by_params("name_item", &params(&[("scope", "Scope2")]))
        .await
        .expect("some record in scope");
    assert_eq!(found.id(), in_scope.id());
}

/// A parent declaring ordered children resolves to the first of them.
#[test_log::test(tokio::test)]
async fn default_child_by_position() {
    let t = TestEngine::new();
    let folder = t.folder("Folder").await;
    let _second = t.document("Second", 2, &folder).await;
    let first = t.document("First", 1, &folder).await;
    let _third = t.document("Third", 3, &folder).await;

    let found = t
        .engine
        .find_by_params("document", &params(&[("folder", "folder")]))
        .await
        .expect("default document");
    assert_eq!(found.id(), first.id());
}

/// Children without a position sort after positioned ones.
#[test_log::test(tokio::test)]
async fn default_child_skips_null_position() {
    let t = TestEngine::new();
    let folder = t.folder("Folder").await;
    let _unplaced = t
        .save(
            Record::new("document")
                .with("name", "NoPos")
                .with("folder_id", folder.id()),
        )
        .await;
    let first = t.document("First", 1, &folder).await;

    let found = t
        .engine
        .find_by_params("document", &params(&[("folder", "folder")]))
        .await
        .expect("default document");
    assert_eq!(found.id(), first.id());
}

#[test_log::test(tokio::test)]
async fn three_level_chain() {
    let t = TestEngine::new();
    let folder1 = t.folder("Folder").await;
    let folder2 = t.folder("Folder").await;
    assert_eq!(slug_of(&folder2, "url_id"), "folder2");

    let doc1 = t.document("Doc", 1, &folder1).await;
    let doc2 = t.document("Doc", 1, &folder2).await;
    let _page1 = t.page("Page", &doc1).await;
    let page2 = t.page("Page", &doc2).await;

    let found = t
        .engine
        .find_by_params(
            "page",
            &params(&[("folder", "folder2"), ("document", "doc"), ("page", "page")]),
        )
        .await
        .expect("page found");
    assert_eq!(found.id(), page2.id());
}

/// A missing intermediate slug falls back to the default child at that level.
#[test_log::test(tokio::test)]
async fn three_level_chain_without_intermediate_slug() {
    let t = TestEngine::new();
    let folder = t.folder("Folder").await;
    let later = t.document("Later", 2, &folder).await;
    let first = t.document("First", 1, &folder).await;
    let _later_page = t.page("Page", &later).await;
    let first_page = t.page("Page", &first).await;

    let found = t
        .engine
        .find_by_params("page", &params(&[("folder", "folder"), ("page", "page")]))
        .await
        .expect("page under the default document");
    assert_eq!(found.id(), first_page.id());
}

#[test_log::test(tokio::test)]
async fn unregistered_entity_is_a_configuration_error() {
    let t = TestEngine::new();

    let err = t
        .engine
        .find_by_params("ghost", &params(&[("ghost", "boo")]))
        .await
        .expect_err("unregistered");
    assert!(matches!(err, ServiceError::ConfigurationError(_)));
}
