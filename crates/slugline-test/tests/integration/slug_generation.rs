//! Integration tests for slug generation on save.

use slugline_test::core::record::Record;

use super::helpers::{TestEngine, slug_of};

/// A plain name becomes a hyphenated lower-case slug.
#[test_log::test(tokio::test)]
async fn simple_name() {
    let t = TestEngine::new();
    let item = t.item("Simple Name").await;
    assert_eq!(slug_of(&item, "slug"), "simple-name");
}

/// Umlauts are transliterated.
#[test_log::test(tokio::test)]
async fn umlauts() {
    let t = TestEngine::new();
    let item = t.item("bänösü").await;
    assert_eq!(slug_of(&item, "slug"), "baenoesue");
}

/// Punctuation and quotes are dropped, spaces become hyphens.
#[test_log::test(tokio::test)]
async fn special_characters() {
    let t = TestEngine::new();
    let item = t.item("Foo,bar* \"").await;
    assert_eq!(slug_of(&item, "slug"), "foobar-");
}

/// Names that normalize to the same candidate get pairwise distinct slugs.
#[test_log::test(tokio::test)]
async fn collision_without_scope() {
    let t = TestEngine::new();
    let item1 = t.item("Name").await;
    let item2 = t.item("Name").await;
    let item3 = t.item("name").await;

    assert_ne!(slug_of(&item1, "slug"), slug_of(&item2, "slug"));
    assert_ne!(slug_of(&item2, "slug"), slug_of(&item3, "slug"));
    assert_ne!(slug_of(&item3, "slug"), slug_of(&item1, "slug"));
    assert_eq!(slug_of(&item3, "slug"), "name3");
}

/// A record without a name still gets a (possibly empty) slug.
#[test_log::test(tokio::test)]
async fn empty_name() {
    let t = TestEngine::new();
    let first = t.save(Record::new("item")).await;
    let second = t.item("").await;

    assert_eq!(slug_of(&first, "slug"), "");
    assert_eq!(slug_of(&second, "slug"), "2");
}

/// Siblings under the same parent collide.
#[test_log::test(tokio::test)]
async fn collision_with_scope() {
    let t = TestEngine::new();
    let item = t.item("").await;
    let sub1 = t.sub_item("Name", &item).await;
    let sub2 = t.sub_item("Name", &item).await;

    assert_ne!(slug_of(&sub1, "slug"), slug_of(&sub2, "slug"));
}

/// Children of different parents may share a slug.
#[test_log::test(tokio::test)]
async fn no_collision_due_to_scope() {
    let t = TestEngine::new();
    let item1 = t.item("").await;
    let item2 = t.item("").await;
    let sub1 = t.sub_item("Name", &item1).await;
    let sub2 = t.sub_item("Name", &item2).await;

    assert_eq!(slug_of(&sub1, "slug"), "name");
    assert_eq!(slug_of(&sub2, "slug"), "name");
}

/// Children without a parent form one scope of their own.
#[test_log::test(tokio::test)]
async fn orphans_share_the_null_scope() {
    let t = TestEngine::new();
    let orphan1 = t
        .save(Record::new("sub_item").with("name", "Name"))
        .await;
    let orphan2 = t
        .save(Record::new("sub_item").with("name", "Name"))
        .await;
    let item = t.item("Item").await;
    let child = t.sub_item("Name", &item).await;

    assert_eq!(slug_of(&orphan1, "slug"), "name");
    assert_eq!(slug_of(&orphan2, "slug"), "name2");
    assert_eq!(slug_of(&child, "slug"), "name");
}

/// A plain column scope isolates slugs per distinct value.
#[test_log::test(tokio::test)]
async fn non_association_scoping() {
    let t = TestEngine::new();
    let item1 = t.name_item("Name", Some("Scope1")).await;
    let item2 = t.name_item("Name", Some("Scope2")).await;
    assert_eq!(slug_of(&item1, "slug"), slug_of(&item2, "slug"));

    let item3 = t.name_item("Name", Some("Scope1")).await;
    assert_ne!(slug_of(&item1, "slug"), slug_of(&item3, "slug"));
}

/// Custom name and slug columns are honoured.
#[test_log::test(tokio::test)]
async fn custom_columns() {
    let t = TestEngine::new();
    let folder = t.folder("Meine Ordner").await;
    assert_eq!(slug_of(&folder, "url_id"), "meine-ordner");
    assert!(folder.get("slug").is_null());
}

/// Re-saving without a rename keeps the slug.
#[test_log::test(tokio::test)]
async fn idempotent_resave() {
    let t = TestEngine::new();
    let _first = t.item("Name").await;
    let second = t.item("Name").await;
    assert_eq!(slug_of(&second, "slug"), "name2");

    let resaved = t.save(second.clone()).await;
    assert_eq!(resaved.id(), second.id());
    assert_eq!(slug_of(&resaved, "slug"), "name2");
}

/// Renaming re-slugs on the next save.
#[test_log::test(tokio::test)]
async fn rename_reslugs() {
    let t = TestEngine::new();
    let mut item = t.item("Old Name").await;
    item.set("name", "New Name");

    let renamed = t.save(item).await;
    assert_eq!(slug_of(&renamed, "slug"), "new-name");
    assert_eq!(t.store.records("item").await.len(), 1);
}

/// Renaming onto a taken slug picks the next free suffix.
#[test_log::test(tokio::test)]
async fn rename_onto_taken_slug() {
    let t = TestEngine::new();
    let _taken = t.item("Name").await;
    let mut other = t.item("Other").await;
    other.set("name", "Name");

    let renamed = t.save(other).await;
    assert_eq!(slug_of(&renamed, "slug"), "name2");
}

/// The engine reports the scope column of each entity type.
#[test_log::test(tokio::test)]
async fn scope_columns() {
    let t = TestEngine::new();
    assert_eq!(t.engine.scope_column("item").expect("registered"), None);
    assert_eq!(
        t.engine.scope_column("sub_item").expect("registered"),
        Some("item_id")
    );
    assert_eq!(
        t.engine.scope_column("name_item").expect("registered"),
        Some("scope")
    );
    assert_eq!(
        t.engine.scope_column("page").expect("registered"),
        Some("document_id")
    );
}
