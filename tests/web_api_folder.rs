//! Folder access, counts, feed and like tests.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};

use common::{id_of, TestApp};

#[tokio::test]
async fn test_public_folder_readable_by_anyone() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let folder = app.folder(&alice, json!({ "name": "Holiday" })).await;
    let id = id_of(&folder);

    assert_eq!(folder["is_public"], true);
    assert_eq!(folder["owner_username"], "alice");
    assert_eq!(folder["folder_code"].as_str().unwrap().len(), 8);

    app.get_folder(None, id).await.assert_status_ok();
    app.get_folder(Some(&bob), id).await.assert_status_ok();
}

#[tokio::test]
async fn test_private_folder_requires_owner_or_password() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let folder = app
        .folder(
            &alice,
            json!({ "name": "Secret", "is_public": false, "password": "open-sesame" }),
        )
        .await;
    let id = id_of(&folder);
    assert_eq!(folder["has_password"], true);
    assert!(folder.get("password_hash").is_none());

    app.get_folder(Some(&alice), id).await.assert_status_ok();

    let response = app.get_folder(Some(&bob), id).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    app.server
        .get(&format!("/api/folders/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .add_query_param("password", "wrong")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get(&format!("/api/folders/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .add_query_param("password", "open-sesame")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    // Counts stay hidden from a password holder.
    assert!(body["data"]["subfolder_count"].is_null());
    assert!(body["data"]["file_count"].is_null());
}

#[tokio::test]
async fn test_password_grants_read_but_not_write() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let id = id_of(
        &app.folder(
            &alice,
            json!({ "name": "Secret", "is_public": false, "password": "open-sesame" }),
        )
        .await,
    );

    app.server
        .get(&format!("/api/folders/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .add_query_param("password", "open-sesame")
        .await
        .assert_status_ok();

    app.server
        .patch(&format!("/api/folders/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .json(&json!({ "name": "Mine now" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete(&format!("/api/folders/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post(&format!("/api/folders/{id}/like"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let body: Value = app.get_folder(Some(&alice), id).await.json();
    assert_eq!(body["data"]["name"], "Secret");
}

#[tokio::test]
async fn test_missing_folder_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get_folder(None, 999).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Folder not found");
}

#[tokio::test]
async fn test_listing_children_of_unreadable_parent_is_empty() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let parent = id_of(
        &app.folder(
            &alice,
            json!({ "name": "Private", "is_public": false, "password": "pw" }),
        )
        .await,
    );
    app.folder(&alice, json!({ "name": "Child", "parent": parent }))
        .await;

    let body: Value = app
        .server
        .get("/api/folders")
        .add_header(AUTHORIZATION, bob.bearer())
        .add_query_param("parent", parent)
        .await
        .json();
    assert_eq!(body["data"], json!([]));

    let body: Value = app
        .server
        .get("/api/folders")
        .add_header(AUTHORIZATION, bob.bearer())
        .add_query_param("parent", parent)
        .add_query_param("password", "pw")
        .await
        .json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Child");
}

#[tokio::test]
async fn test_anonymous_listing_shows_public_only() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    app.folder(&alice, json!({ "name": "Open" })).await;
    app.folder(&alice, json!({ "name": "Closed", "is_public": false }))
        .await;

    let body: Value = app.server.get("/api/folders").await.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Open"]);

    let body: Value = app
        .server
        .get("/api/folders")
        .add_query_param("search", "CLO")
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    for name in ["holiday", "work", "50%off"] {
        app.folder(&alice, json!({ "name": name })).await;
    }

    let search = |term: &'static str| {
        app.server
            .get("/api/folders")
            .add_query_param("search", term)
            .add_header(AUTHORIZATION, alice.bearer())
    };

    let body: Value = search("%").await.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["50%off"]);

    let body: Value = search("_").await.json();
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_recursive_counts_are_additive() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let root = id_of(&app.folder(&alice, json!({ "name": "Root" })).await);
    let left = id_of(&app.folder(&alice, json!({ "name": "Left", "parent": root })).await);
    let right = id_of(&app.folder(&alice, json!({ "name": "Right", "parent": root })).await);
    let deep = id_of(&app.folder(&alice, json!({ "name": "Deep", "parent": left })).await);

    for (folder, name) in [(root, "a.txt"), (left, "b.txt"), (deep, "c.txt"), (deep, "d.txt")] {
        app.upload(&alice, folder, name, b"data")
            .await
            .assert_status(StatusCode::CREATED);
    }

    let counts = |body: Value| {
        (
            body["data"]["subfolder_count"].as_i64().unwrap(),
            body["data"]["file_count"].as_i64().unwrap(),
        )
    };

    let root_counts = counts(app.get_folder(Some(&alice), root).await.json());
    let left_counts = counts(app.get_folder(Some(&alice), left).await.json());
    let right_counts = counts(app.get_folder(Some(&alice), right).await.json());

    assert_eq!(root_counts, (3, 4));
    assert_eq!(left_counts, (1, 3));
    assert_eq!(right_counts, (0, 0));
    // Root's totals are its own files plus each child's totals.
    assert_eq!(root_counts.0, 2 + left_counts.0 + right_counts.0);
    assert_eq!(root_counts.1, 1 + left_counts.1 + right_counts.1);
}

#[tokio::test]
async fn test_views_are_recorded_once_per_user() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let id = id_of(&app.folder(&alice, json!({ "name": "Shared" })).await);

    app.get_folder(Some(&bob), id).await.assert_status_ok();
    app.get_folder(Some(&bob), id).await.assert_status_ok();
    app.get_folder(None, id).await.assert_status_ok();

    let body: Value = app.get_folder(None, id).await.json();
    assert_eq!(body["data"]["view_count"], 1);

    app.get_folder(Some(&alice), id).await.assert_status_ok();
    let body: Value = app.get_folder(None, id).await.json();
    assert_eq!(body["data"]["view_count"], 2);
}

#[tokio::test]
async fn test_like_toggle() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let id = id_of(&app.folder(&alice, json!({ "name": "Likeable" })).await);

    let like = |user: &common::TestUser| {
        app.server
            .post(&format!("/api/folders/{id}/like"))
            .add_header(AUTHORIZATION, user.bearer())
    };

    let body: Value = like(&alice).await.json();
    assert_eq!(body["data"], json!({ "liked": true, "like_count": 1 }));

    let body: Value = app.server.get("/api/folders/liked")
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .json();
    assert_eq!(body["data"][0]["id"], id);
    assert_eq!(body["data"][0]["is_liked"], true);

    // A public folder is readable by bob but only its owner may like it.
    let response = like(&bob).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "You do not own this folder.");
    let body: Value = app.get_folder(None, id).await.json();
    assert_eq!(body["data"]["like_count"], 1);

    let body: Value = like(&alice).await.json();
    assert_eq!(body["data"], json!({ "liked": false, "like_count": 0 }));

    app.server
        .post(&format!("/api/folders/{id}/like"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_feed_breaks_view_ties_on_likes() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let carol = app.user("carol").await;

    let older = id_of(
        &app.folder(&alice, json!({ "name": "Older", "is_listed_in_feed": true }))
            .await,
    );
    let newer = id_of(
        &app.folder(&alice, json!({ "name": "Newer", "is_listed_in_feed": true }))
            .await,
    );
    app.folder(&alice, json!({ "name": "Unlisted" })).await;

    // One view each, one like for the older folder only.
    app.get_folder(Some(&bob), older).await.assert_status_ok();
    app.get_folder(Some(&carol), newer).await.assert_status_ok();
    app.server
        .post(&format!("/api/folders/{older}/like"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status_ok();

    let body: Value = app.server.get("/api/folders/feed").await.json();
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![older, newer]);
}

#[tokio::test]
async fn test_following_feed() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    app.folder(&alice, json!({ "name": "Listed", "is_listed_in_feed": true }))
        .await;
    app.folder(
        &alice,
        json!({ "name": "Hidden", "is_listed_in_feed": true, "is_public": false }),
    )
    .await;

    let feed = || {
        app.server
            .get("/api/folders/following-feed")
            .add_header(AUTHORIZATION, bob.bearer())
    };

    let body: Value = feed().await.json();
    assert_eq!(body["data"], json!([]));

    app.server
        .post(&format!("/api/accounts/users/{}/follow", alice.id))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status_ok();

    let body: Value = feed().await.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Listed"]);
}

#[tokio::test]
async fn test_parent_rules() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let root = id_of(&app.folder(&alice, json!({ "name": "Root" })).await);
    let child = id_of(&app.folder(&alice, json!({ "name": "Child", "parent": root })).await);

    // Someone else's folder cannot be a parent.
    app.server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bob.bearer())
        .json(&json!({ "name": "Intruder", "parent": root }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "name": "Orphan", "parent": 999 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["details"]["parent"][0],
        "Parent folder does not exist."
    );

    // Moving a folder under its own descendant is rejected.
    let response = app
        .server
        .patch(&format!("/api/folders/{root}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "parent": child }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // An explicit null moves the child to the root.
    let body: Value = app
        .server
        .patch(&format!("/api/folders/{child}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "parent": null }))
        .await
        .json();
    assert!(body["data"]["parent"].is_null());
}

#[tokio::test]
async fn test_password_can_be_cleared() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let id = id_of(
        &app.folder(&alice, json!({ "name": "Locked", "password": "pw" }))
            .await,
    );

    let body: Value = app
        .server
        .patch(&format!("/api/folders/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "password": "" }))
        .await
        .json();
    assert_eq!(body["data"]["has_password"], false);
}

#[tokio::test]
async fn test_delete_cascades_to_subtree() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let root = id_of(&app.folder(&alice, json!({ "name": "Root" })).await);
    let child = id_of(&app.folder(&alice, json!({ "name": "Child", "parent": root })).await);
    let file: Value = app.upload(&alice, child, "notes.txt", b"hello").await.json();
    let file_id = file["data"]["id"].as_i64().unwrap();

    app.server
        .delete(&format!("/api/folders/{root}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.get_folder(Some(&alice), child)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_folders_visibility() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    app.folder(&alice, json!({ "name": "Open" })).await;
    app.folder(&alice, json!({ "name": "Closed", "is_public": false }))
        .await;

    let path = format!("/api/accounts/users/{}/folders", alice.id);
    let own: Value = app
        .server
        .get(&path)
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .json();
    assert_eq!(own["data"].as_array().unwrap().len(), 2);

    let other: Value = app
        .server
        .get(&path)
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .json();
    assert_eq!(other["data"].as_array().unwrap().len(), 1);
    assert_eq!(other["data"][0]["name"], "Open");

    let mine: Value = app
        .server
        .get("/api/folders/mine")
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .json();
    assert_eq!(mine["data"].as_array().unwrap().len(), 2);
}
