mod common;

use common::{bearer, create_user, json_body, test_config};
use instalite::db::{create_test_db_pool, Comment, Photo, Tag};
use instalite::db_reactions::{self, ReactionKind};
use instalite::routes::build_routes;
use instalite::warp_helpers::handle_rejection;
use warp::Filter;
use serde_json::json;

#[tokio::test]
async fn photo_view_is_enriched() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (owner, token) = create_user(&db_pool, "owner");
    let (photo, tags) = Photo::create_with_tags(
        &db_pool,
        &owner.id,
        "walk.jpg",
        &["forest".to_string(), "autumn".to_string()],
    )
    .unwrap();
    assert_eq!(tags.len(), 2);

    Comment::create(&db_pool, &photo.id, &owner.id, "first!").unwrap();
    db_reactions::toggle(&db_pool, &owner.id, &photo.id, ReactionKind::Heart).unwrap();

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/photo/{}", photo.id))
        .header("authorization", bearer(&token))
        .header("host", "localhost:8080")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let body = json_body(res.body());
    let view = &body["photo"];
    assert_eq!(view["url"], "http://localhost:8080/uploads/walk.jpg");
    assert_eq!(view["likesCount"], 1);
    assert_eq!(view["tags"].as_array().unwrap().len(), 2);
    assert_eq!(view["comments"][0]["text"], "first!");
    assert_eq!(view["comments"][0]["user"]["username"], "owner");

    let res = warp::test::request()
        .method("GET")
        .path("/api/photo/missing")
        .header("authorization", bearer(&token))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn deleting_a_photo_is_owner_only_and_cascades() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config();
    config.upload_path = upload_dir.path().to_string_lossy().into_owned();
    let routes = build_routes(db_pool.clone(), config).recover(handle_rejection);

    let (owner, owner_token) = create_user(&db_pool, "owner");
    let (intruder, intruder_token) = create_user(&db_pool, "intruder");
    let (photo, _) =
        Photo::create_with_tags(&db_pool, &owner.id, "gone.jpg", &["keepme".to_string()])
            .unwrap();

    Comment::create(&db_pool, &photo.id, &intruder.id, "soon gone").unwrap();
    db_reactions::toggle(&db_pool, &intruder.id, &photo.id, ReactionKind::Like).unwrap();
    std::fs::write(upload_dir.path().join("gone.jpg"), b"jpeg bytes").unwrap();

    let res = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/photo/{}", photo.id))
        .header("authorization", bearer(&intruder_token))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 403);

    let res = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/photo/{}", photo.id))
        .header("authorization", bearer(&owner_token))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);

    assert!(Photo::find_by_id(&db_pool, &photo.id).unwrap().is_none());
    assert!(Comment::for_photo(&db_pool, &photo.id).unwrap().is_empty());
    assert_eq!(db_reactions::count_for_photo(&db_pool, &photo.id).unwrap(), 0);
    assert!(!upload_dir.path().join("gone.jpg").exists());

    // Tag rows persist even when orphaned.
    {
        let conn = db_pool.get().unwrap();
        let tag = Tag::upsert_by_name(&conn, "keepme").unwrap();
        assert_eq!(tag.name, "keepme");
    }

    let res = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/photo/{}", photo.id))
        .header("authorization", bearer(&owner_token))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn stored_uploads_are_served_and_traversal_is_rejected() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config();
    config.upload_path = upload_dir.path().to_string_lossy().into_owned();
    let routes = build_routes(db_pool, config).recover(handle_rejection);

    std::fs::write(upload_dir.path().join("photo_abc.jpg"), b"jpeg bytes").unwrap();

    let res = warp::test::request()
        .method("GET")
        .path("/uploads/photo_abc.jpg")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "image/jpeg");
    assert_eq!(res.body().as_ref(), &b"jpeg bytes"[..]);

    let res = warp::test::request()
        .method("GET")
        .path("/uploads/..%2Fsecrets.txt")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);

    let res = warp::test::request()
        .method("GET")
        .path("/uploads/absent.jpg")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn user_profile_search_and_avatar() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (user_a, token_a) = create_user(&db_pool, "amelia");
    let (_, token_b) = create_user(&db_pool, "amir");
    Photo::create_with_tags(&db_pool, &user_a.id, "mine.jpg", &[]).unwrap();

    // Search matches substrings but never the caller themselves.
    let res = warp::test::request()
        .method("GET")
        .path("/api/search-users?q=am")
        .header("authorization", bearer(&token_a))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let users = json_body(res.body())["users"].as_array().unwrap().clone();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "amir");

    let res = warp::test::request()
        .method("GET")
        .path("/api/user/amelia")
        .header("authorization", bearer(&token_b))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let profile = json_body(res.body())["user"].clone();
    assert_eq!(profile["username"], "amelia");
    assert_eq!(profile["photosCount"], 1);
    assert_eq!(profile["followersCount"], 0);
    assert_eq!(profile["photos"].as_array().unwrap().len(), 1);

    let res = warp::test::request()
        .method("GET")
        .path("/api/user/nobody")
        .header("authorization", bearer(&token_b))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);

    let res = warp::test::request()
        .method("POST")
        .path("/api/update-avatar")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "avatar": "https://cdn.example.com/a.png" }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);

    let res = warp::test::request()
        .method("GET")
        .path("/api/get-user")
        .header("authorization", bearer(&token_a))
        .reply(&routes)
        .await;
    assert_eq!(
        json_body(res.body())["user"]["avatar"],
        "https://cdn.example.com/a.png"
    );
}
