mod common;

use common::{bearer, create_user, json_body, test_config};
use instalite::db::{create_test_db_pool, Photo};
use instalite::routes::build_routes;
use instalite::warp_helpers::handle_rejection;
use warp::Filter;
use serde_json::json;

#[tokio::test]
async fn follow_then_unfollow_restores_counts() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (_, token_a) = create_user(&db_pool, "follower");
    let (user_b, _) = create_user(&db_pool, "followed");

    let res = warp::test::request()
        .method("POST")
        .path("/api/follow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": user_b.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let body = json_body(res.body());
    assert_eq!(body["isFollowing"], true);
    assert_eq!(body["followers"], 1);
    assert_eq!(body["following"], 0);

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/follow-status/{}", user_b.id))
        .header("authorization", bearer(&token_a))
        .reply(&routes)
        .await;
    assert_eq!(json_body(res.body())["isFollowing"], true);

    let res = warp::test::request()
        .method("POST")
        .path("/api/unfollow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": user_b.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let body = json_body(res.body());
    assert_eq!(body["isFollowing"], false);
    assert_eq!(body["followers"], 0);

    // A second unfollow has no edge to remove.
    let res = warp::test::request()
        .method("POST")
        .path("/api/unfollow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": user_b.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res.body())["message"], "You do not follow this user");
}

#[tokio::test]
async fn follow_rejects_self_duplicates_and_unknown_targets() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (user_a, token_a) = create_user(&db_pool, "selfish");
    let (user_b, _) = create_user(&db_pool, "other");

    let res = warp::test::request()
        .method("POST")
        .path("/api/follow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": user_a.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res.body())["message"], "Cannot follow yourself");

    let res = warp::test::request()
        .method("POST")
        .path("/api/follow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": "no-such-user" }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);

    let res = warp::test::request()
        .method("POST")
        .path("/api/follow")
        .header("authorization", bearer(&token_a))
        .json(&json!({}))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res.body())["message"], "User ID required");

    warp::test::request()
        .method("POST")
        .path("/api/follow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": user_b.id }))
        .reply(&routes)
        .await;

    let res = warp::test::request()
        .method("POST")
        .path("/api/follow")
        .header("authorization", bearer(&token_a))
        .json(&json!({ "userId": user_b.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(
        json_body(res.body())["message"],
        "You already follow this user"
    );
}

#[tokio::test]
async fn follower_and_following_listings() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (user_a, token_a) = create_user(&db_pool, "hub");
    let (user_b, token_b) = create_user(&db_pool, "spoke_one");
    let (user_c, token_c) = create_user(&db_pool, "spoke_two");

    for token in [&token_b, &token_c] {
        warp::test::request()
            .method("POST")
            .path("/api/follow")
            .header("authorization", bearer(token.as_str()))
            .json(&json!({ "userId": user_a.id }))
            .reply(&routes)
            .await;
    }

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/followers/{}", user_a.id))
        .header("authorization", bearer(&token_a))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let followers = json_body(res.body())["followers"].as_array().unwrap().clone();
    assert_eq!(followers.len(), 2);
    // Newest edge first.
    assert_eq!(followers[0]["username"], "spoke_two");
    assert_eq!(followers[1]["username"], "spoke_one");

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/following/{}", user_b.id))
        .header("authorization", bearer(&token_b))
        .reply(&routes)
        .await;
    let following = json_body(res.body())["following"].as_array().unwrap().clone();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0]["username"], "hub");

    // Someone with no followers gets an empty list, not an error.
    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/followers/{}", user_c.id))
        .header("authorization", bearer(&token_c))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res.body())["followers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn repost_rules_and_listing() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (owner, owner_token) = create_user(&db_pool, "owner");
    let (reposter, reposter_token) = create_user(&db_pool, "reposter");
    let (photo, _) =
        Photo::create_with_tags(&db_pool, &owner.id, "share.jpg", &["art".to_string()]).unwrap();

    // Owners cannot repost their own photos.
    let res = warp::test::request()
        .method("POST")
        .path("/api/repost")
        .header("authorization", bearer(&owner_token))
        .json(&json!({ "photoId": photo.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(
        json_body(res.body())["message"],
        "Cannot repost your own photo"
    );

    let res = warp::test::request()
        .method("POST")
        .path("/api/repost")
        .header("authorization", bearer(&reposter_token))
        .json(&json!({ "photoId": photo.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let body = json_body(res.body());
    assert_eq!(body["isReposted"], true);
    assert_eq!(body["repost"]["photoId"], photo.id.as_str());

    // Duplicates are rejected.
    let res = warp::test::request()
        .method("POST")
        .path("/api/repost")
        .header("authorization", bearer(&reposter_token))
        .json(&json!({ "photoId": photo.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(
        json_body(res.body())["message"],
        "You already reposted this photo"
    );

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/repost-status/{}", photo.id))
        .header("authorization", bearer(&reposter_token))
        .reply(&routes)
        .await;
    assert_eq!(json_body(res.body())["isReposted"], true);

    // The listing decorates the photo with its repost time.
    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/reposts/{}", reposter.id))
        .header("authorization", bearer(&reposter_token))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let reposted = json_body(res.body())["repostedPhotos"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(reposted.len(), 1);
    assert_eq!(reposted[0]["id"], photo.id.as_str());
    assert_eq!(reposted[0]["user"]["username"], "owner");
    assert!(reposted[0]["repostedAt"].is_string());

    let res = warp::test::request()
        .method("POST")
        .path("/api/unrepost")
        .header("authorization", bearer(&reposter_token))
        .json(&json!({ "photoId": photo.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res.body())["isReposted"], false);

    // Nothing left to remove.
    let res = warp::test::request()
        .method("POST")
        .path("/api/unrepost")
        .header("authorization", bearer(&reposter_token))
        .json(&json!({ "photoId": photo.id }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(
        json_body(res.body())["message"],
        "You haven't reposted this photo"
    );
}

#[tokio::test]
async fn reposting_missing_photos_fails() {
    let db_pool = create_test_db_pool().expect("Failed to create test DB");
    let routes = build_routes(db_pool.clone(), test_config()).recover(handle_rejection);

    let (_, token) = create_user(&db_pool, "lonely");

    let res = warp::test::request()
        .method("POST")
        .path("/api/repost")
        .header("authorization", bearer(&token))
        .json(&json!({ "photoId": "missing" }))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);

    let res = warp::test::request()
        .method("POST")
        .path("/api/repost")
        .header("authorization", bearer(&token))
        .json(&json!({}))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res.body())["message"], "Photo ID required");
}
