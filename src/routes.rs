use warp::{Filter, Rejection, Reply};

use crate::config::Config;
use crate::db::DbPool;
use crate::db_reactions::ReactionKind;
use crate::warp_helpers::{with_auth, with_config, with_db};
use crate::{
    handlers_auth, handlers_comment, handlers_feed, handlers_follow, handlers_health,
    handlers_photo, handlers_reaction, handlers_repost, handlers_user,
};

const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The full route table. CORS, request logging and rejection recovery are
/// layered on by the caller.
pub fn build_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    build_auth_routes(db_pool.clone(), config.clone())
        .or(build_health_routes(db_pool.clone()))
        .or(build_feed_routes(db_pool.clone(), config.clone()))
        .or(build_photo_routes(db_pool.clone(), config.clone()))
        .or(build_comment_routes(db_pool.clone(), config.clone()))
        .or(build_reaction_routes(db_pool.clone(), config.clone()))
        .or(build_follow_routes(db_pool.clone(), config.clone()))
        .or(build_repost_routes(db_pool.clone(), config.clone()))
        .or(build_user_routes(db_pool, config))
}

fn build_auth_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let sign_up = warp::path("sign-up")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_auth::SignUpRequest>())
        .and(with_db(db_pool.clone()))
        .and_then(handlers_auth::sign_up);

    let sign_in = warp::path("sign-in")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_auth::SignInRequest>())
        .and(with_config(config))
        .and(with_db(db_pool))
        .and_then(handlers_auth::sign_in);

    sign_up.or(sign_in)
}

fn build_health_routes(
    db_pool: DbPool,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers_health::health_check);

    let ready = warp::path("ready")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_db(db_pool))
        .and_then(handlers_health::ready_check);

    health.or(ready)
}

fn build_feed_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_feed = warp::path("api")
        .and(warp::path("feed"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handlers_feed::FeedQuery>())
        .and(warp::header::optional::<String>("host"))
        .and(with_auth(config.clone()))
        .and(with_config(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_feed::get_feed);

    let api_feed_following = warp::path("api")
        .and(warp::path("feed"))
        .and(warp::path("following"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handlers_feed::FeedQuery>())
        .and(warp::header::optional::<String>("host"))
        .and(with_auth(config.clone()))
        .and(with_config(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_feed::get_following_feed);

    let api_trending_tags = warp::path("api")
        .and(warp::path("feed"))
        .and(warp::path("trending-tags"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handlers_feed::TrendingQuery>())
        .and(with_auth(config))
        .and(with_db(db_pool))
        .and_then(handlers_feed::get_trending_tags);

    api_feed_following.or(api_trending_tags).or(api_feed)
}

fn build_photo_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_upload_photo = warp::path("api")
        .and(warp::path("upload-photo"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_auth(config.clone()))
        .and(with_config(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_photo::upload_photo);

    let api_photo_get = warp::path("api")
        .and(warp::path("photo"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("host"))
        .and(with_auth(config.clone()))
        .and(with_config(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_photo::get_photo);

    let api_photo_delete = warp::path("api")
        .and(warp::path("photo"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_auth(config.clone()))
        .and(with_config(config.clone()))
        .and(with_db(db_pool))
        .and_then(handlers_photo::delete_photo);

    let uploads = warp::path("uploads")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_config(config))
        .and_then(handlers_photo::serve_upload);

    api_upload_photo
        .or(api_photo_get)
        .or(api_photo_delete)
        .or(uploads)
}

fn build_comment_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_comment_add = warp::path("api")
        .and(warp::path("comment"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_comment::AddCommentRequest>())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_comment::add_comment);

    let api_comment_delete = warp::path("api")
        .and(warp::path("comment"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_comment::delete_comment);

    let api_comments_list = warp::path("api")
        .and(warp::path("comments"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config))
        .and(with_db(db_pool))
        .and_then(handlers_comment::get_comments);

    api_comment_add.or(api_comment_delete).or(api_comments_list)
}

fn build_reaction_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_like = toggle_route("like", ReactionKind::Like, db_pool.clone(), config.clone());
    let api_heart = toggle_route("heart", ReactionKind::Heart, db_pool.clone(), config.clone());
    let api_smile = toggle_route("smile", ReactionKind::Smile, db_pool.clone(), config.clone());

    let api_reactions = warp::path("api")
        .and(warp::path("reactions"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config))
        .and(with_db(db_pool))
        .and_then(handlers_reaction::get_reactions);

    api_like.or(api_heart).or(api_smile).or(api_reactions)
}

/// All three toggle endpoints share one handler, parameterized by kind.
fn toggle_route(
    path: &'static str,
    kind: ReactionKind,
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path(path))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::any().map(move || kind))
        .and(with_auth(config))
        .and(with_db(db_pool))
        .and_then(handlers_reaction::toggle_reaction)
}

fn build_follow_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_follow = warp::path("api")
        .and(warp::path("follow"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_follow::FollowRequest>())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_follow::follow_user);

    let api_unfollow = warp::path("api")
        .and(warp::path("unfollow"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_follow::FollowRequest>())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_follow::unfollow_user);

    let api_followers = warp::path("api")
        .and(warp::path("followers"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_follow::get_followers);

    let api_following = warp::path("api")
        .and(warp::path("following"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_follow::get_following);

    let api_follow_status = warp::path("api")
        .and(warp::path("follow-status"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config))
        .and(with_db(db_pool))
        .and_then(handlers_follow::check_follow_status);

    api_follow
        .or(api_unfollow)
        .or(api_followers)
        .or(api_following)
        .or(api_follow_status)
}

fn build_repost_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_repost = warp::path("api")
        .and(warp::path("repost"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_repost::RepostRequest>())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_repost::repost_photo);

    let api_unrepost = warp::path("api")
        .and(warp::path("unrepost"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_repost::RepostRequest>())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_repost::unrepost_photo);

    let api_repost_status = warp::path("api")
        .and(warp::path("repost-status"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_repost::check_repost_status);

    let api_reposts = warp::path("api")
        .and(warp::path("reposts"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("host"))
        .and(with_auth(config.clone()))
        .and(with_config(config))
        .and(with_db(db_pool))
        .and_then(handlers_repost::get_reposted_photos);

    api_repost
        .or(api_unrepost)
        .or(api_repost_status)
        .or(api_reposts)
}

fn build_user_routes(
    db_pool: DbPool,
    config: Config,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_get_user = warp::path("api")
        .and(warp::path("get-user"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_user::get_user);

    let api_search_users = warp::path("api")
        .and(warp::path("search-users"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handlers_user::UserSearchQuery>())
        .and(with_auth(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_user::search_users);

    let api_user_by_username = warp::path("api")
        .and(warp::path("user"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("host"))
        .and(with_auth(config.clone()))
        .and(with_config(config.clone()))
        .and(with_db(db_pool.clone()))
        .and_then(handlers_user::get_user_by_username);

    let api_update_avatar = warp::path("api")
        .and(warp::path("update-avatar"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<handlers_user::UpdateAvatarRequest>())
        .and(with_auth(config))
        .and(with_db(db_pool))
        .and_then(handlers_user::update_avatar);

    api_get_user
        .or(api_search_users)
        .or(api_user_by_username)
        .or(api_update_avatar)
}
