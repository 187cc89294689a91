use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{DbPool, Tag};
use crate::db_photos::FeedScope;
use crate::feed;
use crate::warp_helpers::{db_rejection, request_base_url};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Kept as a raw string so junk input falls back to page 1 instead of
    /// failing query deserialization.
    pub page: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(rename = "timeRange")]
    pub time_range: Option<String>,
}

/// Recency windows for trending-tag ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeRange {
    /// Unrecognized and absent values fall back to all-time.
    pub fn parse(raw: Option<&str>) -> TimeRange {
        match raw {
            Some("1d") => TimeRange::Day,
            Some("7d") => TimeRange::Week,
            Some("30d") => TimeRange::Month,
            Some("1y") => TimeRange::Year,
            _ => TimeRange::All,
        }
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::Day => now - Duration::days(1),
            TimeRange::Week => now - Duration::days(7),
            TimeRange::Month => now - Duration::days(30),
            TimeRange::Year => now - Duration::days(365),
            TimeRange::All => DateTime::UNIX_EPOCH,
        }
    }
}

pub async fn get_feed(
    query: FeedQuery,
    host: Option<String>,
    _auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let page = feed::parse_page(query.page.as_deref());
    let search = feed::normalize_search(query.search.as_deref());
    let base_url = request_base_url(host.as_deref(), &config);

    let result = feed::get_feed(
        &db_pool,
        FeedScope::Global,
        page,
        search.as_deref(),
        &base_url,
    )
    .map_err(db_rejection)?;

    Ok(warp::reply::json(&result))
}

pub async fn get_following_feed(
    query: FeedQuery,
    host: Option<String>,
    auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let page = feed::parse_page(query.page.as_deref());
    let search = feed::normalize_search(query.search.as_deref());
    let base_url = request_base_url(host.as_deref(), &config);

    let result = feed::get_following_feed(&db_pool, &auth.id, page, search.as_deref(), &base_url)
        .map_err(db_rejection)?;

    Ok(warp::reply::json(&result))
}

pub async fn get_trending_tags(
    query: TrendingQuery,
    _auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let range = TimeRange::parse(query.time_range.as_deref());
    let window_start = range.window_start(Utc::now());

    let tags = Tag::trending(&db_pool, window_start).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({ "tags": tags })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_parsing_falls_back_to_all() {
        assert_eq!(TimeRange::parse(Some("1d")), TimeRange::Day);
        assert_eq!(TimeRange::parse(Some("7d")), TimeRange::Week);
        assert_eq!(TimeRange::parse(Some("30d")), TimeRange::Month);
        assert_eq!(TimeRange::parse(Some("1y")), TimeRange::Year);
        assert_eq!(TimeRange::parse(Some("all")), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("2w")), TimeRange::All);
        assert_eq!(TimeRange::parse(None), TimeRange::All);
    }

    #[test]
    fn window_start_bounds() {
        let now = Utc::now();
        assert_eq!(TimeRange::Day.window_start(now), now - Duration::days(1));
        assert_eq!(TimeRange::All.window_start(now), DateTime::UNIX_EPOCH);
    }
}
