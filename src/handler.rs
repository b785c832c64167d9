//! HTTP request handlers for the idea board API
//!
//! This module implements the request-facing plumbing:
//! - Submitting ideas and listing them with timeframe/sort/limit
//! - Fetching a single idea with its comments, newest first
//! - Submitting comments and casting votes (delegated to the ledger)
//! - Seeding sample ideas into an empty store

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde_json::json;
use std::net::SocketAddr;

use crate::database::{AppState, TABLE_COMMENT_INDEX, TABLE_IDEAS};
use crate::error::AppError;
use crate::ledger::{self, VoteOutcome};
use crate::model::{Comment, CreateComment, CreateIdea, Idea, ListParams};

/// Liveness probe reporting whether the store is reachable
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.begin_read() {
        Ok(_) => "connected",
        Err(_) => "unavailable",
    };
    Json(json!({
        "message": "ideaboard API running",
        "database": database,
    }))
}

/// Creates a new idea
///
/// # Request Body
///
/// ```json
/// {
///   "title": "CLI to full SaaS",
///   "description": "Paste a CLI tool and generate a hosted service.",
///   "link": "https://example.com"  // Optional
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - the stored record, counters at zero
/// - **400 Bad Request** - a field violates its length/format constraint
pub async fn create_idea(
    State(state): State<AppState>,
    Json(payload): Json<CreateIdea>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let idea = payload.into_idea();
    let record_json = serde_json::to_string(&idea)?;

    let write_txn = state.db.begin_write()?;
    {
        let mut table = write_txn.open_table(TABLE_IDEAS)?;
        table.insert(idea.id.as_str(), record_json.as_str())?;
    }
    write_txn.commit()?;

    Ok((StatusCode::CREATED, Json(idea)))
}

/// Lists ideas with a recency filter and sort order
///
/// # Query Parameters
///
/// - `timeframe` - "week" (default), "month" or "all"
/// - `sort` - "votes" (default), "comments" or "recent", all descending
/// - `limit` - maximum items returned (default 50)
///
/// The store is embedded, so this scans the idea table and sorts in memory.
pub async fn list_ideas(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let timeframe = params.timeframe.as_deref().unwrap_or("week");
    let sort = params.sort.as_deref().unwrap_or("votes");
    let limit = params.limit.unwrap_or(50);

    let cutoff = match timeframe {
        "week" => Some(Utc::now() - Duration::days(7)),
        "month" => Some(Utc::now() - Duration::days(30)),
        // "all" and anything unrecognized: no filter
        _ => None,
    };

    let read_txn = state.db.begin_read()?;
    let table = read_txn.open_table(TABLE_IDEAS)?;

    let mut items: Vec<Idea> = table
        .iter()?
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<Idea>(value.value()).ok())
        })
        .filter(|idea| cutoff.is_none_or(|c| idea.created_at >= c))
        .collect();

    match sort {
        "comments" => items.sort_by(|a, b| b.comments_count.cmp(&a.comments_count)),
        "recent" => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        _ => items.sort_by(|a, b| b.votes_count.cmp(&a.votes_count)),
    }
    items.truncate(limit);

    Ok(Json(json!({ "items": items })))
}

/// Fetches one idea together with its comments, newest first
///
/// # Response
///
/// - **200 OK** - `{"idea": {...}, "comments": [...]}`
/// - **404 Not Found** - no idea with this id
pub async fn get_idea(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let read_txn = state.db.begin_read()?;
    let ideas = read_txn.open_table(TABLE_IDEAS)?;

    let idea: Idea = match ideas.get(id.as_str())? {
        Some(guard) => serde_json::from_str(guard.value())?,
        None => return Err(AppError::NotFound("idea".to_string())),
    };

    // Range over the composite "{post_id}:{timestamp}:{id}" keys; ':' bounds
    // the prefix because '{' sorts after every character used in the keys.
    let index = read_txn.open_table(TABLE_COMMENT_INDEX)?;
    let start_key = format!("{}:", id);
    let end_key = format!("{}:{{", id);
    let comments: Vec<Comment> = index
        .range(start_key.as_str()..end_key.as_str())?
        .rev()
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<Comment>(value.value()).ok())
        })
        .collect();

    Ok(Json(json!({ "idea": idea, "comments": comments })))
}

/// Creates a comment on an existing idea
///
/// # Response
///
/// - **201 Created** - the stored comment
/// - **400 Bad Request** - author/text out of bounds
/// - **404 Not Found** - `post_id` does not reference an idea
pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CreateComment>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let comment = ledger::record_comment(&state.db, payload)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Casts a vote for an idea on behalf of the requesting IP
///
/// Voter identity is the first entry of `x-forwarded-for` when the header is
/// present, otherwise the peer address of the connection.
///
/// # Response
///
/// - **200 OK** - `{"status": "ok", "ip": ...}` for a new vote, or
///   `{"status": "already_voted", "ip": ...}` when this IP already voted for
///   this same idea
/// - **403 Forbidden** - this IP is bound to a different idea
/// - **404 Not Found** - no idea with this id
pub async fn vote_idea(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let ip = client_ip(&headers, addr);
    let outcome = ledger::cast_vote(&state.db, &id, &ip)?;

    let status = match outcome {
        VoteOutcome::Recorded => "ok",
        VoteOutcome::AlreadyVoted => "already_voted",
    };
    Ok(Json(json!({ "status": status, "ip": ip })))
}

/// Seeds sample ideas, but only into an empty store
///
/// # Response
///
/// `{"status": "seeded", "count": 3}` when the idea table was empty,
/// `{"status": "skipped", "count": <existing>}` otherwise.
pub async fn seed(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let write_txn = state.db.begin_write()?;
    let response = {
        let mut table = write_txn.open_table(TABLE_IDEAS)?;
        let existing = table.iter()?.count();
        if existing > 0 {
            json!({ "status": "skipped", "count": existing })
        } else {
            let samples = sample_ideas();
            let count = samples.len();
            for idea in &samples {
                table.insert(idea.id.as_str(), serde_json::to_string(idea)?.as_str())?;
            }
            json!({ "status": "seeded", "count": count })
        }
    };
    write_txn.commit()?;
    Ok(Json(response))
}

/// Extracts the voter identity from the forwarded-for header (first entry)
/// or falls back to the connection peer address
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

fn sample_ideas() -> Vec<Idea> {
    let samples = [
        (
            "Changelog Digest Bot",
            "Subscribe to your dependencies and get a weekly digest of breaking changes that actually affect your lockfile.",
            Some("https://github.com"),
        ),
        (
            "Screenshot to Bug Report",
            "Drop a screenshot and get a reproducible bug report with environment details filled in.",
            Some("https://example.com"),
        ),
        (
            "Standup Notes from Commits",
            "Turn yesterday's commit history into a three-line standup summary.",
            None,
        ),
    ];

    samples
        .into_iter()
        .map(|(title, description, link)| {
            CreateIdea {
                title: title.to_string(),
                description: description.to_string(),
                link: link.map(str::to_string),
            }
            .into_idea()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_first_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "1.2.3.4, 10.0.0.1".parse().unwrap());
        let peer = SocketAddr::from(([127, 0, 0, 1], 9000));
        assert_eq!(client_ip(&headers, peer), "1.2.3.4");
    }

    #[test]
    fn empty_forwarded_for_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "".parse().unwrap());
        let peer = SocketAddr::from(([192, 168, 1, 7], 9000));
        assert_eq!(client_ip(&headers, peer), "192.168.1.7");
    }

    #[test]
    fn missing_forwarded_for_uses_peer() {
        let headers = HeaderMap::new();
        let peer = SocketAddr::from(([10, 1, 1, 1], 443));
        assert_eq!(client_ip(&headers, peer), "10.1.1.1");
    }
}
