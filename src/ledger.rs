//! Vote ledger and counter maintenance
//!
//! This module implements the one rule with real teeth in the system: each IP
//! address may vote for at most one idea, ever, and the denormalized
//! `votes_count` / `comments_count` fields on an idea must always equal the
//! number of vote/comment records referencing it.
//!
//! Both rules are enforced at the storage layer. The vote table is keyed by
//! IP, and every check/insert/counter-bump sequence runs inside a single redb
//! write transaction. redb allows one write transaction at a time and commits
//! atomically, so:
//! - two racing votes from the same IP serialize; the loser observes the
//!   winner's committed row instead of inserting a duplicate,
//! - concurrent counter bumps for the same idea cannot lose increments,
//! - a crash never leaves a vote or comment record committed without its
//!   counter bump (or vice versa).

use chrono::Utc;
use redb::{Database, ReadableTable, Table};

use crate::database::{TABLE_COMMENTS, TABLE_COMMENT_INDEX, TABLE_IDEAS, TABLE_VOTES};
use crate::error::AppError;
use crate::model::{new_id, Comment, CreateComment, Idea, Vote};

/// Result of a successful vote request
#[derive(Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// A new vote was recorded and the idea's counter incremented
    Recorded,
    /// This IP already voted for this same idea; nothing changed
    AlreadyVoted,
}

/// Casts a vote for `idea_id` on behalf of `ip`
///
/// The first idea an IP votes for becomes permanently bound to that IP:
/// - no prior vote: record it, bump `votes_count`, return [`VoteOutcome::Recorded`]
/// - prior vote for the same idea: idempotent, return [`VoteOutcome::AlreadyVoted`]
/// - prior vote for a different idea: [`AppError::Forbidden`]
/// - unknown idea: [`AppError::NotFound`]
///
/// Everything happens inside one write transaction; an early error return
/// drops the transaction, which rolls it back.
pub fn cast_vote(db: &Database, idea_id: &str, ip: &str) -> Result<VoteOutcome, AppError> {
    let write_txn = db.begin_write()?;
    let outcome = {
        let mut ideas = write_txn.open_table(TABLE_IDEAS)?;
        let mut idea = match read_idea(&ideas, idea_id)? {
            Some(idea) => idea,
            None => return Err(AppError::NotFound("idea".to_string())),
        };

        let mut votes = write_txn.open_table(TABLE_VOTES)?;
        let existing: Option<Vote> = match votes.get(ip)? {
            Some(guard) => Some(serde_json::from_str(guard.value())?),
            None => None,
        };

        match existing {
            Some(vote) if vote.post_id == idea_id => VoteOutcome::AlreadyVoted,
            Some(_) => {
                return Err(AppError::Forbidden(
                    "this IP has already voted for another idea".to_string(),
                ))
            }
            None => {
                let vote = Vote {
                    post_id: idea_id.to_string(),
                    ip: ip.to_string(),
                    created_at: Utc::now(),
                };
                votes.insert(ip, serde_json::to_string(&vote)?.as_str())?;

                idea.votes_count += 1;
                idea.updated_at = Utc::now();
                store_idea(&mut ideas, &idea)?;

                VoteOutcome::Recorded
            }
        }
    };
    write_txn.commit()?;
    Ok(outcome)
}

/// Records a comment and bumps the idea's `comments_count`
///
/// Fails with [`AppError::NotFound`] if `post_id` does not reference an
/// existing idea; in that case no comment record is written. The comment row,
/// its index entry and the counter bump commit together.
pub fn record_comment(db: &Database, payload: CreateComment) -> Result<Comment, AppError> {
    let write_txn = db.begin_write()?;
    let comment = {
        let mut ideas = write_txn.open_table(TABLE_IDEAS)?;
        let mut idea = match read_idea(&ideas, &payload.post_id)? {
            Some(idea) => idea,
            None => return Err(AppError::NotFound("idea".to_string())),
        };

        let now = Utc::now();
        let comment = Comment {
            id: new_id(),
            post_id: payload.post_id,
            author: payload.author,
            text: payload.text,
            created_at: now,
            updated_at: now,
        };
        let comment_json = serde_json::to_string(&comment)?;

        let mut comments = write_txn.open_table(TABLE_COMMENTS)?;
        comments.insert(comment.id.as_str(), comment_json.as_str())?;

        let mut index = write_txn.open_table(TABLE_COMMENT_INDEX)?;
        index.insert(comment_index_key(&comment).as_str(), comment_json.as_str())?;

        idea.comments_count += 1;
        idea.updated_at = now;
        store_idea(&mut ideas, &idea)?;

        comment
    };
    write_txn.commit()?;
    Ok(comment)
}

/// Builds the composite index key for a comment: chronological within one
/// idea, unique via the comment id suffix
pub fn comment_index_key(comment: &Comment) -> String {
    format!(
        "{}:{}:{}",
        comment.post_id,
        comment.created_at.timestamp_micros(),
        comment.id
    )
}

fn read_idea<T>(table: &T, id: &str) -> Result<Option<Idea>, AppError>
where
    T: ReadableTable<&'static str, &'static str>,
{
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
        None => Ok(None),
    }
}

fn store_idea(
    table: &mut Table<'_, &'static str, &'static str>,
    idea: &Idea,
) -> Result<(), AppError> {
    table.insert(idea.id.as_str(), serde_json::to_string(idea)?.as_str())?;
    Ok(())
}
