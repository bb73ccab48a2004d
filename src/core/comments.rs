//! Threaded comment ordering
//!
//! yt-dlp stores comments as a flat list where every entry points at its
//! parent ("root" for top-level ones). Pages show them as a forest: oldest
//! root first, each followed by its replies, depth-first.

use crate::error::{ArchiveError, Result};
use crate::types::{Comment, ROOT_COMMENT_PARENT};
use std::collections::HashSet;

/// Flatten comments into root-first, depth-first, chronological order.
///
/// Comments whose parent never appears are dropped. A parent chain that loops
/// back onto itself is reported as a data error.
pub fn sort_comments(comments: &[Comment]) -> Result<Vec<Comment>> {
    let mut ordered = Vec::with_capacity(comments.len());
    let mut ancestors = HashSet::new();
    append_children(comments, ROOT_COMMENT_PARENT, &mut ancestors, &mut ordered)?;
    Ok(ordered)
}

/// Direct replies to `parent_id`, oldest first; ties keep list order
fn children_of<'a>(comments: &'a [Comment], parent_id: &str) -> Vec<&'a Comment> {
    let mut children: Vec<&Comment> = comments
        .iter()
        .filter(|c| c.parent_id == parent_id)
        .collect();
    children.sort_by_key(|c| c.timestamp_seconds);
    children
}

fn append_children<'a>(
    comments: &'a [Comment],
    parent_id: &str,
    ancestors: &mut HashSet<&'a str>,
    ordered: &mut Vec<Comment>,
) -> Result<()> {
    for child in children_of(comments, parent_id) {
        if !ancestors.insert(child.id.as_str()) {
            return Err(ArchiveError::Data(format!(
                "comment {} is its own ancestor",
                child.id
            )));
        }

        ordered.push(child.clone());
        append_children(comments, &child.id, ancestors, ordered)?;

        ancestors.remove(child.id.as_str());
    }
    Ok(())
}
