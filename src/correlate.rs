//! Correlation between a parsed feed and its redacted counterpart
//!
//! Two strategies are offered. Ordinal pairing assumes both feeds hold the
//! same records in the same order and refuses to pair when the record counts
//! differ. Control-id pairing parses both feeds and joins on the header
//! control id, so drift between the feeds shows up as unmatched records.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{Hl7Error, Result};
use crate::models::Message;
use crate::redacted::RedactedBlocks;

/// A parsed message and the redacted block at the same ordinal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrdinalPair<'a> {
    pub ordinal: usize,
    pub message: &'a Message,
    pub redacted: &'a str,
}

/// Pair messages with redacted blocks by parse position.
///
/// The message at index `i` pairs with ordinal `i + 1`. Fails with
/// [`Hl7Error::OrdinalMismatch`] when the counts differ.
pub fn pair_by_ordinal<'a>(
    messages: &'a [Message],
    blocks: &'a RedactedBlocks,
) -> Result<Vec<OrdinalPair<'a>>> {
    if messages.len() != blocks.len() {
        warn!(
            "Refusing ordinal pairing: {} messages vs {} redacted blocks",
            messages.len(),
            blocks.len()
        );
        return Err(Hl7Error::OrdinalMismatch {
            primary: messages.len(),
            redacted: blocks.len(),
        });
    }

    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let ordinal = index + 1;
            blocks
                .get(ordinal)
                .map(|redacted| OrdinalPair {
                    ordinal,
                    message,
                    redacted,
                })
                .ok_or_else(|| Hl7Error::OrdinalMismatch {
                    primary: messages.len(),
                    redacted: blocks.len(),
                })
        })
        .collect()
}

/// Result of joining two parsed feeds on the header control id
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControlIdJoin<'a> {
    /// `(primary, redacted)` pairs in primary order
    pub pairs: Vec<(&'a Message, &'a Message)>,

    /// Primary messages with no redacted counterpart (or no control id)
    pub unmatched_primary: Vec<&'a Message>,

    /// Redacted messages with no primary counterpart (or no control id)
    pub unmatched_redacted: Vec<&'a Message>,
}

impl ControlIdJoin<'_> {
    /// Whether every message on both sides found a partner
    pub fn is_complete(&self) -> bool {
        self.unmatched_primary.is_empty() && self.unmatched_redacted.is_empty()
    }
}

/// Join two parsed feeds on the header control id.
///
/// Messages with an empty control id cannot be keyed and are reported as
/// unmatched. A control id that appears twice in either feed is an error.
pub fn pair_by_control_id<'a>(
    primary: &'a [Message],
    redacted: &'a [Message],
) -> Result<ControlIdJoin<'a>> {
    index_by_control_id(primary, "primary")?;
    let redacted_index = index_by_control_id(redacted, "redacted")?;

    let mut join = ControlIdJoin::default();
    let mut matched = vec![false; redacted.len()];

    for message in primary {
        match redacted_index.get(message.control_id.as_str()) {
            Some(&index) if !message.control_id.is_empty() => {
                matched[index] = true;
                join.pairs.push((message, &redacted[index]));
            }
            _ => join.unmatched_primary.push(message),
        }
    }

    join.unmatched_redacted = redacted
        .iter()
        .zip(&matched)
        .filter(|(_, matched)| !**matched)
        .map(|(message, _)| message)
        .collect();

    debug!(
        "Control id join: {} pairs, {} unmatched primary, {} unmatched redacted",
        join.pairs.len(),
        join.unmatched_primary.len(),
        join.unmatched_redacted.len()
    );
    Ok(join)
}

fn index_by_control_id<'a>(
    messages: &'a [Message],
    stream: &str,
) -> Result<HashMap<&'a str, usize>> {
    let mut index = HashMap::with_capacity(messages.len());
    for (position, message) in messages.iter().enumerate() {
        if message.control_id.is_empty() {
            continue;
        }
        if index.insert(message.control_id.as_str(), position).is_some() {
            return Err(Hl7Error::duplicate_control_id(&message.control_id, stream));
        }
    }
    Ok(index)
}
