//! Message lookup, sorting and pagination
//!
//! Query helpers over an in-memory parse result: stable sorting on the
//! summary columns, the patient detail filter, and manual pagination.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::Message;

/// Summary column to sort messages by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Timestamp,
    PatientId,
    LastName,
    FirstName,
    Facility,
    MessageType,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Id,
        SortKey::Timestamp,
        SortKey::PatientId,
        SortKey::LastName,
        SortKey::FirstName,
        SortKey::Facility,
        SortKey::MessageType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Timestamp => "timestamp",
            SortKey::PatientId => "patient_id",
            SortKey::LastName => "last_name",
            SortKey::FirstName => "first_name",
            SortKey::Facility => "facility",
            SortKey::MessageType => "message_type",
        }
    }

    /// Compare two messages on this column
    pub fn compare(&self, a: &Message, b: &Message) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Timestamp => a.timestamp.value().cmp(&b.timestamp.value()),
            SortKey::PatientId => a.patient_id().cmp(b.patient_id()),
            SortKey::LastName => a.last_name().cmp(b.last_name()),
            SortKey::FirstName => a.first_name().cmp(b.first_name()),
            SortKey::Facility => a.facility.cmp(&b.facility),
            SortKey::MessageType => a.message_type.cmp(&b.message_type),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SortKey::ALL
            .iter()
            .find(|key| key.as_str() == normalized)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "Invalid sort key '{}'. Valid keys: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Messages ordered by `key`; ties keep their parse order
pub fn sorted(messages: &[Message], key: SortKey, order: SortOrder) -> Vec<&Message> {
    let mut view: Vec<&Message> = messages.iter().collect();
    view.sort_by(|a, b| match order {
        SortOrder::Ascending => key.compare(a, b),
        SortOrder::Descending => key.compare(b, a),
    });
    view
}

/// Messages for one patient at one facility, matched exactly
pub fn filter_for_patient<'a>(
    messages: &'a [Message],
    patient_id: &str,
    facility: &str,
) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| m.patient.is_some() && m.patient_id() == patient_id && m.facility == facility)
        .collect()
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],

    /// 1-based page number actually served
    pub page: usize,

    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice out a 1-based page, clamping out-of-range page numbers
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * per_page).min(total_items);
    let end = (start + per_page).min(total_items);

    Page {
        items: &items[start..end],
        page,
        per_page,
        total_items,
        total_pages,
    }
}
