//! The audit trail of admin actions.
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Action {
    Validated,
    Rejected,
    Removed,
    BracketGenerated,
    ScoreUpdated,
    MessagePosted,
    MessageDeleted,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validated => "VALIDATED",
            Self::Rejected => "REJECTED",
            Self::Removed => "REMOVED",
            Self::BracketGenerated => "BRACKET_GENERATED",
            Self::ScoreUpdated => "SCORE_UPDATED",
            Self::MessagePosted => "MESSAGE_POSTED",
            Self::MessageDeleted => "MESSAGE_DELETED",
        };

        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Activity {
    pub action: Action,
    pub details: String,
    pub at: DateTime<Utc>,
}

/// An append-only list of [`Activity`] entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActivityLog {
    entries: Vec<Activity>,
}

impl ActivityLog {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<D>(&mut self, action: Action, details: D, at: DateTime<Utc>)
    where
        D: Into<String>,
    {
        let details = details.into();
        log::info!("{}: {}", action, details);

        self.entries.push(Activity {
            action,
            details,
            at,
        });
    }

    /// Returns all entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.entries.iter().rev()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
