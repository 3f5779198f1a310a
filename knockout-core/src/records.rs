//! Match history and badges.
//!
//! The [`Bracket`] only emits records, it never stores them. [`Records`] is the in-memory store
//! they are appended to.
//!
//! [`Bracket`]: crate::Bracket
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use crate::{RoundTier, Update};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl Display for MatchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => f.write_str("win"),
            Self::Loss => f.write_str("loss"),
        }
    }
}

/// A completed match seen from one of its participants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchHistoryRecord {
    pub participant: String,
    pub tier: RoundTier,
    pub opponent: String,
    pub opponent_name: String,
    pub score: u32,
    pub opponent_score: u32,
    pub outcome: MatchOutcome,
}

/// The achievement a [`Badge`] stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BadgeTier {
    Semifinalist,
    Finalist,
    Champion,
}

impl Display for BadgeTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semifinalist => f.write_str("semifinalist"),
            Self::Finalist => f.write_str("finalist"),
            Self::Champion => f.write_str("champion"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Badge {
    pub participant: String,
    pub tier: BadgeTier,
}

impl Badge {
    #[inline]
    pub fn new<T>(participant: T, tier: BadgeTier) -> Self
    where
        T: Into<String>,
    {
        Self {
            participant: participant.into(),
            tier,
        }
    }
}

/// The append-only history of all matches together with all badges granted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Records {
    history: Vec<MatchHistoryRecord>,
    badges: BTreeSet<Badge>,
}

impl Records {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_history(&mut self, record: MatchHistoryRecord) {
        self.history.push(record);
    }

    /// Grants a badge. Returns `false` if the participant already holds a badge of the same tier,
    /// in which case nothing changes.
    pub fn grant(&mut self, badge: Badge) -> bool {
        if self.badges.contains(&badge) {
            log::debug!(
                "{} already holds the {} badge, ignoring grant",
                badge.participant,
                badge.tier
            );

            return false;
        }

        log::info!("Granting {} badge to {}", badge.tier, badge.participant);
        self.badges.insert(badge)
    }

    /// Appends all records emitted by an [`Update`].
    pub fn apply(&mut self, update: &Update) {
        for record in &update.history {
            self.push_history(record.clone());
        }

        for badge in &update.badges {
            self.grant(badge.clone());
        }
    }

    /// Returns all history records in the order they were recorded.
    #[inline]
    pub fn history(&self) -> &[MatchHistoryRecord] {
        &self.history
    }

    /// Returns the history of the participant with the given `id`, most recent first.
    pub fn history_of<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a MatchHistoryRecord> + 'a {
        self.history
            .iter()
            .rev()
            .filter(move |record| record.participant == id)
    }

    #[inline]
    pub fn badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter()
    }

    pub fn badges_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = BadgeTier> + 'a {
        self.badges
            .iter()
            .filter(move |badge| badge.participant == id)
            .map(|badge| badge.tier)
    }
}
