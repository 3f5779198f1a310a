//! # knockout-core
//!
//! This crate contains everything required to run a single elimination tournament: accepting
//! registrations, generating the bracket once enough participants are validated, resolving
//! matches from scores, advancing rounds and awarding badges.
//!
//! Important types:
//! - [`Tournament`]: The whole state of one tournament. This is what gets persisted.
//! - [`Bracket`]: The elimination tree. Consumes participants and scores, emits [`Update`]s.
//! - [`Registry`]: Registrations and their approval status.
//! - [`Records`]: Match history and badges. Badge grants are idempotent.
//! - [`Messages`]: Admin notices with per-participant read state.
//! - [`ActivityLog`]: The audit trail of admin actions.
//! - [`Entrants`]: A wrapper around `Vec<T>` where `T` is a participant in a bracket.
//! - [`EntrantSpot`]: A *spot* within a match, which can contain an entrant, be permanently empty
//! or contain a to-be-done spot.
//! - [`RoundTier`]: The name of a round (`quarterfinal`, `semifinal`, `final`, ...).
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to all state types.
//!
pub mod activity;
pub mod messages;
pub mod records;
pub mod registry;
pub mod render;
pub mod standings;
pub mod tier;
pub mod tournament;

mod bracket;

pub use activity::{Action, Activity, ActivityLog};
pub use bracket::{Bracket, Match, Round, Update};
pub use messages::{Message, Messages, Recipient};
pub use records::{Badge, BadgeTier, MatchHistoryRecord, MatchOutcome, Records};
pub use registry::{Registration, RegistrationStatus, Registry};
pub use tier::RoundTier;
pub use tournament::Tournament;

use thiserror::Error;

use std::ops::Deref;
use std::result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of participants a bracket is built for unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 8;

/// A registered player.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    #[inline]
    pub fn new<I, N>(id: I, name: N) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A wrapper around a `Vec<T>` where `T` should be considered an entrant of a bracket.
///
/// Matches refer to entrants by their index in this list. There is intentionally no way to get
/// mutable access to the list: entrants are fixed once a bracket has been generated.
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Entrants<T> {
    entrants: Vec<T>,
}

impl<T> Entrants<T> {
    /// Creates a new empty `Entrants` list.
    #[inline]
    pub fn new() -> Self {
        Self {
            entrants: Vec::new(),
        }
    }
}

impl<T> Deref for Entrants<T> {
    type Target = Vec<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.entrants
    }
}

impl<T> AsRef<[T]> for Entrants<T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        &self.entrants
    }
}

impl<T, U> PartialEq<U> for Entrants<T>
where
    T: PartialEq,
    U: AsRef<[T]>,
{
    #[inline]
    fn eq(&self, other: &U) -> bool {
        self.entrants == other.as_ref()
    }
}

impl<T> Eq for Entrants<T> where T: Eq {}

impl<T> From<Vec<T>> for Entrants<T> {
    #[inline]
    fn from(entrants: Vec<T>) -> Self {
        Self { entrants }
    }
}

/// A spot for an entrant in the bracket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntrantSpot<T> {
    Entrant(T),
    /// A bye. The spot stays empty forever.
    Empty,
    /// The spot is filled once an earlier match is resolved.
    TBD,
}

impl<T> EntrantSpot<T> {
    /// Creates a new `EntrantSpot` from an [`Option`]. A `Some(T)` value will translate into
    /// a `Entrant(T)` value, a `None` value will translate into a `Empty` value.
    pub fn new(entrant: Option<T>) -> Self {
        match entrant {
            Some(entrant) => Self::Entrant(entrant),
            None => Self::Empty,
        }
    }

    /// Returns a reference to the entrant, or `None` if the spot holds no entrant.
    ///
    /// # Examples
    ///
    /// ```
    /// # use knockout_core::EntrantSpot;
    /// assert_eq!(EntrantSpot::Entrant(3).entrant(), Some(&3));
    /// assert_eq!(EntrantSpot::<u32>::TBD.entrant(), None);
    /// ```
    pub fn entrant(&self) -> Option<&T> {
        match self {
            Self::Entrant(entrant) => Some(entrant),
            _ => None,
        }
    }

    /// Maps `EntrantSpot<T>` to `EntrantSpot<U>` by applying `f` on it.
    pub fn map<U, F>(self, f: F) -> EntrantSpot<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Entrant(entrant) => EntrantSpot::Entrant(f(entrant)),
            Self::Empty => EntrantSpot::Empty,
            Self::TBD => EntrantSpot::TBD,
        }
    }

    /// Maps `EntrantSpot<T>` to `EntrantSpot<U>` by applying `f` on it. If `f` returns `None`
    /// the spot becomes [`Empty`].
    ///
    /// [`Empty`]: Self::Empty
    pub fn and_then<U, F>(self, f: F) -> EntrantSpot<U>
    where
        F: FnOnce(T) -> Option<U>,
    {
        match self {
            Self::Entrant(entrant) => EntrantSpot::new(f(entrant)),
            Self::Empty => EntrantSpot::Empty,
            Self::TBD => EntrantSpot::TBD,
        }
    }
}

/// An `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid capacity {0}: expected a power of two of at least 2")]
    InvalidCapacity(usize),
    #[error("invalid reference: round {tier} has no match at slot {slot}")]
    InvalidReference { tier: RoundTier, slot: usize },
    #[error("too many participants: capacity is {capacity}, found {found}")]
    TooManyParticipants { capacity: usize, found: usize },
    #[error("duplicate participant: {0}")]
    DuplicateParticipant(String),
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),
    #[error("tournament is full: {capacity} participants are already validated")]
    TournamentFull { capacity: usize },
    #[error("the bracket has already been generated")]
    BracketStarted,
    #[error("capacity mismatch: registry holds {registry}, bracket holds {bracket}")]
    CapacityMismatch { registry: usize, bracket: usize },
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("unknown message: {0}")]
    UnknownMessage(u64),
    #[error("message {message} is not addressed to {participant}")]
    NotRecipient { message: u64, participant: String },
    #[error("a message needs a title and a content")]
    EmptyMessage,
}
