//! # Bracket Rendering
//!
//! The `render` module provides types to render a [`Bracket`] without knowing how it is stored.
//!
//! A [`Renderer`] receives all rounds of the bracket from the first round to the final,
//! including rounds that were not created yet. Matches of those rounds have [`EntrantSpot::TBD`]
//! entrants.
use crate::{Bracket, EntrantSpot, Participant, RoundTier};

/// A renderer used to render a [`Bracket`].
pub trait Renderer {
    fn render(&mut self, rounds: Rounds<'_>);
}

/// An iterator over all rounds of a [`Bracket`].
#[derive(Clone, Debug)]
pub struct Rounds<'a> {
    bracket: &'a Bracket,
    next: usize,
}

impl<'a> Rounds<'a> {
    pub(crate) fn new(bracket: &'a Bracket) -> Self {
        Self { bracket, next: 0 }
    }
}

impl<'a> Iterator for Rounds<'a> {
    type Item = Round<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.bracket.num_rounds() {
            return None;
        }

        let index = self.next;
        self.next += 1;

        Some(Round {
            bracket: self.bracket,
            tier: self.bracket.tier(index),
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.bracket.num_rounds().saturating_sub(self.next);
        (len, Some(len))
    }
}

impl<'a> ExactSizeIterator for Rounds<'a> {}

#[derive(Clone, Debug)]
pub struct Round<'a> {
    bracket: &'a Bracket,
    pub tier: RoundTier,
    index: usize,
}

impl<'a> Round<'a> {
    /// Returns `true` if the round was already created.
    pub fn is_created(&self) -> bool {
        self.index < self.bracket.rounds().len()
    }

    /// Returns the matches of the round in slot order.
    pub fn matches(&self) -> impl Iterator<Item = Match<'a>> + 'a {
        let bracket = self.bracket;
        let num_matches = self.tier.num_matches();
        let round = bracket.rounds().get(self.index);

        (0..num_matches).map(move |slot| {
            let entrant = move |spot: &EntrantSpot<usize>| {
                spot.and_then(|index| bracket.entrants().get(index))
            };

            match round.and_then(|round| round.matches().get(slot)) {
                Some(m) => Match {
                    slot,
                    entrants: [entrant(&m[0]), entrant(&m[1])],
                    scores: m.scores(),
                    winner: m.winner().and_then(|index| bracket.entrants().get(index)),
                },
                None => Match {
                    slot,
                    entrants: [EntrantSpot::TBD, EntrantSpot::TBD],
                    scores: [0, 0],
                    winner: None,
                },
            }
        })
    }
}

/// A match with the entrants resolved to their [`Participant`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Match<'a> {
    pub slot: usize,
    pub entrants: [EntrantSpot<&'a Participant>; 2],
    pub scores: [u32; 2],
    pub winner: Option<&'a Participant>,
}
