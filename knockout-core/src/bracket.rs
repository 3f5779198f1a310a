use crate::records::{Badge, BadgeTier, MatchHistoryRecord, MatchOutcome};
use crate::render::{Renderer, Rounds};
use crate::standings::Standings;
use crate::{EntrantSpot, Entrants, Error, Participant, Result, RoundTier};

use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A match between two spots. Entrants are referred to by their index in the [`Entrants`] of
/// the [`Bracket`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    entrants: [EntrantSpot<usize>; 2],
    scores: [u32; 2],
    winner: Option<usize>,
}

impl Match {
    /// Creates a new unstarted `Match` with a score of 0-0.
    #[inline]
    pub fn new(entrants: [EntrantSpot<usize>; 2]) -> Self {
        Self {
            entrants,
            scores: [0, 0],
            winner: None,
        }
    }

    #[inline]
    pub fn entrants(&self) -> &[EntrantSpot<usize>; 2] {
        &self.entrants
    }

    #[inline]
    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Returns the index of the winning entrant. `None` until the scores diverge.
    #[inline]
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Returns the index of the losing entrant. `None` if the match has no winner or the winner
    /// had no opponent.
    pub fn loser(&self) -> Option<usize> {
        let position = self.winner_position()?;
        self.entrants[1 - position].entrant().copied()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    /// Overwrites both scores and resolves the winner. The entrant with the strictly higher
    /// score wins, a tie leaves the match without a winner.
    pub fn set_scores(&mut self, scores: [u32; 2]) {
        self.scores = scores;

        self.winner = match scores[0].cmp(&scores[1]) {
            Ordering::Greater => self.entrants[0].entrant().copied(),
            Ordering::Less => self.entrants[1].entrant().copied(),
            Ordering::Equal => None,
        };
    }

    fn winner_position(&self) -> Option<usize> {
        let winner = self.winner?;

        self.entrants
            .iter()
            .position(|spot| spot.entrant() == Some(&winner))
    }
}

impl Index<usize> for Match {
    type Output = EntrantSpot<usize>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.entrants[index]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Round {
    tier: RoundTier,
    matches: Vec<Match>,
}

impl Round {
    #[inline]
    pub fn tier(&self) -> RoundTier {
        self.tier
    }

    #[inline]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Returns `true` if every match in the round has a winner.
    pub fn is_resolved(&self) -> bool {
        self.matches.iter().all(Match::is_resolved)
    }
}

/// The records emitted by a single score update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Update {
    /// One record per participant of the updated match, if the update resolved it.
    pub history: Vec<MatchHistoryRecord>,
    /// Badges earned by the update. Badges may already be held, granting them is idempotent.
    pub badges: Vec<Badge>,
    /// The tier of the round created by the update, if any.
    pub advanced: Option<RoundTier>,
}

/// A single elimination bracket.
///
/// The bracket is created empty with a fixed capacity. Rounds are created lazily: the first
/// round once [`generate`] receives `capacity` participants, every following round once all
/// matches of the round before have a winner.
///
/// [`generate`]: Self::generate
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "BracketState"))]
pub struct Bracket {
    capacity: usize,
    entrants: Entrants<Participant>,
    rounds: Vec<Round>,
    winner: Option<usize>,
}

impl Bracket {
    /// Creates a new empty `Bracket` for `capacity` participants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is not a power of two of at least 2.
    pub fn new(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;

        Ok(Self {
            capacity,
            entrants: Entrants::new(),
            rounds: Vec::new(),
            winner: None,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of rounds the bracket has once it is complete.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.capacity.trailing_zeros() as usize
    }

    /// Returns the tier of the round at `index`, counting from the first round.
    #[inline]
    pub fn tier(&self, index: usize) -> RoundTier {
        RoundTier::from_participants(self.capacity >> index)
    }

    #[inline]
    pub fn entrants(&self) -> &Entrants<Participant> {
        &self.entrants
    }

    /// Returns the rounds created so far.
    #[inline]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, tier: RoundTier) -> Option<&Round> {
        self.rounds.iter().find(|round| round.tier == tier)
    }

    pub fn get(&self, tier: RoundTier, slot: usize) -> Option<&Match> {
        self.round(tier)?.matches.get(slot)
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        !self.rounds.is_empty()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Returns the champion once the final is resolved.
    pub fn winner(&self) -> Option<&Participant> {
        self.winner.and_then(|index| self.entrants.get(index))
    }

    /// Generates the first round from `participants`, pairing them in the given order: the
    /// entrants at positions 0 and 1 play the first match, 2 and 3 the second and so on.
    ///
    /// Returns `true` if the bracket was generated by this call. Generating does nothing and
    /// returns `false` if the bracket was already generated or if fewer than
    /// [`capacity`](Self::capacity) participants are given.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if more than `capacity` participants are given or if two
    /// participants share an id.
    pub fn generate<I>(&mut self, participants: I) -> Result<bool>
    where
        I: IntoIterator<Item = Participant>,
    {
        if self.is_generated() {
            log::debug!("Bracket is already generated, keeping existing rounds");
            return Ok(false);
        }

        let participants: Vec<Participant> = participants.into_iter().collect();

        match participants.len().cmp(&self.capacity) {
            Ordering::Less => {
                log::debug!(
                    "Not generating bracket: {} of {} participants",
                    participants.len(),
                    self.capacity
                );

                return Ok(false);
            }
            Ordering::Greater => {
                return Err(Error::TooManyParticipants {
                    capacity: self.capacity,
                    found: participants.len(),
                });
            }
            Ordering::Equal => (),
        }

        let mut ids = HashSet::with_capacity(participants.len());
        for participant in &participants {
            if !ids.insert(participant.id.as_str()) {
                return Err(Error::DuplicateParticipant(participant.id.clone()));
            }
        }

        let matches = (0..self.capacity / 2)
            .map(|slot| {
                Match::new([
                    EntrantSpot::Entrant(slot * 2),
                    EntrantSpot::Entrant(slot * 2 + 1),
                ])
            })
            .collect();

        let tier = self.tier(0);
        self.entrants = participants.into();
        self.rounds.push(Round { tier, matches });

        log::debug!(
            "Generated bracket with {} entrants, first round is {}",
            self.entrants.len(),
            tier
        );

        Ok(true)
    }

    /// Overwrites the scores of the match at `slot` in the round `tier`.
    ///
    /// If the update resolves the match, one history record per participant is emitted and
    /// badges are handed out for semifinal and final results. If every match of the round is
    /// resolved afterwards and the next round does not exist yet, it is created from the
    /// winners in slot order. Resolving the final sets the [`winner`](Self::winner).
    ///
    /// Matches can be rescored at any time. Rounds that were already created from a rescored
    /// match are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if the round does not exist (yet) or has no match
    /// at `slot`.
    pub fn update_score(
        &mut self,
        tier: RoundTier,
        slot: usize,
        scores: [u32; 2],
    ) -> Result<Update> {
        let round = self
            .rounds
            .iter()
            .position(|round| round.tier == tier)
            .ok_or(Error::InvalidReference { tier, slot })?;

        let (previous, current) = {
            let r#match = self.rounds[round]
                .matches
                .get_mut(slot)
                .ok_or(Error::InvalidReference { tier, slot })?;

            let previous = r#match.clone();
            r#match.set_scores(scores);

            (previous, r#match.clone())
        };

        log::debug!(
            "Updated {} match {}: {}-{}, winner: {:?}",
            tier,
            slot,
            scores[0],
            scores[1],
            current.winner
        );

        let is_final = round + 1 == self.num_rounds();
        let has_next = round + 1 < self.rounds.len();

        if has_next && previous.winner != current.winner {
            log::warn!(
                "Winner of {} match {} changed, the existing {} round is not updated",
                tier,
                slot,
                self.rounds[round + 1].tier
            );
        }

        let mut update = Update::default();

        if current.is_resolved() && current != previous {
            update.history = self.history_records(tier, &current);
            update.badges = self.badges(tier, &current);
        }

        if is_final {
            self.winner = current.winner;

            if let Some(winner) = self.winner() {
                log::info!("{} won the tournament", winner.name);
            }
        } else if !has_next && self.rounds[round].is_resolved() {
            update.advanced = Some(self.advance(round));
        }

        Ok(update)
    }

    /// Returns the final placements of all entrants that were eliminated or won.
    pub fn standings(&self) -> Standings {
        Standings::new(self)
    }

    /// Renders the bracket using the given [`Renderer`].
    pub fn render<R>(&self, renderer: &mut R)
    where
        R: Renderer,
    {
        renderer.render(Rounds::new(self));
    }

    /// Creates the round after `round` from its winners.
    fn advance(&mut self, round: usize) -> RoundTier {
        let winners: Vec<usize> = self.rounds[round]
            .matches
            .iter()
            .filter_map(Match::winner)
            .collect();

        let matches = winners
            .chunks(2)
            .map(|pair| {
                Match::new([
                    EntrantSpot::Entrant(pair[0]),
                    EntrantSpot::new(pair.get(1).copied()),
                ])
            })
            .collect();

        let tier = self.tier(round + 1);
        self.rounds.push(Round { tier, matches });

        log::info!("All {} matches resolved, created {}", self.rounds[round].tier, tier);

        tier
    }

    fn history_records(&self, tier: RoundTier, r#match: &Match) -> Vec<MatchHistoryRecord> {
        let mut records = Vec::with_capacity(2);

        for position in 0..2 {
            let (index, opponent) = match (r#match[position], r#match[1 - position]) {
                (EntrantSpot::Entrant(index), EntrantSpot::Entrant(opponent)) => (index, opponent),
                _ => continue,
            };

            let (participant, opponent) =
                match (self.entrants.get(index), self.entrants.get(opponent)) {
                    (Some(participant), Some(opponent)) => (participant, opponent),
                    _ => continue,
                };

            records.push(MatchHistoryRecord {
                participant: participant.id.clone(),
                tier,
                opponent: opponent.id.clone(),
                opponent_name: opponent.name.clone(),
                score: r#match.scores[position],
                opponent_score: r#match.scores[1 - position],
                outcome: if r#match.winner == Some(index) {
                    MatchOutcome::Win
                } else {
                    MatchOutcome::Loss
                },
            });
        }

        records
    }

    fn badges(&self, tier: RoundTier, r#match: &Match) -> Vec<Badge> {
        let id = |index: Option<usize>| {
            index
                .and_then(|index| self.entrants.get(index))
                .map(|participant| participant.id.clone())
        };

        let mut badges = Vec::new();

        match tier {
            RoundTier::Semifinal => {
                if let Some(loser) = id(r#match.loser()) {
                    badges.push(Badge::new(loser, BadgeTier::Semifinalist));
                }
            }
            RoundTier::Final => {
                if let Some(winner) = id(r#match.winner) {
                    badges.push(Badge::new(winner, BadgeTier::Champion));
                }

                if let Some(loser) = id(r#match.loser()) {
                    badges.push(Badge::new(loser, BadgeTier::Finalist));
                }
            }
            _ => (),
        }

        badges
    }
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity < 2 || !capacity.is_power_of_two() {
        return Err(Error::InvalidCapacity(capacity));
    }

    Ok(())
}

/// The unchecked form of a [`Bracket`] as it is stored.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(rename = "Bracket")]
struct BracketState {
    capacity: usize,
    entrants: Entrants<Participant>,
    rounds: Vec<Round>,
    winner: Option<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<BracketState> for Bracket {
    type Error = Error;

    fn try_from(state: BracketState) -> Result<Self> {
        check_capacity(state.capacity)?;

        let num_rounds = state.capacity.trailing_zeros() as usize;
        if state.rounds.len() > num_rounds {
            return Err(Error::InvalidState("bracket has more rounds than its capacity allows"));
        }

        if !state.rounds.is_empty() && state.entrants.len() != state.capacity {
            return Err(Error::InvalidState("bracket entrants do not match its capacity"));
        }

        if state.winner.map_or(false, |index| index >= state.entrants.len()) {
            return Err(Error::InvalidState("bracket winner is not an entrant"));
        }

        Ok(Self {
            capacity: state.capacity,
            entrants: state.entrants,
            rounds: state.rounds,
            winner: state.winner,
        })
    }
}
