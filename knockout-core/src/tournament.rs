use chrono::Utc;

use crate::activity::{Action, ActivityLog};
use crate::messages::{Message, Messages, Recipient};
use crate::records::{BadgeTier, MatchHistoryRecord, Records};
use crate::registry::{RegistrationStatus, Registry};
use crate::standings::Standings;
use crate::{Bracket, Error, Participant, Result, RoundTier, Update};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The complete state of a tournament: registrations, the bracket, all records, admin messages
/// and the activity log.
///
/// A `Tournament` is read and written as a whole. Every mutating method is a single
/// read-modify-write of this value. Admin actions that change the state are recorded in the
/// [`activity`](Self::activity) log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TournamentState"))]
pub struct Tournament {
    registry: Registry,
    bracket: Bracket,
    records: Records,
    messages: Messages,
    activity: ActivityLog,
}

impl Tournament {
    /// Creates a new `Tournament` for `capacity` participants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is not a power of two of at least 2.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            registry: Registry::new(capacity),
            bracket: Bracket::new(capacity)?,
            records: Records::new(),
            messages: Messages::new(),
            activity: ActivityLog::new(),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bracket.capacity()
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn bracket(&self) -> &Bracket {
        &self.bracket
    }

    #[inline]
    pub fn records(&self) -> &Records {
        &self.records
    }

    #[inline]
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    #[inline]
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    #[inline]
    pub fn register(&mut self, participant: Participant) -> Result<()> {
        self.registry.register(participant)
    }

    /// Validates the registration of the participant with the given `id`. Once the number of
    /// validated participants reaches the capacity the bracket is generated.
    ///
    /// Returns `true` if the bracket was generated by this call.
    pub fn validate(&mut self, id: &str) -> Result<bool> {
        if !self.registry.validate(id)? {
            return Ok(false);
        }

        self.record(Action::Validated, format!("Validated {}", id));
        self.generate()
    }

    /// Rejects a registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BracketStarted`] if the participant is validated and the bracket has
    /// already been generated.
    pub fn reject(&mut self, id: &str) -> Result<RegistrationStatus> {
        self.ensure_not_placed(id)?;

        let previous = self.registry.reject(id)?;
        self.record(Action::Rejected, format!("Rejected {} (was {})", id, previous));

        Ok(previous)
    }

    /// Removes a registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BracketStarted`] if the participant is validated and the bracket has
    /// already been generated.
    pub fn remove(&mut self, id: &str) -> Result<Participant> {
        self.ensure_not_placed(id)?;

        let participant = self.registry.remove(id)?.participant;
        self.record(Action::Removed, format!("Removed {}", id));

        Ok(participant)
    }

    /// Generates the bracket from the validated participants. This is a no-op returning `false`
    /// until the capacity is reached, or if the bracket was already generated.
    pub fn generate(&mut self) -> Result<bool> {
        let participants = self.registry.validated().cloned();
        let generated = self.bracket.generate(participants)?;

        if generated {
            self.record(
                Action::BracketGenerated,
                format!("Generated the {}", self.bracket.tier(0)),
            );
        }

        Ok(generated)
    }

    /// Updates the scores of a match and stores the history records and badges it produced.
    pub fn update_score(
        &mut self,
        tier: RoundTier,
        slot: usize,
        scores: [u32; 2],
    ) -> Result<Update> {
        let update = self.bracket.update_score(tier, slot, scores)?;
        self.records.apply(&update);

        self.record(
            Action::ScoreUpdated,
            format!("{} match {}: {}-{}", tier, slot, scores[0], scores[1]),
        );

        Ok(update)
    }

    /// Returns the match history of the participant with the given `id`, most recent first.
    pub fn history<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a MatchHistoryRecord> + 'a {
        self.records.history_of(id)
    }

    pub fn badges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = BadgeTier> + 'a {
        self.records.badges_of(id)
    }

    #[inline]
    pub fn standings(&self) -> Standings {
        self.bracket.standings()
    }

    /// Posts an admin message and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipant`] if the message is addressed to a participant that
    /// is not registered and [`Error::EmptyMessage`] if the title or content is blank.
    pub fn post_message(
        &mut self,
        recipient: Recipient,
        title: &str,
        content: &str,
        important: bool,
    ) -> Result<u64> {
        if let Recipient::Participant(id) = &recipient {
            if self.registry.get(id).is_none() {
                return Err(Error::UnknownParticipant(id.clone()));
            }
        }

        let id = self
            .messages
            .post(recipient, title, content, important, Utc::now())?;
        self.record(
            Action::MessagePosted,
            format!("Message {} '{}' posted", id, title.trim()),
        );

        Ok(id)
    }

    pub fn delete_message(&mut self, id: u64) -> Result<()> {
        let title = self.messages.delete(id)?.title.clone();
        self.record(
            Action::MessageDeleted,
            format!("Message {} '{}' deleted", id, title),
        );

        Ok(())
    }

    /// Marks a message as read by a participant. Returns `false` if it was already read.
    #[inline]
    pub fn mark_read(&mut self, message: u64, participant: &str) -> Result<bool> {
        self.messages.mark_read(message, participant)
    }

    /// Returns the messages the participant with the given `id` receives, important first.
    pub fn inbox<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages.inbox(id)
    }

    #[inline]
    pub fn unread_count(&self, id: &str) -> usize {
        self.messages.unread_count(id)
    }

    fn record(&mut self, action: Action, details: String) {
        self.activity.record(action, details, Utc::now());
    }

    fn ensure_not_placed(&self, id: &str) -> Result<()> {
        let validated = self
            .registry
            .get(id)
            .map(|registration| registration.status == RegistrationStatus::Validated)
            .unwrap_or(false);

        if validated && self.bracket.is_generated() {
            return Err(Error::BracketStarted);
        }

        Ok(())
    }
}

/// The unchecked form of a [`Tournament`] as it is stored. State written before messages and
/// the activity log existed loads with both empty.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(rename = "Tournament")]
struct TournamentState {
    registry: Registry,
    bracket: Bracket,
    records: Records,
    #[serde(default)]
    messages: Messages,
    #[serde(default)]
    activity: ActivityLog,
}

#[cfg(feature = "serde")]
impl TryFrom<TournamentState> for Tournament {
    type Error = Error;

    fn try_from(state: TournamentState) -> Result<Self> {
        if state.registry.capacity() != state.bracket.capacity() {
            return Err(Error::CapacityMismatch {
                registry: state.registry.capacity(),
                bracket: state.bracket.capacity(),
            });
        }

        Ok(Self {
            registry: state.registry,
            bracket: state.bracket,
            records: state.records,
            messages: state.messages,
            activity: state.activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Tournament;
    use crate::activity::Action;
    use crate::messages::Recipient;
    use crate::records::{BadgeTier, MatchOutcome};
    use crate::{EntrantSpot, Error, Participant, RoundTier};

    fn tournament(ids: &[&str]) -> Tournament {
        let mut tournament = Tournament::new(8).unwrap();
        for id in ids {
            tournament.register(Participant::new(*id, *id)).unwrap();
        }

        tournament
    }

    fn badges(tournament: &Tournament, id: &str) -> Vec<BadgeTier> {
        tournament.badges(id).collect()
    }

    fn pair(tournament: &Tournament, tier: RoundTier, slot: usize) -> [EntrantSpot<&str>; 2] {
        let entrants = *tournament.bracket().get(tier, slot).unwrap().entrants();
        entrants.map(|spot| {
            spot.and_then(|index| tournament.bracket().entrants().get(index))
                .map(|p| p.id.as_str())
        })
    }

    #[test]
    fn test_tournament_lazy_generation() {
        let ids = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
        let mut tournament = tournament(&ids);

        // I registered but is never validated.
        for id in &ids[..7] {
            assert_eq!(tournament.validate(id), Ok(false));
            assert!(!tournament.bracket().is_generated());
        }

        assert_eq!(tournament.generate(), Ok(false));

        assert_eq!(tournament.validate("H"), Ok(true));
        assert!(tournament.bracket().is_generated());

        assert_eq!(
            tournament.validate("I"),
            Err(Error::TournamentFull { capacity: 8 })
        );

        // Validating again does not touch the bracket.
        assert_eq!(tournament.validate("H"), Ok(false));
        assert_eq!(tournament.generate(), Ok(false));
    }

    #[test]
    fn test_tournament_participants_fixed() {
        let ids = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
        let mut tournament = tournament(&ids);

        tournament.validate("A").unwrap();
        assert!(tournament.reject("A").is_ok());
        tournament.validate("A").unwrap();

        for id in &ids[1..8] {
            tournament.validate(id).unwrap();
        }

        assert_eq!(tournament.reject("A"), Err(Error::BracketStarted));
        assert_eq!(tournament.remove("B").map(|p| p.id), Err(Error::BracketStarted));

        // Registrations outside the bracket can still be managed.
        assert_eq!(tournament.remove("I").map(|p| p.id), Ok(String::from("I")));
    }

    #[test]
    fn test_tournament_end_to_end() {
        let ids = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let mut tournament = tournament(&ids);
        for id in &ids {
            tournament.validate(id).unwrap();
        }

        assert_eq!(
            pair(&tournament, RoundTier::Quarterfinal, 0),
            [EntrantSpot::Entrant("A"), EntrantSpot::Entrant("B")]
        );
        assert_eq!(
            pair(&tournament, RoundTier::Quarterfinal, 3),
            [EntrantSpot::Entrant("G"), EntrantSpot::Entrant("H")]
        );

        tournament.update_score(RoundTier::Quarterfinal, 0, [3, 1]).unwrap();
        tournament.update_score(RoundTier::Quarterfinal, 1, [2, 0]).unwrap();
        tournament.update_score(RoundTier::Quarterfinal, 2, [1, 0]).unwrap();
        let update = tournament
            .update_score(RoundTier::Quarterfinal, 3, [4, 2])
            .unwrap();
        assert_eq!(update.advanced, Some(RoundTier::Semifinal));

        assert_eq!(
            pair(&tournament, RoundTier::Semifinal, 0),
            [EntrantSpot::Entrant("A"), EntrantSpot::Entrant("C")]
        );
        assert_eq!(
            pair(&tournament, RoundTier::Semifinal, 1),
            [EntrantSpot::Entrant("E"), EntrantSpot::Entrant("G")]
        );

        // First round losers get no badge.
        for id in ["B", "D", "F", "H"] {
            assert!(badges(&tournament, id).is_empty());
        }

        tournament.update_score(RoundTier::Semifinal, 0, [2, 0]).unwrap();
        let update = tournament
            .update_score(RoundTier::Semifinal, 1, [0, 1])
            .unwrap();
        assert_eq!(update.advanced, Some(RoundTier::Final));

        assert_eq!(
            pair(&tournament, RoundTier::Final, 0),
            [EntrantSpot::Entrant("A"), EntrantSpot::Entrant("G")]
        );
        assert_eq!(badges(&tournament, "C"), vec![BadgeTier::Semifinalist]);
        assert_eq!(badges(&tournament, "E"), vec![BadgeTier::Semifinalist]);

        let history: Vec<_> = tournament.history("C").collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].tier, RoundTier::Semifinal);
        assert_eq!(history[0].opponent, "A");
        assert_eq!(history[0].outcome, MatchOutcome::Loss);
        assert_eq!(history[1].tier, RoundTier::Quarterfinal);
        assert_eq!(history[1].outcome, MatchOutcome::Win);

        tournament.update_score(RoundTier::Final, 0, [2, 1]).unwrap();

        assert_eq!(badges(&tournament, "A"), vec![BadgeTier::Champion]);
        assert_eq!(badges(&tournament, "G"), vec![BadgeTier::Finalist]);
        assert_eq!(
            tournament.bracket().winner().map(|p| p.id.as_str()),
            Some("A")
        );

        // Resubmitting the final neither duplicates badges nor history.
        tournament.update_score(RoundTier::Final, 0, [2, 1]).unwrap();
        assert_eq!(badges(&tournament, "A"), vec![BadgeTier::Champion]);
        assert_eq!(tournament.history("A").count(), 3);
        assert_eq!(tournament.records().badges().count(), 4);

        assert_eq!(tournament.standings().placement(0), Some(1));
    }

    #[test]
    fn test_tournament_second_semifinal() {
        // E beats G in the second semifinal.
        let ids = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let mut tournament = tournament(&ids);
        for id in &ids {
            tournament.validate(id).unwrap();
        }

        for (slot, scores) in [[3, 1], [2, 0], [1, 0], [4, 2]].into_iter().enumerate() {
            tournament.update_score(RoundTier::Quarterfinal, slot, scores).unwrap();
        }

        tournament.update_score(RoundTier::Semifinal, 0, [1, 0]).unwrap();
        tournament.update_score(RoundTier::Semifinal, 1, [1, 0]).unwrap();

        assert_eq!(
            pair(&tournament, RoundTier::Final, 0),
            [EntrantSpot::Entrant("A"), EntrantSpot::Entrant("E")]
        );
        assert_eq!(badges(&tournament, "C"), vec![BadgeTier::Semifinalist]);
        assert_eq!(badges(&tournament, "G"), vec![BadgeTier::Semifinalist]);
        assert_eq!(tournament.history("G").count(), 2);

        tournament.update_score(RoundTier::Final, 0, [2, 1]).unwrap();

        assert_eq!(badges(&tournament, "A"), vec![BadgeTier::Champion]);
        assert_eq!(badges(&tournament, "E"), vec![BadgeTier::Finalist]);
        for id in ["B", "D", "F", "H"] {
            assert!(badges(&tournament, id).is_empty());
        }
        assert_eq!(
            tournament.bracket().winner().map(|p| p.name.as_str()),
            Some("A")
        );
    }

    fn actions(tournament: &Tournament) -> Vec<Action> {
        tournament.activity().iter().map(|a| a.action).collect()
    }

    #[test]
    fn test_tournament_activity() {
        let mut tournament = Tournament::new(2).unwrap();
        for id in ["a", "b", "c"] {
            tournament.register(Participant::new(id, id)).unwrap();
        }

        // Registering is not an admin action.
        assert!(tournament.activity().is_empty());

        tournament.validate("a").unwrap();
        tournament.validate("a").unwrap();
        tournament.validate("b").unwrap();
        tournament.reject("c").unwrap();

        // Failed actions are not recorded.
        assert_eq!(tournament.remove("a").map(|p| p.id), Err(Error::BracketStarted));
        assert!(tournament.update_score(RoundTier::Semifinal, 0, [1, 0]).is_err());

        tournament.remove("c").unwrap();
        tournament.update_score(RoundTier::Final, 0, [2, 1]).unwrap();

        assert_eq!(
            actions(&tournament),
            vec![
                Action::ScoreUpdated,
                Action::Removed,
                Action::Rejected,
                Action::BracketGenerated,
                Action::Validated,
                Action::Validated,
            ]
        );

        let latest = tournament.activity().iter().next().unwrap();
        assert_eq!(latest.details, "final match 0: 2-1");
    }

    #[test]
    fn test_tournament_messages() {
        let mut tournament = tournament(&["A", "B"]);

        assert_eq!(
            tournament.post_message(Recipient::Participant(String::from("Z")), "t", "c", false),
            Err(Error::UnknownParticipant(String::from("Z")))
        );

        let global = tournament
            .post_message(Recipient::All, "Schedule", "Starts at 9", false)
            .unwrap();
        let direct = tournament
            .post_message(Recipient::Participant(String::from("A")), "Seat", "Table 3", true)
            .unwrap();

        let inbox: Vec<u64> = tournament.inbox("A").map(|m| m.id).collect();
        assert_eq!(inbox, vec![direct, global]);
        assert_eq!(tournament.unread_count("A"), 2);
        assert_eq!(tournament.unread_count("B"), 1);

        assert_eq!(tournament.mark_read(direct, "A"), Ok(true));
        assert_eq!(tournament.unread_count("A"), 1);

        tournament.delete_message(global).unwrap();
        assert_eq!(tournament.unread_count("A"), 0);
        assert_eq!(tournament.unread_count("B"), 0);
        assert_eq!(
            tournament.delete_message(global),
            Err(Error::UnknownMessage(global))
        );

        assert_eq!(
            actions(&tournament),
            vec![
                Action::MessageDeleted,
                Action::MessagePosted,
                Action::MessagePosted,
            ]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tournament_state_checked() {
        use super::TournamentState;
        use crate::activity::ActivityLog;
        use crate::messages::Messages;
        use crate::{Bracket, Records, Registry};

        let state = |registry: usize, bracket: usize| TournamentState {
            registry: Registry::new(registry),
            bracket: Bracket::new(bracket).unwrap(),
            records: Records::new(),
            messages: Messages::new(),
            activity: ActivityLog::new(),
        };

        assert_eq!(
            Tournament::try_from(state(4, 8)),
            Err(Error::CapacityMismatch {
                registry: 4,
                bracket: 8
            })
        );
        assert_eq!(Tournament::try_from(state(8, 8)), Tournament::new(8));
    }
}
