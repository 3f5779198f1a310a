//! Registrations and their approval workflow.
//!
//! Participants register as [`Pending`] and are [`Validated`] or [`Rejected`] by an admin. At
//! most `capacity` registrations can be validated at the same time. The validated
//! registrations, in the order they registered, are the participants of the bracket.
//!
//! [`Pending`]: RegistrationStatus::Pending
//! [`Validated`]: RegistrationStatus::Validated
//! [`Rejected`]: RegistrationStatus::Rejected
use std::fmt::{self, Display, Formatter};

use crate::{Error, Participant, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Validated,
    Rejected,
}

impl Display for RegistrationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Validated => f.write_str("validated"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Registration {
    pub participant: Participant,
    pub status: RegistrationStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Registry {
    capacity: usize,
    registrations: Vec<Registration>,
}

impl Registry {
    /// Creates a new empty `Registry` accepting at most `capacity` validated participants.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            registrations: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds a new pending registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParticipant`] if a participant with the same id is already
    /// registered.
    pub fn register(&mut self, participant: Participant) -> Result<()> {
        if self.get(&participant.id).is_some() {
            return Err(Error::DuplicateParticipant(participant.id));
        }

        log::debug!("Registering {} ({})", participant.name, participant.id);

        self.registrations.push(Registration {
            participant,
            status: RegistrationStatus::Pending,
        });

        Ok(())
    }

    /// Validates the registration of the participant with the given `id`. Returns `false` if the
    /// registration was already validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipant`] if no participant with the given `id` is registered
    /// and [`Error::TournamentFull`] if `capacity` registrations are already validated.
    pub fn validate(&mut self, id: &str) -> Result<bool> {
        let validated = self.num_validated();
        let capacity = self.capacity;

        let registration = self.get_mut(id)?;
        if registration.status == RegistrationStatus::Validated {
            return Ok(false);
        }

        if validated >= capacity {
            return Err(Error::TournamentFull { capacity });
        }

        registration.status = RegistrationStatus::Validated;
        log::info!(
            "Validated {} ({}/{})",
            registration.participant.name,
            validated + 1,
            capacity
        );

        Ok(true)
    }

    /// Rejects the registration of the participant with the given `id`, returning the previous
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipant`] if no participant with the given `id` is registered.
    pub fn reject(&mut self, id: &str) -> Result<RegistrationStatus> {
        let registration = self.get_mut(id)?;
        let previous = registration.status;
        registration.status = RegistrationStatus::Rejected;

        log::info!("Rejected {}", registration.participant.name);

        Ok(previous)
    }

    /// Removes the registration of the participant with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipant`] if no participant with the given `id` is registered.
    pub fn remove(&mut self, id: &str) -> Result<Registration> {
        let index = self
            .registrations
            .iter()
            .position(|registration| registration.participant.id == id)
            .ok_or_else(|| Error::UnknownParticipant(id.to_owned()))?;

        Ok(self.registrations.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|registration| registration.participant.id == id)
    }

    /// Returns all registrations in the order they were made.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Registration> {
        self.registrations.iter()
    }

    /// Returns the validated participants in the order they registered.
    pub fn validated(&self) -> impl Iterator<Item = &Participant> {
        self.with_status(RegistrationStatus::Validated)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Participant> {
        self.with_status(RegistrationStatus::Pending)
    }

    pub fn num_validated(&self) -> usize {
        self.validated().count()
    }

    /// Returns `true` if `capacity` participants are validated.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_validated() >= self.capacity
    }

    fn with_status(&self, status: RegistrationStatus) -> impl Iterator<Item = &Participant> {
        self.registrations
            .iter()
            .filter(move |registration| registration.status == status)
            .map(|registration| &registration.participant)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Registration> {
        self.registrations
            .iter_mut()
            .find(|registration| registration.participant.id == id)
            .ok_or_else(|| Error::UnknownParticipant(id.to_owned()))
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Registration;
    type IntoIter = std::slice::Iter<'a, Registration>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
