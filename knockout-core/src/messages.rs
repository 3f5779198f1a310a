//! Notices posted by admins, either to everyone or to a single participant.
//!
//! Every participant tracks which messages it has read, so a message sent to everyone can be
//! unread for one participant and read for another.
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Who a [`Message`] is addressed to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Recipient {
    All,
    Participant(String),
}

impl Recipient {
    /// Returns `true` if the participant with the given `id` receives messages sent to this
    /// `Recipient`.
    pub fn includes(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Participant(participant) => participant == id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    pub id: u64,
    pub recipient: Recipient,
    pub title: String,
    pub content: String,
    /// Important messages are listed before all others.
    pub important: bool,
    pub created_at: DateTime<Utc>,
    deleted: bool,
    read_by: BTreeSet<String>,
}

impl Message {
    #[inline]
    pub fn is_read_by(&self, id: &str) -> bool {
        self.read_by.contains(id)
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Messages {
    next_id: u64,
    messages: Vec<Message>,
}

impl Messages {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts a new message and returns its id. Title and content are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMessage`] if the title or the content is blank.
    pub fn post(
        &mut self,
        recipient: Recipient,
        title: &str,
        content: &str,
        important: bool,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let (title, content) = (title.trim(), content.trim());
        if title.is_empty() || content.is_empty() {
            return Err(Error::EmptyMessage);
        }

        self.next_id += 1;
        let id = self.next_id;

        log::debug!("Posting message {} to {:?}", id, recipient);

        self.messages.push(Message {
            id,
            recipient,
            title: title.to_owned(),
            content: content.to_owned(),
            important,
            created_at: at,
            deleted: false,
            read_by: BTreeSet::new(),
        });

        Ok(id)
    }

    /// Deletes a message. Deleted messages are kept but no longer listed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMessage`] if no message with the given `id` exists or it was
    /// already deleted.
    pub fn delete(&mut self, id: u64) -> Result<&Message> {
        let message = self.get_mut(id)?;
        message.deleted = true;

        Ok(message)
    }

    /// Marks a message as read by the participant with the given `id`. Returns `false` if the
    /// participant already read the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMessage`] if the message does not exist and
    /// [`Error::NotRecipient`] if the message is addressed to someone else.
    pub fn mark_read(&mut self, message: u64, participant: &str) -> Result<bool> {
        let msg = self.get_mut(message)?;
        if !msg.recipient.includes(participant) {
            return Err(Error::NotRecipient {
                message,
                participant: participant.to_owned(),
            });
        }

        Ok(msg.read_by.insert(participant.to_owned()))
    }

    pub fn get(&self, id: u64) -> Option<&Message> {
        self.messages
            .iter()
            .find(|message| message.id == id && !message.deleted)
    }

    /// Returns all messages that are not deleted, important messages first, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        sorted(self.messages.iter().filter(|message| !message.deleted))
    }

    /// Returns the messages the participant with the given `id` receives, in the same order as
    /// [`iter`](Self::iter).
    pub fn inbox<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        sorted(
            self.messages
                .iter()
                .filter(move |message| !message.deleted && message.recipient.includes(id)),
        )
    }

    pub fn unread_count(&self, id: &str) -> usize {
        self.inbox(id)
            .filter(|message| !message.is_read_by(id))
            .count()
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Message> {
        self.messages
            .iter_mut()
            .find(|message| message.id == id && !message.deleted)
            .ok_or(Error::UnknownMessage(id))
    }
}

fn sorted<'a, I>(messages: I) -> std::vec::IntoIter<&'a Message>
where
    I: Iterator<Item = &'a Message>,
{
    let mut messages: Vec<&Message> = messages.collect();
    // Ids grow with every post, a higher id is a newer message.
    messages.sort_by(|a, b| b.important.cmp(&a.important).then(b.id.cmp(&a.id)));
    messages.into_iter()
}
