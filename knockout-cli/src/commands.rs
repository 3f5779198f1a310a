use std::io::Write;

use clap::Subcommand;
use knockout_core::{Message, Participant, Recipient, RoundTier, Tournament};

use crate::render::TextRenderer;
use crate::{Error, ID_GENERATOR};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Registers a new participant. The registration stays pending until it is validated.
    Register {
        name: String,
        /// Use this id instead of generating one.
        #[arg(long)]
        id: Option<String>,
    },
    /// Validates a registration. The bracket is generated once enough participants are validated.
    Validate { id: String },
    Reject { id: String },
    Remove { id: String },
    /// Lists all registrations.
    Participants,
    /// Generates the bracket if enough participants are validated.
    Generate,
    /// Sets the scores of a match, e.g. `score quarterfinal 0 3 1`.
    Score {
        tier: RoundTier,
        slot: usize,
        score: u32,
        opponent_score: u32,
    },
    /// Prints the bracket.
    Show,
    Standings,
    /// Prints the match history of a participant, most recent first.
    History { id: String },
    Badges { id: String },
    /// Posts a message to all participants, or to a single one with `--to`.
    Message {
        title: String,
        content: String,
        #[arg(long)]
        to: Option<String>,
        /// Lists the message before all non-important ones.
        #[arg(long)]
        important: bool,
    },
    /// Lists all messages, or the inbox of a participant with `--for`.
    Messages {
        #[arg(long = "for")]
        participant: Option<String>,
    },
    /// Marks a message as read by a participant.
    Read { message: u64, participant: String },
    DeleteMessage { id: u64 },
    /// Prints the most recent admin actions.
    Log {
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

impl Command {
    /// Returns `true` if the command changes the tournament.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Register { .. }
                | Self::Validate { .. }
                | Self::Reject { .. }
                | Self::Remove { .. }
                | Self::Generate
                | Self::Score { .. }
                | Self::Message { .. }
                | Self::Read { .. }
                | Self::DeleteMessage { .. }
        )
    }

    pub fn run<W>(self, tournament: &mut Tournament, out: &mut W) -> Result<(), Error>
    where
        W: Write,
    {
        match self {
            Self::Register { name, id } => {
                let id = id.unwrap_or_else(|| ID_GENERATOR.generate::<u64>().to_string());

                tournament.register(Participant::new(id.clone(), name.clone()))?;
                writeln!(out, "Registered {} ({})", name, id)?;
            }
            Self::Validate { id } => {
                let generated = tournament.validate(&id)?;
                writeln!(out, "Validated {}", id)?;

                if generated {
                    writeln!(out, "Bracket generated")?;
                }
            }
            Self::Reject { id } => {
                let previous = tournament.reject(&id)?;
                writeln!(out, "Rejected {} (was {})", id, previous)?;
            }
            Self::Remove { id } => {
                let participant = tournament.remove(&id)?;
                writeln!(out, "Removed {} ({})", participant.name, participant.id)?;
            }
            Self::Participants => {
                writeln!(out, "ID | Name | Status")?;
                for registration in tournament.registry() {
                    writeln!(
                        out,
                        "{} | {} | {}",
                        registration.participant.id,
                        registration.participant.name,
                        registration.status
                    )?;
                }
            }
            Self::Generate => {
                if tournament.bracket().is_generated() {
                    writeln!(out, "Bracket already generated")?;
                } else if tournament.generate()? {
                    writeln!(out, "Bracket generated")?;
                } else {
                    writeln!(
                        out,
                        "Bracket not generated: {} of {} participants validated",
                        tournament.registry().num_validated(),
                        tournament.capacity()
                    )?;
                }
            }
            Self::Score {
                tier,
                slot,
                score,
                opponent_score,
            } => {
                let update = tournament.update_score(tier, slot, [score, opponent_score])?;
                writeln!(
                    out,
                    "Updated {} match {}: {}-{}",
                    tier, slot, score, opponent_score
                )?;

                for badge in &update.badges {
                    writeln!(out, "{} earned the {} badge", badge.participant, badge.tier)?;
                }

                if let Some(tier) = update.advanced {
                    writeln!(out, "Created {}", tier)?;
                }

                if tier == RoundTier::Final {
                    if let Some(winner) = tournament.bracket().winner() {
                        writeln!(out, "{} won the tournament", winner.name)?;
                    }
                }
            }
            Self::Show => {
                let mut renderer = TextRenderer::new();
                tournament.bracket().render(&mut renderer);
                writeln!(out, "{}", renderer.into_string())?;
            }
            Self::Standings => {
                let entrants = tournament.bracket().entrants();

                writeln!(out, "Place | Name")?;
                for entry in &tournament.standings() {
                    let name = entrants
                        .get(entry.index)
                        .map(|participant| participant.name.as_str())
                        .unwrap_or("???");

                    match entry.placement {
                        Some(placement) => writeln!(out, "{} | {}", placement, name)?,
                        None => writeln!(out, "- | {}", name)?,
                    }
                }
            }
            Self::History { id } => {
                writeln!(out, "Round | Result | Score | Opponent")?;
                for record in tournament.history(&id) {
                    writeln!(
                        out,
                        "{} | {} | {}-{} | {}",
                        record.tier,
                        record.outcome,
                        record.score,
                        record.opponent_score,
                        record.opponent_name
                    )?;
                }
            }
            Self::Badges { id } => {
                for badge in tournament.badges(&id) {
                    writeln!(out, "{}", badge)?;
                }
            }
            Self::Message {
                title,
                content,
                to,
                important,
            } => {
                let recipient = match to {
                    Some(id) => Recipient::Participant(id),
                    None => Recipient::All,
                };

                let id = tournament.post_message(recipient, &title, &content, important)?;
                writeln!(out, "Posted message {}", id)?;
            }
            Self::Messages {
                participant: Some(participant),
            } => {
                writeln!(out, "{} unread", tournament.unread_count(&participant))?;
                for message in tournament.inbox(&participant) {
                    let state = if message.is_read_by(&participant) {
                        "read"
                    } else {
                        "new"
                    };

                    writeln!(out, "{} | {} | {}", message.id, state, summary(message))?;
                }
            }
            Self::Messages { participant: None } => {
                for message in tournament.messages().iter() {
                    let to = match &message.recipient {
                        Recipient::All => "all",
                        Recipient::Participant(id) => id.as_str(),
                    };

                    writeln!(out, "{} | {} | {}", message.id, to, summary(message))?;
                }
            }
            Self::Read {
                message,
                participant,
            } => {
                if tournament.mark_read(message, &participant)? {
                    writeln!(out, "Marked message {} as read by {}", message, participant)?;
                } else {
                    writeln!(out, "Message {} was already read by {}", message, participant)?;
                }
            }
            Self::DeleteMessage { id } => {
                tournament.delete_message(id)?;
                writeln!(out, "Deleted message {}", id)?;
            }
            Self::Log { limit } => {
                writeln!(out, "Time | Action | Details")?;
                for activity in tournament.activity().iter().take(limit) {
                    writeln!(
                        out,
                        "{} | {} | {}",
                        activity.at.format("%Y-%m-%d %H:%M:%S"),
                        activity.action,
                        activity.details
                    )?;
                }
            }
        }

        Ok(())
    }
}

fn summary(message: &Message) -> String {
    if message.important {
        format!("{}: {} (important)", message.title, message.content)
    } else {
        format!("{}: {}", message.title, message.content)
    }
}

#[cfg(test)]
mod tests {
    use knockout_core::{RegistrationStatus, RoundTier, Tournament};

    use super::Command;
    use crate::Error;

    fn run(tournament: &mut Tournament, command: Command) -> Result<String, Error> {
        let mut out = Vec::new();
        command.run(tournament, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn register(tournament: &mut Tournament, id: &str) {
        run(
            tournament,
            Command::Register {
                name: id.to_uppercase(),
                id: Some(id.to_owned()),
            },
        )
        .unwrap();
    }

    fn validate(tournament: &mut Tournament, id: &str) -> String {
        run(tournament, Command::Validate { id: id.to_owned() }).unwrap()
    }

    fn score(
        tournament: &mut Tournament,
        tier: RoundTier,
        slot: usize,
        scores: [u32; 2],
    ) -> String {
        run(
            tournament,
            Command::Score {
                tier,
                slot,
                score: scores[0],
                opponent_score: scores[1],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_command_register_generates_id() {
        let mut tournament = Tournament::new(2).unwrap();

        let output = run(
            &mut tournament,
            Command::Register {
                name: String::from("Alice"),
                id: None,
            },
        )
        .unwrap();
        assert!(output.starts_with("Registered Alice ("));

        let registration = tournament.registry().iter().next().unwrap();
        assert_eq!(registration.participant.name, "Alice");
        assert!(registration.participant.id.parse::<u64>().is_ok());
        assert_eq!(registration.status, RegistrationStatus::Pending);
    }

    #[test]
    fn test_command_workflow() {
        let mut tournament = Tournament::new(2).unwrap();
        register(&mut tournament, "a");
        register(&mut tournament, "b");
        register(&mut tournament, "c");

        run(&mut tournament, Command::Reject { id: String::from("c") }).unwrap();

        let output = run(&mut tournament, Command::Generate).unwrap();
        assert_eq!(
            output,
            "Bracket not generated: 0 of 2 participants validated\n"
        );

        assert_eq!(validate(&mut tournament, "a"), "Validated a\n");
        assert_eq!(
            validate(&mut tournament, "b"),
            "Validated b\nBracket generated\n"
        );

        let output = run(&mut tournament, Command::Participants).unwrap();
        assert_eq!(
            output,
            "ID | Name | Status\na | A | validated\nb | B | validated\nc | C | rejected\n"
        );

        let output = score(&mut tournament, RoundTier::Final, 0, [1, 2]);
        assert_eq!(
            output,
            "Updated final match 0: 1-2\n\
             b earned the champion badge\n\
             a earned the finalist badge\n\
             B won the tournament\n"
        );

        let output = run(&mut tournament, Command::Standings).unwrap();
        assert_eq!(output, "Place | Name\n1 | B\n2 | A\n");

        let output = run(&mut tournament, Command::History { id: String::from("a") }).unwrap();
        assert_eq!(
            output,
            "Round | Result | Score | Opponent\nfinal | loss | 1-2 | B\n"
        );

        let output = run(&mut tournament, Command::Badges { id: String::from("b") }).unwrap();
        assert_eq!(output, "champion\n");
    }

    #[test]
    fn test_command_errors() {
        let mut tournament = Tournament::new(2).unwrap();
        register(&mut tournament, "a");
        register(&mut tournament, "b");
        validate(&mut tournament, "a");
        validate(&mut tournament, "b");

        assert!(matches!(
            run(&mut tournament, Command::Remove { id: String::from("a") }),
            Err(Error::Tournament(knockout_core::Error::BracketStarted))
        ));

        assert!(matches!(
            run(
                &mut tournament,
                Command::Score {
                    tier: RoundTier::Semifinal,
                    slot: 0,
                    score: 1,
                    opponent_score: 0,
                }
            ),
            Err(Error::Tournament(knockout_core::Error::InvalidReference { .. }))
        ));
    }

    fn message(
        tournament: &mut Tournament,
        title: &str,
        to: Option<&str>,
        important: bool,
    ) -> String {
        run(
            tournament,
            Command::Message {
                title: title.to_owned(),
                content: format!("{} content", title),
                to: to.map(str::to_owned),
                important,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_command_messages() {
        let mut tournament = Tournament::new(2).unwrap();
        register(&mut tournament, "a");
        register(&mut tournament, "b");

        assert_eq!(message(&mut tournament, "Welcome", None, false), "Posted message 1\n");
        assert_eq!(message(&mut tournament, "Rules", None, true), "Posted message 2\n");
        assert_eq!(message(&mut tournament, "Hint", Some("a"), false), "Posted message 3\n");

        let output = run(&mut tournament, Command::Messages { participant: None }).unwrap();
        assert_eq!(
            output,
            "2 | all | Rules: Rules content (important)\n\
             3 | a | Hint: Hint content\n\
             1 | all | Welcome: Welcome content\n"
        );

        let output = run(
            &mut tournament,
            Command::Read {
                message: 1,
                participant: String::from("a"),
            },
        )
        .unwrap();
        assert_eq!(output, "Marked message 1 as read by a\n");

        let output = run(
            &mut tournament,
            Command::Messages {
                participant: Some(String::from("a")),
            },
        )
        .unwrap();
        assert_eq!(
            output,
            "2 unread\n\
             2 | new | Rules: Rules content (important)\n\
             3 | new | Hint: Hint content\n\
             1 | read | Welcome: Welcome content\n"
        );

        let output = run(
            &mut tournament,
            Command::Messages {
                participant: Some(String::from("b")),
            },
        )
        .unwrap();
        assert_eq!(
            output,
            "2 unread\n\
             2 | new | Rules: Rules content (important)\n\
             1 | new | Welcome: Welcome content\n"
        );

        let output = run(&mut tournament, Command::DeleteMessage { id: 2 }).unwrap();
        assert_eq!(output, "Deleted message 2\n");
        assert_eq!(tournament.unread_count("b"), 1);

        assert!(matches!(
            run(&mut tournament, Command::DeleteMessage { id: 2 }),
            Err(Error::Tournament(knockout_core::Error::UnknownMessage(2)))
        ));
    }

    #[test]
    fn test_command_message_errors() {
        let mut tournament = Tournament::new(2).unwrap();
        register(&mut tournament, "a");
        message(&mut tournament, "Hint", Some("a"), false);

        assert!(matches!(
            run(
                &mut tournament,
                Command::Message {
                    title: String::from("Hint"),
                    content: String::from("content"),
                    to: Some(String::from("z")),
                    important: false,
                }
            ),
            Err(Error::Tournament(knockout_core::Error::UnknownParticipant(_)))
        ));

        assert!(matches!(
            run(
                &mut tournament,
                Command::Message {
                    title: String::from("  "),
                    content: String::from("content"),
                    to: None,
                    important: false,
                }
            ),
            Err(Error::Tournament(knockout_core::Error::EmptyMessage))
        ));

        assert!(matches!(
            run(
                &mut tournament,
                Command::Read {
                    message: 1,
                    participant: String::from("b"),
                }
            ),
            Err(Error::Tournament(knockout_core::Error::NotRecipient { .. }))
        ));
    }

    #[test]
    fn test_command_log() {
        let mut tournament = Tournament::new(2).unwrap();
        register(&mut tournament, "a");
        register(&mut tournament, "b");
        validate(&mut tournament, "a");
        validate(&mut tournament, "b");
        score(&mut tournament, RoundTier::Final, 0, [2, 1]);

        let output = run(&mut tournament, Command::Log { limit: 100 }).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Time | Action | Details");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains(" | SCORE_UPDATED | "));
        assert!(lines[2].contains(" | BRACKET_GENERATED | "));
        assert!(lines[3].contains(" | VALIDATED | "));
        assert!(lines[4].contains(" | VALIDATED | "));

        let output = run(&mut tournament, Command::Log { limit: 1 }).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_command_is_mutating() {
        assert!(Command::Generate.is_mutating());
        assert!(Command::Validate { id: String::new() }.is_mutating());
        assert!(Command::DeleteMessage { id: 1 }.is_mutating());
        assert!(!Command::Show.is_mutating());
        assert!(!Command::History { id: String::new() }.is_mutating());
        assert!(!Command::Log { limit: 10 }.is_mutating());
        assert!(!Command::Messages { participant: None }.is_mutating());
    }
}
