use knockout_core::render::{Renderer, Rounds};
use knockout_core::{EntrantSpot, Participant};

/// Renders a bracket as plain text, one block per round.
#[derive(Clone, Debug, Default)]
pub struct TextRenderer {
    lines: Vec<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.lines.join("\n")
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, rounds: Rounds<'_>) {
        for round in rounds {
            if round.is_created() {
                self.lines.push(format!("{}", round.tier));
            } else {
                self.lines.push(format!("{} (pending)", round.tier));
            }

            for m in round.matches() {
                let [a, b] = m.entrants;

                let mut line = format!(
                    "  [{}] {} {} - {} {}",
                    m.slot,
                    spot(a),
                    m.scores[0],
                    m.scores[1],
                    spot(b)
                );

                if let Some(winner) = m.winner {
                    line.push_str(&format!("  winner: {}", winner.name));
                }

                self.lines.push(line);
            }
        }
    }
}

fn spot(spot: EntrantSpot<&Participant>) -> &str {
    match spot {
        EntrantSpot::Entrant(participant) => &participant.name,
        EntrantSpot::Empty => "BYE",
        EntrantSpot::TBD => "TBD",
    }
}
