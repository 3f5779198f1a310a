#[cfg(feature = "serde")]
mod serde_impl;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// The name of a round, derived from the number of participants still in it.
///
/// Use [`RoundTier::from_participants`] to construct a tier from a participant count. It always
/// returns the named variant where one exists, i.e. `8` becomes [`Quarterfinal`] and never
/// `RoundOf(8)`.
///
/// [`Quarterfinal`]: Self::Quarterfinal
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoundTier {
    Final,
    Semifinal,
    Quarterfinal,
    /// A round with the given number of participants, at least 16.
    RoundOf(usize),
}

impl RoundTier {
    /// Returns the tier of a round played by `participants` participants.
    pub fn from_participants(participants: usize) -> Self {
        match participants {
            0..=2 => Self::Final,
            3..=4 => Self::Semifinal,
            5..=8 => Self::Quarterfinal,
            n => Self::RoundOf(n.next_power_of_two()),
        }
    }

    /// Returns the number of participants in a round of this tier.
    pub fn participants(self) -> usize {
        match self {
            Self::Final => 2,
            Self::Semifinal => 4,
            Self::Quarterfinal => 8,
            Self::RoundOf(n) => n,
        }
    }

    /// Returns the number of matches in a round of this tier.
    #[inline]
    pub fn num_matches(self) -> usize {
        self.participants() / 2
    }
}

impl Display for RoundTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final => f.write_str("final"),
            Self::Semifinal => f.write_str("semifinal"),
            Self::Quarterfinal => f.write_str("quarterfinal"),
            Self::RoundOf(n) => write!(f, "round_of_{}", n),
        }
    }
}

impl FromStr for RoundTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "final" => Ok(Self::Final),
            "semifinal" => Ok(Self::Semifinal),
            "quarterfinal" => Ok(Self::Quarterfinal),
            s => {
                let n = s
                    .strip_prefix("round_of_")
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| ParseTierError(s.to_owned()))?;

                if n < 16 || !n.is_power_of_two() {
                    return Err(ParseTierError(s.to_owned()));
                }

                Ok(Self::RoundOf(n))
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid round tier: {0}")]
pub struct ParseTierError(String);
