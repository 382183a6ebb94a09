//! Scoring policies for abstentions and obstructions.
//!
//! A [`PolicySet`] fixes how an incidence matrix is recoded and which
//! pairwise [`Metric`] scores two legislators against each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyKind};

/// How the abstention code (`0`) is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AbstentionPolicy {
    /// Abstaining carries no signal.
    Unknown,
    /// Abstaining is its own signal, rewarded when shared and when it meets a
    /// vote against.
    Partial,
    /// Abstaining is its own signal, scored by plain equality.
    PartialUnknown,
    /// Abstaining follows the majority outcome of the vote.
    Strong,
    /// Abstaining is a vote like any other.
    Same,
}

impl AbstentionPolicy {
    pub const ALL: [AbstentionPolicy; 5] = [
        AbstentionPolicy::Unknown,
        AbstentionPolicy::Partial,
        AbstentionPolicy::PartialUnknown,
        AbstentionPolicy::Strong,
        AbstentionPolicy::Same,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AbstentionPolicy::Unknown => "unknown",
            AbstentionPolicy::Partial => "partial",
            AbstentionPolicy::PartialUnknown => "partial-unknown",
            AbstentionPolicy::Strong => "strong",
            AbstentionPolicy::Same => "same",
        }
    }
}

impl FromStr for AbstentionPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbstentionPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PolicyError::UnsupportedPolicy {
                kind: PolicyKind::Abstention,
                name: s.to_string(),
            })
    }
}

/// How the obstruction code (`0.1`) is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ObstructionPolicy {
    /// Obstructing counts as voting against.
    Against,
    /// Obstructing counts as not voting.
    Unknown,
    /// Obstructing stays a category of its own.
    Same,
}

impl ObstructionPolicy {
    pub const ALL: [ObstructionPolicy; 3] = [
        ObstructionPolicy::Against,
        ObstructionPolicy::Unknown,
        ObstructionPolicy::Same,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstructionPolicy::Against => "against",
            ObstructionPolicy::Unknown => "unknown",
            ObstructionPolicy::Same => "same",
        }
    }
}

impl FromStr for ObstructionPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObstructionPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PolicyError::UnsupportedPolicy {
                kind: PolicyKind::Obstruction,
                name: s.to_string(),
            })
    }
}

macro_rules! name_conversions {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = PolicyError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

name_conversions!(AbstentionPolicy);
name_conversions!(ObstructionPolicy);

/// A full scoring configuration.
///
/// `agreement` only changes the result when `abstention` is
/// [`AbstentionPolicy::Same`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    pub abstention: AbstentionPolicy,
    pub obstruction: ObstructionPolicy,
    #[serde(default)]
    pub agreement: bool,
}

impl PolicySet {
    pub fn new(
        abstention: AbstentionPolicy,
        obstruction: ObstructionPolicy,
        agreement: bool,
    ) -> Self {
        Self {
            abstention,
            obstruction,
            agreement,
        }
    }

    /// Parses both policy names. Fails on the first unsupported name.
    pub fn parse(
        abstention: &str,
        obstruction: &str,
        agreement: bool,
    ) -> Result<Self, PolicyError> {
        Ok(Self::new(abstention.parse()?, obstruction.parse()?, agreement))
    }

    pub fn metric(&self) -> Metric {
        Metric::for_policy(self.abstention, self.agreement)
    }
}

impl fmt::Display for PolicySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.abstention, self.obstruction)?;
        if self.agreement {
            f.write_str(" (agreement)")?;
        }
        Ok(())
    }
}

/// Pairwise similarity between two legislators' recoded vote vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Inner product of the two vectors.
    DotProduct,
    /// Inner product, plus 0.25 per shared abstention and 1 per event where
    /// one abstained and the other voted against.
    PartialDot,
    /// Events with equal values minus events with opposite values.
    EqualityBalance,
    /// Over events where both took part: +1 if equal, -1 otherwise.
    CoParticipation,
    /// Share of co-participated events with identical votes, scaled by the
    /// number of events.
    Agreement,
}

impl Metric {
    pub fn for_policy(abstention: AbstentionPolicy, agreement: bool) -> Metric {
        match abstention {
            AbstentionPolicy::Unknown | AbstentionPolicy::Strong => Metric::DotProduct,
            AbstentionPolicy::Partial => Metric::PartialDot,
            AbstentionPolicy::PartialUnknown => Metric::EqualityBalance,
            AbstentionPolicy::Same if agreement => Metric::Agreement,
            AbstentionPolicy::Same => Metric::CoParticipation,
        }
    }
}
