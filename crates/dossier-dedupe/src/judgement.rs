//! Match decisions, automatic or human.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgement {
    Positive,
    Negative,
    Unsure,
    #[default]
    NoJudgement,
}

impl Judgement {
    pub fn as_str(self) -> &'static str {
        match self {
            Judgement::Positive => "positive",
            Judgement::Negative => "negative",
            Judgement::Unsure => "unsure",
            Judgement::NoJudgement => "no_judgement",
        }
    }

    /// Whether a decision has been recorded.
    pub fn is_decided(self) -> bool {
        matches!(self, Judgement::Positive | Judgement::Negative)
    }

    /// Judgement implied transitively by two links: positive only when both
    /// are, negative when either is.
    pub fn combine(self, other: Judgement) -> Judgement {
        match (self, other) {
            (Judgement::Positive, Judgement::Positive) => Judgement::Positive,
            (Judgement::Negative, _) | (_, Judgement::Negative) => Judgement::Negative,
            _ => Judgement::Unsure,
        }
    }
}

impl fmt::Display for Judgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Judgement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Judgement::Positive),
            "negative" => Ok(Judgement::Negative),
            "unsure" => Ok(Judgement::Unsure),
            "no_judgement" => Ok(Judgement::NoJudgement),
            other => Err(format!("unknown judgement: {other:?}")),
        }
    }
}

/// A scored candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub left: String,
    pub right: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub judgement: Judgement,
}

impl Match {
    pub fn new(left: impl Into<String>, right: impl Into<String>, score: f64) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            score,
            judgement: Judgement::NoJudgement,
        }
    }

    pub fn judged(left: impl Into<String>, right: impl Into<String>, judgement: Judgement) -> Self {
        Self {
            judgement,
            ..Self::new(left, right, 0.0)
        }
    }

    /// The pair in sorted order, so `(a, b)` and `(b, a)` share a key.
    pub fn key(&self) -> (&str, &str) {
        if self.left <= self.right {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_pessimistic() {
        use Judgement::*;
        assert_eq!(Positive.combine(Positive), Positive);
        assert_eq!(Positive.combine(Negative), Negative);
        assert_eq!(Unsure.combine(Negative), Negative);
        assert_eq!(Positive.combine(NoJudgement), Unsure);
    }

    #[test]
    fn judgements_round_trip_as_snake_case() {
        let text = serde_json::to_string(&Judgement::NoJudgement).unwrap();
        assert_eq!(text, "\"no_judgement\"");
        for j in [Judgement::Positive, Judgement::Negative, Judgement::Unsure, Judgement::NoJudgement] {
            assert_eq!(j.as_str().parse::<Judgement>(), Ok(j));
        }
    }

    #[test]
    fn match_key_ignores_order() {
        assert_eq!(Match::new("b", "a", 0.5).key(), ("a", "b"));
        assert_eq!(Match::new("a", "b", 0.5).key(), ("a", "b"));
    }
}
