use serde::{Deserialize, Serialize};

use crate::entry::EntryId;

/// How raw cosine similarity in `[-1, 1]` is mapped onto the verdict's `[0, 1]` score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMapping {
    /// `max(cos, 0)`. A threshold of 0.7 means "cosine at least 0.7".
    #[default]
    Clamped,
    /// `(cos + 1) / 2`. Keeps negative similarities distinguishable.
    Shifted,
}

impl ScoreMapping {
    pub fn apply(self, cosine: f32) -> f32 {
        let cosine = cosine.clamp(-1.0, 1.0);
        match self {
            ScoreMapping::Clamped => cosine.max(0.0),
            ScoreMapping::Shifted => (cosine + 1.0) / 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreMapping::Clamped => "clamped",
            ScoreMapping::Shifted => "shifted",
        }
    }
}

impl std::str::FromStr for ScoreMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamped" => Ok(ScoreMapping::Clamped),
            "shifted" => Ok(ScoreMapping::Shifted),
            other => Err(format!("unknown score mapping '{}'", other)),
        }
    }
}

/// Coarse confidence band for a verdict score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Score at or above the match threshold.
    Strong,
    /// Below the threshold but at or above the possible-match threshold.
    Possible,
    Unlikely,
    /// The index held nothing to compare against.
    NoCandidates,
}

impl MatchConfidence {
    pub fn classify(score: f32, threshold: f32, possible_threshold: f32) -> Self {
        if score >= threshold {
            MatchConfidence::Strong
        } else if score >= possible_threshold {
            MatchConfidence::Possible
        } else {
            MatchConfidence::Unlikely
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MatchConfidence::Strong => "Strong match",
            MatchConfidence::Possible => "Possible match",
            MatchConfidence::Unlikely => "No likely match",
            MatchConfidence::NoCandidates => "No candidates",
        }
    }
}

/// One ranked result, score already mapped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub entry_id: EntryId,
    pub reference: String,
    pub text: String,
    pub score: f32,
}

/// Outcome of resolving one query.
///
/// `matched == (score >= threshold)` always holds. A non-matching verdict still names the best
/// candidate so callers can show "closest entry"; only an empty index yields empty fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub matched: bool,
    pub score: f32,
    pub reference: String,
    pub text: String,
    pub entry_id: Option<EntryId>,
    pub confidence: MatchConfidence,
    pub candidates: Vec<Candidate>,
}

impl Verdict {
    /// Verdict for an index with no entries.
    pub fn no_candidates() -> Self {
        Self {
            matched: false,
            score: 0.0,
            reference: String::new(),
            text: String::new(),
            entry_id: None,
            confidence: MatchConfidence::NoCandidates,
            candidates: Vec::new(),
        }
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}
