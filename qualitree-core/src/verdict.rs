//! The ordinal verdict scale and parsing of judge responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quality level assigned to a single file, ordered from worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Verdict {
    /// Score 0.
    Critical,
    /// Score 1.
    Poor,
    /// Score 2.
    Fair,
    /// Score 3.
    Good,
    /// Score 4.
    #[serde(rename = "Very Good")]
    VeryGood,
    /// Score 5.
    Excellent,
}

impl Verdict {
    /// Every level, worst first.
    pub const ALL: [Verdict; 6] = [
        Verdict::Critical,
        Verdict::Poor,
        Verdict::Fair,
        Verdict::Good,
        Verdict::VeryGood,
        Verdict::Excellent,
    ];

    /// Integer score of the level, equal to its position on the scale.
    pub fn score(self) -> u8 {
        match self {
            Verdict::Critical => 0,
            Verdict::Poor => 1,
            Verdict::Fair => 2,
            Verdict::Good => 3,
            Verdict::VeryGood => 4,
            Verdict::Excellent => 5,
        }
    }

    /// Bucket a (possibly fractional or out-of-range) score back to the nearest level.
    ///
    /// Bucket boundaries sit at the midpoints between consecutive scores. Scores
    /// above the scale clamp to `Excellent`; negative scores and NaN land on `Critical`.
    pub fn from_score(score: f64) -> Verdict {
        if score >= 4.5 {
            Verdict::Excellent
        } else if score >= 3.5 {
            Verdict::VeryGood
        } else if score >= 2.5 {
            Verdict::Good
        } else if score >= 1.5 {
            Verdict::Fair
        } else if score >= 0.5 {
            Verdict::Poor
        } else {
            Verdict::Critical
        }
    }

    /// Canonical display label, as judges are asked to write it.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Critical => "Critical",
            Verdict::Poor => "Poor",
            Verdict::Fair => "Fair",
            Verdict::Good => "Good",
            Verdict::VeryGood => "Very Good",
            Verdict::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Verdict {
    type Err = String;

    /// Exact, case-sensitive match against the canonical labels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Verdict::ALL
            .into_iter()
            .find(|verdict| verdict.label() == value)
            .ok_or_else(|| format!("unknown verdict: {value}"))
    }
}

const VERDICT_MARKER: &str = "Verdict:";

/// Result of parsing a judge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerdict {
    /// The parsed level, or `Critical` when none could be recognised.
    pub verdict: Verdict,
    /// Free-form text preceding the verdict line.
    pub rationale: String,
}

/// Extract the verdict from raw judge text.
///
/// The first line carrying a `Verdict:` marker decides the outcome. The marker
/// may sit anywhere in the line, so list bullets, headings and phrases such as
/// `Final Verdict:` are accepted. Emphasis markup (`*`, `_`) around the label is
/// ignored. A missing marker or an unrecognised label falls back to `Critical`.
pub fn parse_verdict(raw: &str) -> ParsedVerdict {
    let mut offset = 0usize;
    for line in raw.split_inclusive('\n') {
        if let Some(captured) = marker_value(line) {
            let verdict = captured.parse().unwrap_or_else(|_| {
                log::debug!("unrecognised verdict label {captured:?}, using Critical");
                Verdict::Critical
            });
            return ParsedVerdict {
                verdict,
                rationale: raw[..offset].trim().to_string(),
            };
        }
        offset += line.len();
    }

    log::debug!("no verdict line in judge response, using Critical");
    ParsedVerdict {
        verdict: Verdict::Critical,
        rationale: raw.trim().to_string(),
    }
}

fn marker_value(line: &str) -> Option<&str> {
    let start = line.find(VERDICT_MARKER)?;
    Some(strip_emphasis(&line[start + VERDICT_MARKER.len()..]))
}

fn strip_emphasis(text: &str) -> &str {
    text.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::{Verdict, parse_verdict};

    #[test]
    fn scores_follow_scale_order() {
        let scores: Vec<u8> = Verdict::ALL.iter().map(|v| v.score()).collect();
        assert_eq!(scores, vec![0, 1, 2, 3, 4, 5]);
        assert!(Verdict::Critical < Verdict::Poor);
        assert!(Verdict::VeryGood < Verdict::Excellent);
    }

    #[test]
    fn score_and_level_round_trip() {
        for verdict in Verdict::ALL {
            assert_eq!(Verdict::from_score(f64::from(verdict.score())), verdict);
        }
    }

    #[test]
    fn from_score_uses_midpoint_buckets() {
        assert_eq!(Verdict::from_score(4.5), Verdict::Excellent);
        assert_eq!(Verdict::from_score(4.49), Verdict::VeryGood);
        assert_eq!(Verdict::from_score(3.5), Verdict::VeryGood);
        assert_eq!(Verdict::from_score(2.5), Verdict::Good);
        assert_eq!(Verdict::from_score(1.5), Verdict::Fair);
        assert_eq!(Verdict::from_score(0.5), Verdict::Poor);
        assert_eq!(Verdict::from_score(0.49), Verdict::Critical);
    }

    #[test]
    fn from_score_clamps_out_of_range() {
        assert_eq!(Verdict::from_score(7.0), Verdict::Excellent);
        assert_eq!(Verdict::from_score(-3.0), Verdict::Critical);
        assert_eq!(Verdict::from_score(f64::NAN), Verdict::Critical);
        assert_eq!(Verdict::from_score(f64::INFINITY), Verdict::Excellent);
    }

    #[test]
    fn labels_parse_exactly() {
        assert_eq!("Very Good".parse::<Verdict>(), Ok(Verdict::VeryGood));
        assert_eq!("Excellent".parse::<Verdict>(), Ok(Verdict::Excellent));
        assert!("VeryGood".parse::<Verdict>().is_err());
        assert!("good".parse::<Verdict>().is_err());
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Verdict::VeryGood).expect("json");
        assert_eq!(json, "\"Very Good\"");
        let parsed: Verdict = serde_json::from_str("\"Fair\"").expect("parse");
        assert_eq!(parsed, Verdict::Fair);
    }

    #[test]
    fn parses_plain_marker() {
        let parsed = parse_verdict("Clean module with tests.\nVerdict: Good\n");
        assert_eq!(parsed.verdict, Verdict::Good);
        assert_eq!(parsed.rationale, "Clean module with tests.");
    }

    #[test]
    fn parses_marker_wrapped_in_emphasis() {
        let raw = "## Review\nSolid naming.\n\n**Verdict:** Very Good\n\nTests: Fair";
        let parsed = parse_verdict(raw);
        assert_eq!(parsed.verdict, Verdict::VeryGood);
        assert_eq!(parsed.rationale, "## Review\nSolid naming.");

        assert_eq!(parse_verdict("**Verdict: Excellent**").verdict, Verdict::Excellent);
        assert_eq!(parse_verdict("_Verdict:_ *Poor*").verdict, Verdict::Poor);
    }

    #[test]
    fn parses_marker_inside_bullets_and_headings() {
        let parsed = parse_verdict("Mostly tidy.\n- **Verdict:** Good\n");
        assert_eq!(parsed.verdict, Verdict::Good);
        assert_eq!(parsed.rationale, "Mostly tidy.");

        assert_eq!(parse_verdict("## Verdict: Fair").verdict, Verdict::Fair);
        assert_eq!(
            parse_verdict("Final Verdict: Very Good").verdict,
            Verdict::VeryGood
        );
        assert_eq!(parse_verdict("> *Verdict:* _Poor_").verdict, Verdict::Poor);
    }

    #[test]
    fn first_marker_wins() {
        let parsed = parse_verdict("Verdict: Fair\nVerdict: Excellent");
        assert_eq!(parsed.verdict, Verdict::Fair);
        assert_eq!(parsed.rationale, "");
    }

    #[test]
    fn missing_marker_falls_back_to_critical() {
        let parsed = parse_verdict("Looks great overall, ship it.");
        assert_eq!(parsed.verdict, Verdict::Critical);
        assert_eq!(parsed.rationale, "Looks great overall, ship it.");

        assert_eq!(parse_verdict("").verdict, Verdict::Critical);
    }

    #[test]
    fn unknown_label_falls_back_to_critical() {
        assert_eq!(parse_verdict("Verdict: Superb").verdict, Verdict::Critical);
        assert_eq!(parse_verdict("Verdict: very good").verdict, Verdict::Critical);
        assert_eq!(parse_verdict("Verdict: Good-ish").verdict, Verdict::Critical);
    }
}
