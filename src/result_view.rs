//! Interpretation of calculation results.
//!
//! The service sends every answer field as optional; [`CalculationResult`]
//! is the checked form where each answer variant carries exactly the fields
//! its mode needs. Conversion fails closed with [`MalformedResult`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{MatchInput, Toss};

const IMPOSSIBLE_FALLBACK: &str = "No achievable range for the desired position";

/// Scenario the service answered for. Same tags as the toss result.
pub type Mode = Toss;

/// Response body as received from the calculation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCalculationResult {
    pub mode: Mode,
    #[serde(default)]
    pub answer: Option<RawAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    #[serde(default)]
    pub restrict_runs_min: Option<f64>,
    #[serde(default)]
    pub restrict_runs_max: Option<f64>,
    #[serde(default)]
    pub min_overs: Option<f64>,
    #[serde(default)]
    pub max_overs: Option<f64>,
    #[serde(default, rename = "revisedNRRMin")]
    pub revised_nrr_min: Option<f64>,
    #[serde(default, rename = "revisedNRRMax")]
    pub revised_nrr_max: Option<f64>,
    #[serde(default)]
    pub impossible: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NrrRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Impossible {
        message: String,
    },
    BattingFirst {
        restrict_runs_min: f64,
        restrict_runs_max: f64,
        revised_nrr: NrrRange,
    },
    Chasing {
        min_overs: f64,
        max_overs: f64,
        revised_nrr: NrrRange,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub mode: Mode,
    pub answer: Option<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {mode} result: missing {}", .missing.join(", "))]
pub struct MalformedResult {
    pub mode: &'static str,
    pub missing: Vec<&'static str>,
}

impl TryFrom<RawCalculationResult> for CalculationResult {
    type Error = MalformedResult;

    fn try_from(raw: RawCalculationResult) -> Result<Self, Self::Error> {
        let answer = match raw.answer {
            Some(answer) => Some(check_answer(raw.mode, answer)?),
            None => None,
        };
        Ok(Self {
            mode: raw.mode,
            answer,
        })
    }
}

fn check_answer(mode: Mode, raw: RawAnswer) -> Result<Answer, MalformedResult> {
    if raw.impossible.unwrap_or(false) {
        let message = raw
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| IMPOSSIBLE_FALLBACK.to_string());
        return Ok(Answer::Impossible { message });
    }

    let mut missing = Vec::new();
    let (first, second) = match mode {
        Mode::Bat => (
            require(raw.restrict_runs_min, "restrictRunsMin", &mut missing),
            require(raw.restrict_runs_max, "restrictRunsMax", &mut missing),
        ),
        Mode::Bowl => (
            require(raw.min_overs, "minOvers", &mut missing),
            require(raw.max_overs, "maxOvers", &mut missing),
        ),
    };
    let nrr_min = require(raw.revised_nrr_min, "revisedNRRMin", &mut missing);
    let nrr_max = require(raw.revised_nrr_max, "revisedNRRMax", &mut missing);

    match (first, second, nrr_min, nrr_max) {
        (Some(first), Some(second), Some(min), Some(max)) => {
            let revised_nrr = NrrRange { min, max };
            Ok(match mode {
                Mode::Bat => Answer::BattingFirst {
                    restrict_runs_min: first,
                    restrict_runs_max: second,
                    revised_nrr,
                },
                Mode::Bowl => Answer::Chasing {
                    min_overs: first,
                    max_overs: second,
                    revised_nrr,
                },
            })
        }
        _ => Err(MalformedResult {
            mode: mode.as_str(),
            missing,
        }),
    }
}

fn require(value: Option<f64>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            missing.push(name);
            None
        }
    }
}

/// What the result dialog shows. Numbers are already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Impossible {
        message: String,
    },
    BattingFirst {
        your_team: String,
        opposition_team: String,
        match_overs: String,
        runs_scored: String,
        restrict_runs_min: String,
        restrict_runs_max: String,
        nrr_min: String,
        nrr_max: String,
    },
    Chasing {
        your_team: String,
        opposition_team: String,
        match_overs: String,
        runs_scored: String,
        min_overs: String,
        max_overs: String,
        nrr_min: String,
        nrr_max: String,
    },
}

impl Presentation {
    pub fn title(&self) -> &'static str {
        match self {
            Presentation::Impossible { .. } => "No achievable outcome",
            Presentation::BattingFirst { .. } => "Batting first",
            Presentation::Chasing { .. } => "Chasing",
        }
    }

    /// Narrative lines for display.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Presentation::Impossible { message } => vec![message.clone()],
            Presentation::BattingFirst {
                your_team,
                opposition_team,
                match_overs,
                runs_scored,
                restrict_runs_min,
                restrict_runs_max,
                nrr_min,
                nrr_max,
            } => vec![
                format!(
                    "If {your_team} score {runs_scored} runs in {match_overs} overs, \
                     {your_team} need to restrict {opposition_team} between \
                     {restrict_runs_min} to {restrict_runs_max} runs in {match_overs} overs."
                ),
                format!("Revised NRR of {your_team} will be between {nrr_min} to {nrr_max}."),
            ],
            Presentation::Chasing {
                your_team,
                opposition_team,
                match_overs,
                runs_scored,
                min_overs,
                max_overs,
                nrr_min,
                nrr_max,
            } => vec![
                format!(
                    "{your_team} need to chase {runs_scored} runs set by {opposition_team} \
                     between {min_overs} to {max_overs} overs (of {match_overs})."
                ),
                format!("Revised NRR for {your_team} will be between {nrr_min} to {nrr_max}."),
            ],
        }
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

/// Builds presentation data for a checked result. `None` means nothing to show.
pub fn interpret(result: &CalculationResult, input: &MatchInput) -> Option<Presentation> {
    let answer = result.answer.as_ref()?;
    let presentation = match answer {
        Answer::Impossible { message } => Presentation::Impossible {
            message: message.clone(),
        },
        Answer::BattingFirst {
            restrict_runs_min,
            restrict_runs_max,
            revised_nrr,
        } => Presentation::BattingFirst {
            your_team: input.your_team.clone(),
            opposition_team: input.opposition_team.clone(),
            match_overs: format_number(input.match_overs),
            runs_scored: format_number(input.runs_scored),
            restrict_runs_min: format_number(*restrict_runs_min),
            restrict_runs_max: format_number(*restrict_runs_max),
            nrr_min: format_nrr(revised_nrr.min),
            nrr_max: format_nrr(revised_nrr.max),
        },
        Answer::Chasing {
            min_overs,
            max_overs,
            revised_nrr,
        } => Presentation::Chasing {
            your_team: input.your_team.clone(),
            opposition_team: input.opposition_team.clone(),
            match_overs: format_number(input.match_overs),
            runs_scored: format_number(input.runs_scored),
            min_overs: format_number(*min_overs),
            max_overs: format_number(*max_overs),
            nrr_min: format_nrr(revised_nrr.min),
            nrr_max: format_nrr(revised_nrr.max),
        },
    };
    Some(presentation)
}

/// Shortest round-trip decimal form (`150`, `10.4`).
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Formats an NRR bound with exactly three decimals, rounding half away
/// from zero on the shortest decimal form of the value, so `1.2345` shows
/// as `1.235` even though its binary value sits just below the midpoint.
pub fn format_nrr(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = match repr.split_once('.') {
        Some((i, f)) => (i, f),
        None => (repr.as_str(), ""),
    };

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(3))
        .map(|b| b - b'0')
        .collect();
    let round_up = frac_part.as_bytes().get(3).is_some_and(|d| *d >= b'5');

    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 3;
    let int_str: String = digits[..split].iter().map(|d| char::from(b'0' + d)).collect();
    let frac_str: String = digits[split..].iter().map(|d| char::from(b'0' + d)).collect();
    let is_zero = digits.iter().all(|d| *d == 0);
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}{int_str}.{frac_str}")
}
