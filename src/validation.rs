use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::teams::TeamRoster;

pub const MIN_POSITION: u8 = 1;
pub const MAX_POSITION: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    YourTeam,
    OppositionTeam,
    MatchOvers,
    DesiredPosition,
    TossResult,
    RunsScored,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::YourTeam,
        Field::OppositionTeam,
        Field::MatchOvers,
        Field::DesiredPosition,
        Field::TossResult,
        Field::RunsScored,
    ];

    /// Wire key of the field, as sent to the calculation service.
    pub fn key(self) -> &'static str {
        match self {
            Field::YourTeam => "yourTeam",
            Field::OppositionTeam => "oppositionTeam",
            Field::MatchOvers => "matchOvers",
            Field::DesiredPosition => "desiredPosition",
            Field::TossResult => "tossResult",
            Field::RunsScored => "runsScored",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::YourTeam => "Your Team",
            Field::OppositionTeam => "Opponent Team",
            Field::MatchOvers => "Match Overs",
            Field::DesiredPosition => "Desired Position",
            Field::TossResult => "Toss Result",
            Field::RunsScored => "Runs Scored",
        }
    }

    pub fn next(self) -> Field {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Field {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toss {
    Bat,
    Bowl,
}

impl Toss {
    pub fn as_str(self) -> &'static str {
        match self {
            Toss::Bat => "bat",
            Toss::Bowl => "bowl",
        }
    }

    pub fn parse(raw: &str) -> Option<Toss> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bat" => Some(Toss::Bat),
            "bowl" => Some(Toss::Bowl),
            _ => None,
        }
    }
}

/// A match input that passed every rule. Built only by [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    pub your_team: String,
    pub opposition_team: String,
    pub match_overs: f64,
    pub desired_position: u8,
    pub toss_result: Toss,
    pub runs_scored: f64,
}

/// Raw form contents, one string per field, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchForm {
    pub your_team: String,
    pub opposition_team: String,
    pub match_overs: String,
    pub desired_position: String,
    pub toss_result: String,
    pub runs_scored: String,
}

impl MatchForm {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::YourTeam => &self.your_team,
            Field::OppositionTeam => &self.opposition_team,
            Field::MatchOvers => &self.match_overs,
            Field::DesiredPosition => &self.desired_position,
            Field::TossResult => &self.toss_result,
            Field::RunsScored => &self.runs_scored,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::YourTeam => &mut self.your_team,
            Field::OppositionTeam => &mut self.opposition_team,
            Field::MatchOvers => &mut self.match_overs,
            Field::DesiredPosition => &mut self.desired_position,
            Field::TossResult => &mut self.toss_result,
            Field::RunsScored => &mut self.runs_scored,
        }
    }
}

/// Validation failures keyed by field. Non-empty whenever returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, Vec<String>>,
}

impl FieldErrors {
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn messages(&self, field: Field) -> &[String] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message for the field, the one shown next to the input.
    pub fn first(&self, field: Field) -> Option<&str> {
        self.messages(field).first().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[String])> + '_ {
        self.errors.iter().map(|(f, msgs)| (*f, msgs.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msgs) in self.iter() {
            for msg in msgs {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {msg}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Runs every per-field rule, then the whole-record rule, and reports all
/// violations at once.
pub fn validate(form: &MatchForm, roster: &TeamRoster) -> Result<MatchInput, FieldErrors> {
    let mut errors = FieldErrors::default();

    let your_team = check_team(&form.your_team, Field::YourTeam, roster, &mut errors);
    let opposition_team =
        check_team(&form.opposition_team, Field::OppositionTeam, roster, &mut errors);
    let match_overs = check_overs(&form.match_overs, &mut errors);
    let desired_position = check_position(&form.desired_position, &mut errors);
    let toss_result = check_toss(&form.toss_result, &mut errors);
    let runs_scored = check_runs(&form.runs_scored, &mut errors);

    if let (Some(yours), Some(theirs)) = (&your_team, &opposition_team) {
        if yours == theirs {
            errors.push(
                Field::OppositionTeam,
                "Your team and Opponent team must be different",
            );
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every rule that yields `None` also records an error.
    match (
        your_team,
        opposition_team,
        match_overs,
        desired_position,
        toss_result,
        runs_scored,
    ) {
        (
            Some(your_team),
            Some(opposition_team),
            Some(match_overs),
            Some(desired_position),
            Some(toss_result),
            Some(runs_scored),
        ) => Ok(MatchInput {
            your_team,
            opposition_team,
            match_overs,
            desired_position,
            toss_result,
            runs_scored,
        }),
        _ => Err(errors),
    }
}

fn check_team(
    raw: &str,
    field: Field,
    roster: &TeamRoster,
    errors: &mut FieldErrors,
) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        let msg = match field {
            Field::OppositionTeam => "Opponent Team is required",
            _ => "Your Team is required",
        };
        errors.push(field, msg);
        return None;
    }
    if !roster.contains(name) {
        errors.push(field, format!("Unknown team: {name}"));
        return None;
    }
    Some(name.to_string())
}

fn parse_number(raw: &str, field: Field, errors: &mut FieldErrors) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.push(field, format!("{} must be a number", field.label()));
            None
        }
    }
}

fn check_overs(raw: &str, errors: &mut FieldErrors) -> Option<f64> {
    let overs = parse_number(raw, Field::MatchOvers, errors)?;
    if overs <= 0.0 {
        errors.push(Field::MatchOvers, "Match Overs must be greater than zero");
        return None;
    }
    Some(overs)
}

fn check_position(raw: &str, errors: &mut FieldErrors) -> Option<u8> {
    let value = parse_number(raw, Field::DesiredPosition, errors)?;
    let mut ok = true;
    if value.fract() != 0.0 {
        errors.push(
            Field::DesiredPosition,
            "Desired Position must be a whole number",
        );
        ok = false;
    }
    if value < f64::from(MIN_POSITION) || value > f64::from(MAX_POSITION) {
        errors.push(Field::DesiredPosition, "Must be between 1 and 5");
        ok = false;
    }
    if ok { Some(value as u8) } else { None }
}

fn check_toss(raw: &str, errors: &mut FieldErrors) -> Option<Toss> {
    let toss = Toss::parse(raw);
    if toss.is_none() {
        errors.push(Field::TossResult, "Toss Result must be 'bat' or 'bowl'");
    }
    toss
}

fn check_runs(raw: &str, errors: &mut FieldErrors) -> Option<f64> {
    let runs = parse_number(raw, Field::RunsScored, errors)?;
    if runs < 0.0 {
        errors.push(Field::RunsScored, "Runs cannot be negative");
        return None;
    }
    Some(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> MatchForm {
        MatchForm {
            your_team: "A".to_string(),
            opposition_team: "B".to_string(),
            match_overs: "20".to_string(),
            desired_position: "3".to_string(),
            toss_result: "bat".to_string(),
            runs_scored: "150".to_string(),
        }
    }

    fn roster() -> TeamRoster {
        TeamRoster::new(["A", "B", "C"])
    }

    #[test]
    fn fractional_out_of_range_position_reports_both_rules() {
        let mut f = form();
        f.desired_position = "7.5".to_string();
        let errs = validate(&f, &roster()).expect_err("should fail");
        assert_eq!(errs.messages(Field::DesiredPosition).len(), 2);
    }

    #[test]
    fn infinity_is_not_a_number() {
        let mut f = form();
        f.match_overs = "inf".to_string();
        let errs = validate(&f, &roster()).expect_err("should fail");
        assert_eq!(errs.first(Field::MatchOvers), Some("Match Overs must be a number"));
    }

    #[test]
    fn toss_is_case_insensitive_and_trimmed() {
        let mut f = form();
        f.toss_result = " BOWL ".to_string();
        let input = validate(&f, &roster()).expect("valid");
        assert_eq!(input.toss_result, Toss::Bowl);
    }

    #[test]
    fn field_cycle_wraps() {
        assert_eq!(Field::RunsScored.next(), Field::YourTeam);
        assert_eq!(Field::YourTeam.prev(), Field::RunsScored);
    }
}
