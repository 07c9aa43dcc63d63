use nrr_terminal::teams::TeamRoster;
use nrr_terminal::validation::{Field, MatchForm, Toss, validate};

fn roster() -> TeamRoster {
    TeamRoster::new(["A", "B", "C"])
}

fn valid_form() -> MatchForm {
    MatchForm {
        your_team: "A".to_string(),
        opposition_team: "B".to_string(),
        match_overs: "20".to_string(),
        desired_position: "3".to_string(),
        toss_result: "bowl".to_string(),
        runs_scored: "150".to_string(),
    }
}

#[test]
fn accepts_valid_form() {
    let input = validate(&valid_form(), &roster()).expect("form should validate");
    assert_eq!(input.your_team, "A");
    assert_eq!(input.opposition_team, "B");
    assert_eq!(input.match_overs, 20.0);
    assert_eq!(input.desired_position, 3);
    assert_eq!(input.toss_result, Toss::Bowl);
    assert_eq!(input.runs_scored, 150.0);
}

#[test]
fn same_teams_error_is_on_opposition_only() {
    for team in ["A", "B", "C"] {
        let mut form = valid_form();
        form.your_team = team.to_string();
        form.opposition_team = team.to_string();
        let errors = validate(&form, &roster()).expect_err("same teams must fail");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first(Field::OppositionTeam),
            Some("Your team and Opponent team must be different")
        );
        assert!(!errors.contains(Field::YourTeam));
    }
}

#[test]
fn cross_field_rule_skipped_when_a_team_is_invalid() {
    let mut form = valid_form();
    form.your_team = String::new();
    form.opposition_team = String::new();
    let errors = validate(&form, &roster()).expect_err("empty teams must fail");
    assert_eq!(errors.messages(Field::YourTeam), &["Your Team is required"]);
    assert_eq!(
        errors.messages(Field::OppositionTeam),
        &["Opponent Team is required"]
    );
}

#[test]
fn team_outside_roster_is_rejected() {
    let mut form = valid_form();
    form.opposition_team = "Z".to_string();
    let errors = validate(&form, &roster()).expect_err("unknown team must fail");
    assert_eq!(errors.first(Field::OppositionTeam), Some("Unknown team: Z"));
}

#[test]
fn position_outside_range_or_fractional_fails() {
    for raw in ["0", "6", "-1", "2.5", "100"] {
        let mut form = valid_form();
        form.desired_position = raw.to_string();
        let errors = validate(&form, &roster()).expect_err("position must fail");
        assert!(errors.contains(Field::DesiredPosition), "position {raw}");
        assert_eq!(errors.len(), 1, "position {raw}");
    }
    for raw in ["1", "5", "5.0"] {
        let mut form = valid_form();
        form.desired_position = raw.to_string();
        assert!(validate(&form, &roster()).is_ok(), "position {raw}");
    }
}

#[test]
fn negative_runs_fail_and_zero_is_accepted() {
    let mut form = valid_form();
    form.runs_scored = "-0.5".to_string();
    let errors = validate(&form, &roster()).expect_err("negative runs must fail");
    assert_eq!(errors.first(Field::RunsScored), Some("Runs cannot be negative"));

    form.runs_scored = "0".to_string();
    let input = validate(&form, &roster()).expect("zero runs are valid");
    assert_eq!(input.runs_scored, 0.0);
}

#[test]
fn overs_must_be_positive() {
    for raw in ["0", "-20"] {
        let mut form = valid_form();
        form.match_overs = raw.to_string();
        let errors = validate(&form, &roster()).expect_err("overs must fail");
        assert_eq!(
            errors.first(Field::MatchOvers),
            Some("Match Overs must be greater than zero")
        );
    }
}

#[test]
fn non_numeric_entries_fail_on_their_field() {
    let mut form = valid_form();
    form.match_overs = "twenty".to_string();
    form.desired_position = String::new();
    form.runs_scored = "NaN".to_string();
    let errors = validate(&form, &roster()).expect_err("must fail");
    assert_eq!(errors.first(Field::MatchOvers), Some("Match Overs must be a number"));
    assert_eq!(
        errors.first(Field::DesiredPosition),
        Some("Desired Position must be a number")
    );
    assert_eq!(errors.first(Field::RunsScored), Some("Runs Scored must be a number"));
}

#[test]
fn all_violations_reported_together() {
    let form = MatchForm {
        your_team: String::new(),
        opposition_team: "B".to_string(),
        match_overs: "0".to_string(),
        desired_position: "9".to_string(),
        toss_result: "field".to_string(),
        runs_scored: "-1".to_string(),
    };
    let errors = validate(&form, &roster()).expect_err("must fail");
    let fields = errors.fields().collect::<Vec<_>>();
    assert_eq!(
        fields,
        vec![
            Field::YourTeam,
            Field::MatchOvers,
            Field::DesiredPosition,
            Field::TossResult,
            Field::RunsScored,
        ]
    );
    assert_eq!(
        errors.first(Field::TossResult),
        Some("Toss Result must be 'bat' or 'bowl'")
    );
}

#[test]
fn serialized_input_uses_wire_keys() {
    let input = validate(&valid_form(), &roster()).expect("valid");
    let value = serde_json::to_value(&input).expect("serialize");
    let obj = value.as_object().expect("object");
    let mut keys = obj.keys().cloned().collect::<Vec<_>>();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "desiredPosition",
            "matchOvers",
            "oppositionTeam",
            "runsScored",
            "tossResult",
            "yourTeam",
        ]
    );
    assert_eq!(obj["tossResult"], "bowl");
    assert_eq!(obj["desiredPosition"], 3);
}
