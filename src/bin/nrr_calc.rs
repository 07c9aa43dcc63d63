use anyhow::{Context, Result, anyhow};

use nrr_terminal::calc_client::CalcClient;
use nrr_terminal::config::AppConfig;
use nrr_terminal::result_view::interpret;
use nrr_terminal::submission::{SubmissionOutcome, run_submission};
use nrr_terminal::validation::{Field, MatchForm};

const USAGE: &str = "usage: nrr_calc --your-team <TEAM> --opposition-team <TEAM> --overs <N> \
--position <1-5> --toss <bat|bowl> --runs <N>";

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    let form = parse_form_args(&args)?;

    let cfg = AppConfig::load().context("failed to load configuration")?;
    let client = CalcClient::from_config(&cfg)?;

    match run_submission(&form, &cfg.roster, &client) {
        SubmissionOutcome::Rejected(errors) => {
            for (field, msgs) in errors.iter() {
                for msg in msgs {
                    eprintln!("{}: {msg}", field.label());
                }
            }
            Err(anyhow!("{} invalid field(s)", errors.len()))
        }
        SubmissionOutcome::Failed(message) => Err(remote_error(message)),
        SubmissionOutcome::Completed { input, result } => {
            match interpret(&result, &input) {
                Some(view) => {
                    println!("{}", view.title());
                    for line in view.lines() {
                        println!("{line}");
                    }
                }
                None => println!("No result returned"),
            }
            Ok(())
        }
    }
}

/// anyhow's report already prefixes `Error: `, so the message goes in bare.
fn remote_error(message: String) -> anyhow::Error {
    anyhow!(message)
}

fn parse_form_args(args: &[String]) -> Result<MatchForm> {
    let mut form = MatchForm::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let field = match flag.as_str() {
            "--your-team" => Field::YourTeam,
            "--opposition-team" => Field::OppositionTeam,
            "--overs" => Field::MatchOvers,
            "--position" => Field::DesiredPosition,
            "--toss" => Field::TossResult,
            "--runs" => Field::RunsScored,
            other => return Err(anyhow!("unknown argument {other}\n{USAGE}")),
        };
        let value = iter
            .next()
            .with_context(|| format!("missing value for {flag}"))?;
        *form.get_mut(field) = value.clone();
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::{parse_form_args, remote_error};

    #[test]
    fn remote_failure_is_reported_once() {
        let err = remote_error("service unavailable".to_string());
        assert_eq!(err.to_string(), "service unavailable");
        assert!(!err.to_string().starts_with("Error:"));
    }

    #[test]
    fn flags_fill_form_fields() {
        let args = ["--your-team", "A", "--toss", "bowl", "--runs", "150"]
            .map(String::from)
            .to_vec();
        let form = parse_form_args(&args).expect("valid flags");
        assert_eq!(form.your_team, "A");
        assert_eq!(form.toss_result, "bowl");
        assert_eq!(form.runs_scored, "150");
        assert!(parse_form_args(&["--bogus".to_string()]).is_err());
        assert!(parse_form_args(&["--overs".to_string()]).is_err());
    }
}
