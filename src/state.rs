use std::collections::VecDeque;

use chrono::Local;

use crate::result_view::CalculationResult;
use crate::submission::SubmissionId;
use crate::teams::TeamRoster;
use crate::validation::{Field, FieldErrors, MatchForm, MatchInput, Toss, validate};

const MAX_LOGS: usize = 200;

/// What the result area shows. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayState {
    #[default]
    Closed,
    Showing {
        result: CalculationResult,
        input: MatchInput,
    },
    Error(String),
}

impl DisplayState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DisplayState::Closed)
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub values: MatchForm,
    pub focus: Field,
    pub errors: FieldErrors,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            values: MatchForm::default(),
            focus: Field::YourTeam,
            errors: FieldErrors::default(),
        }
    }

    /// Team and toss fields behave like drop-downs; the rest take typed text.
    pub fn is_select(field: Field) -> bool {
        matches!(
            field,
            Field::YourTeam | Field::OppositionTeam | Field::TossResult
        )
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppState {
    pub roster: TeamRoster,
    pub form: FormState,
    pub display: DisplayState,
    pub pending: Option<SubmissionId>,
    pub latest_submission: Option<SubmissionId>,
    next_submission: u64,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(roster: TeamRoster) -> Self {
        Self {
            roster,
            form: FormState::new(),
            display: DisplayState::Closed,
            pending: None,
            latest_submission: None,
            next_submission: 1,
            logs: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn focus_next(&mut self) {
        self.form.focus = self.form.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.form.focus = self.form.focus.prev();
    }

    /// Moves a select-style field to its next or previous option.
    pub fn cycle_option(&mut self, forward: bool) {
        let field = self.form.focus;
        let current = self.form.values.get(field).to_string();
        let next = match field {
            Field::YourTeam | Field::OppositionTeam => self.roster.cycle(&current, forward),
            Field::TossResult => cycle_toss(&current, forward),
            _ => return,
        };
        *self.form.values.get_mut(field) = next;
    }

    pub fn type_char(&mut self, ch: char) {
        let field = self.form.focus;
        if FormState::is_select(field) || ch.is_control() {
            return;
        }
        self.form.values.get_mut(field).push(ch);
    }

    pub fn backspace(&mut self) {
        let field = self.form.focus;
        if FormState::is_select(field) {
            self.form.values.get_mut(field).clear();
        } else {
            self.form.values.get_mut(field).pop();
        }
    }

    pub fn reset_form(&mut self) {
        self.form = FormState::new();
    }

    /// Validates the form. On success the returned command must be sent to
    /// the worker; field errors are left on the form otherwise.
    pub fn submit(&mut self) -> Option<ProviderCommand> {
        match validate(&self.form.values, &self.roster) {
            Ok(input) => {
                self.form.errors = FieldErrors::default();
                let submission = SubmissionId(self.next_submission);
                self.next_submission += 1;
                if let Some(prev) = self.pending {
                    self.push_log(format!(
                        "[INFO] Submission #{} superseded by #{}",
                        prev.0, submission.0
                    ));
                }
                self.latest_submission = Some(submission);
                self.pending = Some(submission);
                self.push_log(format!(
                    "[INFO] Submission #{} sent: {} vs {}",
                    submission.0, input.your_team, input.opposition_team
                ));
                Some(ProviderCommand::Calculate { submission, input })
            }
            Err(errors) => {
                self.push_log(format!(
                    "[WARN] Form has {} invalid field(s)",
                    errors.len()
                ));
                self.form.errors = errors;
                None
            }
        }
    }

    /// Hides the dialog. A pending request keeps running.
    pub fn close_display(&mut self) {
        self.display = DisplayState::Closed;
    }

    /// Reverts a submission whose command never reached the worker.
    pub fn abandon(&mut self, submission: SubmissionId, reason: &str) {
        if self.pending == Some(submission) {
            self.pending = None;
        }
        self.push_log(format!("[WARN] Submission #{} dropped: {reason}", submission.0));
        self.display = DisplayState::Error(reason.to_string());
    }
}

fn cycle_toss(current: &str, forward: bool) -> String {
    let options = ["", Toss::Bat.as_str(), Toss::Bowl.as_str()];
    let idx = Toss::parse(current)
        .map(|t| if t == Toss::Bat { 1 } else { 2 })
        .unwrap_or(0);
    let next = if forward { (idx + 1) % 3 } else { (idx + 2) % 3 };
    options[next].to_string()
}

#[derive(Debug, Clone)]
pub enum Delta {
    CalculationFinished {
        submission: SubmissionId,
        input: MatchInput,
        outcome: Result<CalculationResult, String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Calculate {
        submission: SubmissionId,
        input: MatchInput,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::CalculationFinished {
            submission,
            input,
            outcome,
        } => {
            if state.latest_submission != Some(submission) {
                state.push_log(format!(
                    "[INFO] Discarded stale response for submission #{}",
                    submission.0
                ));
                return;
            }
            state.pending = None;
            match outcome {
                Ok(result) if result.answer.is_none() => {
                    // Nothing to present, so the dialog must not stay open.
                    state.push_log(format!(
                        "[WARN] Submission #{} returned no answer",
                        submission.0
                    ));
                    state.display = DisplayState::Closed;
                }
                Ok(result) => {
                    state.push_log(format!("[INFO] Submission #{} complete", submission.0));
                    state.display = DisplayState::Showing { result, input };
                }
                Err(message) => {
                    state.push_log(format!(
                        "[WARN] Submission #{} failed: {message}",
                        submission.0
                    ));
                    state.display = DisplayState::Error(message);
                }
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
