use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::state::{Delta, ProviderCommand};
use crate::submission::{CalculationService, complete};

/// Runs calculation requests off the UI thread, one at a time, until the
/// command channel closes or the UI stops listening. Commands that queued up
/// behind a slow request are skipped in favour of the newest one.
pub fn spawn_calc_provider<S>(
    service: S,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    S: CalculationService + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(first) = cmd_rx.recv() {
            let cmd = newest_queued(first, &cmd_rx, &tx);
            match cmd {
                ProviderCommand::Calculate { submission, input } => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Calculating submission #{}",
                        submission.0
                    )));
                    let outcome = complete(&service, &input);
                    if tx
                        .send(Delta::CalculationFinished {
                            submission,
                            input,
                            outcome,
                        })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }
    })
}

fn newest_queued(
    mut cmd: ProviderCommand,
    cmd_rx: &Receiver<ProviderCommand>,
    tx: &Sender<Delta>,
) -> ProviderCommand {
    while let Ok(newer) = cmd_rx.try_recv() {
        let ProviderCommand::Calculate { submission, .. } = &cmd;
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Skipped superseded submission #{}",
            submission.0
        )));
        cmd = newer;
    }
    cmd
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::spawn_calc_provider;
    use crate::calc_client::{FailureKind, RemoteFailure};
    use crate::result_view::RawCalculationResult;
    use crate::state::{Delta, ProviderCommand};
    use crate::submission::{CalculationService, SubmissionId};
    use crate::validation::{MatchInput, Toss};

    struct Down;

    impl CalculationService for Down {
        fn calculate(&self, _input: &MatchInput) -> Result<RawCalculationResult, RemoteFailure> {
            Err(RemoteFailure::new(FailureKind::Transport, "connection refused"))
        }
    }

    /// Records the runs figure of every input it is asked about.
    struct Recorder(Arc<Mutex<Vec<f64>>>);

    impl CalculationService for Recorder {
        fn calculate(&self, input: &MatchInput) -> Result<RawCalculationResult, RemoteFailure> {
            self.0.lock().expect("lock").push(input.runs_scored);
            Err(RemoteFailure::new(FailureKind::Service, "recorded"))
        }
    }

    fn input_with_runs(runs: f64) -> MatchInput {
        MatchInput {
            your_team: "A".to_string(),
            opposition_team: "B".to_string(),
            match_overs: 20.0,
            desired_position: 2,
            toss_result: Toss::Bat,
            runs_scored: runs,
        }
    }

    #[test]
    fn queued_commands_collapse_to_newest() {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        for (id, runs) in [(1, 100.0), (2, 120.0), (3, 140.0)] {
            cmd_tx
                .send(ProviderCommand::Calculate {
                    submission: SubmissionId(id),
                    input: input_with_runs(runs),
                })
                .expect("send");
        }
        drop(cmd_tx);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let handle = spawn_calc_provider(Recorder(Arc::clone(&calls)), tx, cmd_rx);

        let mut finished = Vec::new();
        let mut logs = Vec::new();
        while let Ok(delta) = rx.recv_timeout(Duration::from_secs(5)) {
            match delta {
                Delta::CalculationFinished { submission, .. } => finished.push(submission),
                Delta::Log(line) => logs.push(line),
            }
        }
        handle.join().expect("worker exits");

        assert_eq!(*calls.lock().expect("lock"), vec![140.0]);
        assert_eq!(finished, vec![SubmissionId(3)]);
        assert!(logs.contains(&"[INFO] Skipped superseded submission #1".to_string()));
        assert!(logs.contains(&"[INFO] Skipped superseded submission #2".to_string()));
    }

    #[test]
    fn worker_replies_with_tagged_outcome() {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let handle = spawn_calc_provider(Down, tx, cmd_rx);

        let input = MatchInput {
            your_team: "A".to_string(),
            opposition_team: "B".to_string(),
            match_overs: 20.0,
            desired_position: 2,
            toss_result: Toss::Bat,
            runs_scored: 160.0,
        };
        cmd_tx
            .send(ProviderCommand::Calculate {
                submission: SubmissionId(7),
                input,
            })
            .expect("send");
        drop(cmd_tx);

        let mut finished = None;
        while let Ok(delta) = rx.recv_timeout(Duration::from_secs(5)) {
            if let Delta::CalculationFinished {
                submission,
                outcome,
                ..
            } = delta
            {
                finished = Some((submission, outcome));
            }
        }
        handle.join().expect("worker exits");
        let (submission, outcome) = finished.expect("finished delta");
        assert_eq!(submission, SubmissionId(7));
        assert_eq!(outcome, Err("connection refused".to_string()));
    }
}
