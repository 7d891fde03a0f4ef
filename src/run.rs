use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info, warn};

use ordercheck_core::config::AppConfig;
use ordercheck_core::types::{Credentials, Outcome, ProbeResult, ReportContext};
use ordercheck_core::CheckError;
use ordercheck_login::dump;
use ordercheck_login::{build_login_data, classify, find_login_form, resolve_action, PortalClient};
use ordercheck_notify::{Notifier, Report};

/// One run is a walk through these states. Candidate URLs are tried strictly
/// in order inside LoginAttempt; OrderProbe only happens after a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ConnectivityProbe,
    LoginAttempt { index: usize },
    LoginSucceeded,
    LoginFailed,
    OrderProbe,
    ReportSent,
    Done,
}

/// What a single candidate URL produced. Success and Failure are definitive;
/// everything else advances to the next candidate.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success { submitted_to: String },
    Failure { submitted_to: String },
    Ambiguous,
    NoForm,
    Network(String),
}

pub fn next_after_attempt(index: usize, total: usize, outcome: &AttemptOutcome) -> RunState {
    match outcome {
        AttemptOutcome::Success { .. } => RunState::LoginSucceeded,
        AttemptOutcome::Failure { .. } => RunState::LoginFailed,
        AttemptOutcome::Ambiguous | AttemptOutcome::NoForm | AttemptOutcome::Network(_) => {
            if index + 1 < total {
                RunState::LoginAttempt { index: index + 1 }
            } else {
                RunState::LoginFailed
            }
        }
    }
}

pub struct Runner {
    config: AppConfig,
    creds: Credentials,
    client: PortalClient,
    ctx: ReportContext,
}

impl Runner {
    pub fn new(config: AppConfig, creds: Credentials) -> Result<Self, CheckError> {
        let client = PortalClient::new(&config.http, &config.heuristics)?;
        let ctx = ReportContext::new(chrono::Utc::now());
        Ok(Self { config, creds, client, ctx })
    }

    /// Drive the state machine to completion and hand back the report context.
    /// Per-candidate failures never escape; they become attempt outcomes.
    pub async fn run(mut self, notifier: Option<&Notifier>) -> ReportContext {
        let started = Instant::now();
        let total = self.config.portal.login_urls.len();
        let mut state = RunState::Init;

        loop {
            state = match state {
                RunState::Init => {
                    info!(candidates = total, "starting order check run");
                    RunState::ConnectivityProbe
                }

                RunState::ConnectivityProbe => {
                    self.probe_candidates().await;
                    if total == 0 {
                        warn!("no candidate login URLs configured");
                        RunState::LoginFailed
                    } else {
                        RunState::LoginAttempt { index: 0 }
                    }
                }

                RunState::LoginAttempt { index } => {
                    let url = self.config.portal.login_urls[index].clone();
                    info!(url = %url, attempt = index + 1, total, "login attempt");

                    let outcome = self.attempt_login(&url).await;
                    match &outcome {
                        AttemptOutcome::Success { submitted_to } => {
                            self.ctx.outcome = Some(Outcome::Success);
                            self.ctx.decided_at = Some(submitted_to.clone());
                        }
                        AttemptOutcome::Failure { submitted_to } => {
                            self.ctx.outcome = Some(Outcome::Failure);
                            self.ctx.decided_at = Some(submitted_to.clone());
                        }
                        AttemptOutcome::Ambiguous => {
                            info!(url = %url, "ambiguous response, trying next candidate")
                        }
                        AttemptOutcome::NoForm => {
                            warn!(url = %url, "no login form found, trying next candidate")
                        }
                        AttemptOutcome::Network(e) => {
                            warn!(url = %url, error = %e, "network error, trying next candidate")
                        }
                    }
                    next_after_attempt(index, total, &outcome)
                }

                RunState::LoginSucceeded => {
                    info!(decided_at = ?self.ctx.decided_at, "login succeeded");
                    RunState::OrderProbe
                }

                RunState::LoginFailed => {
                    warn!(outcome = ?self.ctx.outcome, "login failed");
                    RunState::ReportSent
                }

                RunState::OrderProbe => {
                    self.probe_orders().await;
                    RunState::ReportSent
                }

                RunState::ReportSent => {
                    self.ctx.duration_secs = started.elapsed().as_secs_f64();
                    let report = Report::from_run(&self.ctx);
                    match notifier {
                        Some(n) => {
                            if let Err(e) = n.send(&report) {
                                // A lost report must not mask the run outcome
                                error!(error = %e, "report send failed");
                            }
                        }
                        None => info!(subject = %report.subject, "mail disabled\n{}", report.body),
                    }
                    RunState::Done
                }

                RunState::Done => break,
            };
        }

        self.ctx
    }

    /// GET every candidate login URL once, for the diagnostic email only.
    async fn probe_candidates(&mut self) {
        for url in self.config.portal.login_urls.clone() {
            let probe = match self.client.get(&url).await {
                Ok(page) => {
                    info!(url = %url, status = page.status, "connectivity probe");
                    ProbeResult::ok(&url, page.status, &page.final_url, page.body_len)
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "connectivity probe failed");
                    ProbeResult::failed(&url, &e.to_string())
                }
            };
            self.ctx.probes.push(probe);
        }
    }

    /// The heuristic core: fetch, locate the form, map credentials, resolve
    /// the action, submit, classify.
    async fn attempt_login(&mut self, url: &str) -> AttemptOutcome {
        let page = match self.client.get(url).await {
            Ok(page) => page,
            Err(e) => return AttemptOutcome::Network(e.to_string()),
        };
        if page.status != 200 {
            return AttemptOutcome::Network(format!("status {}", page.status));
        }

        let Some(form) = find_login_form(&page.text, &self.config.heuristics.password_aliases)
        else {
            return AttemptOutcome::NoForm;
        };

        let login_data = build_login_data(&form, &self.creds, &self.config.heuristics);

        if self.config.debug.dump_pages {
            let dir = PathBuf::from(&self.config.debug.dump_dir);
            dump::dump_page(&dir, &format!("login-page-{}", url), &page.text);
            dump::dump_login_fields(&dir, &format!("login-page-{}", url), &login_data);
        }

        let target = match resolve_action(form.action.as_deref(), &page.final_url) {
            Ok(t) => t,
            Err(e) => return AttemptOutcome::Network(e.to_string()),
        };
        info!(target = %target, fields = login_data.len(), "submitting login form");

        let response = match self.client.post_form(&target, &login_data).await {
            Ok(r) => r,
            Err(e) => return AttemptOutcome::Network(e.to_string()),
        };

        if self.config.debug.dump_pages {
            let dir = PathBuf::from(&self.config.debug.dump_dir);
            dump::dump_page(&dir, &format!("login-response-{}", url), &response.text);
        }

        match classify(&response.text, &self.config.heuristics) {
            Outcome::Success => AttemptOutcome::Success { submitted_to: target },
            Outcome::Failure => AttemptOutcome::Failure { submitted_to: target },
            Outcome::Ambiguous => AttemptOutcome::Ambiguous,
        }
    }

    /// After a successful login, the first order page answering 200 goes into
    /// the report. No order content is parsed.
    async fn probe_orders(&mut self) {
        for url in self.config.portal.order_urls.clone() {
            match self.client.get(&url).await {
                Ok(page) if page.status == 200 => {
                    info!(url = %url, bytes = page.body_len, "order page reachable");
                    self.ctx.order_probe =
                        Some(ProbeResult::ok(&url, page.status, &page.final_url, page.body_len));
                    return;
                }
                Ok(page) => {
                    warn!(url = %url, status = page.status, "order page not usable");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "order page fetch failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(total: usize, outcomes: &[AttemptOutcome]) -> (RunState, usize) {
        let mut state = RunState::LoginAttempt { index: 0 };
        let mut attempts = 0;
        for outcome in outcomes {
            let RunState::LoginAttempt { index } = state else {
                break;
            };
            attempts += 1;
            state = next_after_attempt(index, total, outcome);
        }
        (state, attempts)
    }

    #[test]
    fn test_third_candidate_succeeds_after_two_timeouts() {
        let (state, attempts) = walk(
            3,
            &[
                AttemptOutcome::Network("timeout after 30s".into()),
                AttemptOutcome::Network("timeout after 30s".into()),
                AttemptOutcome::Success { submitted_to: "https://h/vendor/login.php".into() },
            ],
        );
        assert_eq!(state, RunState::LoginSucceeded);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_definitive_failure_stops_the_loop() {
        let (state, attempts) = walk(
            3,
            &[AttemptOutcome::Failure { submitted_to: "https://h/login.php".into() }],
        );
        assert_eq!(state, RunState::LoginFailed);
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_exhaustion_is_a_failed_login() {
        let (state, attempts) = walk(
            2,
            &[AttemptOutcome::Ambiguous, AttemptOutcome::NoForm],
        );
        assert_eq!(state, RunState::LoginFailed);
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_ambiguous_advances_to_next_candidate() {
        let state = next_after_attempt(0, 2, &AttemptOutcome::Ambiguous);
        assert_eq!(state, RunState::LoginAttempt { index: 1 });
    }
}
