use ordercheck_core::types::{Outcome, ProbeResult, ReportContext};

const SUBJECT_PREFIX: &str = "[ordercheck]";

#[derive(Debug, Clone)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

impl Report {
    /// Report for a completed run, success or failed login.
    pub fn from_run(ctx: &ReportContext) -> Self {
        match ctx.outcome {
            Some(Outcome::Success) => Self::success(ctx),
            _ => Self::login_failed(ctx),
        }
    }

    fn success(ctx: &ReportContext) -> Self {
        let mut body = String::new();
        body.push_str(&header(ctx));
        body.push_str("Status: login succeeded\n");
        if let Some(url) = &ctx.decided_at {
            body.push_str(&format!("Decided at: {}\n", url));
        }
        body.push('\n');
        body.push_str(&probe_section(&ctx.probes));
        match &ctx.order_probe {
            Some(p) => {
                body.push_str("\nOrder page:\n");
                body.push_str(&probe_line(p));
            }
            None => body.push_str("\nOrder page: no candidate responded with 200\n"),
        }
        body.push_str(&footer());

        Self {
            subject: format!("{} login OK", SUBJECT_PREFIX),
            body,
        }
    }

    fn login_failed(ctx: &ReportContext) -> Self {
        let mut body = String::new();
        body.push_str(&header(ctx));
        body.push_str("Status: login failed\n");
        match ctx.outcome {
            Some(Outcome::Failure) => {
                body.push_str("The portal answered with an error message; check the credentials.\n");
                if let Some(url) = &ctx.decided_at {
                    body.push_str(&format!("Decided at: {}\n", url));
                }
            }
            _ => body.push_str(
                "No candidate URL produced a definitive outcome. The portal may be \
                 down, its markup may have changed, or it may be under maintenance.\n",
            ),
        }
        body.push('\n');
        body.push_str(&probe_section(&ctx.probes));
        body.push_str(&footer());

        Self {
            subject: format!("{} login failed", SUBJECT_PREFIX),
            body,
        }
    }

    /// Missing environment variables; no login was attempted.
    pub fn configuration_error(missing: &[&str]) -> Self {
        let body = format!(
            "Status: configuration error\n\nMissing environment variables:\n{}\n\n\
             No login was attempted.\n{}",
            missing
                .iter()
                .map(|v| format!("  - {}", v))
                .collect::<Vec<_>>()
                .join("\n"),
            footer()
        );
        Self {
            subject: format!("{} configuration error", SUBJECT_PREFIX),
            body,
        }
    }

    /// Anything unexpected that short-circuited the run.
    pub fn run_error(ctx: &ReportContext, error: &str) -> Self {
        let mut body = String::new();
        body.push_str(&header(ctx));
        body.push_str("Status: run error\n\n");
        body.push_str(&format!("Error:\n  {}\n\n", error));
        body.push_str(&probe_section(&ctx.probes));
        body.push_str(&footer());

        Self {
            subject: format!("{} run error", SUBJECT_PREFIX),
            body,
        }
    }
}

fn header(ctx: &ReportContext) -> String {
    format!(
        "Vendor portal order check\n\nStarted: {} UTC\nDuration: {:.2}s\n\n",
        ctx.started_at.format("%Y-%m-%d %H:%M:%S"),
        ctx.duration_secs
    )
}

fn probe_section(probes: &[ProbeResult]) -> String {
    if probes.is_empty() {
        return String::new();
    }
    let mut out = String::from("Connectivity:\n");
    for p in probes {
        out.push_str(&probe_line(p));
    }
    out
}

fn probe_line(p: &ProbeResult) -> String {
    match (&p.status, &p.error) {
        (Some(status), _) => format!(
            "  {} -> {} ({} bytes, final URL {})\n",
            p.url,
            status,
            p.body_len,
            p.final_url.as_deref().unwrap_or("?")
        ),
        (None, Some(err)) => format!("  {} -> {}\n", p.url, err),
        (None, None) => format!("  {} -> no response\n", p.url),
    }
}

fn footer() -> &'static str {
    "\n--\nSent automatically by ordercheck.\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordercheck_core::types::ReportContext;

    fn ctx_with(outcome: Option<Outcome>) -> ReportContext {
        let mut ctx = ReportContext::new(chrono::Utc::now());
        ctx.duration_secs = 4.2;
        ctx.probes.push(ProbeResult::ok(
            "https://host.example/vendor/",
            200,
            "https://host.example/vendor/index.php",
            5120,
        ));
        ctx.probes.push(ProbeResult::failed("http://host.example/vendor/", "timeout after 30s"));
        ctx.outcome = outcome;
        ctx.decided_at = Some("https://host.example/vendor/login.php".to_string());
        ctx
    }

    #[test]
    fn test_success_report_names_the_deciding_url() {
        let report = Report::from_run(&ctx_with(Some(Outcome::Success)));
        assert!(report.subject.contains("login OK"));
        assert!(report.body.contains("login.php"));
        assert!(report.body.contains("timeout after 30s"));
    }

    #[test]
    fn test_failed_report_mentions_credentials() {
        let report = Report::from_run(&ctx_with(Some(Outcome::Failure)));
        assert!(report.subject.contains("login failed"));
        assert!(report.body.contains("credentials"));
    }

    #[test]
    fn test_exhausted_report_is_not_a_credential_complaint() {
        let report = Report::from_run(&ctx_with(None));
        assert!(report.subject.contains("login failed"));
        assert!(report.body.contains("definitive outcome"));
    }

    #[test]
    fn test_configuration_error_lists_variables() {
        let report = Report::configuration_error(&["ORDERCHECK_PASSWORD"]);
        assert!(report.subject.contains("configuration error"));
        assert!(report.body.contains("ORDERCHECK_PASSWORD"));
        assert!(report.body.contains("No login was attempted"));
    }
}
