mod cli;
mod run;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use ordercheck_core::config::{AppConfig, EnvSecrets, MailConfig};
use ordercheck_core::types::ReportContext;
use ordercheck_notify::{Notifier, Report};

use crate::cli::Cli;
use crate::run::Runner;

fn parse_config(raw: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(raw)
}

/// Best-effort delivery for reports produced before a Notifier exists: a
/// broken config file or missing variables must still reach the operator
/// when the mail variables happen to be set.
fn send_or_log(report: &Report, env: &EnvSecrets, mail: &MailConfig, no_mail: bool) {
    match env.mail_account() {
        Some((user, password, recipient)) if !no_mail => {
            let notifier = Notifier::new(&mail.smtp_host, mail.smtp_port, &user, &password, &recipient);
            if let Err(e) = notifier.send(report) {
                error!(error = %e, "could not send report");
            }
        }
        _ => info!(subject = %report.subject, "report\n{}", report.body),
    }
}

// One scheduled invocation = one linear run, so a single-threaded runtime is
// all this needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let env = EnvSecrets::from_env();

    let config = match parse_config(&config_str) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %cli.config, error = %e, "config file is malformed");
            let report = Report::run_error(
                &ReportContext::new(chrono::Utc::now()),
                &format!("config file {} is malformed: {}", cli.config, e),
            );
            send_or_log(&report, &env, &MailConfig::default(), cli.no_mail);
            return Ok(());
        }
    };

    let missing = env.missing();
    if !missing.is_empty() {
        error!(?missing, "required environment variables are missing, not attempting login");
        let report = Report::configuration_error(&missing);
        send_or_log(&report, &env, &config.mail, cli.no_mail);
        return Ok(());
    }

    let Some(secrets) = env.into_secrets() else {
        // Unreachable once missing() came back empty
        error!("environment secrets incomplete");
        return Ok(());
    };

    let notifier = Notifier::new(
        &config.mail.smtp_host,
        config.mail.smtp_port,
        &secrets.smtp_user,
        &secrets.smtp_password,
        &secrets.recipient,
    );
    let notifier_ref = if cli.no_mail { None } else { Some(&notifier) };

    match Runner::new(config, secrets.portal) {
        Ok(runner) => {
            let ctx = runner.run(notifier_ref).await;
            info!(outcome = ?ctx.outcome, duration_secs = ctx.duration_secs, "run finished");
        }
        Err(e) => {
            error!(error = %e, "run aborted before the first request");
            let report = Report::run_error(&ReportContext::new(chrono::Utc::now()), &e.to_string());
            if let Some(n) = notifier_ref {
                if let Err(send_err) = n.send(&report) {
                    error!(error = %send_err, "could not send error report");
                }
            } else {
                info!(subject = %report.subject, "error report\n{}", report.body);
            }
        }
    }

    // Exit normally in every case; the report content carries the outcome.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_config_parses() {
        let config = parse_config(include_str!("../config/default.toml")).unwrap();
        assert!(!config.portal.login_urls.is_empty());
    }

    #[test]
    fn test_malformed_config_becomes_an_error_report() {
        let err = parse_config("portal = \"not a table\"").unwrap_err();

        let report = Report::run_error(
            &ReportContext::new(chrono::Utc::now()),
            &format!("config file broken.toml is malformed: {}", err),
        );
        assert!(report.subject.contains("run error"));
        assert!(report.body.contains("broken.toml"));
    }
}
