use tracing::debug;

use ordercheck_core::config::HeuristicsConfig;
use ordercheck_core::types::Outcome;

/// Classify a decoded response body against the configured keyword sets.
///
/// Success requires a success keyword AND the absence of every error keyword;
/// any error keyword otherwise means Failure; neither set matching leaves the
/// attempt Ambiguous and the orchestrator moves on to the next candidate.
pub fn classify(body: &str, heuristics: &HeuristicsConfig) -> Outcome {
    let text = body.to_lowercase();

    let has_success = heuristics
        .success_keywords
        .iter()
        .any(|k| text.contains(&k.to_lowercase()));
    let has_error = heuristics
        .error_keywords
        .iter()
        .any(|k| text.contains(&k.to_lowercase()));

    let outcome = if has_success && !has_error {
        Outcome::Success
    } else if has_error {
        Outcome::Failure
    } else {
        Outcome::Ambiguous
    };

    debug!(%outcome, has_success, has_error, "classified login response");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristics() -> HeuristicsConfig {
        HeuristicsConfig::default()
    }

    #[test]
    fn test_logout_keyword_is_success() {
        let body = "<html><body><a href='/exit'>登出</a></body></html>";
        assert_eq!(classify(body, &heuristics()), Outcome::Success);
    }

    #[test]
    fn test_error_beats_success_when_both_present() {
        let body = "訂單查詢：密碼錯誤，請重新登入";
        assert_eq!(classify(body, &heuristics()), Outcome::Failure);
    }

    #[test]
    fn test_error_alone_is_failure() {
        let body = "Login error: please try again";
        assert_eq!(classify(body, &heuristics()), Outcome::Failure);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let body = "<a href='/bye'>LOGOUT</a>";
        assert_eq!(classify(body, &heuristics()), Outcome::Success);
    }

    #[test]
    fn test_nothing_matches_is_ambiguous() {
        let body = "<html><body>hello world</body></html>";
        assert_eq!(classify(body, &heuristics()), Outcome::Ambiguous);
    }
}
