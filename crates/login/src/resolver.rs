use url::Url;

use ordercheck_core::CheckError;

/// Resolve a form's action attribute against the page URL it came from.
///
/// Empty action resubmits to the page itself; an absolute action is used
/// verbatim; a root-relative action is prefixed with the page's scheme+host;
/// anything else joins onto the page URL with a single separator.
pub fn resolve_action(action: Option<&str>, page_url: &str) -> Result<String, CheckError> {
    let action = action.unwrap_or("").trim();
    if action.is_empty() {
        return Ok(page_url.to_string());
    }

    if action.starts_with("http://") || action.starts_with("https://") {
        return Ok(action.to_string());
    }

    let page = Url::parse(page_url).map_err(|e| CheckError::InvalidUrl(e.to_string()))?;

    if action.starts_with('/') {
        let origin = page.origin().ascii_serialization();
        return Ok(format!("{}{}", origin, action));
    }

    Ok(format!(
        "{}/{}",
        page_url.trim_end_matches('/'),
        action.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://host.example/vendor/";

    #[test]
    fn test_empty_action_resubmits_to_page() {
        assert_eq!(resolve_action(None, PAGE).unwrap(), PAGE);
        assert_eq!(resolve_action(Some(""), PAGE).unwrap(), PAGE);
    }

    #[test]
    fn test_absolute_action_verbatim() {
        assert_eq!(
            resolve_action(Some("https://other.example/auth"), PAGE).unwrap(),
            "https://other.example/auth"
        );
    }

    #[test]
    fn test_root_relative_action() {
        assert_eq!(
            resolve_action(Some("/vendor/login.php"), PAGE).unwrap(),
            "https://host.example/vendor/login.php"
        );
    }

    #[test]
    fn test_relative_action_joins_with_single_separator() {
        assert_eq!(
            resolve_action(Some("login.php"), PAGE).unwrap(),
            "https://host.example/vendor/login.php"
        );
        assert_eq!(
            resolve_action(Some("login.php"), "https://host.example/vendor").unwrap(),
            "https://host.example/vendor/login.php"
        );
    }

    #[test]
    fn test_invalid_page_url_is_an_error() {
        assert!(resolve_action(Some("/x"), "not a url").is_err());
    }
}
