use tracing::{debug, warn};

use ordercheck_core::config::HeuristicsConfig;
use ordercheck_core::types::Credentials;

use crate::form::{is_alias, FieldKind, FormField, LoginForm};

/// Build the submission data for a login form. Field order follows the form.
///
/// Hidden defaults are carried verbatim (anti-forgery tokens, session markers),
/// alias-matched names get the credentials, and leftover text/email fields with
/// no default get the username since some portals use an unlabeled identifier
/// field. When no alias matched at all, the two configured fallback names are
/// forced in; that can submit a conflicting pair if the guess is wrong, which
/// is the accepted failure mode of this heuristic.
pub fn build_login_data(
    form: &LoginForm,
    creds: &Credentials,
    heuristics: &HeuristicsConfig,
) -> Vec<(String, String)> {
    let mut data: Vec<(String, String)> = Vec::new();
    let mut matched_username = false;
    let mut matched_password = false;

    for field in &form.fields {
        match field.kind {
            FieldKind::Hidden => {
                if let Some(value) = &field.value {
                    data.push((field.name.clone(), value.clone()));
                }
            }
            _ if is_alias(&field.name, &heuristics.username_aliases) => {
                data.push((field.name.clone(), creds.username.clone()));
                matched_username = true;
                debug!(field = %field.name, "mapped username alias");
            }
            _ if is_alias(&field.name, &heuristics.password_aliases) => {
                data.push((field.name.clone(), creds.password.clone()));
                matched_password = true;
                debug!(field = %field.name, "mapped password alias");
            }
            FieldKind::Text | FieldKind::Email => match &field.value {
                Some(value) => data.push((field.name.clone(), value.clone())),
                None => {
                    data.push((field.name.clone(), creds.username.clone()));
                    debug!(field = %field.name, "guessed identifier field");
                }
            },
            FieldKind::Select => {
                if let Some(value) = &field.value {
                    data.push((field.name.clone(), value.clone()));
                }
            }
            FieldKind::Password => {
                // Name outside the alias set; submit it the way a browser
                // would rather than drop it from the request
                data.push((field.name.clone(), field.value.clone().unwrap_or_default()));
            }
            _ => {}
        }
    }

    if !matched_username && !matched_password {
        warn!(
            username_field = %heuristics.fallback_username_field,
            password_field = %heuristics.fallback_password_field,
            "no alias matched, forcing fallback field names"
        );
        data.push((heuristics.fallback_username_field.clone(), creds.username.clone()));
        data.push((heuristics.fallback_password_field.clone(), creds.password.clone()));
    }

    data
}
