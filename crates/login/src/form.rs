use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Input kinds the credential mapper distinguishes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Hidden,
    Text,
    Password,
    Email,
    Select,
    Other,
}

impl FieldKind {
    fn from_input_type(t: &str) -> Self {
        match t.to_lowercase().as_str() {
            "hidden" => FieldKind::Hidden,
            "text" => FieldKind::Text,
            "password" => FieldKind::Password,
            "email" => FieldKind::Email,
            _ => FieldKind::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub action: Option<String>,
    pub fields: Vec<FormField>,
}

/// Find the login form: the first form in document order that carries a
/// password-type input, or an input whose name is in the password alias set.
/// Returns None when no form on the page qualifies.
pub fn find_login_form(html: &str, password_aliases: &[String]) -> Option<LoginForm> {
    let document = Html::parse_document(html);
    let form_selector = Selector::parse("form").unwrap();

    for form_elem in document.select(&form_selector) {
        let fields = extract_fields(&form_elem);

        let qualifies = fields.iter().any(|f| {
            f.kind == FieldKind::Password || is_alias(&f.name, password_aliases)
        });
        if !qualifies {
            continue;
        }

        let action = form_elem
            .value()
            .attr("action")
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());

        debug!(fields = fields.len(), action = ?action, "selected login form");

        return Some(LoginForm { action, fields });
    }

    None
}

pub(crate) fn is_alias(name: &str, aliases: &[String]) -> bool {
    let name_lower = name.to_lowercase();
    aliases.iter().any(|a| a.to_lowercase() == name_lower)
}

/// Collect the named inputs and selects of a form, in document order.
fn extract_fields(form_elem: &ElementRef) -> Vec<FormField> {
    let mut fields = Vec::new();

    let input_selector = Selector::parse("input").unwrap();
    for input in form_elem.select(&input_selector) {
        let Some(name) = input.value().attr("name") else {
            continue;
        };
        let input_type = input.value().attr("type").unwrap_or("text");
        if matches!(input_type, "submit" | "button" | "reset" | "image") {
            continue;
        }

        fields.push(FormField {
            name: name.to_string(),
            kind: FieldKind::from_input_type(input_type),
            value: input.value().attr("value").map(|s| s.to_string()),
        });
    }

    let select_selector = Selector::parse("select").unwrap();
    for select in form_elem.select(&select_selector) {
        let Some(name) = select.value().attr("name") else {
            continue;
        };

        // Default is the selected option, else the first one
        let option_selector = Selector::parse("option").unwrap();
        let options: Vec<_> = select.select(&option_selector).collect();
        let value = options
            .iter()
            .find(|o| o.value().attr("selected").is_some())
            .or_else(|| options.first())
            .and_then(|o| o.value().attr("value").map(|s| s.to_string()));

        fields.push(FormField {
            name: name.to_string(),
            kind: FieldKind::Select,
            value,
        });
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> Vec<String> {
        vec!["password", "passwd", "mpasswd", "pwd"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_password_form_found_regardless_of_position() {
        let html = r#"
            <form action="/search"><input type="text" name="q" /></form>
            <form action="/newsletter"><input type="email" name="addr" /></form>
            <form action="/vendor/login.php">
                <input type="hidden" name="token" value="abc123" />
                <input type="text" name="mno" />
                <input type="password" name="mpasswd" />
            </form>
        "#;

        let form = find_login_form(html, &aliases()).unwrap();
        assert_eq!(form.action.as_deref(), Some("/vendor/login.php"));
        assert_eq!(form.fields.len(), 3);
        assert_eq!(form.fields[0].name, "token");
        assert_eq!(form.fields[0].value.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_alias_name_qualifies_without_type_attribute() {
        let html = r#"
            <form>
                <input name="mno" />
                <input name="mpasswd" />
            </form>
        "#;

        let form = find_login_form(html, &aliases()).unwrap();
        assert_eq!(form.fields[1].name, "mpasswd");
        // No type attribute defaults to text
        assert_eq!(form.fields[1].kind, FieldKind::Text);
    }

    #[test]
    fn test_no_qualifying_form() {
        let html = r#"<form><input type="text" name="q" /></form>"#;
        assert!(find_login_form(html, &aliases()).is_none());
    }

    #[test]
    fn test_submit_inputs_are_skipped() {
        let html = r#"
            <form>
                <input type="password" name="pwd" />
                <input type="submit" name="go" value="Login" />
            </form>
        "#;
        let form = find_login_form(html, &aliases()).unwrap();
        assert_eq!(form.fields.len(), 1);
    }

    #[test]
    fn test_select_default_is_selected_option() {
        let html = r#"
            <form>
                <input type="password" name="pwd" />
                <select name="branch">
                    <option value="north">North</option>
                    <option value="south" selected>South</option>
                </select>
            </form>
        "#;
        let form = find_login_form(html, &aliases()).unwrap();
        let branch = form.fields.iter().find(|f| f.name == "branch").unwrap();
        assert_eq!(branch.kind, FieldKind::Select);
        assert_eq!(branch.value.as_deref(), Some("south"));
    }

    #[test]
    fn test_empty_action_is_none() {
        let html = r#"<form action=""><input type="password" name="pwd" /></form>"#;
        let form = find_login_form(html, &aliases()).unwrap();
        assert!(form.action.is_none());
    }
}
