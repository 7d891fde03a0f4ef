use serde::Deserialize;

use crate::types::Credentials;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub portal: PortalConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    /// Candidate login pages, tried strictly in order.
    pub login_urls: Vec<String>,
    /// Candidate order listing pages, probed after a successful login.
    pub order_urls: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Attempts per request, counting the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

/// The field-name alias tables and keyword tables the login heuristic runs on.
/// These are data so a portal change means a config edit, not a code change.
#[derive(Debug, Deserialize, Clone)]
pub struct HeuristicsConfig {
    #[serde(default = "default_username_aliases")]
    pub username_aliases: Vec<String>,
    #[serde(default = "default_password_aliases")]
    pub password_aliases: Vec<String>,
    /// Forced into the login data when no alias matched anything.
    #[serde(default = "default_fallback_username_field")]
    pub fallback_username_field: String,
    #[serde(default = "default_fallback_password_field")]
    pub fallback_password_field: String,
    #[serde(default = "default_success_keywords")]
    pub success_keywords: Vec<String>,
    #[serde(default = "default_error_keywords")]
    pub error_keywords: Vec<String>,
    /// Encoding labels tried in order against response bytes.
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            username_aliases: default_username_aliases(),
            password_aliases: default_password_aliases(),
            fallback_username_field: default_fallback_username_field(),
            fallback_password_field: default_fallback_password_field(),
            success_keywords: default_success_keywords(),
            error_keywords: default_error_keywords(),
            encodings: default_encodings(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    #[serde(default = "default_dump_pages")]
    pub dump_pages: bool,
    #[serde(default = "default_dump_dir")]
    pub dump_dir: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            dump_pages: default_dump_pages(),
            dump_dir: default_dump_dir(),
        }
    }
}

fn default_request_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_max_attempts() -> u32 { 5 }
fn default_backoff_base_ms() -> u64 { 1000 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
fn default_accept_language() -> String { "zh-TW,zh;q=0.8,en;q=0.5".to_string() }

fn default_username_aliases() -> Vec<String> {
    vec!["username", "user", "mno", "account"].into_iter().map(String::from).collect()
}
fn default_password_aliases() -> Vec<String> {
    vec!["password", "passwd", "mpasswd", "pwd"].into_iter().map(String::from).collect()
}
fn default_fallback_username_field() -> String { "mno".to_string() }
fn default_fallback_password_field() -> String { "mpasswd".to_string() }
fn default_success_keywords() -> Vec<String> {
    vec!["歡迎", "廠商", "商品", "訂單", "menu", "logout", "登出", "管理", "系統"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_error_keywords() -> Vec<String> {
    vec!["錯誤", "失敗", "error", "invalid", "帳號或密碼錯誤"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_encodings() -> Vec<String> {
    vec!["utf-8", "big5"].into_iter().map(String::from).collect()
}

fn default_smtp_host() -> String { "smtp.gmail.com".to_string() }
fn default_smtp_port() -> u16 { 587 }
fn default_dump_pages() -> bool { true }
fn default_dump_dir() -> String { "debug".to_string() }

pub const ENV_USERNAME: &str = "ORDERCHECK_USERNAME";
pub const ENV_PASSWORD: &str = "ORDERCHECK_PASSWORD";
pub const ENV_SMTP_USER: &str = "ORDERCHECK_SMTP_USER";
pub const ENV_SMTP_PASSWORD: &str = "ORDERCHECK_SMTP_PASSWORD";
pub const ENV_RECIPIENT: &str = "ORDERCHECK_RECIPIENT";

/// Fully resolved secrets. Only exists when every required variable was set.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub portal: Credentials,
    pub smtp_user: String,
    pub smtp_password: String,
    pub recipient: String,
}

/// Raw environment state. Each variable is optional here so a run with missing
/// configuration can still report which ones were absent, and can still send
/// that report if the mail variables happen to be the ones present.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets {
    pub portal_username: Option<String>,
    pub portal_password: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub recipient: Option<String>,
}

impl EnvSecrets {
    pub fn from_env() -> Self {
        let get = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            portal_username: get(ENV_USERNAME),
            portal_password: get(ENV_PASSWORD),
            smtp_user: get(ENV_SMTP_USER),
            smtp_password: get(ENV_SMTP_PASSWORD),
            recipient: get(ENV_RECIPIENT),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.portal_username.is_none() {
            missing.push(ENV_USERNAME);
        }
        if self.portal_password.is_none() {
            missing.push(ENV_PASSWORD);
        }
        if self.smtp_user.is_none() {
            missing.push(ENV_SMTP_USER);
        }
        if self.smtp_password.is_none() {
            missing.push(ENV_SMTP_PASSWORD);
        }
        if self.recipient.is_none() {
            missing.push(ENV_RECIPIENT);
        }
        missing
    }

    /// Mail settings alone, for the best-effort configuration-error report.
    pub fn mail_account(&self) -> Option<(String, String, String)> {
        match (&self.smtp_user, &self.smtp_password, &self.recipient) {
            (Some(u), Some(p), Some(r)) => Some((u.clone(), p.clone(), r.clone())),
            _ => None,
        }
    }

    pub fn into_secrets(self) -> Option<Secrets> {
        Some(Secrets {
            portal: Credentials {
                username: self.portal_username?,
                password: self.portal_password?,
            },
            smtp_user: self.smtp_user?,
            smtp_password: self.smtp_password?,
            recipient: self.recipient?,
        })
    }
}
