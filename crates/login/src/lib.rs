pub mod classify;
pub mod client;
pub mod dump;
pub mod encoding;
pub mod form;
pub mod mapper;
pub mod resolver;

pub use classify::classify;
pub use client::{FetchedPage, PortalClient};
pub use form::{find_login_form, FieldKind, FormField, LoginForm};
pub use mapper::build_login_data;
pub use resolver::resolve_action;
