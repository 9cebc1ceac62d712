mod course_summary;
mod error;
mod remove_excess_whitespace;
mod static_selector;
mod text_from_selection;
mod weekly_summary;

pub use course_summary::{assignments, course_name, Assignment};
pub use error::Error;
pub use remove_excess_whitespace::remove_excess_whitespace;
pub use weekly_summary::{course_keys, CourseKey};

/// Marker present on every page that renders the portal's login form.
const LOGIN_FORM_MARKER: &str = "j_security_check";

/// Whether `page` is the login form rather than the requested content,
/// which is what the portal serves once the session has expired.
pub fn is_login_page(page: &str) -> bool {
    page.contains(LOGIN_FORM_MARKER)
}
