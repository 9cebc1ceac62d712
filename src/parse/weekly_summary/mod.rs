mod course_key;

pub use course_key::CourseKey;

use crate::static_regex;

/// Every `(code, section)` pair embedded in the weekly summary's
/// `showAssignmentsByMPAndCourse('<code>','<section>')` calls, in page order.
/// Repeated pairs are kept.
pub fn course_keys(page: &str) -> Vec<CourseKey> {
    static_regex!(COURSE_CALL <- r"showAssignmentsByMPAndCourse\('(\d+)','(\d+)'\)");
    COURSE_CALL
        .captures_iter(page)
        .filter_map(|caps| {
            let code = caps.get(1)?.as_str().parse().ok()?;
            let section = caps.get(2)?.as_str().parse().ok()?;
            Some(CourseKey::new(code, section))
        })
        .collect()
}
