use std::fmt::{self, Display, Formatter};

/// Identifies one enrolled course on the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CourseKey {
    pub code: u32,
    pub section: u32,
}

impl CourseKey {
    pub const fn new(code: u32, section: u32) -> Self {
        Self { code, section }
    }

    /// Extra query parameters for course scoped pages.
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("courseCode", self.code.to_string()),
            ("courseSection", self.section.to_string()),
        ]
    }
}

// same shape as the portal's course <option> values
impl Display for CourseKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.section)
    }
}
