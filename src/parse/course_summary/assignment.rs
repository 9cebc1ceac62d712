use scraper::ElementRef;

use crate::parse::text_from_selection::element_text;
use crate::{static_regex, static_selector};

/// One gradebook entry on a course summary page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    date: String,
    name: String,
    grade: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GradeClass {
    Good,
    Fine,
    Bad,
}

impl GradeClass {
    pub const fn from_percentage(percentage: u32) -> Option<Self> {
        match percentage {
            90..=199 => Some(Self::Good),
            80..=89 => Some(Self::Fine),
            0..=79 => Some(Self::Bad),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Great Job!",
            Self::Fine => "You Did Fine.",
            Self::Bad => "Needs Improvement.",
        }
    }
}

impl Assignment {
    #[cfg(test)]
    pub fn new(date: impl Into<String>, name: impl Into<String>, grade: Option<String>) -> Self {
        Self {
            date: date.into(),
            name: name.into(),
            grade,
        }
    }

    /// Builds an assignment from a `tr` data row. Returns `None` when the
    /// first cell does not contain a `month/day` date.
    pub(super) fn from_html_element(row: ElementRef<'_>) -> Option<Self> {
        static_selector!(CELL_SELECTOR <- "td");
        static_selector!(NAME_SELECTOR <- "b");
        // the first cell reads like "Monday 9/4" followed by an optional status
        static_regex!(DATE_PATTERN <- r"\s\d+/\d+");
        static_regex!(PERCENTAGE_PATTERN <- r"\d+%");

        let mut cells = row.select(&CELL_SELECTOR);
        let date = element_text(cells.next()?);
        if !DATE_PATTERN.is_match(&date) {
            return None;
        }

        let grade = cells.map(element_text).find_map(|text| {
            if text.contains('%') {
                PERCENTAGE_PATTERN.find(&text).map(|m| m.as_str().to_owned())
            } else {
                None
            }
        });

        let name = row
            .select(&NAME_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_default();

        Some(Self { date, name, grade })
    }

    #[cfg(test)]
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    pub fn grade_percentage(&self) -> Option<u32> {
        self.grade.as_deref()?.strip_suffix('%')?.parse().ok()
    }

    pub fn classify_grade(&self) -> Option<GradeClass> {
        self.grade_percentage().and_then(GradeClass::from_percentage)
    }

    /// Identity used when diffing snapshots. The grade is not part of it.
    pub fn key(&self) -> (&str, &str) {
        (&self.date, &self.name)
    }
}
