use scraper::{Html, Selector};

use crate::parse::text_from_selection::text_from_selection;
use crate::parse::{CourseKey, Error};
use crate::static_selector;

/// Display name of `key`, read from the course picker on its summary page.
///
/// The picker is the last `<select>` inside a table; the matching option has
/// the value `"<code>:<section>"`.
pub fn course_name(document: &Html, key: CourseKey) -> Result<String, Error> {
    static_selector!(PICKER_SELECTOR <- "table select");

    let picker = document
        .select(&PICKER_SELECTOR)
        .last()
        .ok_or_else(|| Error::missing("course picker"))?;

    let option_selector = Selector::parse(&format!(r#"option[value="{key}"]"#))
        .map_err(|e| Error::BadSelector(format!("option for {key}: {e:?}")))?;

    text_from_selection(&option_selector, picker, "course picker", "course option")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_course_name_from_example() {
        let html =
            fs::read_to_string("./src/parse/html_examples/course_summary/course_summary.html")
                .unwrap();
        let document = Html::parse_document(&html);
        let name = course_name(&document, CourseKey::new(101, 2)).unwrap();
        assert_eq!(name, "Algebra II Honors");
        let other = course_name(&document, CourseKey::new(205, 1)).unwrap();
        assert_eq!(other, "Biology");
    }

    #[test]
    fn test_last_picker_is_used() {
        let document = Html::parse_document(
            r#"<table><tr><td>
                <select><option value="101:2">Marking Period 1</option></select>
                <select><option value="101:2">Algebra</option></select>
            </td></tr></table>"#,
        );
        assert_eq!(
            course_name(&document, CourseKey::new(101, 2)).unwrap(),
            "Algebra"
        );
    }

    #[test]
    fn test_missing_option() {
        let html =
            fs::read_to_string("./src/parse/html_examples/course_summary/course_summary.html")
                .unwrap();
        let document = Html::parse_document(&html);
        assert!(course_name(&document, CourseKey::new(999, 9)).is_err());
    }

    #[test]
    fn test_missing_picker() {
        let document = Html::parse_document("<table><tr><td>No picker</td></tr></table>");
        assert!(matches!(
            course_name(&document, CourseKey::new(101, 2)),
            Err(Error::MissingElement(_))
        ));
    }
}
