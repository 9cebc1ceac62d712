mod assignment;
mod course_name;

pub use assignment::Assignment;
pub use course_name::course_name;

use scraper::Html;

use crate::parse::Error;
use crate::static_selector;

/// Parses the assignment rows of a course summary page, in page order.
///
/// Only rows styled `listrowodd` carry assignment data on the portal; every
/// other row (headers, spacers, totals) is skipped, as is any data row whose
/// first cell has no `month/day` date in it.
pub fn assignments(document: &Html) -> Result<Vec<Assignment>, Error> {
    static_selector!(TABLE_SELECTOR <- "table");
    static_selector!(DATA_ROW_SELECTOR <- "tr.listrowodd");

    if document.select(&TABLE_SELECTOR).next().is_none() {
        return Err(Error::missing("course summary table"));
    }

    Ok(document
        .select(&DATA_ROW_SELECTOR)
        .filter_map(Assignment::from_html_element)
        .collect())
}
