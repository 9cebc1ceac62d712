use super::{remove_excess_whitespace, Error};
use scraper::{ElementRef, Selector};

/// Text of the first element matching `selector` below `element`.
/// Errors if nothing matches or the match holds no text.
pub fn text_from_selection(
    selector: &Selector,
    element: ElementRef<'_>,
    parent_label: &str,
    child_label: &str,
) -> Result<String, Error> {
    let child = element
        .select(selector)
        .next() // first match
        .ok_or_else(|| Error::missing(format!("{child_label} in {parent_label}")))?;
    let text = element_text(child);
    if text.is_empty() {
        return Err(Error::empty(child_label));
    }
    Ok(text)
}

/// All descendant text of `element`, text nodes separated by a space and
/// whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    remove_excess_whitespace(&raw).into_owned()
}
