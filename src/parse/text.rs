use scraper::ElementRef;

/// Every text node trimmed on its own, empty ones dropped, the rest joined
/// with nothing in between. Used for titles and item names, which the site
/// pads with indentation inside nested tags.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// All text of the element joined as-is, trimmed once at the ends.
pub fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}
