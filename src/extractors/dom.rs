// src/extractors/dom.rs
// Small text helpers over scraper element references.
use scraper::ElementRef;

/// All descendant text of an element, trimmed (non-breaking spaces included).
pub fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Only the element's direct text children, concatenated and trimmed.
pub fn own_text(element: ElementRef) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Nearest ancestor element with the given tag name.
pub fn enclosing<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
}
