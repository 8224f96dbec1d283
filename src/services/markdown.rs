//! Hike description rendering.

use pulldown_cmark::{html, Event, Parser};

use crate::models::Hike;

/// Render a Markdown description to HTML.
///
/// Raw HTML in the source is escaped rather than passed through, since the
/// text comes from whoever created the hike.
pub fn render_description(markdown: &str) -> String {
    let parser = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Replace a stored hike's Markdown description with rendered HTML.
pub fn with_rendered_description(mut hike: Hike) -> Hike {
    hike.description = hike
        .description
        .filter(|d| !d.is_empty())
        .map(|d| render_description(&d));
    hike
}
