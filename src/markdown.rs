//! Markdown rendering for metadata values and document bodies.
//!
//! Header fields are usually short phrases (`title: "*Untitled* (2021)"`), so
//! they are rendered *inline*: when the whole rendered fragment is a single
//! paragraph the `<p>` wrapper is dropped. Anything with more structure (two
//! paragraphs, a heading, a list) keeps its block markup.
//!
//! The check runs on the parser's event stream rather than on the HTML
//! string, so `"a\n\nb"` is recognized as two paragraphs even though its HTML
//! also starts with `<p>` and ends with `</p>`.

use crate::types::{MetaMap, MetaValue};
use pulldown_cmark::{Event, Parser, Tag, TagEnd, html as md_html};

/// Render a document body as block-level HTML.
pub fn render_block(markdown: &str) -> String {
    let mut html = String::new();
    md_html::push_html(&mut html, Parser::new(markdown));
    html
}

/// Render a short fragment, unwrapping a lone paragraph.
pub fn render_inline(markdown: &str) -> String {
    let events: Vec<Event> = Parser::new(markdown).collect();
    let mut html = String::new();
    if is_single_paragraph(&events) {
        md_html::push_html(&mut html, events[1..events.len() - 1].iter().cloned());
    } else {
        md_html::push_html(&mut html, events.into_iter());
    }
    html
}

/// True when the stream is exactly `Start(Paragraph) … End(Paragraph)` with
/// nothing else at the top level.
fn is_single_paragraph(events: &[Event]) -> bool {
    let (Some(Event::Start(Tag::Paragraph)), Some(Event::End(TagEnd::Paragraph))) =
        (events.first(), events.last())
    else {
        return false;
    };

    let mut depth = 0usize;
    let mut top_level = 0usize;
    for event in events {
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    top_level += 1;
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 => top_level += 1,
            _ => {}
        }
    }
    top_level == 1
}

/// Render every string inside `value`, keeping its shape.
///
/// Mapping keys and sequence order are preserved. Scalars other than text
/// (numbers, booleans, null) pass through unchanged.
pub fn render_value(value: &MetaValue) -> MetaValue {
    match value {
        MetaValue::Text(s) => MetaValue::Text(render_inline(s)),
        MetaValue::Sequence(items) => MetaValue::Sequence(items.iter().map(render_value).collect()),
        MetaValue::Mapping(map) => MetaValue::Mapping(render_map(map)),
        MetaValue::Null | MetaValue::Bool(_) | MetaValue::Integer(_) | MetaValue::Float(_) => {
            value.clone()
        }
    }
}

/// [`render_value`] over a whole header.
pub fn render_map(map: &MetaMap) -> MetaMap {
    map.iter()
        .map(|(k, v)| (k.clone(), render_value(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // render_inline
    // =========================================================================

    #[test]
    fn plain_text_has_no_wrapper() {
        assert_eq!(render_inline("hello"), "hello");
    }

    #[test]
    fn inline_markup_is_rendered() {
        assert_eq!(
            render_inline("*Untitled* by [me](https://example.com)"),
            r#"<em>Untitled</em> by <a href="https://example.com">me</a>"#
        );
    }

    #[test]
    fn two_paragraphs_keep_block_structure() {
        assert_eq!(render_inline("first\n\nsecond"), "<p>first</p>\n<p>second</p>\n");
    }

    #[test]
    fn headings_are_not_unwrapped() {
        assert_eq!(render_inline("# Title"), "<h1>Title</h1>\n");
    }

    #[test]
    fn paragraph_followed_by_list_is_kept() {
        let html = render_inline("intro\n\n- a\n- b");
        assert!(html.starts_with("<p>intro</p>"));
        assert!(html.contains("<ul>"));
    }

    #[test]
    fn empty_string_renders_empty() {
        assert_eq!(render_inline(""), "");
    }

    #[test]
    fn html_is_escaped_in_text() {
        assert_eq!(render_inline("a & b"), "a &amp; b");
    }

    // =========================================================================
    // render_block
    // =========================================================================

    #[test]
    fn block_render_keeps_paragraph() {
        assert_eq!(render_block("hello"), "<p>hello</p>\n");
    }

    // =========================================================================
    // render_value
    // =========================================================================

    #[test]
    fn nested_structures_are_rendered_recursively() {
        let mut credit = MetaMap::new();
        credit.insert("name".into(), "**Someone**".into());
        let mut header = MetaMap::new();
        header.insert("title".into(), "*Demo*".into());
        header.insert(
            "credits".into(),
            MetaValue::Sequence(vec![MetaValue::Mapping(credit)]),
        );

        let rendered = render_map(&header);

        assert_eq!(rendered["title"], MetaValue::from("<em>Demo</em>"));
        let MetaValue::Sequence(credits) = &rendered["credits"] else {
            panic!("credits should stay a sequence");
        };
        let MetaValue::Mapping(first) = &credits[0] else {
            panic!("credit should stay a mapping");
        };
        assert_eq!(first["name"], MetaValue::from("<strong>Someone</strong>"));
    }

    #[test]
    fn non_text_scalars_pass_through() {
        assert_eq!(render_value(&MetaValue::Integer(2021)), MetaValue::Integer(2021));
        assert_eq!(render_value(&MetaValue::Bool(true)), MetaValue::Bool(true));
        assert_eq!(render_value(&MetaValue::Float(1.5)), MetaValue::Float(1.5));
        assert_eq!(render_value(&MetaValue::Null), MetaValue::Null);
    }

    #[test]
    fn sequence_order_is_preserved() {
        let seq = MetaValue::Sequence(vec!["b".into(), "a".into(), "*c*".into()]);
        assert_eq!(
            render_value(&seq),
            MetaValue::Sequence(vec!["b".into(), "a".into(), "<em>c</em>".into()])
        );
    }
}
