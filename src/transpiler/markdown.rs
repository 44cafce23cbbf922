//! Markdown rendering via `pulldown-cmark`.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use super::Rendered;

/// Extensions enabled for every document.
fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    opts
}

/// Render Markdown to an HTML fragment and pick up the first `#` heading.
pub fn render(source: &str) -> Rendered {
    let events: Vec<Event<'_>> = Parser::new_ext(source, options()).collect();
    let title = first_h1(&events);

    let mut body = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());

    Rendered { body, title }
}

/// Plain text of the first level-one heading.
fn first_h1(events: &[Event<'_>]) -> Option<String> {
    let mut inside = false;
    let mut text = String::new();

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => inside = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if inside => {
                let title = text.trim();
                return (!title.is_empty()).then(|| title.to_string());
            }
            Event::Text(s) | Event::Code(s) if inside => text.push_str(s),
            Event::SoftBreak | Event::HardBreak if inside => text.push(' '),
            _ => {}
        }
    }
    None
}
