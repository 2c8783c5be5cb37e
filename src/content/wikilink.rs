//! Event rewrites applied between parsing and HTML output
//!
//! Three rewrites run in a single pass over the parser's events:
//! `[[label]]` spans become WikiLink anchors, bare `http(s)://` URLs become
//! links, and relative image paths are rooted under `/images/`. Text inside
//! code, links and image alt text is left untouched.

use lazy_static::lazy_static;
use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

use super::slug::{encode_slug, slugify_with, SlugStyle};

/// Class marking WikiLink anchors
pub const WIKI_LINK_CLASS: &str = "wiki-link";

/// Prefix for rewritten relative image paths
pub const IMAGES_ROOT: &str = "/images/";

lazy_static! {
    /// `[[label]]`; the label cannot contain `]` or span lines
    static ref WIKI_LINK: Regex = Regex::new(r"\[\[([^\]\n]+)\]\]").unwrap();
    static ref BARE_URL: Regex =
        Regex::new(r#"https?://[^\s<>"]*[^\s<>".,:;!?'()\[\]]"#).unwrap();
}

/// Rewrite a parsed event stream into a new one
pub fn rewrite_events<'a, I>(events: I, style: SlugStyle) -> Vec<Event<'a>>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut out = Vec::new();
    // Links and images nest; code blocks do not
    let mut link_depth = 0usize;
    let mut image_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match event {
            Event::Start(Tag::Link { .. }) => {
                link_depth += 1;
                out.push(event);
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                out.push(event);
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                image_depth += 1;
                let dest_url = rewrite_image_url(&dest_url)
                    .map(CowStr::from)
                    .unwrap_or(dest_url);
                out.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            Event::End(TagEnd::Image) => {
                image_depth = image_depth.saturating_sub(1);
                out.push(event);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                out.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push(event);
            }
            Event::Text(text) if link_depth == 0 && image_depth == 0 && !in_code_block => {
                push_text(&mut out, text, style);
            }
            other => out.push(other),
        }
    }

    out
}

/// Split a text run at WikiLinks, autolinking the plain pieces in between
fn push_text<'a>(out: &mut Vec<Event<'a>>, text: CowStr<'a>, style: SlugStyle) {
    if !WIKI_LINK.is_match(&text) && !BARE_URL.is_match(&text) {
        out.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for caps in WIKI_LINK.captures_iter(&text) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_autolinked(out, &text[last..whole.start()]);
        push_wiki_link(out, label.as_str(), style);
        last = whole.end();
    }
    push_autolinked(out, &text[last..]);
}

fn push_wiki_link(out: &mut Vec<Event<'_>>, label: &str, style: SlugStyle) {
    let slug = slugify_with(label, style);
    // Slugs hold only word characters, hyphens and Hangul, so they need no escaping
    out.push(Event::InlineHtml(CowStr::from(format!(
        r#"<a href="/posts/{}" class="{}" data-slug="{}">"#,
        encode_slug(&slug),
        WIKI_LINK_CLASS,
        slug
    ))));
    out.push(Event::Text(CowStr::from(label.to_string())));
    out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
}

fn push_autolinked(out: &mut Vec<Event<'_>>, text: &str) {
    let mut last = 0;
    for m in BARE_URL.find_iter(text) {
        if m.start() > last {
            out.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }
        let url = m.as_str().to_string();
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.clone()),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(url)));
        out.push(Event::End(TagEnd::Link));
        last = m.end();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// New URL for a relative image path; `None` leaves the URL as written
pub fn rewrite_image_url(url: &str) -> Option<String> {
    if url.is_empty()
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with('/')
    {
        return None;
    }
    Some(format!("{}{}", IMAGES_ROOT, url.trim_start_matches("./")))
}
