//! Slug codec: link labels and filenames to post identifiers

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// File extension of post sources
pub const POST_EXTENSION: &str = ".md";

/// Bytes left unescaped when a slug is placed in a URL path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NOT_SLUG_HANGUL: Regex = Regex::new(r"[^A-Za-z0-9_\-\x{AC00}-\x{D7A3}]").unwrap();
    static ref NOT_SLUG_ASCII: Regex = Regex::new(r"[^A-Za-z0-9_\-]").unwrap();
}

/// Which characters survive slugification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugStyle {
    /// ASCII word characters, hyphens and Hangul syllables
    #[default]
    Hangul,
    /// ASCII word characters and hyphens only
    Ascii,
}

/// Convert WikiLink label text to a slug.
///
/// # Examples
/// ```
/// use wikiblog::content::slugify;
/// assert_eq!(slugify("My Awesome Post"), "my-awesome-post");
/// assert_eq!(slugify("한글 포스트"), "한글-포스트");
/// ```
pub fn slugify(label: &str) -> String {
    slugify_with(label, SlugStyle::Hangul)
}

/// Convert label text to a slug using the given style
pub fn slugify_with(label: &str, style: SlugStyle) -> String {
    let lowered = label.trim().to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    let strip = match style {
        SlugStyle::Hangul => &*NOT_SLUG_HANGUL,
        SlugStyle::Ascii => &*NOT_SLUG_ASCII,
    };
    strip.replace_all(&hyphenated, "").into_owned()
}

/// Map a directory entry name to its slug; `None` for non-post files
pub fn slug_from_filename(filename: &str) -> Option<&str> {
    filename.strip_suffix(POST_EXTENSION)
}

/// Source filename for a slug
pub fn filename_for_slug(slug: &str) -> String {
    format!("{}{}", slug, POST_EXTENSION)
}

/// Percent-encode a slug for use in an href path segment
pub fn encode_slug(slug: &str) -> String {
    utf8_percent_encode(slug, PATH_SEGMENT).to_string()
}

/// Site-relative URL of a post
pub fn post_href(slug: &str) -> String {
    format!("/posts/{}", encode_slug(slug))
}

/// Whether a slug can safely name a file inside the posts directory
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}
