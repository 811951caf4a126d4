//! The bridge to the markup compiler. Document bodies go in as markdown and
//! come out as an opaque HTML string; nothing downstream inspects it.

use crate::htmlrenderer::HtmlRenderer;
use crate::url::Converter as LinkConverter;
use pulldown_cmark::*;
use std::io;
use url::{ParseError as UrlParseError, Url};

/// Converts markdown to HTML, writing the result into [`w`].
///
/// * [`site_root`] is the URL of the content root (e.g.,
///   https://example.org/). This should end in a trailing slash.
/// * [`raw_path`] is the relative path to the source file from the content
///   root.
/// * [`markdown`] is the body of the source file.
/// * [`footnote_prefix`] is the prefix to prepend onto footnote links.
pub fn to_html<W: escape::StrWrite>(
    w: &mut W,
    site_root: &Url,
    raw_path: &str,
    markdown: &str,
    footnote_prefix: &str,
) -> Result<(), Error> {
    check_code_fences(markdown)?;

    let event_converter = EventConverter {
        link_converter: LinkConverter::new(site_root, raw_path)?,
    };
    let mut html_renderer = HtmlRenderer::with_footnote_prefix(footnote_prefix);
    for ev in Parser::new_ext(markdown, options()).map(|ev| event_converter.convert(ev)) {
        let ev = ev?;
        html_renderer.on_event(w, ev)?;
    }
    Ok(())
}

/// Rejects bodies with a fenced code block that is never closed. CommonMark
/// would silently swallow the rest of the document into the block. Fences are
/// found by the parser itself, so indented code and fences nested in lists
/// or block quotes are handled the way they render.
pub fn check_code_fences(markdown: &str) -> Result<(), Error> {
    for (event, range) in Parser::new_ext(markdown, options()).into_offset_iter() {
        if let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) = event {
            if !is_closed_fence(&markdown[range.clone()]) {
                return Err(Error::UnterminatedCodeFence {
                    line: markdown[..range.start].matches('\n').count() + 1,
                });
            }
        }
    }
    Ok(())
}

// `block` is the source of a fenced code block, opening fence included. Its
// last non-blank line must be a fence of the same character that is at least
// as long as the opening one.
fn is_closed_fence(block: &str) -> bool {
    fn fence(line: &str) -> &str {
        line.trim_start_matches(|c: char| c.is_whitespace() || c == '>')
            .trim_end()
    }
    let mut lines = block.lines().filter(|line| !fence(line).is_empty());
    let opening = match lines.next() {
        Some(line) => fence(line),
        None => return false,
    };
    let fence_char = match opening.chars().next() {
        Some(c) => c,
        None => return false,
    };
    let open_len = opening.chars().take_while(|&c| c == fence_char).count();
    match lines.last().map(fence) {
        Some(closing) => {
            closing.chars().all(|c| c == fence_char) && closing.chars().count() >= open_len
        }
        None => false,
    }
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

struct EventConverter<'a> {
    link_converter: LinkConverter<'a>,
}

impl<'a> EventConverter<'a> {
    fn convert_tag<'b>(&self, tag: Tag<'b>) -> Result<Tag<'b>, UrlParseError> {
        Ok(match tag {
            // Internal links (links from one document to another) need to be
            // converted from their source paths to their routes (e.g., a post
            // linking to another post as `foo.mdx` will need to be converted
            // to `/posts/foo`).
            Tag::Link(LinkType::Email, url, title) => Tag::Link(LinkType::Email, url, title),
            Tag::Link(link, url, title) => Tag::Link(
                link,
                CowStr::Boxed(self.link_converter.convert(&url)?.into_boxed_str()),
                title,
            ),
            _ => tag,
        })
    }

    fn convert<'b>(&self, ev: Event<'b>) -> Result<Event<'b>, UrlParseError> {
        Ok(match ev {
            Event::Start(tag) => Event::Start(self.convert_tag(tag)?),
            _ => ev,
        })
    }
}

/// Represents an error converting markdown to HTML.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a fenced code block is opened but never closed.
    #[error("code fence opened on line {line} is never closed")]
    UnterminatedCodeFence { line: usize },

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Returned when there is a problem parsing URLs.
    #[error(transparent)]
    UrlParse(#[from] UrlParseError),
}
