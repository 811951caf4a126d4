//! Implements [`HtmlRenderer`], a replacement for
//! [`pulldown_cmark::html::push_html`]. On top of what that does, this gives
//! every heading a slugified `id` with a self-link, splits `lang:title` fence info strings
//! into a language class and a code title, prefixes footnote links with the
//! page's slug, and writes image alt text into the `alt` attribute.

use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Tag};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::io;

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

struct EscapeHref<'a>(&'a str);

impl Display for EscapeHref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_href(&mut adaptor, self.0);
        adaptor.result
    }
}

struct EscapeHtml<'a>(&'a str);

impl Display for EscapeHtml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };

        let _ = escape_html(&mut adaptor, self.0);
        adaptor.result
    }
}

enum TableState {
    Head,
    Body,
}

/// A heading whose contents are being buffered until its end tag, since the
/// `id` is derived from the heading text.
struct PendingHeading {
    level: u32,
    html: String,
    text: String,
}

/// An image whose alt text is being buffered until its end tag.
struct PendingImage {
    dest: String,
    title: String,
    alt: String,
}

/// Renders markdown [`Event`]s into HTML. This is largely modeled after
/// [`pulldown_cmark`]'s private [`HtmlWriter`
/// struct](https://github.com/raphlinus/pulldown-cmark/blob/bf0a1a4938dbd2ec41c3add069b3d361d11731f4/src/html.rs#L36-L50).
pub struct HtmlRenderer {
    table_alignments: Vec<Alignment>,
    table_state: TableState,
    table_cell_index: usize,

    /// The prefix to prepend onto footnote links.
    footnote_prefix: String,

    heading: Option<PendingHeading>,
    image: Option<PendingImage>,

    /// How often each heading id has been handed out, so repeated headings
    /// get `-1`, `-2`, ... suffixes.
    heading_ids: HashMap<String, usize>,
}

impl HtmlRenderer {
    fn new() -> Self {
        HtmlRenderer {
            table_alignments: Vec::default(),
            table_state: TableState::Head,
            table_cell_index: usize::default(),
            footnote_prefix: String::default(),
            heading: None,
            image: None,
            heading_ids: HashMap::new(),
        }
    }

    pub fn with_footnote_prefix(footnote_prefix: &str) -> Self {
        let mut renderer = Self::new();
        renderer.footnote_prefix = footnote_prefix.to_owned();
        renderer
    }

    pub fn on_event<W: StrWrite>(&mut self, w: &mut W, event: Event) -> io::Result<()> {
        match self.heading.take() {
            Some(mut heading) => {
                if let Event::End(Tag::Heading(_)) = event {
                    return self.close_heading(w, heading);
                }
                if let Event::Text(text) | Event::Code(text) = &event {
                    heading.text.push_str(text);
                }
                let result = self.on_inline(&mut heading.html, event);
                self.heading = Some(heading);
                result
            }
            None => self.on_inline(w, event),
        }
    }

    // Images buffer their alt text until the end tag.
    fn on_inline<W: StrWrite>(&mut self, w: &mut W, event: Event) -> io::Result<()> {
        let mut image = match self.image.take() {
            Some(image) => image,
            None => return self.render(w, event),
        };
        match event {
            Event::End(Tag::Image(..)) => write!(
                w,
                r#"<img src="{}" alt="{}" title="{}">"#,
                EscapeHref(&image.dest),
                EscapeHtml(&image.alt),
                EscapeHtml(&image.title),
            ),
            Event::Text(text) | Event::Code(text) => {
                image.alt.push_str(&text);
                self.image = Some(image);
                Ok(())
            }
            _ => {
                self.image = Some(image);
                Ok(())
            }
        }
    }

    fn render<W: StrWrite>(&mut self, w: &mut W, event: Event) -> io::Result<()> {
        match event {
            Event::Start(tag) => self.on_start(w, tag),
            Event::End(tag) => self.on_end(w, tag),
            Event::Code(code) => write!(w, "<code>{}</code>", EscapeHtml(&code)),
            Event::FootnoteReference(name) => write!(
                w,
                r##"<sup class="footnote-reference"><a href="{}#{}">{}</a></sup>"##,
                EscapeHtml(&self.footnote_prefix),
                EscapeHtml(&name),
                EscapeHtml(&name),
            ),
            Event::HardBreak => w.write_str("<br />"),
            Event::Html(html) => w.write_str(&html),
            Event::Rule => w.write_str("<hr />"),
            Event::SoftBreak => w.write_str("\n"),
            Event::TaskListMarker(checked) => write!(
                w,
                r#"<input disabled="" type="checkbox" {}/>"#,
                match checked {
                    true => r#"checked="" "#,
                    false => "",
                }
            ),
            Event::Text(text) => escape_html(w, &text),
        }
    }

    fn close_heading<W: StrWrite>(
        &mut self,
        w: &mut W,
        heading: PendingHeading,
    ) -> io::Result<()> {
        let id = self.unique_heading_id(&heading.text);
        write!(
            w,
            r##"<h{level} id="{id}"><a class="anchor" aria-hidden="true" href="#{id}"></a>{html}</h{level}>"##,
            level = heading.level,
            id = EscapeHtml(&id),
            html = heading.html,
        )
    }

    fn unique_heading_id(&mut self, text: &str) -> String {
        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = String::from("section");
        }
        let seen = self.heading_ids.entry(base.clone()).or_insert(0);
        let id = match *seen {
            0 => base,
            n => format!("{}-{}", base, n),
        };
        *seen += 1;
        id
    }

    fn on_start<W: StrWrite>(&mut self, w: &mut W, tag: Tag) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("<blockquote>"),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let info = info.split(' ').next().unwrap_or_default();
                let (lang, title) = match info.split_once(':') {
                    Some((lang, title)) => (lang, Some(title)),
                    None => (info, None),
                };
                if let Some(title) = title.filter(|t| !t.is_empty()) {
                    write!(w, r#"<div class="code-title">{}</div>"#, EscapeHtml(title))?;
                }
                match lang.is_empty() {
                    true => w.write_str("<pre><code>"),
                    false => write!(
                        w,
                        r#"<pre class="language-{lang}"><code class="language-{lang}">"#,
                        lang = EscapeHtml(lang)
                    ),
                }
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => w.write_str("<pre><code>"),
            Tag::Emphasis => w.write_str("<em>"),
            Tag::FootnoteDefinition(name) => {
                let name = EscapeHtml(&name);
                write!(
                    w,
                    r#"<div class="footnote-definition" id="{}">{}. &nbsp;"#,
                    &name, &name,
                )
            }
            Tag::Heading(level) => {
                self.heading = Some(PendingHeading {
                    level,
                    html: String::new(),
                    text: String::new(),
                });
                Ok(())
            }
            Tag::Image(_link_type, dest, title) => {
                self.image = Some(PendingImage {
                    dest: dest.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                });
                Ok(())
            }
            Tag::Item => w.write_str("<li>"),
            Tag::Link(LinkType::Email, dest, title) => write!(
                w,
                r#"<a href="mailto:{}" title="{}">"#,
                EscapeHref(&dest),
                EscapeHtml(&title),
            ),
            Tag::Link(_link_type, dest, title) => write!(
                w,
                r#"<a href="{}" title="{}">"#,
                EscapeHref(&dest),
                EscapeHtml(&title),
            ),
            Tag::List(None) => w.write_str("<ul>"),
            Tag::List(Some(1)) => w.write_str("<ol>"),
            Tag::List(Some(start)) => write!(w, r#"<ol start="{}">"#, start),
            Tag::Paragraph => w.write_str("<p>"),
            Tag::Strikethrough => w.write_str("<del>"),
            Tag::Strong => w.write_str("<strong>"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                w.write_str("<table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                w.write_str("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                w.write_str("<tr>")
            }
            Tag::TableCell => write!(
                w,
                "<{}{}>",
                match self.table_state {
                    TableState::Head => "th",
                    TableState::Body => "td",
                },
                match self.table_alignments.get(self.table_cell_index) {
                    Some(Alignment::Left) => r#" align="left""#,
                    Some(Alignment::Right) => r#" align="right""#,
                    Some(Alignment::Center) => r#" align="center""#,
                    _ => "",
                }
            ),
        }
    }

    fn on_end<W: StrWrite>(&mut self, w: &mut W, tag: Tag) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("</blockquote>"),
            Tag::CodeBlock(_) => w.write_str("</code></pre>"),
            Tag::Emphasis => w.write_str("</em>"),
            Tag::FootnoteDefinition(_) => w.write_str("</div>"),
            // headings and images are closed in `on_event` and `on_inline`
            Tag::Heading(_) | Tag::Image(..) => Ok(()),
            Tag::Item => w.write_str("</li>"),
            Tag::Link(..) => w.write_str("</a>"),
            Tag::List(Some(_)) => w.write_str("</ol>"),
            Tag::List(None) => w.write_str("</ul>"),
            Tag::Paragraph => w.write_str("</p>"),
            Tag::Strikethrough => w.write_str("</del>"),
            Tag::Strong => w.write_str("</strong>"),
            Tag::Table(_) => w.write_str("</tbody></table>"),
            Tag::TableHead => {
                self.table_state = TableState::Body;
                w.write_str("</tr></thead><tbody>")
            }
            Tag::TableRow => w.write_str("</tr>"),
            Tag::TableCell => {
                self.table_cell_index += 1;
                w.write_str(match self.table_state {
                    TableState::Head => "</th>",
                    TableState::Body => "</td>",
                })
            }
        }
    }
}
