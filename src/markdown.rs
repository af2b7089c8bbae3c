//! Terminal rendering of generated markdown.
//!
//! `TerminalMarkdown` walks pulldown-cmark events and writes styled text into
//! a termcolor buffer. With color disabled the same layout is produced
//! without escape codes.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::error::{Error, Result};
use crate::present::MarkupRenderer;

fn markdown_err(err: std::io::Error) -> Error {
    Error::Markdown(err.to_string())
}

/// Markdown renderer for terminal output
#[derive(Debug, Clone, Copy)]
pub struct TerminalMarkdown {
    color: bool,
}

impl TerminalMarkdown {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Renderer emitting ANSI color codes
    pub fn colored() -> Self {
        Self::new(true)
    }

    /// Renderer producing plain text
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Render `markdown` into a string
    pub fn render(&self, markdown: &str) -> Result<String> {
        let mut buffer = if self.color {
            Buffer::ansi()
        } else {
            Buffer::no_color()
        };

        let mut state = FormatState::default();
        for event in Parser::new_ext(markdown, Options::all()) {
            state.handle_event(&mut buffer, event)?;
        }
        buffer.reset().map_err(markdown_err)?;

        String::from_utf8(buffer.into_inner()).map_err(|e| Error::Markdown(e.to_string()))
    }
}

impl Default for TerminalMarkdown {
    fn default() -> Self {
        Self::colored()
    }
}

impl MarkupRenderer for TerminalMarkdown {
    fn render_markup(&self, text: &str) -> Result<String> {
        self.render(text)
    }
}

struct Link {
    dest: String,
    text: String,
}

/// Tracks the current formatting state
#[derive(Default)]
struct FormatState {
    style_stack: Vec<ColorSpec>,
    /// One entry per open list, holding the next number for ordered lists
    lists: Vec<Option<u64>>,
    heading: Option<(HeadingLevel, String)>,
    link: Option<Link>,
    in_quote: bool,
    pending_gap: bool,
    line_start: bool,
    written: bool,
}

impl FormatState {
    fn handle_event<W: WriteColor>(&mut self, out: &mut W, event: Event) -> Result<()> {
        match event {
            Event::Start(tag) => self.handle_start(out, tag),
            Event::End(tag_end) => self.handle_end(out, tag_end),
            Event::Text(text) => self.write_text(out, &text),
            Event::Code(code) => self.write_inline_code(out, &code),
            Event::Html(html) | Event::InlineHtml(html) => self.write_text(out, &html),
            Event::SoftBreak | Event::HardBreak => {
                self.write(out, "\n")?;
                if self.in_quote {
                    self.write(out, "  │ ")?;
                }
                Ok(())
            }
            Event::Rule => {
                self.begin_block(out)?;
                self.write(out, &"─".repeat(40))?;
                self.write(out, "\n")?;
                self.pending_gap = true;
                Ok(())
            }
            Event::TaskListMarker(checked) => self.write(out, if checked { "[x] " } else { "[ ] " }),
            _ => Ok(()),
        }
    }

    fn handle_start<W: WriteColor>(&mut self, out: &mut W, tag: Tag) -> Result<()> {
        match tag {
            Tag::Heading { level, .. } => {
                self.begin_block(out)?;
                let level_color = match level {
                    HeadingLevel::H1 => Color::Rgb(255, 99, 71),
                    HeadingLevel::H2 => Color::Rgb(70, 130, 180),
                    _ => Color::Cyan,
                };
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(level_color)).set_bold(true);
                self.push_style(out, spec)?;
                self.heading = Some((level, String::new()));
            }
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.begin_block(out)?;
                }
            }
            Tag::Strong => {
                let mut spec = self.current_style();
                spec.set_bold(true);
                self.push_style(out, spec)?;
            }
            Tag::Emphasis => {
                let mut spec = self.current_style();
                spec.set_italic(true);
                self.push_style(out, spec)?;
            }
            Tag::Strikethrough => {
                let mut spec = self.current_style();
                spec.set_dimmed(true);
                self.push_style(out, spec)?;
            }
            Tag::BlockQuote(_) => {
                self.begin_block(out)?;
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(Color::Yellow));
                self.push_style(out, spec)?;
                self.in_quote = true;
                self.write(out, "  │ ")?;
            }
            Tag::CodeBlock(kind) => {
                self.begin_block(out)?;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        let mut lang_spec = ColorSpec::new();
                        lang_spec.set_fg(Some(Color::Blue)).set_italic(true);
                        self.push_style(out, lang_spec)?;
                        self.write(out, &format!("[{lang}]\n"))?;
                        self.pop_style(out)?;
                    }
                }
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(Color::Green));
                self.push_style(out, spec)?;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.begin_block(out)?;
                } else if !self.line_start {
                    self.write(out, "\n")?;
                }
                self.lists.push(start);
            }
            Tag::Item => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.write(out, &format!("{indent}{marker}"))?;
            }
            Tag::Link { dest_url, .. } => {
                let mut spec = self.current_style();
                spec.set_fg(Some(Color::Blue)).set_underline(true);
                self.push_style(out, spec)?;
                self.link = Some(Link {
                    dest: dest_url.to_string(),
                    text: String::new(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end<W: WriteColor>(&mut self, out: &mut W, tag_end: TagEnd) -> Result<()> {
        match tag_end {
            TagEnd::Heading(_) => {
                self.pop_style(out)?;
                self.write(out, "\n")?;
                if let Some((level, text)) = self.heading.take() {
                    let rule = match level {
                        HeadingLevel::H1 => Some('='),
                        HeadingLevel::H2 => Some('-'),
                        _ => None,
                    };
                    if let Some(rule) = rule {
                        let width = text.chars().count().max(1);
                        self.write(out, &rule.to_string().repeat(width))?;
                        self.write(out, "\n")?;
                    }
                }
                self.pending_gap = true;
            }
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.write(out, "\n")?;
                    self.pending_gap = true;
                } else if !self.line_start {
                    self.write(out, "\n")?;
                }
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => self.pop_style(out)?,
            TagEnd::Link => {
                self.pop_style(out)?;
                if let Some(link) = self.link.take() {
                    if !link.dest.is_empty() && link.dest != link.text {
                        self.write(out, &format!(" ({})", link.dest))?;
                    }
                }
            }
            TagEnd::BlockQuote(_) => {
                self.in_quote = false;
                self.pop_style(out)?;
                if !self.line_start {
                    self.write(out, "\n")?;
                }
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.pop_style(out)?;
                if !self.line_start {
                    self.write(out, "\n")?;
                }
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.pending_gap = true;
                }
            }
            TagEnd::Item => {
                if !self.line_start {
                    self.write(out, "\n")?;
                }
            }
            TagEnd::TableCell => self.write(out, " | ")?,
            TagEnd::TableHead | TagEnd::TableRow => self.write(out, "\n")?,
            TagEnd::Table => self.pending_gap = true,
            _ => {}
        }
        Ok(())
    }

    /// Separate a new top-level block from the previous one by a blank line
    fn begin_block<W: WriteColor>(&mut self, out: &mut W) -> Result<()> {
        if self.pending_gap && self.written {
            if !self.line_start {
                self.write(out, "\n")?;
            }
            self.write(out, "\n")?;
        }
        self.pending_gap = false;
        Ok(())
    }

    fn write<W: WriteColor>(&mut self, out: &mut W, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        write!(out, "{text}").map_err(markdown_err)?;
        self.line_start = text.ends_with('\n');
        self.written = true;
        Ok(())
    }

    fn write_text<W: WriteColor>(&mut self, out: &mut W, text: &str) -> Result<()> {
        if let Some((_, heading)) = self.heading.as_mut() {
            heading.push_str(text);
        }
        if let Some(link) = self.link.as_mut() {
            link.text.push_str(text);
        }
        self.write(out, text)
    }

    fn write_inline_code<W: WriteColor>(&mut self, out: &mut W, code: &str) -> Result<()> {
        let restore = self.current_style();
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))
            .map_err(markdown_err)?;
        self.write_text(out, &format!("`{code}`"))?;
        out.set_color(&restore).map_err(markdown_err)
    }

    fn current_style(&self) -> ColorSpec {
        self.style_stack.last().cloned().unwrap_or_default()
    }

    fn push_style<W: WriteColor>(&mut self, out: &mut W, spec: ColorSpec) -> Result<()> {
        out.set_color(&spec).map_err(markdown_err)?;
        self.style_stack.push(spec);
        Ok(())
    }

    fn pop_style<W: WriteColor>(&mut self, out: &mut W) -> Result<()> {
        self.style_stack.pop();
        match self.style_stack.last() {
            Some(spec) => out.set_color(spec).map_err(markdown_err),
            None => out.reset().map_err(markdown_err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colored_heading_differs_from_source() {
        let rendered = TerminalMarkdown::colored().render("## Summary").unwrap();
        assert!(!rendered.is_empty());
        assert_ne!(rendered, "## Summary");
        assert!(rendered.contains("Summary"));
        assert!(rendered.contains("\x1b["));
    }

    #[test]
    fn test_plain_heading_is_underlined() {
        let rendered = TerminalMarkdown::plain().render("# Title\n\nBody text.").unwrap();
        assert_eq!(rendered, "Title\n=====\n\nBody text.\n");
    }

    #[test]
    fn test_lists_are_marked_and_numbered() {
        let rendered = TerminalMarkdown::plain()
            .render("- one\n- two\n\n1. first\n2. second\n")
            .unwrap();
        assert!(rendered.contains("• one\n• two\n"));
        assert!(rendered.contains("1. first\n2. second\n"));
    }

    #[test]
    fn test_nested_list_is_indented() {
        let rendered = TerminalMarkdown::plain()
            .render("- outer\n  - inner\n")
            .unwrap();
        assert_eq!(rendered, "• outer\n  • inner\n");
    }

    #[test]
    fn test_code_block_keeps_language_tag() {
        let rendered = TerminalMarkdown::plain()
            .render("```rust\nfn main() {}\n```\n")
            .unwrap();
        assert_eq!(rendered, "[rust]\nfn main() {}\n");
    }

    #[test]
    fn test_link_shows_destination_after_text() {
        let rendered = TerminalMarkdown::plain()
            .render("See [the docs](https://docs.rs).")
            .unwrap();
        assert_eq!(rendered, "See the docs (https://docs.rs).\n");
    }

    #[test]
    fn test_inline_code_and_emphasis_keep_text() {
        let rendered = TerminalMarkdown::plain()
            .render("Run `cargo build` *now*.")
            .unwrap();
        assert_eq!(rendered, "Run `cargo build` now.\n");
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert_eq!(TerminalMarkdown::plain().render("").unwrap(), "");
    }
}
