//! # Presentation
//!
//! Maps a [`GenerationState`] to what the panel shows. Successful overviews
//! go through the formatting engine when one is available; if it is missing,
//! fails, or produces nothing, the raw overview text is shown instead.

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::overview::GenerationState;

/// Formatting engine contract
pub trait MarkupRenderer: Send + Sync {
    fn render_markup(&self, text: &str) -> Result<String>;
}

/// Whether a formatting engine is present for this run
pub enum Formatting {
    Available(Box<dyn MarkupRenderer>),
    Unavailable,
}

impl Formatting {
    pub fn available(renderer: impl MarkupRenderer + 'static) -> Self {
        Formatting::Available(Box::new(renderer))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Formatting::Available(_))
    }

    /// Format `text`, falling back to the raw text
    pub fn apply(&self, text: &str) -> String {
        match self {
            Formatting::Available(renderer) => match renderer.render_markup(text) {
                Ok(rendered) if !rendered.trim().is_empty() => rendered,
                Ok(_) => {
                    debug!("Formatting produced no output, showing raw text");
                    text.to_string()
                }
                Err(e) => {
                    warn!(error = %e, "Formatting failed, showing raw text");
                    text.to_string()
                }
            },
            Formatting::Unavailable => text.to_string(),
        }
    }
}

impl fmt::Debug for Formatting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatting::Available(_) => f.write_str("Formatting::Available"),
            Formatting::Unavailable => f.write_str("Formatting::Unavailable"),
        }
    }
}

/// Heading of the idle display
pub const INTRO_TITLE: &str = "Repository overview";

/// Call to action of the idle display
pub const INTRO_ACTION: &str = "Generate an overview of this repository.";

/// Text shown while loading
pub const BUSY_MESSAGE: &str = "Generating overview...";

/// What the panel shows for one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayPayload {
    Intro { title: String, action: String },
    Busy { message: String },
    Error { message: String },
    Content { text: String },
}

impl DisplayPayload {
    pub fn is_content(&self) -> bool {
        matches!(self, DisplayPayload::Content { .. })
    }
}

impl fmt::Display for DisplayPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayPayload::Intro { title, action } => write!(f, "{title}\n\n{action}"),
            DisplayPayload::Busy { message } => f.write_str(message),
            DisplayPayload::Error { message } => write!(f, "Error: {message}"),
            DisplayPayload::Content { text } => f.write_str(text),
        }
    }
}

/// Convert a state into its display
pub fn render(state: &GenerationState, formatting: &Formatting) -> DisplayPayload {
    match state {
        GenerationState::Idle => DisplayPayload::Intro {
            title: INTRO_TITLE.to_string(),
            action: INTRO_ACTION.to_string(),
        },
        GenerationState::Loading => DisplayPayload::Busy {
            message: BUSY_MESSAGE.to_string(),
        },
        GenerationState::Failure(message) => DisplayPayload::Error {
            message: message.clone(),
        },
        GenerationState::Success(content) => DisplayPayload::Content {
            text: formatting.apply(content),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::markdown::TerminalMarkdown;

    struct Failing;

    impl MarkupRenderer for Failing {
        fn render_markup(&self, _text: &str) -> Result<String> {
            Err(Error::Markdown("broken".into()))
        }
    }

    struct Blank;

    impl MarkupRenderer for Blank {
        fn render_markup(&self, _text: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn success(text: &str) -> GenerationState {
        GenerationState::Success(text.to_string())
    }

    #[test]
    fn test_available_engine_formats_content() {
        let formatting = Formatting::available(TerminalMarkdown::colored());
        let payload = render(&success("## Summary"), &formatting);

        let DisplayPayload::Content { text } = payload else {
            panic!("expected content");
        };
        assert!(!text.is_empty());
        assert_ne!(text, "## Summary");
    }

    #[test]
    fn test_unavailable_engine_passes_raw_text() {
        let payload = render(&success("## Summary"), &Formatting::Unavailable);
        assert_eq!(
            payload,
            DisplayPayload::Content {
                text: "## Summary".to_string()
            }
        );
        assert!(payload.to_string().contains("Summary"));
    }

    #[test]
    fn test_failing_or_blank_engine_falls_back_to_raw_text() {
        for formatting in [Formatting::available(Failing), Formatting::available(Blank)] {
            let payload = render(&success("## Summary"), &formatting);
            assert_eq!(payload.to_string(), "## Summary");
        }
    }

    #[test]
    fn test_failure_message_is_shown_verbatim() {
        let message = "Failed to generate overview: quota exceeded";
        let payload = render(
            &GenerationState::Failure(message.to_string()),
            &Formatting::Unavailable,
        );
        assert_eq!(
            payload,
            DisplayPayload::Error {
                message: message.to_string()
            }
        );
    }

    #[test]
    fn test_idle_and_loading_have_no_content() {
        let intro = render(&GenerationState::Idle, &Formatting::Unavailable);
        assert!(matches!(intro, DisplayPayload::Intro { .. }));
        assert!(intro.to_string().contains(INTRO_ACTION));

        let busy = render(&GenerationState::Loading, &Formatting::Unavailable);
        assert_eq!(
            busy,
            DisplayPayload::Busy {
                message: BUSY_MESSAGE.to_string()
            }
        );
        assert!(!busy.is_content());
    }
}
