use crate::core::config::Appearance;
use crate::ui::theme::Theme;
use crate::utils::syntax::{highlight_code_block, registered_syntax_token, sanitize_for_display};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use tracing::debug;

/// Which routine produced a [`HighlightedCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightRoutine {
    /// syntect highlighting through the given syntax token
    Syntax(&'static str),
    /// Escaped text without styling tokens
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedCode {
    pub routine: HighlightRoutine,
    pub lines: Vec<Line<'static>>,
}

impl HighlightedCode {
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Maps a fence language to a highlighting routine. Unknown or empty
/// languages, disabled highlighting and syntect failures all fall back to
/// the plain routine; `highlight` never fails.
#[derive(Debug, Clone)]
pub struct CodeHighlighter {
    syntax_enabled: bool,
    appearance: Appearance,
    background: Option<Color>,
    plain_style: Style,
}

impl CodeHighlighter {
    pub fn new(theme: &Theme, syntax_enabled: bool) -> Self {
        Self {
            syntax_enabled,
            appearance: theme.appearance,
            background: theme.codeblock_bg,
            plain_style: theme.codeblock_style(),
        }
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax_enabled
    }

    pub fn highlight(&self, code: &str, language: &str) -> HighlightedCode {
        if self.syntax_enabled {
            if let Some(token) = registered_syntax_token(language) {
                match highlight_code_block(token, code, self.appearance, self.background) {
                    Some(lines) => {
                        return HighlightedCode {
                            routine: HighlightRoutine::Syntax(token),
                            lines,
                        }
                    }
                    None => debug!(language, "Highlighting failed, using plain code"),
                }
            }
        }
        HighlightedCode {
            routine: HighlightRoutine::Plain,
            lines: plain_lines(code, self.plain_style),
        }
    }
}

fn plain_lines(code: &str, style: Style) -> Vec<Line<'static>> {
    if code.is_empty() {
        return Vec::new();
    }
    sanitize_for_display(code)
        .split('\n')
        .map(|line| Line::from(vec![Span::styled(line.to_string(), style)]))
        .collect()
}
