use super::{build_segments, CodeHighlighter, EmphasisRun, Segment};
use crate::core::message::Message;
use crate::ui::theme::Theme;
use crate::utils::syntax::sanitize_for_display;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

pub const USER_PREFIX: &str = "You: ";
pub const ASSISTANT_PREFIX: &str = "Mint: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRenderConfig {
    pub syntax_enabled: bool,
    pub role_prefix: bool,
}

impl MessageRenderConfig {
    pub fn new(syntax_enabled: bool) -> Self {
        Self {
            syntax_enabled,
            role_prefix: true,
        }
    }

    pub fn with_role_prefix(mut self, role_prefix: bool) -> Self {
        self.role_prefix = role_prefix;
        self
    }
}

/// Render one transcript message into styled lines.
pub fn render_message(
    message: &Message,
    theme: &Theme,
    config: MessageRenderConfig,
) -> Vec<Line<'static>> {
    let highlighter = CodeHighlighter::new(theme, config.syntax_enabled);
    let segments = build_segments(&message.content, &highlighter);
    let (prefix, prefix_style, text_style) = if message.is_user() {
        (USER_PREFIX, theme.user_prefix_style, theme.user_text_style)
    } else {
        (
            ASSISTANT_PREFIX,
            theme.assistant_prefix_style,
            theme.assistant_text_style,
        )
    };

    let mut lines = render_segments(&segments, theme, text_style);
    if config.role_prefix {
        let prefix_span = Span::styled(prefix, prefix_style);
        match lines.first_mut() {
            // A code block label gets its own prefix line
            Some(first) if !segments.first().is_some_and(Segment::is_code) => {
                first.spans.insert(0, prefix_span);
            }
            _ => lines.insert(0, Line::from(vec![prefix_span])),
        }
    }
    lines
}

/// Lay segments out line by line. The newline that separates a fence from
/// the neighbouring prose does not produce a blank line.
pub fn render_segments(
    segments: &[Segment<'_>],
    theme: &Theme,
    text_style: Style,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Text { runs } => {
                let mut text = text_lines(runs, theme, text_style);
                let after_code = index > 0 && segments[index - 1].is_code();
                let before_code = segments.get(index + 1).is_some_and(Segment::is_code);
                if before_code
                    && text.len() > 1
                    && text.last().is_some_and(|l| l.spans.is_empty())
                {
                    text.pop();
                }
                if after_code && text.len() > 1 && text[0].spans.is_empty() {
                    text.remove(0);
                }
                lines.extend(text);
            }
            Segment::Code {
                language,
                highlighted,
                ..
            } => {
                lines.push(Line::from(vec![Span::styled(
                    format!(" {language} "),
                    theme.codeblock_label_style,
                )]));
                lines.extend(highlighted.lines.iter().cloned());
            }
        }
    }
    lines
}

fn text_lines(runs: &[EmphasisRun<'_>], theme: &Theme, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    for run in runs {
        let style = if run.emphasized {
            base.patch(theme.emphasis_style)
        } else {
            base
        };
        let cleaned = sanitize_for_display(run.text);
        for (i, part) in cleaned.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}
