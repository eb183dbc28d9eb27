use crate::core::message::Message;
use crate::ui::markdown::{render_message, MessageRenderConfig};
use crate::ui::theme::Theme;
use ratatui::text::Line;

pub fn render_for_test(message: &Message, syntax_enabled: bool) -> Vec<Line<'static>> {
    render_message(
        message,
        &Theme::dark_default(),
        MessageRenderConfig::new(syntax_enabled).with_role_prefix(false),
    )
}

pub fn line_texts(lines: &[Line<'static>]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}
