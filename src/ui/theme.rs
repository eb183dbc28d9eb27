use crate::core::config::Appearance;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub appearance: Appearance,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub emphasis_style: Style,
    pub notice_style: Style,

    // Code blocks
    pub codeblock_label_style: Style,
    pub codeblock_text_style: Style,
    pub codeblock_bg: Option<Color>,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            appearance: Appearance::Dark,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            emphasis_style: Style::default().add_modifier(Modifier::BOLD),
            notice_style: Style::default().fg(Color::DarkGray),
            codeblock_label_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            codeblock_text_style: Style::default().fg(Color::Rgb(205, 205, 205)),
            codeblock_bg: Some(Color::Rgb(45, 45, 45)),
        }
    }

    pub fn light() -> Self {
        Theme {
            appearance: Appearance::Light,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            emphasis_style: Style::default().add_modifier(Modifier::BOLD),
            notice_style: Style::default().fg(Color::Gray),
            codeblock_label_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            codeblock_text_style: Style::default().fg(Color::Rgb(40, 40, 40)),
            codeblock_bg: Some(Color::Rgb(240, 240, 240)),
        }
    }

    /// Colorless theme for output that is not a terminal.
    pub fn monochrome() -> Self {
        Theme {
            appearance: Appearance::Dark,
            user_prefix_style: Style::default(),
            user_text_style: Style::default(),
            assistant_prefix_style: Style::default(),
            assistant_text_style: Style::default(),
            emphasis_style: Style::default(),
            notice_style: Style::default(),
            codeblock_label_style: Style::default(),
            codeblock_text_style: Style::default(),
            codeblock_bg: None,
        }
    }

    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self::dark_default(),
            Appearance::Light => Self::light(),
        }
    }

    /// Style for plain code lines, background included.
    pub fn codeblock_style(&self) -> Style {
        match self.codeblock_bg {
            Some(bg) => self.codeblock_text_style.bg(bg),
            None => self.codeblock_text_style,
        }
    }
}
