//! Writes styled lines to a plain terminal stream using ANSI escapes.

use ratatui::crossterm::queue;
use ratatui::crossterm::style::{
    Attribute, Color as CtColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use std::io::{self, Write};

fn to_crossterm_color(color: Color) -> CtColor {
    match color {
        Color::Reset => CtColor::Reset,
        Color::Black => CtColor::Black,
        Color::Red => CtColor::DarkRed,
        Color::Green => CtColor::DarkGreen,
        Color::Yellow => CtColor::DarkYellow,
        Color::Blue => CtColor::DarkBlue,
        Color::Magenta => CtColor::DarkMagenta,
        Color::Cyan => CtColor::DarkCyan,
        Color::Gray => CtColor::Grey,
        Color::DarkGray => CtColor::DarkGrey,
        Color::LightRed => CtColor::Red,
        Color::LightGreen => CtColor::Green,
        Color::LightYellow => CtColor::Yellow,
        Color::LightBlue => CtColor::Blue,
        Color::LightMagenta => CtColor::Magenta,
        Color::LightCyan => CtColor::Cyan,
        Color::White => CtColor::White,
        Color::Rgb(r, g, b) => CtColor::Rgb { r, g, b },
        Color::Indexed(i) => CtColor::AnsiValue(i),
    }
}

fn apply_style<W: Write>(out: &mut W, style: Style) -> io::Result<()> {
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(to_crossterm_color(fg)))?;
    }
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(to_crossterm_color(bg)))?;
    }
    let modifiers = style.add_modifier;
    if modifiers.contains(Modifier::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if modifiers.contains(Modifier::ITALIC) {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if modifiers.contains(Modifier::UNDERLINED) {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if modifiers.contains(Modifier::DIM) {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

/// Print `lines`, styled when `color` is set and as plain text otherwise.
pub fn write_lines<W: Write>(out: &mut W, lines: &[Line<'_>], color: bool) -> io::Result<()> {
    for line in lines {
        if color {
            for span in &line.spans {
                let style = line.style.patch(span.style);
                apply_style(out, style)?;
                queue!(
                    out,
                    Print(span.content.as_ref()),
                    SetAttribute(Attribute::Reset),
                    ResetColor
                )?;
            }
            writeln!(out)?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;

    #[test]
    fn plain_output_has_no_escapes() {
        let lines = vec![
            Line::from(vec![Span::raw("a"), Span::styled("b", Style::default().fg(Color::Red))]),
            Line::from(""),
        ];
        let mut buf = Vec::new();
        write_lines(&mut buf, &lines, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "ab\n\n");
    }

    #[test]
    fn colored_output_wraps_spans_in_escapes() {
        let lines = vec![Line::from(vec![Span::styled(
            "x",
            Style::default().fg(Color::Rgb(1, 2, 3)).add_modifier(Modifier::BOLD),
        )])];
        let mut buf = Vec::new();
        write_lines(&mut buf, &lines, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\u{1b}[38;2;1;2;3m"));
        assert!(text.contains("\u{1b}[1m"));
        assert!(text.contains('x'));
        assert!(text.ends_with('\n'));
    }
}
