//! Splits raw message text into text and fenced-code precursors.
//!
//! An opener is three backticks, an optional tag of ASCII word characters and
//! a newline. The body runs to the first following triple backtick. A fence
//! without a closer is not a code block; it stays in the surrounding text.

use memchr::memmem;

const FENCE: &[u8] = b"```";
const DEFAULT_LANGUAGE: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecursorKind {
    Text,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePrecursor<'a> {
    /// Tag written after the opening fence, if any.
    pub tag: Option<&'a str>,
    /// Everything between the opener's newline and the closing fence.
    pub body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precursor<'a> {
    Text(&'a str),
    Code(CodePrecursor<'a>),
}

impl<'a> CodePrecursor<'a> {
    /// The fence tag, or `"text"` for an untagged fence.
    pub fn language(&self) -> &'a str {
        self.tag.unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Body with surrounding whitespace removed. NEL (U+0085) is kept and
    /// the byte order mark is stripped.
    pub fn code(&self) -> &'a str {
        self.body
            .trim_matches(|c: char| (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}')
    }
}

impl<'a> Precursor<'a> {
    pub fn kind(&self) -> PrecursorKind {
        match self {
            Precursor::Text(_) => PrecursorKind::Text,
            Precursor::Code(_) => PrecursorKind::Code,
        }
    }

    /// Text verbatim, or the trimmed code of a code block.
    pub fn content(&self) -> &'a str {
        match self {
            Precursor::Text(text) => *text,
            Precursor::Code(code) => code.code(),
        }
    }

    pub fn language(&self) -> Option<&'a str> {
        match self {
            Precursor::Text(_) => None,
            Precursor::Code(code) => Some(code.language()),
        }
    }

    /// The exact source slice this precursor was cut from, fences included.
    pub fn source(&self) -> String {
        match self {
            Precursor::Text(text) => (*text).to_string(),
            Precursor::Code(code) => {
                format!("```{}\n{}```", code.tag.unwrap_or(""), code.body)
            }
        }
    }
}

/// Tokenize `raw` in a single left-to-right pass. Empty text runs are never
/// emitted.
pub fn tokenize(raw: &str) -> Vec<Precursor<'_>> {
    let bytes = raw.as_bytes();
    let finder = memmem::Finder::new(FENCE);
    let mut out = Vec::new();
    let mut emitted = 0;
    let mut search = 0;

    while let Some(found) = finder.find(&bytes[search..]) {
        let start = search + found;
        let Some((tag, body_start)) = parse_opener(bytes, start) else {
            search = start + 1;
            continue;
        };
        let Some(close) = finder.find(&bytes[body_start..]) else {
            // Any later opener starts past this body and cannot close either
            break;
        };
        let body_end = body_start + close;

        push_text(&mut out, &raw[emitted..start]);
        out.push(Precursor::Code(CodePrecursor {
            tag: tag.map(|range| &raw[range.0..range.1]),
            body: &raw[body_start..body_end],
        }));
        emitted = body_end + FENCE.len();
        search = emitted;
    }

    push_text(&mut out, &raw[emitted..]);
    out
}

/// Reassemble the input from its precursors.
pub fn reassemble(precursors: &[Precursor<'_>]) -> String {
    precursors.iter().map(Precursor::source).collect()
}

fn push_text<'a>(out: &mut Vec<Precursor<'a>>, text: &'a str) {
    if !text.is_empty() {
        out.push(Precursor::Text(text));
    }
}

/// Returns the tag byte range (if any) and the body start for an opener at
/// `start`.
fn parse_opener(bytes: &[u8], start: usize) -> Option<(Option<(usize, usize)>, usize)> {
    let tag_start = start + FENCE.len();
    let tag_len = bytes[tag_start..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    let newline = tag_start + tag_len;
    if bytes.get(newline) != Some(&b'\n') {
        return None;
    }
    let tag = (tag_len > 0).then_some((tag_start, newline));
    Some((tag, newline + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    type Summary<'a> = Vec<(PrecursorKind, Option<&'a str>, &'a str)>;

    fn summary<'a>(precursors: &[Precursor<'a>]) -> Summary<'a> {
        precursors
            .iter()
            .map(|p| (p.kind(), p.language(), p.content()))
            .collect()
    }

    #[test]
    fn plain_text_is_a_single_precursor() {
        let out = tokenize("Here is **bold** text");
        assert_eq!(out, [Precursor::Text("Here is **bold** text")]);
    }

    #[test]
    fn empty_input_has_no_precursors() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn code_block_splits_surrounding_text() {
        let out = tokenize("Before\n```python\nprint(1)\n```\nAfter");
        assert_eq!(
            summary(&out),
            [
                (PrecursorKind::Text, None, "Before\n"),
                (PrecursorKind::Code, Some("python"), "print(1)"),
                (PrecursorKind::Text, None, "\nAfter"),
            ]
        );
    }

    #[test]
    fn untagged_fence_defaults_to_text() {
        let out = tokenize("```\n  x = 1  \n```");
        assert_eq!(summary(&out), [(PrecursorKind::Code, Some("text"), "x = 1")]);
        match out[0] {
            Precursor::Code(code) => assert_eq!(code.tag, None),
            _ => unreachable!(),
        }
    }

    #[test]
    fn adjacent_blocks_emit_no_empty_text() {
        let out = tokenize("```a\n1``````b\n2```");
        assert_eq!(
            summary(&out),
            [
                (PrecursorKind::Code, Some("a"), "1"),
                (PrecursorKind::Code, Some("b"), "2"),
            ]
        );
    }

    #[test]
    fn unterminated_fence_stays_literal() {
        let raw = "Look:\n```rust\nfn main() {}\n";
        assert_eq!(tokenize(raw), [Precursor::Text(raw)]);
    }

    #[test]
    fn unterminated_fence_after_a_block_is_kept() {
        let raw = "```sh\nls\n```\nthen ```js\nalert(1)";
        let out = tokenize(raw);
        assert_eq!(
            summary(&out),
            [
                (PrecursorKind::Code, Some("sh"), "ls"),
                (PrecursorKind::Text, None, "\nthen ```js\nalert(1)"),
            ]
        );
    }

    #[test]
    fn opener_requires_newline_right_after_tag() {
        // A space after the tag disqualifies the first fence; the closing
        // fence then opens nothing because no newline follows it.
        let raw = "```python x\nprint(1)\n```";
        assert_eq!(tokenize(raw), [Precursor::Text(raw)]);

        let crlf = "```py\r\nx\r\n```";
        assert_eq!(tokenize(crlf), [Precursor::Text(crlf)]);
    }

    #[test]
    fn later_backtick_can_start_an_opener() {
        // Four backticks: the fence starts at the second one.
        let out = tokenize("````\ncode```");
        assert_eq!(
            summary(&out),
            [
                (PrecursorKind::Text, None, "`"),
                (PrecursorKind::Code, Some("text"), "code"),
            ]
        );
    }

    #[test]
    fn non_word_tags_are_not_openers() {
        let raw = "```c++\nint x;\n```";
        let out = tokenize(raw);
        assert_eq!(out, [Precursor::Text(raw)]);
    }

    #[test]
    fn body_stops_at_first_closer_and_may_be_empty() {
        let out = tokenize("```\n```tail");
        assert_eq!(
            summary(&out),
            [
                (PrecursorKind::Code, Some("text"), ""),
                (PrecursorKind::Text, None, "tail"),
            ]
        );
    }

    #[test]
    fn emphasis_markers_inside_code_are_untouched() {
        let out = tokenize("```py\nx = a ** b ** c\n```");
        assert_eq!(out[0].content(), "x = a ** b ** c");
    }

    #[test]
    fn reassembly_reproduces_input() {
        let samples = [
            "",
            "no fences at all",
            "Before\n```python\nprint(1)\n```\nAfter",
            "```\n\n  padded  \n\n```",
            "a```x\n1```b```y\n2```c",
            "````\ncode```",
            "multi\n```js\nlet a = `tpl`;\n```\nand ```unclosed\nrest",
            "unicode ✓ ```rs\nlet s = \"é\";\n``` fin ✓",
        ];
        for raw in samples {
            assert_eq!(reassemble(&tokenize(raw)), raw, "round trip of {raw:?}");
        }
    }

    #[test]
    fn code_trim_keeps_next_line_character() {
        let block = CodePrecursor {
            tag: None,
            body: "\u{feff} \u{85}x\u{85}\u{a0}\n",
        };
        assert_eq!(block.code(), "\u{85}x\u{85}");
    }
}
