//! Bold emphasis for text segments: `**...**` pairs on a single line.

use memchr::memmem;

const MARKER: &[u8] = b"**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmphasisRun<'a> {
    pub text: &'a str,
    pub emphasized: bool,
}

impl<'a> EmphasisRun<'a> {
    pub fn plain(text: &'a str) -> Self {
        Self {
            text,
            emphasized: false,
        }
    }

    pub fn bold(text: &'a str) -> Self {
        Self {
            text,
            emphasized: true,
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Partition `text` into alternating plain and emphasized runs. A pair is the
/// nearest closing `**` on the same line; the inner run may be empty. Markers
/// without a partner stay in the plain text. Empty plain runs are dropped, so
/// text without any pair comes back as exactly one plain run.
pub fn apply_emphasis(text: &str) -> Vec<EmphasisRun<'_>> {
    let bytes = text.as_bytes();
    let finder = memmem::Finder::new(MARKER);
    let mut runs = Vec::new();
    let mut plain_start = 0;
    let mut search = 0;

    while let Some(found) = finder.find(&bytes[search..]) {
        let open = search + found;
        let inner_start = open + MARKER.len();
        let line_end = text[inner_start..]
            .find(is_line_terminator)
            .map_or(text.len(), |offset| inner_start + offset);

        match finder.find(&bytes[inner_start..line_end]) {
            Some(close) => {
                let inner_end = inner_start + close;
                if open > plain_start {
                    runs.push(EmphasisRun::plain(&text[plain_start..open]));
                }
                runs.push(EmphasisRun::bold(&text[inner_start..inner_end]));
                plain_start = inner_end + MARKER.len();
                search = plain_start;
            }
            // No `**` remains before the line break, so no opener on this
            // line can be closed.
            None => search = line_end.max(open + 1),
        }
    }

    if plain_start < text.len() || runs.is_empty() {
        runs.push(EmphasisRun::plain(&text[plain_start..]));
    }
    runs
}
