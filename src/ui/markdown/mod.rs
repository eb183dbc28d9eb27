//! Message formatting: fenced code blocks and `**bold**` runs.
//!
//! Raw text is cut into precursors by [`tokenizer`], text precursors are
//! partitioned by [`emphasis`], and code precursors go through the
//! [`CodeHighlighter`]. Segments are rebuilt on every render and never cached.

mod code;
pub mod emphasis;
mod render;
pub mod tokenizer;

#[cfg(test)]
mod tests;

pub use code::{CodeHighlighter, HighlightRoutine, HighlightedCode};
pub use emphasis::{apply_emphasis, EmphasisRun};
pub use render::{render_message, render_segments, MessageRenderConfig};
pub use tokenizer::{tokenize, CodePrecursor, Precursor, PrecursorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Text {
        runs: Vec<EmphasisRun<'a>>,
    },
    Code {
        language: &'a str,
        code: &'a str,
        highlighted: HighlightedCode,
    },
}

impl Segment<'_> {
    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code { .. })
    }
}

/// Tokenize `raw` and format every precursor: emphasis for text, the
/// highlighter for code.
pub fn build_segments<'a>(raw: &'a str, highlighter: &CodeHighlighter) -> Vec<Segment<'a>> {
    tokenize(raw)
        .into_iter()
        .map(|precursor| match precursor {
            Precursor::Text(text) => Segment::Text {
                runs: apply_emphasis(text),
            },
            Precursor::Code(block) => {
                let language = block.language();
                let code = block.code();
                Segment::Code {
                    language,
                    code,
                    highlighted: highlighter.highlight(code, language),
                }
            }
        })
        .collect()
}
