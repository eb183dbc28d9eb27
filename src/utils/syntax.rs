use crate::core::config::Appearance;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Fence tags with a highlighting routine, mapped to the syntect token used
/// to look up the syntax. Matching is exact and case-sensitive.
const LANGUAGE_REGISTRY: &[(&str, &str)] = &[
    ("python", "py"),
    ("py", "py"),
    ("java", "java"),
    ("c", "c"),
    ("clike", "c"),
    ("bash", "sh"),
    ("sh", "sh"),
    ("shell", "sh"),
    ("javascript", "js"),
    ("js", "js"),
    ("jsx", "js"),
    ("html", "html"),
    ("markup", "html"),
    ("xml", "xml"),
    ("svg", "xml"),
    ("mathml", "xml"),
    ("css", "css"),
];

pub fn registered_syntax_token(language: &str) -> Option<&'static str> {
    LANGUAGE_REGISTRY
        .iter()
        .find(|(tag, _)| *tag == language)
        .map(|(_, token)| *token)
}

pub fn registered_languages() -> impl Iterator<Item = &'static str> {
    LANGUAGE_REGISTRY.iter().map(|(tag, _)| *tag)
}

// Simple FIFO cache (bounded) for highlighted blocks
// key = (syntax token, hash of code and styling inputs)

fn hash_code(
    token: &str,
    code: &str,
    appearance: Appearance,
    background: Option<TuiColor>,
) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    token.hash(&mut hasher);
    code.hash(&mut hasher);
    appearance.hash(&mut hasher);
    background.hash(&mut hasher);
    hasher.finish()
}

type CacheKey = (&'static str, u64);

struct SimpleCache {
    map: HashMap<CacheKey, Vec<Line<'static>>>,
    order: VecDeque<CacheKey>,
    cap: usize,
}

impl SimpleCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }
    fn get(&self, k: &CacheKey) -> Option<Vec<Line<'static>>> {
        self.map.get(k).cloned()
    }
    fn put(&mut self, k: CacheKey, v: Vec<Line<'static>>) {
        if !self.map.contains_key(&k) {
            self.order.push_back(k);
        }
        self.map.insert(k, v);
        while self.map.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            } else {
                break;
            }
        }
    }
}

const CACHE_CAPACITY: usize = 64;

static SYNTAX_CACHE: Mutex<Option<SimpleCache>> = Mutex::new(None);

fn with_cache<T>(f: impl FnOnce(&mut SimpleCache) -> T) -> T {
    let mut guard = SYNTAX_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(guard.get_or_insert_with(|| SimpleCache::new(CACHE_CAPACITY)))
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

pub(crate) fn pick_syntect_theme_name(appearance: Appearance) -> &'static str {
    match appearance {
        Appearance::Dark => "base16-ocean.dark",
        Appearance::Light => "InspiredGitHub",
    }
}

fn parse_tui_color_from_syntect(c: syntect::highlighting::Color) -> TuiColor {
    TuiColor::Rgb(c.r, c.g, c.b)
}

/// Expand tabs and drop control characters other than newline so code can be
/// printed to a terminal verbatim.
pub fn sanitize_for_display(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str("    "),
            '\n' => out.push('\n'),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Highlight `code` with the syntect syntax behind `token`. Returns `None`
/// when syntect cannot handle the input; callers fall back to plain lines.
pub fn highlight_code_block(
    token: &'static str,
    code: &str,
    appearance: Appearance,
    background: Option<TuiColor>,
) -> Option<Vec<Line<'static>>> {
    let key = (token, hash_code(token, code, appearance, background));
    if let Some(lines) = with_cache(|cache| cache.get(&key)) {
        return Some(lines);
    }

    let ps = syntax_set();
    let ts = theme_set();
    let fallback_names = ["base16-ocean.dark", "base16-ocean.light", "Solarized (light)"];
    let syn_theme = ts
        .themes
        .get(pick_syntect_theme_name(appearance))
        .or_else(|| fallback_names.iter().find_map(|name| ts.themes.get(*name)))?;
    let syntax = ps.find_syntax_by_token(token)?;

    let mut h = HighlightLines::new(syntax, syn_theme);
    let mut out: Vec<Line<'static>> = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = h.highlight_line(line, ps).ok()?;
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (style, text) in ranges {
            let frag = sanitize_for_display(text.strip_suffix('\n').unwrap_or(text));
            if frag.is_empty() {
                continue;
            }
            let mut st = Style::default().fg(parse_tui_color_from_syntect(style.foreground));
            if let Some(bg) = background {
                st = st.bg(bg);
            }
            spans.push(Span::styled(frag, st));
        }
        out.push(Line::from(spans));
    }

    with_cache(|cache| cache.put(key, out.clone()));
    Some(out)
}
