use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub(crate) fn extract_emojis(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < text.len() {
        let rest = &text[idx..];
        if let Some(m) = emoji_re().find(rest) {
            if m.start() == 0 {
                // Greedy match at the cursor keeps ZWJ and skin-tone sequences whole.
                out.push(m.as_str().to_string());
                idx += m.end();
                continue;
            }
        }
        idx += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
    }
    out
}

/// Words of a message in order, with URLs removed. Case is preserved so the
/// scorer can detect ALL-CAPS emphasis.
pub(crate) fn word_tokens(text: &str) -> Vec<String> {
    let cleaned = url_re().replace_all(text, " ");
    cleaned
        .unicode_words()
        .map(|w| w.replace('\u{2019}', "'"))
        .collect()
}

/// Splits a space-joined suggestion string back into glyphs.
pub(crate) fn split_glyphs(joined: &str) -> Vec<String> {
    joined.split_whitespace().map(str::to_string).collect()
}

pub(crate) fn join_glyphs(glyphs: &[String]) -> String {
    glyphs.join(" ")
}

pub(crate) fn is_shouted(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

fn emoji_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        // Flags, base emoji with optional skin tone / variation selector, and ZWJ chains.
        Regex::new(
            r"(?x)
            [\u{1F1E6}-\u{1F1FF}]{2}
            |
            (?:
                [\u{1F300}-\u{1FAFF}\u{2600}-\u{27BF}\u{2300}-\u{23FF}\u{2B50}-\u{2B55}\u{203C}\u{2049}\u{2764}]
                [\u{1F3FB}-\u{1F3FF}]?
                \u{FE0F}?
                (?:\u{200D}
                    [\u{1F300}-\u{1FAFF}\u{2600}-\u{27BF}\u{2640}\u{2642}\u{2695}\u{2696}\u{2708}\u{2764}]
                    [\u{1F3FB}-\u{1F3FF}]?
                    \u{FE0F}?
                )*
            )
            ",
        )
        .expect("emoji regex")
    })
}

fn url_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.[^\s]+").expect("url regex"))
}
