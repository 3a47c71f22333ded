//! PGN movetext scanning
//!
//! Only what recorded openings need: the first game's mainline SAN tokens and
//! the `Color` tag. Tag pairs, `{}` and `;` comments, `(...)` variations, NAGs,
//! move numbers, annotation glyphs and the result token are dropped.

use shakmaty::Color;

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// SAN tokens of the first game's mainline, in order
pub fn mainline_tokens(pgn_text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = pgn_text.chars().peekable();
    let mut variation_depth = 0usize;
    let mut seen_movetext = false;

    while let Some(c) = chars.next() {
        match c {
            '[' if variation_depth == 0 => {
                // A tag section after movetext starts the next game
                if seen_movetext {
                    break;
                }
                for t in chars.by_ref() {
                    if t == ']' {
                        break;
                    }
                }
            }
            '{' => {
                flush(&mut current, &mut tokens, variation_depth, &mut seen_movetext);
                for t in chars.by_ref() {
                    if t == '}' {
                        break;
                    }
                }
            }
            ';' => {
                flush(&mut current, &mut tokens, variation_depth, &mut seen_movetext);
                for t in chars.by_ref() {
                    if t == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                flush(&mut current, &mut tokens, variation_depth, &mut seen_movetext);
                variation_depth += 1;
            }
            ')' => {
                flush(&mut current, &mut tokens, variation_depth, &mut seen_movetext);
                variation_depth = variation_depth.saturating_sub(1);
            }
            c if c.is_whitespace() => {
                flush(&mut current, &mut tokens, variation_depth, &mut seen_movetext);
            }
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens, variation_depth, &mut seen_movetext);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>, depth: usize, seen: &mut bool) {
    if current.is_empty() {
        return;
    }
    let raw = std::mem::take(current);
    *seen = true;
    if depth > 0 {
        return;
    }
    if let Some(san) = clean_token(&raw) {
        tokens.push(san);
    }
}

/// Strip move numbers and annotation glyphs; `None` for non-move tokens
fn clean_token(raw: &str) -> Option<String> {
    if RESULTS.contains(&raw) || raw.starts_with('$') {
        return None;
    }

    // "12." "12..." and the glued form "12.Nf3"
    let without_number = raw.trim_start_matches(|c: char| c.is_ascii_digit());
    let body = if without_number.len() < raw.len() && without_number.starts_with('.') {
        without_number.trim_start_matches('.')
    } else {
        raw
    };

    let san = body.trim_end_matches(['!', '?']);
    if san.is_empty() || san == "--" {
        None
    } else {
        Some(san.to_string())
    }
}

/// Side a recorded opening is meant to be played by
///
/// A `[Color "Black"]` tag (any case) marks a Black repertoire; everything else
/// is treated as White.
pub fn recorded_color(pgn_text: &str) -> Color {
    let lowered = pgn_text.to_ascii_lowercase();
    if lowered.contains("[color \"black\"]") {
        Color::Black
    } else {
        Color::White
    }
}
