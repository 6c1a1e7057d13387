use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Terminal columns occupied by `s`.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_width` columns, ending in `…` when anything was dropped.
///
/// Borrows when `s` already fits.
///
/// ```
/// use feedgrid::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("short", 10), "short");
/// assert_eq!(truncate_to_width("hello world", 6), "hello…");
/// assert_eq!(truncate_to_width("abc", 0), "");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Drop terminal control characters and escape sequences from remote text.
///
/// Newlines and tabs survive; everything else below 0x20, DEL, and
/// `ESC [`/`ESC ]` sequences are removed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let dirty = |c: char| c == '\x7f' || (c.is_ascii_control() && c != '\n' && c != '\t');
    if !s.chars().any(dirty) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !dirty(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            // CSI: parameters until a final byte in '@'..='~'
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: until BEL or ESC '\'
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Greedy word wrap to `width` columns, producing at most `max_lines` lines.
///
/// Words wider than a line are hard-split. When text remains after the last
/// line, that line is truncated with `…`.
pub fn wrap_to_width(s: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut overflow = false;

    'words: for word in s.split_whitespace() {
        let mut word = word;
        loop {
            let word_width = display_width(word);
            let sep = usize::from(current_width > 0);
            if current_width + sep + word_width <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += sep + word_width;
                break;
            }
            if current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
                if lines.len() == max_lines {
                    overflow = true;
                    break 'words;
                }
                continue;
            }
            // Word alone is too wide: hard-split at the column limit
            let split = split_at_width(word, width);
            lines.push(word[..split].to_string());
            word = &word[split..];
            if lines.len() == max_lines {
                overflow = !word.is_empty();
                break 'words;
            }
            if word.is_empty() {
                break;
            }
        }
    }

    if !current.is_empty() {
        if lines.len() < max_lines {
            lines.push(current);
        } else {
            overflow = true;
        }
    }
    if overflow {
        if let Some(last) = lines.last_mut() {
            let cut = truncate_to_width(last, width.saturating_sub(1)).into_owned();
            *last = format!("{}{ELLIPSIS}", cut.trim_end_matches(ELLIPSIS));
        }
    }
    lines
}

fn split_at_width(s: &str, width: usize) -> usize {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            return idx.max(c.len_utf8().min(s.len()));
        }
        used += w;
    }
    s.len()
}
