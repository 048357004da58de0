//! Comment blanking
//!
//! Replaces `//` and `/* */` comments with spaces so that directive matching
//! never sees commented-out code. Newlines are kept and no byte is ever
//! inserted or removed, so every offset stays valid for the original buffer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    LineComment,
    BlockComment,
    Str,
    Char,
    RawStr,
}

/// Return a copy of `code` with every comment byte replaced by a space
pub fn strip_comments(code: &[u8]) -> Vec<u8> {
    let mut out = code.to_vec();
    let mut state = State::Normal;
    let mut raw_terminator: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < out.len() {
        let c = out[i];
        let next = out.get(i + 1).copied();
        match state {
            State::Normal => match (c, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                (b'R', Some(b'"')) if starts_raw_string(&out, i) => {
                    if let Some(open) = out[i + 2..].iter().position(|&b| b == b'(') {
                        let delimiter = &out[i + 2..i + 2 + open];
                        raw_terminator.clear();
                        raw_terminator.push(b')');
                        raw_terminator.extend_from_slice(delimiter);
                        raw_terminator.push(b'"');
                        state = State::RawStr;
                        i += 2 + open;
                    }
                }
                (b'"', _) => state = State::Str,
                (b'\'', _) if !is_digit_separator(&out, i) => state = State::Char,
                _ => {}
            },
            State::LineComment => {
                if c == b'\n' {
                    state = State::Normal;
                } else {
                    out[i] = b' ';
                }
            }
            State::BlockComment => {
                if c == b'*' && next == Some(b'/') {
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                    state = State::Normal;
                } else if c != b'\n' {
                    out[i] = b' ';
                }
            }
            State::Str | State::Char => {
                let quote = if state == State::Str { b'"' } else { b'\'' };
                if c == b'\\' {
                    i += 1;
                } else if c == quote || c == b'\n' {
                    state = State::Normal;
                }
            }
            State::RawStr => {
                if out[i..].starts_with(&raw_terminator) {
                    i += raw_terminator.len() - 1;
                    state = State::Normal;
                }
            }
        }
        i += 1;
    }

    out
}

/// `R"` opens a raw string only when the `R` is not the tail of an identifier
/// (prefixes `u8R`, `uR`, `UR`, `LR` are allowed).
fn starts_raw_string(code: &[u8], at: usize) -> bool {
    let prefix_start = code[..at]
        .iter()
        .rposition(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .map(|p| p + 1)
        .unwrap_or(0);
    matches!(&code[prefix_start..at], b"" | b"u8" | b"u" | b"U" | b"L")
}

/// `1'000'000` uses `'` as a digit separator
fn is_digit_separator(code: &[u8], at: usize) -> bool {
    at > 0 && code[at - 1].is_ascii_hexdigit() && !starts_char_prefix(code, at)
}

fn starts_char_prefix(code: &[u8], at: usize) -> bool {
    // u8'x' is the only char literal prefix ending in a hex digit
    at >= 2 && &code[at - 2..at] == b"u8" && (at == 2 || !code[at - 3].is_ascii_alphanumeric())
}
