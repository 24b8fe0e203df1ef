//! Declaration-level COBOL syntax queries.
//!
//! Free functions over the token list of one data-description entry:
//! clause extraction, picture string expansion and compaction, and the
//! category predicates the classifier is built from. Only the subset of
//! data-division syntax needed for metadata is understood here; procedural
//! COBOL is never read.

use metascan_core::{ImportError, Result};

/// Keywords that may directly follow a level number in place of a data
/// name.
const KEYWORDS: &[&str] = &[
    "FILLER",
    "RENAMES",
    "REDEFINES",
    "BLANK",
    "EXTERNAL",
    "GLOBAL",
    "GROUP-USAGE",
    "JUSTIFIED",
    "JUST",
    "PICTURE",
    "PIC",
    "SIGN",
    "SYNCHRONIZED",
    "SYNC",
    "USAGE",
    "VALUE",
    "VALUES",
];

/// USAGE phrases recognized even without the USAGE keyword.
const USAGES: &[&str] = &[
    "BINARY",
    "COMP",
    "COMP-1",
    "COMP-2",
    "COMP-3",
    "COMP-4",
    "COMP-5",
    "COMPUTATIONAL",
    "COMPUTATIONAL-1",
    "COMPUTATIONAL-2",
    "COMPUTATIONAL-3",
    "COMPUTATIONAL-4",
    "COMPUTATIONAL-5",
];

/// Picture characters that merge into repetition counts when compacting.
const REPEATABLE: &[char] = &['X', 'A', '9', 'Z'];

/// Split a declaration into whitespace-delimited tokens.
pub fn tokenize(declaration: &str) -> Vec<String> {
    declaration.split_whitespace().map(str::to_string).collect()
}

fn is_keyword(token: &str) -> bool {
    KEYWORDS.contains(&token)
}

/// Level number: mandatory, always the first token. A declaration whose
/// first token is not an integer fails the whole read.
pub fn level_number(tokens: &[String]) -> Result<u32> {
    let first = tokens
        .first()
        .ok_or_else(|| ImportError::MalformedDeclaration("empty declaration".to_string()))?;
    first.parse().map_err(|_| {
        ImportError::MalformedDeclaration(format!("invalid level number \"{first}\""))
    })
}

/// Data name: the token after the level number, unless a keyword stands
/// there, in which case the entry is anonymous.
pub fn data_name(tokens: &[String]) -> &str {
    match tokens.get(1) {
        Some(token) if !is_keyword(token) => token,
        _ => "",
    }
}

/// The token after a clause keyword, skipping an optional filler word
/// such as `IS` or `ARE`.
fn clause_argument<'a>(tokens: &'a [String], idx: usize, skip: &str) -> &'a str {
    match tokens.get(idx + 1) {
        Some(token) if token == skip => tokens.get(idx + 2).map(String::as_str).unwrap_or(""),
        Some(token) => token,
        None => "",
    }
}

/// Picture character string: the token after `PIC` or `PICTURE`, skipping
/// an optional `IS`. Empty when the entry has no picture clause.
pub fn picture_string(tokens: &[String]) -> &str {
    let idx = tokens
        .iter()
        .position(|t| t == "PIC")
        .or_else(|| tokens.iter().position(|t| t == "PICTURE"));
    match idx {
        Some(idx) => clause_argument(tokens, idx, "IS"),
        None => "",
    }
}

/// USAGE phrase: the token after `USAGE` (skipping an optional `IS`), or,
/// without the keyword, the first entry of the usage vocabulary present
/// anywhere in the declaration. Empty when neither is found.
pub fn usage_phrase(tokens: &[String]) -> &str {
    if let Some(idx) = tokens.iter().position(|t| t == "USAGE") {
        return clause_argument(tokens, idx, "IS");
    }
    for usage in USAGES {
        if tokens.iter().any(|t| t == usage) {
            return usage;
        }
    }
    ""
}

/// VALUE/VALUES content: every token from the clause argument to the end
/// of the declaration, joined with single spaces. A single quoted token
/// loses its surrounding quote characters.
pub fn value(tokens: &[String]) -> String {
    let (idx, skip) = if let Some(idx) = tokens.iter().position(|t| t == "VALUE") {
        (idx, "IS")
    } else if let Some(idx) = tokens.iter().position(|t| t == "VALUES") {
        (idx, "ARE")
    } else {
        return String::new();
    };

    let mut start = idx + 1;
    if tokens.get(start).map(String::as_str) == Some(skip) {
        start += 1;
    }
    let rest = tokens.get(start..).unwrap_or(&[]);
    let joined = rest.join(" ");
    if rest.len() == 1 && joined.len() >= 2 && (joined.starts_with('\'') || joined.starts_with('"'))
    {
        return joined[1..joined.len() - 1].to_string();
    }
    joined
}

/// Expand shorthand repetition in a picture string: `99(2)V99(3)` becomes
/// `999V99999`. Malformed repetitions fail the read.
pub fn expand_picture(picture: &str) -> Result<String> {
    let mut out = String::new();
    let mut idx = 0;
    while idx < picture.len() {
        let Some(open) = picture[idx..].find('(').map(|i| i + idx) else {
            out.push_str(&picture[idx..]);
            return Ok(out);
        };
        let close = picture[idx..]
            .find(')')
            .map(|i| i + idx)
            .filter(|&close| close > open)
            .ok_or_else(|| invalid_picture(picture))?;
        // The repeated character must sit inside the current segment.
        if open == 0 || open == idx {
            return Err(invalid_picture(picture));
        }
        let repeated = picture[..open]
            .chars()
            .next_back()
            .ok_or_else(|| invalid_picture(picture))?;
        let count: usize = picture[open + 1..close]
            .parse()
            .map_err(|_| invalid_picture(picture))?;
        out.push_str(&picture[idx..open - 1]);
        for _ in 0..count {
            out.push(repeated);
        }
        idx = close + 1;
    }
    Ok(out)
}

fn invalid_picture(picture: &str) -> ImportError {
    ImportError::MalformedDeclaration(format!("invalid picture string \"{picture}\""))
}

/// Compact an expanded picture string, the inverse of [`expand_picture`]:
/// `999ZZZ` becomes `9(3)Z(3)`. Only used for diagnostics.
pub fn compact_picture(expanded: &str) -> String {
    let mut out = String::new();
    let mut chars = expanded.chars();
    let Some(mut prev) = chars.next() else {
        return out;
    };
    let mut count = 1usize;
    // A trailing sentinel flushes the final run.
    for ch in chars.chain(std::iter::once(' ')) {
        if is_repeatable(prev) && prev == ch {
            count += 1;
            continue;
        }
        if count > 1 {
            out.push(prev);
            out.push('(');
            out.push_str(&count.to_string());
            out.push(')');
        } else {
            out.push(prev);
        }
        count = 1;
        prev = ch;
    }
    out
}

fn is_repeatable(ch: char) -> bool {
    REPEATABLE.contains(&ch)
}

/// Numeric or numeric-edited (sign and zero-suppression subset only): an
/// optional leading sign, one or more of `0 Z 9 . V`, an optional trailing
/// sign. Must be called on an expanded picture string.
pub fn is_numeric_plus(picture: &str) -> bool {
    let upper = picture.to_uppercase();
    let mut body = upper.as_str();
    if let Some(rest) = body.strip_prefix(['S', '+', '-']) {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix(['+', '-']) {
        body = rest;
    }
    !body.is_empty() && body.chars().all(|c| matches!(c, '0' | 'Z' | '9' | '.' | 'V'))
}

/// Alphabetic: `A` characters only. Must be called on an expanded picture
/// string.
pub fn is_alphabetic(picture: &str) -> bool {
    !picture.is_empty() && picture.to_uppercase().chars().all(|c| c == 'A')
}

/// Alphanumeric or alphanumeric-edited. Must be called on an expanded
/// picture string.
pub fn is_alphanumeric_plus(picture: &str) -> bool {
    is_alphanumeric(picture) || is_alphanumeric_edited(picture)
}

/// Alphanumeric: `A`, `X`, `9` characters with at least one `X`. Must be
/// called on an expanded picture string.
pub fn is_alphanumeric(picture: &str) -> bool {
    let upper = picture.to_uppercase();
    upper.chars().all(|c| matches!(c, 'A' | 'X' | '9')) && upper.contains('X')
}

/// Alphanumeric-edited: `A`, `X`, `9` plus the editing characters `B`,
/// `0`, `/`, with an alphabetic/alphanumeric symbol and an editing symbol
/// separated only by `9`s somewhere in the string. Must be called on an
/// expanded picture string.
pub fn is_alphanumeric_edited(picture: &str) -> bool {
    let upper = picture.to_uppercase();
    if upper.is_empty()
        || !upper
            .chars()
            .all(|c| matches!(c, 'A' | 'X' | '9' | '0' | 'B' | '/'))
    {
        return false;
    }
    let mut last_non_nine: Option<char> = None;
    for ch in upper.chars() {
        if ch == '9' {
            continue;
        }
        if let Some(prev) = last_non_nine {
            if (is_alpha_symbol(prev) && is_edit_symbol(ch))
                || (is_edit_symbol(prev) && is_alpha_symbol(ch))
            {
                return true;
            }
        }
        last_non_nine = Some(ch);
    }
    false
}

fn is_alpha_symbol(ch: char) -> bool {
    matches!(ch, 'A' | 'X')
}

fn is_edit_symbol(ch: char) -> bool {
    matches!(ch, 'B' | '0' | '/')
}

/// COMP-1 internal floating point, determined by usage alone.
pub fn is_float4(usage: &str) -> bool {
    usage == "COMP-1" || usage == "COMPUTATIONAL-1"
}

/// COMP-2 internal floating point, determined by usage alone.
pub fn is_float8(usage: &str) -> bool {
    usage == "COMP-2" || usage == "COMPUTATIONAL-2"
}

/// True when a numeric picture carries a sign indicator anywhere. Must be
/// called on an expanded picture string that satisfies
/// [`is_numeric_plus`].
pub fn is_signed(picture: &str) -> bool {
    picture.chars().any(|c| matches!(c, 'S' | '+' | '-'))
}

/// Strip the sign indicator: the leading `S`/`+`/`-` when present,
/// otherwise the trailing one.
fn strip_sign(picture: &str) -> &str {
    if let Some(rest) = picture.strip_prefix(['S', '+', '-']) {
        rest
    } else if picture.ends_with(['+', '-']) {
        &picture[..picture.len() - 1]
    } else {
        picture
    }
}

/// Position of the decimal point: an explicit `.` wins over an implied
/// `V`.
fn decimal_position(picture: &str) -> Option<usize> {
    picture.find('.').or_else(|| picture.find('V'))
}

/// Digits to the left of the decimal point of an expanded numeric
/// picture; the whole string when it carries no decimal point.
pub fn characteristic_digits(picture: &str) -> usize {
    let body = if is_signed(picture) {
        strip_sign(picture)
    } else {
        picture
    };
    match decimal_position(body) {
        Some(pos) => pos,
        None => body.len(),
    }
}

/// Digits to the right of the decimal point of an expanded numeric
/// picture; zero when it carries no decimal point.
pub fn mantissa_digits(picture: &str) -> usize {
    let body = if is_signed(picture) {
        strip_sign(picture)
    } else {
        picture
    };
    match decimal_position(body) {
        Some(pos) => body.len() - pos - 1,
        None => 0,
    }
}
