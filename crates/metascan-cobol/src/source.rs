//! Fixed-format copybook source handling.
//!
//! Layout of a fixed-format line:
//! - Columns 1-6: sequence number area (ignored)
//! - Column 7: indicator area (`*` or `/` comment, `-` continuation)
//! - Columns 8-72: code
//! - Columns 73+: identification area (ignored)

use std::io::BufRead;

use metascan_core::{ImportError, Result};

/// Number of columns before the code area (sequence area plus indicator).
const CODE_AREA_START: usize = 7;

/// Rightmost column of the code area (1-based, inclusive).
const CODE_AREA_END: usize = 72;

/// Column-7 indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Normal code line (space or any other character).
    Normal,
    /// Comment line (`*` or `/`).
    Comment,
    /// Continuation line (`-`).
    Continuation,
}

impl Indicator {
    /// Parse an indicator character.
    pub fn from_char(ch: char) -> Self {
        match ch {
            '*' | '/' => Indicator::Comment,
            '-' => Indicator::Continuation,
            _ => Indicator::Normal,
        }
    }
}

/// True when the line is a comment: `*` or `/` in column 7. Lines too
/// short to carry an indicator read as comments as well.
pub fn is_comment(line: &str) -> bool {
    match line.chars().nth(CODE_AREA_START - 1) {
        Some(ch) => Indicator::from_char(ch) == Indicator::Comment,
        None => true,
    }
}

/// True when the next physical line carries the continuation marker.
pub fn is_continuation(line: &str) -> bool {
    line.chars().nth(CODE_AREA_START - 1) == Some('-')
}

/// True when the sentence is continued on the next line: a declaration is
/// complete only once it ends with a period.
pub fn is_continued(text: &str) -> bool {
    !text.trim_end().ends_with('.')
}

/// The code area of a physical line: columns 8-72.
pub fn code_area(line: &str) -> &str {
    if line.len() < CODE_AREA_START {
        return "";
    }
    &line[CODE_AREA_START..line.len().min(CODE_AREA_END)]
}

/// Reconstructs logical declarations from the physical lines of a
/// fixed-format copybook.
///
/// Physical code areas are concatenated until the accumulated sentence
/// ends with a period, which is then stripped from the returned
/// declaration. Periods inside quoted literals are not excluded: a VALUE
/// literal that spans lines with a period at a line break ends the
/// sentence early. Copybooks in production depend on that tokenization,
/// so it is kept as is.
#[derive(Debug)]
pub struct DeclarationReader<R> {
    input: R,
    /// Raw physical line read ahead of the current sentence.
    pending: Option<String>,
}

impl<R: BufRead> DeclarationReader<R> {
    /// Wrap a buffered reader over copybook source.
    pub fn new(input: R) -> Self {
        Self {
            input,
            pending: None,
        }
    }

    /// The next complete declaration, or `None` at end of input.
    pub fn next_declaration(&mut self) -> Result<Option<String>> {
        let mut sentence = String::new();
        let mut current = match self.pending.take() {
            Some(line) => Some(line),
            None => self.read_code_line()?,
        };

        while let Some(line) = current {
            let code = code_area(&line).to_string();
            sentence.push_str(&code);
            let next = self.read_code_line()?;
            if is_continued(&code) {
                current = next;
                continue;
            }
            self.pending = next;
            let mut text = sentence.trim().to_string();
            if text.ends_with('.') {
                text.pop();
            }
            return Ok(Some(text));
        }
        Ok(None)
    }

    /// The next physical line that can carry code: skips comments, lines
    /// with an empty code area, and lines too short to reach it.
    fn read_code_line(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            let n = self.input.read_line(&mut line).map_err(|e| ImportError::Io {
                context: "failed to read copybook line".to_string(),
                source: e,
            })?;
            if n == 0 {
                return Ok(None);
            }
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            if line.len() < CODE_AREA_START || code_area(&line).is_empty() || is_comment(&line) {
                continue;
            }
            return Ok(Some(line));
        }
    }
}
