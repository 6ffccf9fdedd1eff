//! Checkpoint path templates
//!
//! A template holds exactly one slot for the epoch index, written with the
//! usual brace syntax:
//!
//! - `{}` or `{0}`: the epoch as-is
//! - `{:4}`: right-aligned in a field of width 4
//! - `{:04}` / `{:04d}`: zero-padded to width 4
//! - `{{` / `}}`: literal braces
//!
//! Construction never inspects the string; problems surface when the
//! template is formatted.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a template cannot be formatted with an epoch index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no placeholder for the epoch index")]
    NoPlaceholder,

    #[error("template has {0} placeholders, expected exactly one")]
    TooManyPlaceholders(usize),

    #[error("unmatched brace at byte {0}")]
    UnmatchedBrace(usize),

    #[error("invalid placeholder '{{{0}}}'")]
    InvalidFormatSpec(String),

    #[error("placeholder index {0} out of range (only index 0 is available)")]
    IndexOutOfRange(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot { width: usize, zero_pad: bool },
}

/// Immutable path template with a single epoch slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
}

impl PathTemplate {
    /// Wrap a template string
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The template as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check that the template would format, without producing a path
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.parse().map(|_| ())
    }

    /// Substitute the epoch index and return the concrete path
    pub fn format(&self, epoch: usize) -> Result<PathBuf, TemplateError> {
        let mut out = String::with_capacity(self.raw.len() + 8);
        for segment in self.parse()? {
            match segment {
                Segment::Literal(text) => out.push_str(&text),
                Segment::Slot { width, zero_pad } if zero_pad => {
                    out.push_str(&format!("{epoch:0width$}"))
                }
                Segment::Slot { width, .. } => out.push_str(&format!("{epoch:>width$}")),
            }
        }
        Ok(PathBuf::from(out))
    }

    fn parse(&self) -> Result<Vec<Segment>, TemplateError> {
        let bytes = self.raw.as_bytes();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut slots = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    literal.push('{');
                    i += 2;
                }
                b'{' => {
                    let close = self.raw[i + 1..]
                        .find('}')
                        .map(|off| i + 1 + off)
                        .ok_or(TemplateError::UnmatchedBrace(i))?;
                    let field = &self.raw[i + 1..close];
                    if field.contains('{') {
                        return Err(TemplateError::UnmatchedBrace(i));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(field)?);
                    slots += 1;
                    i = close + 1;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    literal.push('}');
                    i += 2;
                }
                b'}' => return Err(TemplateError::UnmatchedBrace(i)),
                _ => {
                    // Advance by whole characters so multi-byte paths survive
                    let ch = self.raw[i..].chars().next().unwrap_or_default();
                    literal.push(ch);
                    i += ch.len_utf8().max(1);
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        match slots {
            0 => Err(TemplateError::NoPlaceholder),
            1 => Ok(segments),
            n => Err(TemplateError::TooManyPlaceholders(n)),
        }
    }
}

fn parse_field(field: &str) -> Result<Segment, TemplateError> {
    let (index, spec) = match field.split_once(':') {
        Some((index, spec)) => (index, spec),
        None => (field, ""),
    };

    if !index.is_empty() {
        match index.parse::<usize>() {
            Ok(0) => {}
            Ok(n) => return Err(TemplateError::IndexOutOfRange(n)),
            Err(_) => return Err(TemplateError::InvalidFormatSpec(field.to_string())),
        }
    }

    let digits = spec.strip_suffix('d').unwrap_or(spec);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TemplateError::InvalidFormatSpec(field.to_string()));
    }
    let zero_pad = digits.len() > 1 && digits.starts_with('0');
    // std::fmt caps padding widths at u16::MAX
    let width = if digits.is_empty() {
        0
    } else {
        digits
            .parse::<u16>()
            .map_err(|_| TemplateError::InvalidFormatSpec(field.to_string()))?
            as usize
    };

    Ok(Segment::Slot { width, zero_pad })
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PathTemplate {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PathTemplate {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
