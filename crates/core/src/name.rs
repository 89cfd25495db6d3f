//! Qualified names
//!
//! Every Type and Contract is identified by a globally unique dotted name,
//! e.g. `Core.Collections.List`. Identity checks across the type graph
//! compare qualified names, never the display of a property key.
//!
//! ## Validation
//!
//! Qualified names must:
//! - Be 1-512 characters
//! - Consist of one or more dot-separated segments
//! - Have every segment match `[A-Za-z_][A-Za-z0-9_]*`

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Maximum length of a qualified name
pub const MAX_QUALIFIED_NAME_LENGTH: usize = 512;

/// Globally unique dotted identifier for a Type or Contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

/// Error when validating a qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty
    Empty,
    /// Name exceeds maximum length
    TooLong {
        /// Actual length of the name
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// A segment between dots is empty (`a..b`, `.a`, `a.`)
    EmptySegment {
        /// Index of the empty segment
        index: usize,
    },
    /// A segment starts with a digit
    InvalidStart {
        /// The invalid starting character
        char: char,
    },
    /// Name contains an invalid character
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "qualified name cannot be empty"),
            NameError::TooLong { length, max } => {
                write!(f, "qualified name too long: {} chars (max {})", length, max)
            }
            NameError::EmptySegment { index } => write!(f, "segment {} is empty", index),
            NameError::InvalidStart { char } => {
                write!(f, "segment cannot start with '{}'", char)
            }
            NameError::InvalidChar { char, position } => write!(
                f,
                "invalid character '{}' at position {} (only alphanumeric, underscore, dot allowed)",
                char, position
            ),
        }
    }
}

impl std::error::Error for NameError {}

impl QualifiedName {
    /// Create a new qualified name, validating the input
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is malformed.
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        match Self::validate(&name) {
            Ok(()) => Ok(QualifiedName(name)),
            Err(reason) => Err(Error::InvalidName {
                name,
                reason: reason.to_string(),
            }),
        }
    }

    /// Create a qualified name without validation
    ///
    /// The caller must ensure the name is valid. Use `new()` for untrusted input.
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        QualifiedName(name.into())
    }

    /// Validate a qualified name
    pub fn validate(name: &str) -> Result<(), NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > MAX_QUALIFIED_NAME_LENGTH {
            return Err(NameError::TooLong {
                length: name.len(),
                max: MAX_QUALIFIED_NAME_LENGTH,
            });
        }

        let mut position = 0;
        for (index, segment) in name.split('.').enumerate() {
            let mut chars = segment.chars();
            match chars.next() {
                None => return Err(NameError::EmptySegment { index }),
                Some(c) if c.is_ascii_digit() => return Err(NameError::InvalidStart { char: c }),
                Some(_) => {}
            }
            for (offset, ch) in segment.chars().enumerate() {
                if !(ch.is_ascii_alphanumeric() || ch == '_') {
                    return Err(NameError::InvalidChar {
                        char: ch,
                        position: position + offset,
                    });
                }
            }
            position += segment.chars().count() + 1;
        }

        Ok(())
    }

    /// Get the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Last segment, e.g. `List` for `Core.Collections.List`
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, `None` for single-segment names
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(ns, _)| ns)
    }

    /// Append a segment, producing a child name
    pub fn child(&self, segment: &str) -> crate::Result<Self> {
        QualifiedName::new(format!("{}.{}", self.0, segment))
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QualifiedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualifiedName::new(s)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QualifiedName::new(value)
    }
}

impl TryFrom<&str> for QualifiedName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        QualifiedName::new(value)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.0
    }
}

// ============================================================================
// Tests
// ============================================================================
