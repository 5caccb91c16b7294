//! Message flags.

use std::fmt;

/// Message flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read.
    Seen,
    /// Message has been answered.
    Answered,
    /// Message is flagged for special attention.
    Flagged,
    /// Message is marked for deletion.
    Deleted,
    /// Message is a draft and must not be delivered.
    Draft,
    /// Custom keyword flag.
    Keyword(String),
}

impl Flag {
    /// Returns the flag in its IMAP spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Keyword(s) => s,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of message flags.
///
/// Flags are local state: they are never rendered into the message text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Flags {
    /// Creates an empty flag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears a flag.
    pub fn set(&mut self, flag: Flag, on: bool) {
        if on {
            if !self.flags.contains(&flag) {
                self.flags.push(flag);
            }
        } else {
            self.flags.retain(|f| *f != flag);
        }
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Returns true if the message is a draft.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.contains(&Flag::Draft)
    }

    /// Returns true if no flag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Iterates over the flags in the order they were set.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }
}
