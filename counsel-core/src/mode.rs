//! Chat sub-modes and their document-selection preconditions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many selected documents a mode needs before it may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    /// No documents are required.
    None,
    /// At least this many documents.
    AtLeast(usize),
    /// Exactly this many documents.
    Exactly(usize),
}

impl SelectionRule {
    /// Check whether `selected` documents satisfy this rule.
    #[must_use]
    pub fn is_satisfied_by(self, selected: usize) -> bool {
        match self {
            Self::None => true,
            Self::AtLeast(n) => selected >= n,
            Self::Exactly(n) => selected == n,
        }
    }

    /// The number of documents the rule asks for.
    #[must_use]
    pub fn required(self) -> usize {
        match self {
            Self::None => 0,
            Self::AtLeast(n) | Self::Exactly(n) => n,
        }
    }
}

/// The active chat sub-mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Grounded Q&A over the selected documents.
    #[default]
    Ask,
    /// Compare two or more selected documents.
    Compare,
    /// General legal question against the law collection.
    Law,
    /// Review a single selected contract.
    Review,
}

impl ChatMode {
    /// All modes, in display order.
    pub const ALL: [ChatMode; 4] = [Self::Ask, Self::Compare, Self::Law, Self::Review];

    /// The selection precondition for this mode.
    #[must_use]
    pub fn selection_rule(self) -> SelectionRule {
        match self {
            Self::Ask => SelectionRule::AtLeast(1),
            Self::Compare => SelectionRule::AtLeast(2),
            Self::Law => SelectionRule::None,
            Self::Review => SelectionRule::Exactly(1),
        }
    }

    /// Whether this mode works on selected documents at all.
    #[must_use]
    pub fn uses_documents(self) -> bool {
        !matches!(self.selection_rule(), SelectionRule::None)
    }

    /// User-facing notice when the selection precondition is unmet.
    #[must_use]
    pub fn selection_notice(self) -> &'static str {
        match self {
            Self::Ask => "Select documents first.",
            Self::Compare => "Select at least 2 documents to compare.",
            Self::Law => "",
            Self::Review => "Select exactly one contract to review.",
        }
    }

    /// Short identifier used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Compare => "compare",
            Self::Law => "law",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
