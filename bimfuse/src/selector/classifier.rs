//! Rule-based query classification
//!
//! Rules are checked in order and the first match wins:
//!
//! 1. a 22-character IFC GlobalId-like token -> [`QueryType::Identifier`]
//! 2. a temporal keyword -> [`QueryType::Temporal`]
//! 3. an author prefix (`author:`, `by:`, `@name`, ...) -> [`QueryType::Author`]
//! 4. more than three words and a relational keyword -> [`QueryType::Semantic`]
//! 5. anything else -> [`QueryType::Keyword`]

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Length of an IFC GlobalId in its compressed base64 form
pub const IDENTIFIER_LENGTH: usize = 22;

lazy_static! {
    static ref TEMPORAL_KEYWORDS: HashSet<&'static str> = [
        "recent", "recently", "latest", "newest", "oldest", "before", "after", "since",
        "until", "created", "modified", "updated", "date", "when", "yesterday", "today",
    ]
    .into_iter()
    .collect();
    static ref RELATIONAL_KEYWORDS: HashSet<&'static str> = [
        "related", "relates", "relation", "relationship", "connected", "linked", "issue",
        "issues", "problem", "problems", "similar", "affects", "affecting",
    ]
    .into_iter()
    .collect();
    static ref AUTHOR_PATTERN: Regex =
        Regex::new(r"(?i)(?:^|\s)(?:author|by|creator|assignee|owner):\s*[\w.@-]+|(?:^|\s)@[\w.-]+")
            .unwrap();
    static ref IDENTIFIER_PATTERN: Regex =
        Regex::new(r"(?:^|[^0-9A-Za-z_$])[0-9A-Za-z_$]{22}(?:$|[^0-9A-Za-z_$])").unwrap();
    static ref WORD_PATTERN: Regex = Regex::new(r"[\p{L}\p{N}_$]+").unwrap();
}

/// Query shapes the selector distinguishes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Lookup by GlobalId
    Identifier,
    /// Time-constrained lookup
    Temporal,
    /// Lookup by author
    Author,
    /// Descriptive, relational question
    Semantic,
    /// Plain keyword search
    Keyword,
    /// Unclassified; used when a caller passes no usable type
    General,
}

impl QueryType {
    /// Types produced by the classifier
    pub const CLASSIFIED: [QueryType; 5] = [
        QueryType::Identifier,
        QueryType::Temporal,
        QueryType::Author,
        QueryType::Semantic,
        QueryType::Keyword,
    ];

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Temporal => "temporal",
            Self::Author => "author",
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::General => "general",
        }
    }

    /// Parse a name, mapping anything unknown to [`QueryType::General`]
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::General)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identifier" => Ok(Self::Identifier),
            "temporal" => Ok(Self::Temporal),
            "author" => Ok(Self::Author),
            "semantic" => Ok(Self::Semantic),
            "keyword" => Ok(Self::Keyword),
            "general" => Ok(Self::General),
            _ => Err(format!("Invalid query type: {}", s)),
        }
    }
}

/// Classify a query string
pub fn classify(query: &str) -> QueryType {
    if contains_identifier(query) {
        return QueryType::Identifier;
    }

    let words: Vec<String> = WORD_PATTERN
        .find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect();

    if words.iter().any(|w| TEMPORAL_KEYWORDS.contains(w.as_str())) {
        return QueryType::Temporal;
    }
    if AUTHOR_PATTERN.is_match(query) {
        return QueryType::Author;
    }
    if query.split_whitespace().count() > 3
        && words.iter().any(|w| RELATIONAL_KEYWORDS.contains(w.as_str()))
    {
        return QueryType::Semantic;
    }
    QueryType::Keyword
}

/// Whether the query holds a run of exactly [`IDENTIFIER_LENGTH`] GlobalId
/// characters, wherever it is attached
fn contains_identifier(query: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(query)
}
