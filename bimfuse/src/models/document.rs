//! Document model for building-model entities and collaboration issues

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of documents held by the knowledge graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A building-model entity (wall, slab, space, ...)
    Entity,
    /// A collaboration issue (topic, comment thread)
    Issue,
}

impl Default for DocumentKind {
    fn default() -> Self {
        Self::Entity
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::Issue => write!(f, "issue"),
        }
    }
}

/// A node of the knowledge graph as seen by the retrieval core.
///
/// Documents are owned by the external graph/index; the core only reads
/// them by id through a [`DocumentSource`](crate::storage::DocumentSource).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable identifier (an IFC GlobalId for entities, a topic guid for issues)
    pub doc_id: String,

    /// Entity or issue
    pub kind: DocumentKind,

    /// Short title or name
    pub title: String,

    /// Free text body (description, comments, property dump)
    pub body: String,

    /// Author of the document, empty when unknown
    pub author: String,

    /// When the document was created
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Create a document with the given id, kind and title
    pub fn new(doc_id: impl Into<String>, kind: DocumentKind, title: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            kind,
            title: title.into(),
            body: String::new(),
            author: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Title and body joined, as used for tokenization
    pub fn text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }
}
