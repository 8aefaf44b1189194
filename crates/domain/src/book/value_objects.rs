//! Value objects for the book domain.
//!
//! Validation lives in the constructors: a value of one of these types is
//! well-formed by construction. Cross-field rules (chapter sequencing, the
//! translation limit, and the like) stay in the command handlers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookError;

/// Unique identifier for an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(Uuid);

impl AuthorId {
    /// Creates a new random author ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an author ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AuthorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublisherId(Uuid);

impl PublisherId {
    /// Creates a new random publisher ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a publisher ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PublisherId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PublisherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book title; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Creates a title, rejecting empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Result<Self, BookError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(BookError::EmptyTitle);
        }
        Ok(Self(value))
    }

    /// Returns the title text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literary genre; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genre(String);

impl Genre {
    /// Creates a genre, rejecting empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Result<Self, BookError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(BookError::EmptyGenre);
        }
        Ok(Self(value))
    }

    /// Returns the genre name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An International Standard Book Number, stored normalized (digits only,
/// `X` allowed as the ISBN-10 check character).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    /// Parses an ISBN-10 or ISBN-13, accepting dashes and spaces.
    pub fn new(value: impl Into<String>) -> Result<Self, BookError> {
        let raw = value.into();
        let normalized: String = raw
            .chars()
            .filter(|c| !matches!(c, '-' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let valid = match normalized.len() {
            10 => {
                let (head, check) = normalized.split_at(9);
                head.chars().all(|c| c.is_ascii_digit())
                    && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
            }
            13 => normalized.chars().all(|c| c.is_ascii_digit()),
            _ => false,
        };

        if valid {
            Ok(Self(normalized))
        } else {
            Err(BookError::InvalidIsbn { value: raw })
        }
    }

    /// Returns the normalized ISBN.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Isbn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Title of a chapter. The canonical form `"Chapter {number}"` is enforced
/// when the chapter is added, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterTitle(String);

impl ChapterTitle {
    /// Creates a chapter title.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the title text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChapterTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body text of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterContent(String);

impl ChapterContent {
    /// Creates chapter content.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the content text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A chapter: a positive sequence number, a title, and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 1-based position in the book.
    pub number: u32,

    /// The chapter title.
    pub title: ChapterTitle,

    /// The chapter body.
    pub content: ChapterContent,
}

impl Chapter {
    /// Creates a chapter.
    pub fn new(number: u32, title: ChapterTitle, content: ChapterContent) -> Self {
        Self {
            number,
            title,
            content,
        }
    }
}

/// Someone who reviewed the book. Reviewers are appended, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    /// The reviewer's name.
    pub name: String,
}

impl Reviewer {
    /// Creates a reviewer.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The editorial committee's verdict. Set at most once, while the book is
/// under editing, and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeApproval {
    /// The committee's written feedback.
    pub feedback: String,

    /// Whether the committee approved.
    pub is_approved: bool,
}

impl CommitteeApproval {
    /// Creates an approval, rejecting empty feedback.
    pub fn new(feedback: impl Into<String>, is_approved: bool) -> Result<Self, BookError> {
        let feedback = feedback.into();
        if feedback.trim().is_empty() {
            return Err(BookError::EmptyFeedback);
        }
        Ok(Self {
            feedback,
            is_approved,
        })
    }
}

/// A translation of the book, identified by the language/translator pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Translation {
    /// Target language.
    pub language: String,

    /// Who translated it.
    pub translator: String,
}

impl Translation {
    /// Creates a translation.
    pub fn new(language: impl Into<String>, translator: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            translator: translator.into(),
        }
    }
}

/// The kind of a physical or digital edition (hardcover, e-book, ...).
/// Unique key within a book's format list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatType(String);

impl FormatType {
    /// Creates a format type.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the format type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FormatType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FormatType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An edition format with its print-run counters, used for the unsold-copies
/// ratio that gates retirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Unique key within the book.
    pub format_type: FormatType,

    /// Copies printed.
    pub total_copies: u32,

    /// Copies sold; never exceeds `total_copies`.
    pub sold_copies: u32,
}

impl Format {
    /// Creates a format, rejecting counters where sold exceeds total.
    pub fn new(
        format_type: impl Into<FormatType>,
        total_copies: u32,
        sold_copies: u32,
    ) -> Result<Self, BookError> {
        let format_type = format_type.into();
        if sold_copies > total_copies {
            return Err(BookError::SoldExceedsTotal {
                format_type: format_type.to_string(),
                sold: sold_copies,
                total: total_copies,
            });
        }
        Ok(Self {
            format_type,
            total_copies,
            sold_copies,
        })
    }

    /// Copies printed but not sold.
    pub fn unsold_copies(&self) -> u32 {
        self.total_copies - self.sold_copies
    }
}
