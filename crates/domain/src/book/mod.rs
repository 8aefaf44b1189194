//! Book aggregate and related types.
//!
//! A book moves through a one-directional lifecycle: draft, editing,
//! printing, publication, retirement. Each phase is its own type carrying
//! only the data that phase needs, and each transition is gated by the
//! invariants of the corresponding command handler.

mod aggregate;
mod commands;
mod events;
mod providers;
mod service;
mod state;
mod value_objects;

pub use aggregate::Book;
pub use commands::*;
pub use events::{
    ApprovedData, BookEvent, ChapterAddedData, DraftCreatedData, FormatAddedData,
    FormatRemovedData, IsbnSetData, MovedToEditingData, MovedToOutOfPrintData,
    MovedToPrintingData, MovedToPublishedData, ReviewerAddedData, TranslationAddedData,
};
pub use providers::{
    Author, AuthorProvider, AuthorRef, GenreQuotaPolicy, InMemoryAuthorProvider,
    InMemoryPublisherProvider, ProviderError, Publisher, PublisherProvider, StubGenreQuota,
};
pub use service::{BookService, PublishingPolicies};
pub use state::{
    BookPhase, DraftBook, InPrintBook, OutOfPrintBook, PublishedBook, UnderEditingBook,
};
pub use value_objects::{
    AuthorId, Chapter, ChapterContent, ChapterTitle, CommitteeApproval, Format, FormatType, Genre,
    Isbn, PublisherId, Reviewer, Title, Translation,
};

use common::AggregateId;
use thiserror::Error;

/// Errors produced by the book command handlers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookError {
    /// A draft already exists for this id.
    #[error("book already created")]
    AlreadyCreated,

    /// The book has no recorded events.
    #[error("book {book_id} was never created")]
    NotFound { book_id: AggregateId },

    /// The command is not supported in the book's current phase.
    #[error("cannot {action} from the {phase} phase")]
    InvalidStateTransition {
        phase: BookPhase,
        action: &'static str,
    },

    /// Title must be non-empty.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// Genre must be non-empty.
    #[error("genre cannot be empty")]
    EmptyGenre,

    /// Committee feedback must be non-empty.
    #[error("committee approval feedback cannot be empty")]
    EmptyFeedback,

    /// The ISBN does not parse as ISBN-10 or ISBN-13.
    #[error("invalid ISBN: {value}")]
    InvalidIsbn { value: String },

    /// A chapter with this title already exists.
    #[error("chapter with title {title} already exists")]
    DuplicateChapterTitle { title: String },

    /// Chapters must be added in sequence.
    #[error("chapters must be added in sequence; the next chapter should be titled '{expected}'")]
    ChapterOutOfSequence { expected: String },

    /// At least one chapter is required to leave drafting.
    #[error("a book must have at least one chapter to move to editing")]
    NoChapters,

    /// A genre is required to leave drafting.
    #[error("a book can only move forward once its genre is specified")]
    GenreMissing,

    /// The translations limit was reached.
    #[error("cannot add more translations, at most {max} are allowed")]
    TranslationLimitReached { max: usize },

    /// A format with this type already exists.
    #[error("format {format_type} already exists")]
    FormatAlreadyExists { format_type: String },

    /// No format with this type exists.
    #[error("format {format_type} does not exist")]
    FormatNotFound { format_type: String },

    /// Sold copies can never exceed total copies.
    #[error("format {format_type} reports {sold} sold copies out of {total}")]
    SoldExceedsTotal {
        format_type: String,
        sold: u32,
        total: u32,
    },

    /// The reviewer threshold was not met.
    #[error("at least {required} reviewers are required, found {actual}")]
    NotEnoughReviewers { required: usize, actual: usize },

    /// The committee already approved this book.
    #[error("book has already been approved")]
    AlreadyApproved,

    /// Committee approval is missing.
    #[error("book cannot move to printing until the committee has approved it")]
    NotApproved,

    /// The translation threshold for publication was not met.
    #[error("at least {required} translations are required to publish, found {actual}")]
    NotEnoughTranslations { required: usize, actual: usize },

    /// An ISBN is required for publication.
    #[error("book cannot be published without an ISBN")]
    IsbnMissing,

    /// The ISBN was already set.
    #[error("ISBN has already been set")]
    IsbnAlreadySet,

    /// The genre quota gate has not opened yet.
    #[error("cannot move to printing until the {genre} genre limit is reached")]
    GenreLimitNotReached { genre: String },

    /// Too many unsold copies to retire the book.
    #[error("cannot move out of print: {unsold_ratio:.1}% of copies are unsold (limit {threshold:.1}%)")]
    UnsoldRatioTooHigh { unsold_ratio: f64, threshold: f64 },
}

impl BookError {
    /// Stable machine-readable code, folded into the domain taxonomy:
    /// phase mismatches, missing aggregates, and everything else an
    /// invariant violation.
    pub fn code(&self) -> &'static str {
        match self {
            BookError::InvalidStateTransition { .. } => "invalid_state_transition",
            BookError::NotFound { .. } => "aggregate_not_found",
            _ => "invariant_violation",
        }
    }

    pub(crate) fn invalid_transition(phase: BookPhase, action: &'static str) -> Self {
        BookError::InvalidStateTransition { phase, action }
    }
}
