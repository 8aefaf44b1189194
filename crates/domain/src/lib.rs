//! Domain layer for the publishing house.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - Command trait and CommandHandler for command processing
//! - Book aggregate with its phase-typed lifecycle

pub mod aggregate;
pub mod book;
pub mod command;
pub mod error;

pub use aggregate::{Aggregate, DomainEvent, SnapshotCapable};
pub use book::{
    AddChapter, AddFormat, AddReviewer, AddTranslation, Approve, AuthorId, AuthorRef, Book,
    BookError, BookEvent, BookPhase, BookService, Chapter, CommitteeApproval, CreateDraft, Format,
    FormatType, Genre, Isbn, MoveToEditing, MoveToOutOfPrint, MoveToPrinting, MoveToPublished,
    PublisherId, PublishingPolicies, RemoveFormat, Reviewer, SetIsbn, Title, Translation,
};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
