//! The book aggregate: a sum over the lifecycle phases.

use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent, SnapshotCapable};

use super::{
    AuthorId, BookError, BookEvent, BookPhase, DraftBook, Genre, InPrintBook, OutOfPrintBook,
    PublishedBook, PublisherId, Reviewer, Title, UnderEditingBook,
};

/// A book, in exactly one lifecycle phase at a time.
///
/// State is rebuilt by folding [`Book::evolve`] over the event stream,
/// starting from [`Book::Initial`]. Evolution trusts the stream: an event
/// that cannot occur in the current phase is a corrupted stream or a bug in
/// a command handler, and `evolve` panics rather than guessing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase")]
pub enum Book {
    /// No events yet.
    #[default]
    Initial,

    /// Being written.
    Draft(DraftBook),

    /// Under editorial review.
    UnderEditing(UnderEditingBook),

    /// At the printing press.
    InPrint(InPrintBook),

    /// Available for sale.
    Published(PublishedBook),

    /// Retired.
    OutOfPrint(OutOfPrintBook),
}

impl Book {
    /// The phase name, for errors and logging.
    pub fn phase(&self) -> BookPhase {
        match self {
            Book::Initial => BookPhase::Initial,
            Book::Draft(_) => BookPhase::Draft,
            Book::UnderEditing(_) => BookPhase::UnderEditing,
            Book::InPrint(_) => BookPhase::InPrint,
            Book::Published(_) => BookPhase::Published,
            Book::OutOfPrint(_) => BookPhase::OutOfPrint,
        }
    }

    /// Creates a draft. Only valid before any other event.
    pub fn create_draft(
        &self,
        book_id: AggregateId,
        title: Title,
        author_id: AuthorId,
        publisher_id: PublisherId,
        edition: u32,
        genre: Option<Genre>,
    ) -> Result<Vec<BookEvent>, BookError> {
        match self {
            Book::Initial => Ok(vec![BookEvent::draft_created(
                book_id,
                title,
                author_id,
                publisher_id,
                edition,
                genre,
            )]),
            _ => Err(BookError::AlreadyCreated),
        }
    }

    /// Applies a single event, moving the book to its next state.
    ///
    /// # Panics
    ///
    /// Panics when the event is illegal for the current phase.
    pub fn evolve(self, event: BookEvent) -> Book {
        match (self, event) {
            (Book::Initial, BookEvent::DraftCreated(data)) => Book::Draft(DraftBook {
                book_id: data.book_id,
                genre: data.genre,
                chapter_titles: Vec::new(),
            }),

            (Book::Draft(mut draft), BookEvent::ChapterAdded(data)) => {
                draft.chapter_titles.push(data.chapter.title);
                Book::Draft(draft)
            }

            (Book::Draft(draft), BookEvent::MovedToEditing(data)) => {
                Book::UnderEditing(UnderEditingBook {
                    book_id: draft.book_id,
                    genre: data.genre,
                    isbn: None,
                    approval: None,
                    reviewers: Vec::new(),
                    translations: Vec::new(),
                    formats: Vec::new(),
                })
            }

            (Book::UnderEditing(mut book), BookEvent::IsbnSet(data)) => {
                book.isbn = Some(data.isbn);
                Book::UnderEditing(book)
            }

            (Book::UnderEditing(mut book), BookEvent::TranslationAdded(data)) => {
                book.translations.push(data.translation);
                Book::UnderEditing(book)
            }

            (Book::UnderEditing(mut book), BookEvent::FormatAdded(data)) => {
                book.formats.push(data.format);
                Book::UnderEditing(book)
            }

            (Book::UnderEditing(mut book), BookEvent::FormatRemoved(data)) => {
                book.formats.retain(|f| f.format_type != data.format_type);
                Book::UnderEditing(book)
            }

            (Book::UnderEditing(mut book), BookEvent::ReviewerAdded(data)) => {
                book.reviewers.push(Reviewer::new(data.reviewer_name));
                Book::UnderEditing(book)
            }

            (Book::UnderEditing(mut book), BookEvent::Approved(data)) => {
                book.approval = Some(data.approval);
                Book::UnderEditing(book)
            }

            (Book::UnderEditing(book), BookEvent::MovedToPrinting(_)) => {
                Book::InPrint(InPrintBook {
                    book_id: book.book_id,
                    isbn: book.isbn,
                    reviewer_count: book.reviewers.len(),
                    translation_count: book.translations.len(),
                    formats: book.formats,
                })
            }

            (Book::InPrint(book), BookEvent::MovedToPublished(_)) => Book::Published(PublishedBook {
                book_id: book.book_id,
                formats: book.formats,
            }),

            (Book::Published(book), BookEvent::MovedToOutOfPrint(_)) => {
                Book::OutOfPrint(OutOfPrintBook {
                    book_id: book.book_id,
                })
            }

            (state, event) => panic!(
                "illegal event {} in the {} phase",
                event.event_type(),
                state.phase(),
            ),
        }
    }
}

impl Aggregate for Book {
    type Event = BookEvent;
    type Error = BookError;

    fn aggregate_type() -> &'static str {
        "Book"
    }

    fn id(&self) -> Option<AggregateId> {
        match self {
            Book::Initial => None,
            Book::Draft(b) => Some(b.book_id),
            Book::UnderEditing(b) => Some(b.book_id),
            Book::InPrint(b) => Some(b.book_id),
            Book::Published(b) => Some(b.book_id),
            Book::OutOfPrint(b) => Some(b.book_id),
        }
    }

    fn apply(&mut self, event: Self::Event) {
        let prev = std::mem::take(self);
        *self = prev.evolve(event);
    }
}

impl SnapshotCapable for Book {}
