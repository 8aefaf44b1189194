//! Book domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{
    AuthorId, Chapter, CommitteeApproval, Format, FormatType, Genre, Isbn, PublisherId, Title,
    Translation,
};

/// Events that can occur on a book aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BookEvent {
    /// A draft was created.
    DraftCreated(DraftCreatedData),

    /// A chapter was added to the draft.
    ChapterAdded(ChapterAddedData),

    /// The draft moved to editing.
    MovedToEditing(MovedToEditingData),

    /// The book's ISBN was set.
    IsbnSet(IsbnSetData),

    /// A translation was added.
    TranslationAdded(TranslationAddedData),

    /// An edition format was added.
    FormatAdded(FormatAddedData),

    /// An edition format was removed.
    FormatRemoved(FormatRemovedData),

    /// A reviewer signed off.
    ReviewerAdded(ReviewerAddedData),

    /// The editorial committee recorded its verdict.
    Approved(ApprovedData),

    /// The book moved to printing.
    MovedToPrinting(MovedToPrintingData),

    /// The book was published.
    MovedToPublished(MovedToPublishedData),

    /// The book was taken out of print.
    MovedToOutOfPrint(MovedToOutOfPrintData),
}

impl DomainEvent for BookEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BookEvent::DraftCreated(_) => "DraftCreated",
            BookEvent::ChapterAdded(_) => "ChapterAdded",
            BookEvent::MovedToEditing(_) => "MovedToEditing",
            BookEvent::IsbnSet(_) => "IsbnSet",
            BookEvent::TranslationAdded(_) => "TranslationAdded",
            BookEvent::FormatAdded(_) => "FormatAdded",
            BookEvent::FormatRemoved(_) => "FormatRemoved",
            BookEvent::ReviewerAdded(_) => "ReviewerAdded",
            BookEvent::Approved(_) => "Approved",
            BookEvent::MovedToPrinting(_) => "MovedToPrinting",
            BookEvent::MovedToPublished(_) => "MovedToPublished",
            BookEvent::MovedToOutOfPrint(_) => "MovedToOutOfPrint",
        }
    }
}

impl BookEvent {
    /// The aggregate this event belongs to.
    pub fn book_id(&self) -> AggregateId {
        match self {
            BookEvent::DraftCreated(d) => d.book_id,
            BookEvent::ChapterAdded(d) => d.book_id,
            BookEvent::MovedToEditing(d) => d.book_id,
            BookEvent::IsbnSet(d) => d.book_id,
            BookEvent::TranslationAdded(d) => d.book_id,
            BookEvent::FormatAdded(d) => d.book_id,
            BookEvent::FormatRemoved(d) => d.book_id,
            BookEvent::ReviewerAdded(d) => d.book_id,
            BookEvent::Approved(d) => d.book_id,
            BookEvent::MovedToPrinting(d) => d.book_id,
            BookEvent::MovedToPublished(d) => d.book_id,
            BookEvent::MovedToOutOfPrint(d) => d.book_id,
        }
    }
}

/// Data for the [`BookEvent::DraftCreated`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCreatedData {
    pub book_id: AggregateId,
    pub title: Title,
    pub author_id: AuthorId,
    pub publisher_id: PublisherId,
    pub edition: u32,
    pub genre: Option<Genre>,
    pub created_at: DateTime<Utc>,
}

/// Data for the [`BookEvent::ChapterAdded`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterAddedData {
    pub book_id: AggregateId,
    pub chapter: Chapter,
}

/// Data for the [`BookEvent::MovedToEditing`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovedToEditingData {
    pub book_id: AggregateId,
    pub genre: Genre,
    pub moved_at: DateTime<Utc>,
}

/// Data for the [`BookEvent::IsbnSet`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsbnSetData {
    pub book_id: AggregateId,
    pub isbn: Isbn,
}

/// Data for the [`BookEvent::TranslationAdded`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationAddedData {
    pub book_id: AggregateId,
    pub translation: Translation,
}

/// Data for the [`BookEvent::FormatAdded`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatAddedData {
    pub book_id: AggregateId,
    pub format: Format,
}

/// Data for the [`BookEvent::FormatRemoved`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatRemovedData {
    pub book_id: AggregateId,
    pub format_type: FormatType,
}

/// Data for the [`BookEvent::ReviewerAdded`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerAddedData {
    pub book_id: AggregateId,
    pub reviewer_name: String,
}

/// Data for the [`BookEvent::Approved`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedData {
    pub book_id: AggregateId,
    pub approval: CommitteeApproval,
    pub approved_at: DateTime<Utc>,
}

/// Data for the [`BookEvent::MovedToPrinting`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovedToPrintingData {
    pub book_id: AggregateId,
    pub moved_at: DateTime<Utc>,
}

/// Data for the [`BookEvent::MovedToPublished`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovedToPublishedData {
    pub book_id: AggregateId,
    pub isbn: Isbn,
    pub published_at: DateTime<Utc>,
}

/// Data for the [`BookEvent::MovedToOutOfPrint`] event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovedToOutOfPrintData {
    pub book_id: AggregateId,
    pub retired_at: DateTime<Utc>,
}

// Constructors capture the timestamp where one is carried; everything else
// stays deterministic for replay.
impl BookEvent {
    pub fn draft_created(
        book_id: AggregateId,
        title: Title,
        author_id: AuthorId,
        publisher_id: PublisherId,
        edition: u32,
        genre: Option<Genre>,
    ) -> Self {
        BookEvent::DraftCreated(DraftCreatedData {
            book_id,
            title,
            author_id,
            publisher_id,
            edition,
            genre,
            created_at: Utc::now(),
        })
    }

    pub fn chapter_added(book_id: AggregateId, chapter: Chapter) -> Self {
        BookEvent::ChapterAdded(ChapterAddedData { book_id, chapter })
    }

    pub fn moved_to_editing(book_id: AggregateId, genre: Genre) -> Self {
        BookEvent::MovedToEditing(MovedToEditingData {
            book_id,
            genre,
            moved_at: Utc::now(),
        })
    }

    pub fn isbn_set(book_id: AggregateId, isbn: Isbn) -> Self {
        BookEvent::IsbnSet(IsbnSetData { book_id, isbn })
    }

    pub fn translation_added(book_id: AggregateId, translation: Translation) -> Self {
        BookEvent::TranslationAdded(TranslationAddedData {
            book_id,
            translation,
        })
    }

    pub fn format_added(book_id: AggregateId, format: Format) -> Self {
        BookEvent::FormatAdded(FormatAddedData { book_id, format })
    }

    pub fn format_removed(book_id: AggregateId, format_type: FormatType) -> Self {
        BookEvent::FormatRemoved(FormatRemovedData {
            book_id,
            format_type,
        })
    }

    pub fn reviewer_added(book_id: AggregateId, reviewer_name: impl Into<String>) -> Self {
        BookEvent::ReviewerAdded(ReviewerAddedData {
            book_id,
            reviewer_name: reviewer_name.into(),
        })
    }

    pub fn approved(book_id: AggregateId, approval: CommitteeApproval) -> Self {
        BookEvent::Approved(ApprovedData {
            book_id,
            approval,
            approved_at: Utc::now(),
        })
    }

    pub fn moved_to_printing(book_id: AggregateId) -> Self {
        BookEvent::MovedToPrinting(MovedToPrintingData {
            book_id,
            moved_at: Utc::now(),
        })
    }

    pub fn moved_to_published(book_id: AggregateId, isbn: Isbn) -> Self {
        BookEvent::MovedToPublished(MovedToPublishedData {
            book_id,
            isbn,
            published_at: Utc::now(),
        })
    }

    pub fn moved_to_out_of_print(book_id: AggregateId) -> Self {
        BookEvent::MovedToOutOfPrint(MovedToOutOfPrintData {
            book_id,
            retired_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable() {
        let book_id = AggregateId::new();
        let event = BookEvent::draft_created(
            book_id,
            Title::new("Anatomy of a Codebase").unwrap(),
            AuthorId::new(),
            PublisherId::new(),
            1,
            None,
        );
        assert_eq!(event.event_type(), "DraftCreated");
        assert_eq!(event.book_id(), book_id);

        let event = BookEvent::moved_to_out_of_print(book_id);
        assert_eq!(event.event_type(), "MovedToOutOfPrint");
    }

    #[test]
    fn events_round_trip_through_json() {
        let book_id = AggregateId::new();
        let event = BookEvent::format_added(
            book_id,
            Format::new("hardcover", 500, 0).unwrap(),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "FormatAdded");

        let back: BookEvent = serde_json::from_value(json).unwrap();
        match back {
            BookEvent::FormatAdded(data) => {
                assert_eq!(data.book_id, book_id);
                assert_eq!(data.format.total_copies, 500);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
