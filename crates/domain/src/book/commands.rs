//! Book commands.

use common::AggregateId;

use crate::command::Command;

use super::{
    AuthorRef, Book, ChapterContent, ChapterTitle, CommitteeApproval, Format, FormatType, Genre,
    Isbn, PublisherId, Reviewer, Title, Translation,
};

/// Command to start a new book draft.
#[derive(Debug, Clone)]
pub struct CreateDraft {
    /// The book ID to create.
    pub book_id: AggregateId,

    /// The working title.
    pub title: Title,

    /// The author, by ID or by name for first-time authors.
    pub author: AuthorRef,

    /// The publisher.
    pub publisher_id: PublisherId,

    /// Edition number.
    pub edition: u32,

    /// The genre, if already settled.
    pub genre: Option<Genre>,
}

impl CreateDraft {
    /// Creates a new CreateDraft command.
    pub fn new(
        book_id: AggregateId,
        title: Title,
        author: AuthorRef,
        publisher_id: PublisherId,
        edition: u32,
        genre: Option<Genre>,
    ) -> Self {
        Self {
            book_id,
            title,
            author,
            publisher_id,
            edition,
            genre,
        }
    }
}

impl Command for CreateDraft {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to add the next chapter to a draft.
#[derive(Debug, Clone)]
pub struct AddChapter {
    /// The book to add the chapter to.
    pub book_id: AggregateId,

    /// The chapter title.
    pub title: ChapterTitle,

    /// The chapter body.
    pub content: ChapterContent,
}

impl AddChapter {
    /// Creates a new AddChapter command.
    pub fn new(
        book_id: AggregateId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            book_id,
            title: ChapterTitle::new(title),
            content: ChapterContent::new(content),
        }
    }
}

impl Command for AddChapter {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to move a draft into editing.
#[derive(Debug, Clone)]
pub struct MoveToEditing {
    /// The book to move.
    pub book_id: AggregateId,
}

impl MoveToEditing {
    /// Creates a new MoveToEditing command.
    pub fn new(book_id: AggregateId) -> Self {
        Self { book_id }
    }
}

impl Command for MoveToEditing {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to set the book's ISBN.
#[derive(Debug, Clone)]
pub struct SetIsbn {
    /// The book to update.
    pub book_id: AggregateId,

    /// The ISBN to set.
    pub isbn: Isbn,
}

impl SetIsbn {
    /// Creates a new SetIsbn command.
    pub fn new(book_id: AggregateId, isbn: Isbn) -> Self {
        Self { book_id, isbn }
    }
}

impl Command for SetIsbn {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to record a translation.
#[derive(Debug, Clone)]
pub struct AddTranslation {
    /// The book being translated.
    pub book_id: AggregateId,

    /// The translation.
    pub translation: Translation,
}

impl AddTranslation {
    /// Creates a new AddTranslation command.
    pub fn new(book_id: AggregateId, translation: Translation) -> Self {
        Self {
            book_id,
            translation,
        }
    }

    /// Creates a new AddTranslation command from individual fields.
    pub fn with_details(
        book_id: AggregateId,
        language: impl Into<String>,
        translator: impl Into<String>,
    ) -> Self {
        Self {
            book_id,
            translation: Translation::new(language, translator),
        }
    }
}

impl Command for AddTranslation {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to add an edition format.
#[derive(Debug, Clone)]
pub struct AddFormat {
    /// The book to add the format to.
    pub book_id: AggregateId,

    /// The format.
    pub format: Format,
}

impl AddFormat {
    /// Creates a new AddFormat command.
    pub fn new(book_id: AggregateId, format: Format) -> Self {
        Self { book_id, format }
    }
}

impl Command for AddFormat {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to remove an edition format.
#[derive(Debug, Clone)]
pub struct RemoveFormat {
    /// The book to remove the format from.
    pub book_id: AggregateId,

    /// The format type to remove.
    pub format_type: FormatType,
}

impl RemoveFormat {
    /// Creates a new RemoveFormat command.
    pub fn new(book_id: AggregateId, format_type: impl Into<FormatType>) -> Self {
        Self {
            book_id,
            format_type: format_type.into(),
        }
    }
}

impl Command for RemoveFormat {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to record a reviewer sign-off.
#[derive(Debug, Clone)]
pub struct AddReviewer {
    /// The book being reviewed.
    pub book_id: AggregateId,

    /// The reviewer.
    pub reviewer: Reviewer,
}

impl AddReviewer {
    /// Creates a new AddReviewer command.
    pub fn new(book_id: AggregateId, reviewer_name: impl Into<String>) -> Self {
        Self {
            book_id,
            reviewer: Reviewer::new(reviewer_name),
        }
    }
}

impl Command for AddReviewer {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to record the committee verdict.
#[derive(Debug, Clone)]
pub struct Approve {
    /// The book under review.
    pub book_id: AggregateId,

    /// The committee verdict.
    pub approval: CommitteeApproval,
}

impl Approve {
    /// Creates a new Approve command.
    pub fn new(book_id: AggregateId, approval: CommitteeApproval) -> Self {
        Self { book_id, approval }
    }
}

impl Command for Approve {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to send a book to the printing press.
#[derive(Debug, Clone)]
pub struct MoveToPrinting {
    /// The book to move.
    pub book_id: AggregateId,
}

impl MoveToPrinting {
    /// Creates a new MoveToPrinting command.
    pub fn new(book_id: AggregateId) -> Self {
        Self { book_id }
    }
}

impl Command for MoveToPrinting {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to publish a printed book.
#[derive(Debug, Clone)]
pub struct MoveToPublished {
    /// The book to publish.
    pub book_id: AggregateId,
}

impl MoveToPublished {
    /// Creates a new MoveToPublished command.
    pub fn new(book_id: AggregateId) -> Self {
        Self { book_id }
    }
}

impl Command for MoveToPublished {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}

/// Command to retire a published book.
#[derive(Debug, Clone)]
pub struct MoveToOutOfPrint {
    /// The book to retire.
    pub book_id: AggregateId,
}

impl MoveToOutOfPrint {
    /// Creates a new MoveToOutOfPrint command.
    pub fn new(book_id: AggregateId) -> Self {
        Self { book_id }
    }
}

impl Command for MoveToOutOfPrint {
    type Aggregate = Book;

    fn aggregate_id(&self) -> AggregateId {
        self.book_id
    }
}
