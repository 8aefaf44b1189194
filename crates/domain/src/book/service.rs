//! Book service: the application surface for the book lifecycle.
//!
//! Each method runs one command through the load → compute → append cycle,
//! consulting collaborators where a guard needs outside knowledge, and hands
//! the persisted records to the outbox for downstream consumers.

use std::sync::Arc;

use common::{AggregateId, Ratio};
use event_log::{EventLog, Outbox};

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    AddChapter, AddFormat, AddReviewer, AddTranslation, Approve, AuthorProvider, Book, BookError,
    BookEvent, CreateDraft, GenreQuotaPolicy, MoveToEditing, MoveToOutOfPrint, MoveToPrinting,
    MoveToPublished, PublisherProvider, RemoveFormat, SetIsbn,
};

impl From<BookError> for DomainError {
    fn from(e: BookError) -> Self {
        match e {
            BookError::NotFound { book_id } => DomainError::AggregateNotFound {
                aggregate_type: "Book",
                aggregate_id: book_id.to_string(),
            },
            other => DomainError::Book(other),
        }
    }
}

/// Editorial thresholds the command handlers enforce.
#[derive(Debug, Clone)]
pub struct PublishingPolicies {
    /// Reviewers required before the committee can approve, and before a
    /// book can be published.
    pub minimum_reviewers: usize,

    /// Translation cap while under editing, and the count required for
    /// publication.
    pub maximum_translations: usize,

    /// Largest fraction of printed copies that may remain unsold when the
    /// book is retired.
    pub max_unsold_ratio: Ratio,
}

impl Default for PublishingPolicies {
    fn default() -> Self {
        Self {
            minimum_reviewers: 3,
            maximum_translations: 5,
            max_unsold_ratio: Ratio::from_percent(10),
        }
    }
}

/// Service for managing books.
///
/// Wraps the command handler and the collaborators a publishing house needs:
/// the author and publisher registries, the genre quota policy, and the
/// outbox for persisted records.
pub struct BookService<S: EventLog> {
    handler: CommandHandler<S, Book>,
    authors: Arc<dyn AuthorProvider>,
    publishers: Arc<dyn PublisherProvider>,
    genre_quota: Arc<dyn GenreQuotaPolicy>,
    outbox: Arc<dyn Outbox>,
    policies: PublishingPolicies,
}

impl<S: EventLog> BookService<S> {
    /// Creates a book service with default policies.
    pub fn new(
        log: S,
        authors: Arc<dyn AuthorProvider>,
        publishers: Arc<dyn PublisherProvider>,
        genre_quota: Arc<dyn GenreQuotaPolicy>,
        outbox: Arc<dyn Outbox>,
    ) -> Self {
        Self {
            handler: CommandHandler::new(log),
            authors,
            publishers,
            genre_quota,
            outbox,
            policies: PublishingPolicies::default(),
        }
    }

    /// Replaces the default policies.
    pub fn with_policies(mut self, policies: PublishingPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Book> {
        &self.handler
    }

    /// Loads a book, `None` if it has no recorded events.
    pub async fn get_book(&self, book_id: AggregateId) -> Result<Option<Book>, DomainError> {
        self.handler.load_existing(book_id).await
    }

    /// Starts a new draft.
    ///
    /// Resolves the author (registering first-time authors) and verifies
    /// the publisher exists before any event is recorded.
    #[tracing::instrument(skip(self))]
    pub async fn create_draft(&self, cmd: CreateDraft) -> Result<CommandResult<Book>, DomainError> {
        let author = self.authors.resolve(&cmd.author).await?;
        self.publishers.get(cmd.publisher_id).await?;

        let CreateDraft {
            book_id,
            title,
            publisher_id,
            edition,
            genre,
            ..
        } = cmd;

        self.execute_and_publish(book_id, move |book| {
            book.create_draft(
                book_id,
                title.clone(),
                author.author_id,
                publisher_id,
                edition,
                genre.clone(),
            )
        })
        .await
    }

    /// Adds the next chapter to a draft.
    #[tracing::instrument(skip(self))]
    pub async fn add_chapter(&self, cmd: AddChapter) -> Result<CommandResult<Book>, DomainError> {
        let AddChapter {
            book_id,
            title,
            content,
        } = cmd;

        self.execute_and_publish(book_id, move |book| match book {
            Book::Draft(draft) => draft.add_chapter(title.clone(), content.clone()),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "add chapter")),
        })
        .await
    }

    /// Moves a draft into editing.
    #[tracing::instrument(skip(self))]
    pub async fn move_to_editing(
        &self,
        cmd: MoveToEditing,
    ) -> Result<CommandResult<Book>, DomainError> {
        let book_id = cmd.book_id;

        self.execute_and_publish(book_id, move |book| match book {
            Book::Draft(draft) => draft.move_to_editing(),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(
                other.phase(),
                "move to editing",
            )),
        })
        .await
    }

    /// Sets the book's ISBN.
    #[tracing::instrument(skip(self))]
    pub async fn set_isbn(&self, cmd: SetIsbn) -> Result<CommandResult<Book>, DomainError> {
        let SetIsbn { book_id, isbn } = cmd;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => editing.set_isbn(isbn.clone()),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "set ISBN")),
        })
        .await
    }

    /// Records a translation.
    #[tracing::instrument(skip(self))]
    pub async fn add_translation(
        &self,
        cmd: AddTranslation,
    ) -> Result<CommandResult<Book>, DomainError> {
        let AddTranslation {
            book_id,
            translation,
        } = cmd;
        let max = self.policies.maximum_translations;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => editing.add_translation(translation.clone(), max),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(
                other.phase(),
                "add translation",
            )),
        })
        .await
    }

    /// Adds an edition format.
    #[tracing::instrument(skip(self))]
    pub async fn add_format(&self, cmd: AddFormat) -> Result<CommandResult<Book>, DomainError> {
        let AddFormat { book_id, format } = cmd;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => editing.add_format(format.clone()),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "add format")),
        })
        .await
    }

    /// Removes an edition format.
    #[tracing::instrument(skip(self))]
    pub async fn remove_format(
        &self,
        cmd: RemoveFormat,
    ) -> Result<CommandResult<Book>, DomainError> {
        let RemoveFormat {
            book_id,
            format_type,
        } = cmd;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => editing.remove_format(format_type.clone()),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "remove format")),
        })
        .await
    }

    /// Records a reviewer sign-off.
    #[tracing::instrument(skip(self))]
    pub async fn add_reviewer(
        &self,
        cmd: AddReviewer,
    ) -> Result<CommandResult<Book>, DomainError> {
        let AddReviewer { book_id, reviewer } = cmd;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => editing.add_reviewer(reviewer.clone()),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "add reviewer")),
        })
        .await
    }

    /// Records the committee verdict.
    #[tracing::instrument(skip(self))]
    pub async fn approve(&self, cmd: Approve) -> Result<CommandResult<Book>, DomainError> {
        let Approve { book_id, approval } = cmd;
        let minimum_reviewers = self.policies.minimum_reviewers;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => editing.approve(approval.clone(), minimum_reviewers),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "approve")),
        })
        .await
    }

    /// Sends the book to the printing press.
    ///
    /// The genre quota policy is consulted once, before the command runs;
    /// its answer is treated as a fact of this execution even if the
    /// version race forces a retry.
    #[tracing::instrument(skip(self))]
    pub async fn move_to_printing(
        &self,
        cmd: MoveToPrinting,
    ) -> Result<CommandResult<Book>, DomainError> {
        let book_id = cmd.book_id;

        let (book, _) = self.handler.load(book_id).await?;
        let genre = match &book {
            Book::UnderEditing(editing) => editing.genre.clone(),
            Book::Initial => return Err(BookError::NotFound { book_id }.into()),
            other => {
                return Err(
                    BookError::invalid_transition(other.phase(), "move to printing").into(),
                );
            }
        };
        let limit_reached = self.genre_quota.is_limit_reached(&genre).await?;
        let minimum_reviewers = self.policies.minimum_reviewers;

        self.execute_and_publish(book_id, move |book| match book {
            Book::UnderEditing(editing) => {
                editing.move_to_printing(minimum_reviewers, limit_reached)
            }
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(
                other.phase(),
                "move to printing",
            )),
        })
        .await
    }

    /// Publishes a printed book.
    #[tracing::instrument(skip(self))]
    pub async fn move_to_published(
        &self,
        cmd: MoveToPublished,
    ) -> Result<CommandResult<Book>, DomainError> {
        let book_id = cmd.book_id;
        let required_translations = self.policies.maximum_translations;
        let minimum_reviewers = self.policies.minimum_reviewers;

        self.execute_and_publish(book_id, move |book| match book {
            Book::InPrint(in_print) => {
                in_print.move_to_published(required_translations, minimum_reviewers)
            }
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(other.phase(), "publish")),
        })
        .await
    }

    /// Retires a published book.
    #[tracing::instrument(skip(self))]
    pub async fn move_to_out_of_print(
        &self,
        cmd: MoveToOutOfPrint,
    ) -> Result<CommandResult<Book>, DomainError> {
        let book_id = cmd.book_id;
        let max_unsold_ratio = self.policies.max_unsold_ratio.as_f64();

        self.execute_and_publish(book_id, move |book| match book {
            Book::Published(published) => published.move_to_out_of_print(max_unsold_ratio),
            Book::Initial => Err(BookError::NotFound { book_id }),
            other => Err(BookError::invalid_transition(
                other.phase(),
                "move out of print",
            )),
        })
        .await
    }

    async fn execute_and_publish<F>(
        &self,
        book_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<Book>, DomainError>
    where
        F: Fn(&Book) -> Result<Vec<BookEvent>, BookError>,
    {
        let result = self.handler.execute(book_id, command_fn).await?;

        if !result.records.is_empty() {
            self.outbox.enqueue(result.records.clone()).await?;
        }

        Ok(result)
    }
}
