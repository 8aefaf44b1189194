//! External collaborators the book service consults.
//!
//! Drafting resolves the author and checks the publisher; moving to printing
//! asks the genre quota policy whether the gate is open. All three sit
//! behind async traits so the service can run against real registries in
//! production and the in-memory versions in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{AuthorId, Genre, PublisherId};

/// Errors from collaborator lookups.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No author with this ID is registered.
    #[error("author {author_id} not found")]
    AuthorNotFound { author_id: AuthorId },

    /// No publisher with this ID is registered.
    #[error("publisher {publisher_id} not found")]
    PublisherNotFound { publisher_id: PublisherId },

    /// The collaborator could not answer.
    #[error("{service} unavailable: {message}")]
    Unavailable { service: &'static str, message: String },
}

/// A registered author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// The author's ID.
    pub author_id: AuthorId,

    /// The author's first name.
    pub first_name: String,

    /// The author's last name.
    pub last_name: String,
}

/// A registered publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    /// The publisher's ID.
    pub publisher_id: PublisherId,

    /// The publisher's name.
    pub name: String,
}

/// How a draft names its author: an existing registration, or a name to
/// register on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    /// An author already in the registry.
    Existing(AuthorId),

    /// A first-time author, registered when the draft is created.
    New {
        first_name: String,
        last_name: String,
    },
}

/// Resolves author references against the author registry.
#[async_trait]
pub trait AuthorProvider: Send + Sync {
    /// Resolves a reference, registering first-time authors.
    async fn resolve(&self, author: &AuthorRef) -> Result<Author, ProviderError>;
}

/// Looks up publishers.
#[async_trait]
pub trait PublisherProvider: Send + Sync {
    /// Fetches a publisher by ID.
    async fn get(&self, publisher_id: PublisherId) -> Result<Publisher, ProviderError>;
}

/// Decides whether a genre's printing quota gate is open.
#[async_trait]
pub trait GenreQuotaPolicy: Send + Sync {
    /// Whether the genre has accumulated enough titles for printing.
    async fn is_limit_reached(&self, genre: &Genre) -> Result<bool, ProviderError>;
}

/// In-memory author registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthorProvider {
    authors: Arc<RwLock<HashMap<AuthorId, Author>>>,
}

impl InMemoryAuthorProvider {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an author directly.
    pub async fn register(&self, author: Author) {
        self.authors.write().await.insert(author.author_id, author);
    }
}

#[async_trait]
impl AuthorProvider for InMemoryAuthorProvider {
    async fn resolve(&self, author: &AuthorRef) -> Result<Author, ProviderError> {
        match author {
            AuthorRef::Existing(author_id) => self
                .authors
                .read()
                .await
                .get(author_id)
                .cloned()
                .ok_or(ProviderError::AuthorNotFound {
                    author_id: *author_id,
                }),
            AuthorRef::New {
                first_name,
                last_name,
            } => {
                let author = Author {
                    author_id: AuthorId::new(),
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                };
                self.authors
                    .write()
                    .await
                    .insert(author.author_id, author.clone());
                tracing::debug!(author_id = %author.author_id, "registered new author");
                Ok(author)
            }
        }
    }
}

/// In-memory publisher registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisherProvider {
    publishers: Arc<RwLock<HashMap<PublisherId, Publisher>>>,
}

impl InMemoryPublisherProvider {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a publisher.
    pub async fn register(&self, publisher: Publisher) {
        self.publishers
            .write()
            .await
            .insert(publisher.publisher_id, publisher);
    }
}

#[async_trait]
impl PublisherProvider for InMemoryPublisherProvider {
    async fn get(&self, publisher_id: PublisherId) -> Result<Publisher, ProviderError> {
        self.publishers
            .read()
            .await
            .get(&publisher_id)
            .cloned()
            .ok_or(ProviderError::PublisherNotFound { publisher_id })
    }
}

/// Configurable quota policy for tests: a default answer plus per-genre
/// overrides.
#[derive(Debug, Clone)]
pub struct StubGenreQuota {
    default: bool,
    overrides: Arc<RwLock<HashMap<String, bool>>>,
}

impl StubGenreQuota {
    /// Creates a stub answering `default` for every genre.
    pub fn new(default: bool) -> Self {
        Self {
            default,
            overrides: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Overrides the answer for one genre.
    pub async fn set(&self, genre: &Genre, reached: bool) {
        self.overrides
            .write()
            .await
            .insert(genre.as_str().to_string(), reached);
    }
}

#[async_trait]
impl GenreQuotaPolicy for StubGenreQuota {
    async fn is_limit_reached(&self, genre: &Genre) -> Result<bool, ProviderError> {
        let overrides = self.overrides.read().await;
        Ok(*overrides.get(genre.as_str()).unwrap_or(&self.default))
    }
}
