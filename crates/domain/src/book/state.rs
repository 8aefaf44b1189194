//! The book lifecycle, one type per phase.
//!
//! Transitions are one-directional:
//! ```text
//! Initial ──► Draft ──► UnderEditing ──► InPrint ──► Published ──► OutOfPrint
//! ```
//! Each phase struct carries only the data its own command handlers read,
//! and each handler is a pure function from state and input to events.

use common::AggregateId;
use serde::{Deserialize, Serialize};

use super::{
    BookError, BookEvent, Chapter, ChapterContent, ChapterTitle, CommitteeApproval, Format,
    FormatType, Genre, Isbn, Reviewer, Translation,
};

/// Name of a lifecycle phase, used in transition errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookPhase {
    Initial,
    Draft,
    UnderEditing,
    InPrint,
    Published,
    OutOfPrint,
}

impl std::fmt::Display for BookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BookPhase::Initial => "Initial",
            BookPhase::Draft => "Draft",
            BookPhase::UnderEditing => "UnderEditing",
            BookPhase::InPrint => "InPrint",
            BookPhase::Published => "Published",
            BookPhase::OutOfPrint => "OutOfPrint",
        };
        write!(f, "{name}")
    }
}

/// A book being drafted: chapters accumulate, the genre may still be open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBook {
    pub book_id: AggregateId,
    pub genre: Option<Genre>,
    pub chapter_titles: Vec<ChapterTitle>,
}

impl DraftBook {
    /// Adds the next chapter. Titles are unique, and chapters arrive in
    /// sequence as `"Chapter {n}"`.
    pub fn add_chapter(
        &self,
        title: ChapterTitle,
        content: ChapterContent,
    ) -> Result<Vec<BookEvent>, BookError> {
        if self.chapter_titles.contains(&title) {
            return Err(BookError::DuplicateChapterTitle {
                title: title.to_string(),
            });
        }

        let number = self.chapter_titles.len() as u32 + 1;
        let expected = format!("Chapter {number}");
        if title.as_str() != expected {
            return Err(BookError::ChapterOutOfSequence { expected });
        }

        let chapter = Chapter::new(number, title, content);
        Ok(vec![BookEvent::chapter_added(self.book_id, chapter)])
    }

    /// Hands the draft over to editing. Requires at least one chapter and
    /// a settled genre.
    pub fn move_to_editing(&self) -> Result<Vec<BookEvent>, BookError> {
        if self.chapter_titles.is_empty() {
            return Err(BookError::NoChapters);
        }
        let genre = self.genre.clone().ok_or(BookError::GenreMissing)?;
        Ok(vec![BookEvent::moved_to_editing(self.book_id, genre)])
    }
}

/// A book under editorial review: reviewers, translations, formats, and the
/// committee verdict are collected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderEditingBook {
    pub book_id: AggregateId,
    pub genre: Genre,
    pub isbn: Option<Isbn>,
    pub approval: Option<CommitteeApproval>,
    pub reviewers: Vec<Reviewer>,
    pub translations: Vec<Translation>,
    pub formats: Vec<Format>,
}

impl UnderEditingBook {
    /// Sets the ISBN. It can be set once and never changed.
    pub fn set_isbn(&self, isbn: Isbn) -> Result<Vec<BookEvent>, BookError> {
        if self.isbn.is_some() {
            return Err(BookError::IsbnAlreadySet);
        }
        Ok(vec![BookEvent::isbn_set(self.book_id, isbn)])
    }

    /// Records a translation, up to the policy limit.
    pub fn add_translation(
        &self,
        translation: Translation,
        max_translations: usize,
    ) -> Result<Vec<BookEvent>, BookError> {
        if self.translations.len() >= max_translations {
            return Err(BookError::TranslationLimitReached {
                max: max_translations,
            });
        }
        Ok(vec![BookEvent::translation_added(self.book_id, translation)])
    }

    /// Adds an edition format. Format types are unique within a book.
    pub fn add_format(&self, format: Format) -> Result<Vec<BookEvent>, BookError> {
        if self
            .formats
            .iter()
            .any(|f| f.format_type == format.format_type)
        {
            return Err(BookError::FormatAlreadyExists {
                format_type: format.format_type.to_string(),
            });
        }
        Ok(vec![BookEvent::format_added(self.book_id, format)])
    }

    /// Removes an edition format by type.
    pub fn remove_format(&self, format_type: FormatType) -> Result<Vec<BookEvent>, BookError> {
        if !self.formats.iter().any(|f| f.format_type == format_type) {
            return Err(BookError::FormatNotFound {
                format_type: format_type.to_string(),
            });
        }
        Ok(vec![BookEvent::format_removed(self.book_id, format_type)])
    }

    /// Records a reviewer's sign-off.
    pub fn add_reviewer(&self, reviewer: Reviewer) -> Result<Vec<BookEvent>, BookError> {
        Ok(vec![BookEvent::reviewer_added(self.book_id, reviewer.name)])
    }

    /// Records the committee verdict. Requires the reviewer threshold and
    /// happens at most once.
    pub fn approve(
        &self,
        approval: CommitteeApproval,
        minimum_reviewers: usize,
    ) -> Result<Vec<BookEvent>, BookError> {
        if self.approval.is_some() {
            return Err(BookError::AlreadyApproved);
        }
        if self.reviewers.len() < minimum_reviewers {
            return Err(BookError::NotEnoughReviewers {
                required: minimum_reviewers,
                actual: self.reviewers.len(),
            });
        }
        Ok(vec![BookEvent::approved(self.book_id, approval)])
    }

    /// Sends the book to the printing press. Requires a recorded committee
    /// verdict, the reviewer threshold, and an open slot in the genre
    /// quota, which the caller has already resolved into
    /// `genre_limit_reached`.
    pub fn move_to_printing(
        &self,
        minimum_reviewers: usize,
        genre_limit_reached: bool,
    ) -> Result<Vec<BookEvent>, BookError> {
        if self.approval.is_none() {
            return Err(BookError::NotApproved);
        }
        if self.reviewers.len() < minimum_reviewers {
            return Err(BookError::NotEnoughReviewers {
                required: minimum_reviewers,
                actual: self.reviewers.len(),
            });
        }
        if !genre_limit_reached {
            return Err(BookError::GenreLimitNotReached {
                genre: self.genre.to_string(),
            });
        }
        Ok(vec![BookEvent::moved_to_printing(self.book_id)])
    }
}

/// A book at the printing press, waiting for its publication gate to open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InPrintBook {
    pub book_id: AggregateId,
    pub isbn: Option<Isbn>,
    pub reviewer_count: usize,
    pub translation_count: usize,
    pub formats: Vec<Format>,
}

impl InPrintBook {
    /// Publishes the book. Requires an ISBN, the translation threshold,
    /// and the reviewer threshold.
    pub fn move_to_published(
        &self,
        required_translations: usize,
        minimum_reviewers: usize,
    ) -> Result<Vec<BookEvent>, BookError> {
        let isbn = self.isbn.clone().ok_or(BookError::IsbnMissing)?;
        if self.translation_count < required_translations {
            return Err(BookError::NotEnoughTranslations {
                required: required_translations,
                actual: self.translation_count,
            });
        }
        if self.reviewer_count < minimum_reviewers {
            return Err(BookError::NotEnoughReviewers {
                required: minimum_reviewers,
                actual: self.reviewer_count,
            });
        }
        Ok(vec![BookEvent::moved_to_published(self.book_id, isbn)])
    }
}

/// A published book; only its sales figures still matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedBook {
    pub book_id: AggregateId,
    pub formats: Vec<Format>,
}

impl PublishedBook {
    /// Fraction of printed copies that remain unsold, or zero when nothing
    /// was printed.
    pub fn unsold_ratio(&self) -> f64 {
        let total: u64 = self.formats.iter().map(|f| u64::from(f.total_copies)).sum();
        if total == 0 {
            return 0.0;
        }
        let unsold: u64 = self
            .formats
            .iter()
            .map(|f| u64::from(f.unsold_copies()))
            .sum();
        unsold as f64 / total as f64
    }

    /// Retires the book, provided the stock of unsold copies is small
    /// enough.
    pub fn move_to_out_of_print(
        &self,
        max_unsold_ratio: f64,
    ) -> Result<Vec<BookEvent>, BookError> {
        let ratio = self.unsold_ratio();
        if ratio > max_unsold_ratio {
            return Err(BookError::UnsoldRatioTooHigh {
                unsold_ratio: ratio * 100.0,
                threshold: max_unsold_ratio * 100.0,
            });
        }
        Ok(vec![BookEvent::moved_to_out_of_print(self.book_id)])
    }
}

/// A retired book. Terminal; no commands apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutOfPrintBook {
    pub book_id: AggregateId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_chapters(titles: &[&str]) -> DraftBook {
        DraftBook {
            book_id: AggregateId::new(),
            genre: Some(Genre::new("Fantasy").unwrap()),
            chapter_titles: titles.iter().map(|t| ChapterTitle::new(*t)).collect(),
        }
    }

    fn under_editing() -> UnderEditingBook {
        UnderEditingBook {
            book_id: AggregateId::new(),
            genre: Genre::new("Fantasy").unwrap(),
            isbn: None,
            approval: None,
            reviewers: Vec::new(),
            translations: Vec::new(),
            formats: Vec::new(),
        }
    }

    #[test]
    fn chapters_must_arrive_in_sequence() {
        let draft = draft_with_chapters(&["Chapter 1"]);

        let events = draft
            .add_chapter(ChapterTitle::new("Chapter 2"), ChapterContent::new(""))
            .unwrap();
        assert_eq!(events.len(), 1);

        let err = draft
            .add_chapter(ChapterTitle::new("Chapter 3"), ChapterContent::new(""))
            .unwrap_err();
        assert_eq!(
            err,
            BookError::ChapterOutOfSequence {
                expected: "Chapter 2".to_string()
            }
        );
    }

    #[test]
    fn duplicate_chapter_title_is_reported_before_sequence() {
        let draft = draft_with_chapters(&["Chapter 1"]);
        let err = draft
            .add_chapter(ChapterTitle::new("Chapter 1"), ChapterContent::new(""))
            .unwrap_err();
        assert_eq!(
            err,
            BookError::DuplicateChapterTitle {
                title: "Chapter 1".to_string()
            }
        );
    }

    #[test]
    fn editing_requires_chapters_and_genre() {
        let empty = DraftBook {
            book_id: AggregateId::new(),
            genre: Some(Genre::new("Fantasy").unwrap()),
            chapter_titles: Vec::new(),
        };
        assert_eq!(empty.move_to_editing().unwrap_err(), BookError::NoChapters);

        let no_genre = DraftBook {
            book_id: AggregateId::new(),
            genre: None,
            chapter_titles: vec![ChapterTitle::new("Chapter 1")],
        };
        assert_eq!(
            no_genre.move_to_editing().unwrap_err(),
            BookError::GenreMissing
        );

        assert!(draft_with_chapters(&["Chapter 1"]).move_to_editing().is_ok());
    }

    #[test]
    fn isbn_is_set_once() {
        let mut book = under_editing();
        let isbn = Isbn::new("0321125215").unwrap();
        assert!(book.set_isbn(isbn.clone()).is_ok());

        book.isbn = Some(isbn.clone());
        assert_eq!(book.set_isbn(isbn).unwrap_err(), BookError::IsbnAlreadySet);
    }

    #[test]
    fn translations_are_capped() {
        let mut book = under_editing();
        book.translations = (0..5)
            .map(|i| Translation::new(format!("Language {i}"), "translator"))
            .collect();

        let err = book
            .add_translation(Translation::new("French", "M. Dubois"), 5)
            .unwrap_err();
        assert_eq!(err, BookError::TranslationLimitReached { max: 5 });
    }

    #[test]
    fn format_types_are_unique() {
        let mut book = under_editing();
        book.formats = vec![Format::new("hardcover", 100, 0).unwrap()];

        let err = book
            .add_format(Format::new("hardcover", 200, 0).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            BookError::FormatAlreadyExists {
                format_type: "hardcover".to_string()
            }
        );

        assert!(book.add_format(Format::new("paperback", 200, 0).unwrap()).is_ok());

        let err = book
            .remove_format(FormatType::new("e-book"))
            .unwrap_err();
        assert_eq!(
            err,
            BookError::FormatNotFound {
                format_type: "e-book".to_string()
            }
        );
    }

    #[test]
    fn approval_needs_enough_reviewers_and_happens_once() {
        let mut book = under_editing();
        let approval = CommitteeApproval::new("solid manuscript", true).unwrap();

        let err = book.approve(approval.clone(), 3).unwrap_err();
        assert_eq!(
            err,
            BookError::NotEnoughReviewers {
                required: 3,
                actual: 0
            }
        );

        book.reviewers = vec![
            Reviewer::new("A"),
            Reviewer::new("B"),
            Reviewer::new("C"),
        ];
        assert!(book.approve(approval.clone(), 3).is_ok());

        book.approval = Some(approval.clone());
        assert_eq!(book.approve(approval, 3).unwrap_err(), BookError::AlreadyApproved);
    }

    #[test]
    fn printing_requires_a_verdict_reviewers_and_quota() {
        let mut book = under_editing();
        book.reviewers = vec![
            Reviewer::new("Ana"),
            Reviewer::new("Ben"),
            Reviewer::new("Cleo"),
        ];

        assert_eq!(
            book.move_to_printing(3, true).unwrap_err(),
            BookError::NotApproved
        );

        book.approval = Some(CommitteeApproval::new("approved", true).unwrap());
        assert_eq!(
            book.move_to_printing(4, true).unwrap_err(),
            BookError::NotEnoughReviewers {
                required: 4,
                actual: 3
            }
        );
        assert_eq!(
            book.move_to_printing(3, false).unwrap_err(),
            BookError::GenreLimitNotReached {
                genre: "Fantasy".to_string()
            }
        );
        assert!(book.move_to_printing(3, true).is_ok());
    }

    #[test]
    fn a_negative_verdict_still_counts_as_a_verdict() {
        let mut book = under_editing();
        book.reviewers = vec![
            Reviewer::new("Ana"),
            Reviewer::new("Ben"),
            Reviewer::new("Cleo"),
        ];
        book.approval = Some(CommitteeApproval::new("needs work", false).unwrap());

        // The committee spoke once; the verdict's polarity does not gate
        // printing, and a second verdict is not accepted.
        assert!(book.move_to_printing(3, true).is_ok());
        assert_eq!(
            book.approve(CommitteeApproval::new("again", true).unwrap(), 3)
                .unwrap_err(),
            BookError::AlreadyApproved
        );
    }

    #[test]
    fn publication_gates() {
        let book = InPrintBook {
            book_id: AggregateId::new(),
            isbn: None,
            reviewer_count: 3,
            translation_count: 5,
            formats: Vec::new(),
        };
        assert_eq!(book.move_to_published(5, 3).unwrap_err(), BookError::IsbnMissing);

        let book = InPrintBook {
            isbn: Some(Isbn::new("0321125215").unwrap()),
            translation_count: 4,
            ..book
        };
        assert_eq!(
            book.move_to_published(5, 3).unwrap_err(),
            BookError::NotEnoughTranslations {
                required: 5,
                actual: 4
            }
        );

        let book = InPrintBook {
            translation_count: 5,
            ..book
        };
        assert!(book.move_to_published(5, 3).is_ok());
    }

    #[test]
    fn retirement_checks_the_unsold_ratio() {
        let book = PublishedBook {
            book_id: AggregateId::new(),
            formats: vec![Format::new("hardcover", 1000, 850).unwrap()],
        };
        let err = book.move_to_out_of_print(0.1).unwrap_err();
        match err {
            BookError::UnsoldRatioTooHigh { unsold_ratio, threshold } => {
                assert!((unsold_ratio - 15.0).abs() < f64::EPSILON);
                assert!((threshold - 10.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let book = PublishedBook {
            book_id: book.book_id,
            formats: vec![Format::new("hardcover", 1000, 950).unwrap()],
        };
        assert!(book.move_to_out_of_print(0.1).is_ok());
    }

    #[test]
    fn retirement_boundary_is_inclusive() {
        let book_id = AggregateId::new();
        let with_sales = |sold| PublishedBook {
            book_id,
            formats: vec![Format::new("paperback", 100, sold).unwrap()],
        };

        // Everything sold.
        assert!(with_sales(100).move_to_out_of_print(0.1).is_ok());

        // Exactly at the threshold: 10% unsold against a 10% limit.
        assert!(with_sales(90).move_to_out_of_print(0.1).is_ok());

        // One copy past it.
        match with_sales(89).move_to_out_of_print(0.1).unwrap_err() {
            BookError::UnsoldRatioTooHigh { unsold_ratio, .. } => {
                assert!((unsold_ratio - 11.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nothing_printed_means_nothing_unsold() {
        let book = PublishedBook {
            book_id: AggregateId::new(),
            formats: Vec::new(),
        };
        assert_eq!(book.unsold_ratio(), 0.0);
        assert!(book.move_to_out_of_print(0.1).is_ok());
    }
}
