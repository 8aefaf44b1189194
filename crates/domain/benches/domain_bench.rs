use std::sync::Arc;

use common::AggregateId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::book::{
    Author, AuthorId, AuthorRef, InMemoryAuthorProvider, InMemoryPublisherProvider, Publisher,
    PublisherId, StubGenreQuota,
};
use domain::{
    AddChapter, AddReviewer, Aggregate, Book, BookEvent, BookService, CreateDraft, Genre,
    MoveToEditing, Title,
};
use event_log::{
    AppendOptions, EventLog, InMemoryEventLog, InMemoryOutbox, RecordedEvent, Version,
};

struct Registry {
    author_id: AuthorId,
    publisher_id: PublisherId,
}

async fn make_service(log: InMemoryEventLog) -> (BookService<InMemoryEventLog>, Registry) {
    let authors = InMemoryAuthorProvider::new();
    let author_id = AuthorId::new();
    authors
        .register(Author {
            author_id,
            first_name: "Bench".to_string(),
            last_name: "Author".to_string(),
        })
        .await;

    let publishers = InMemoryPublisherProvider::new();
    let publisher_id = PublisherId::new();
    publishers
        .register(Publisher {
            publisher_id,
            name: "Bench House".to_string(),
        })
        .await;

    let service = BookService::new(
        log,
        Arc::new(authors),
        Arc::new(publishers),
        Arc::new(StubGenreQuota::new(true)),
        Arc::new(InMemoryOutbox::new()),
    );

    (service, Registry {
        author_id,
        publisher_id,
    })
}

fn create_cmd(registry: &Registry, book_id: AggregateId) -> CreateDraft {
    CreateDraft::new(
        book_id,
        Title::new("Benchmark Book").unwrap(),
        AuthorRef::Existing(registry.author_id),
        registry.publisher_id,
        1,
        Some(Genre::new("Reference").unwrap()),
    )
}

fn make_record(aggregate_id: AggregateId, version: i64, event: &BookEvent) -> RecordedEvent {
    RecordedEvent::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type("Book")
        .event_type(domain::DomainEvent::event_type(event))
        .version(Version::new(version))
        .payload(event)
        .unwrap()
        .build()
}

fn bench_create_draft(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_draft", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (service, registry) = make_service(InMemoryEventLog::new()).await;
                let cmd = create_cmd(&registry, AggregateId::new());
                service.create_draft(cmd).await.unwrap();
            });
        });
    });
}

fn bench_add_reviewer(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (service, registry) = rt.block_on(make_service(InMemoryEventLog::new()));
    let book_id = AggregateId::new();

    rt.block_on(async {
        service
            .create_draft(create_cmd(&registry, book_id))
            .await
            .unwrap();
        service
            .add_chapter(AddChapter::new(book_id, "Chapter 1", ""))
            .await
            .unwrap();
        service
            .move_to_editing(MoveToEditing::new(book_id))
            .await
            .unwrap();
    });

    c.bench_function("domain/add_reviewer", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .add_reviewer(AddReviewer::new(book_id, "Bench Reviewer"))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_full_command_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/full_draft_chapter_editing", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (service, registry) = make_service(InMemoryEventLog::new()).await;
                let book_id = AggregateId::new();
                service
                    .create_draft(create_cmd(&registry, book_id))
                    .await
                    .unwrap();
                service
                    .add_chapter(AddChapter::new(book_id, "Chapter 1", "Benchmark."))
                    .await
                    .unwrap();
                service
                    .move_to_editing(MoveToEditing::new(book_id))
                    .await
                    .unwrap();
            });
        });
    });
}

fn populate_stream(
    rt: &tokio::runtime::Runtime,
    log: &InMemoryEventLog,
    book_id: AggregateId,
    event_count: i64,
) {
    rt.block_on(async {
        let created = BookEvent::draft_created(
            book_id,
            Title::new("Long Lived").unwrap(),
            domain::AuthorId::new(),
            domain::PublisherId::new(),
            1,
            Some(Genre::new("Reference").unwrap()),
        );
        let mut records = vec![make_record(book_id, 1, &created)];
        for v in 2..=event_count {
            let chapter = domain::Chapter::new(
                (v - 1) as u32,
                domain::book::ChapterTitle::new(format!("Chapter {}", v - 1)),
                domain::book::ChapterContent::new("text"),
            );
            let added = BookEvent::chapter_added(book_id, chapter);
            records.push(make_record(book_id, v, &added));
        }
        log.append(records, AppendOptions::new()).await.unwrap();
    });
}

fn bench_aggregate_reconstruction(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let log = InMemoryEventLog::new();
    let book_id = AggregateId::new();
    populate_stream(&rt, &log, book_id, 51);

    c.bench_function("domain/reconstruct_50_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                let records = log.read_all(book_id).await.unwrap();
                let mut book = Book::default();
                for record in &records {
                    let event: BookEvent = serde_json::from_value(record.payload.clone()).unwrap();
                    book.apply(event);
                }
            });
        });
    });
}

fn bench_aggregate_reconstruction_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let log = InMemoryEventLog::new();
    let book_id = AggregateId::new();
    populate_stream(&rt, &log, book_id, 100);

    c.bench_function("domain/reconstruct_100_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                let records = log.read_all(book_id).await.unwrap();
                let mut book = Book::default();
                for record in &records {
                    let event: BookEvent = serde_json::from_value(record.payload.clone()).unwrap();
                    book.apply(event);
                }
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_draft,
    bench_add_reviewer,
    bench_full_command_cycle,
    bench_aggregate_reconstruction,
    bench_aggregate_reconstruction_100,
);
criterion_main!(benches);
