//! Integration tests against a disposable MySQL container.
//!
//! These need a running Docker daemon: `cargo test -- --ignored`.

use pinhole_core::{NewShortUrl, OwnerId, ShortCode};
use pinhole_storage::{MySqlRepository, ReadRepository, Repository, StorageError};
use pinhole_test_infra::mysql::{MySqlServer, MysqlConfig};

struct Fixture {
    _mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MysqlConfig::builder().build())
            .await
            .expect("start mysql");
        let pool = mysql
            .connect_with_schema(include_str!("../ddl/mysql/short_urls.sql"))
            .await
            .expect("connect and create schema");

        Self {
            _mysql: mysql,
            repo: MySqlRepository::new(pool),
        }
    }
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

fn new_url(owner: i64, url: &str, short_code: &str) -> NewShortUrl {
    NewShortUrl {
        owner_id: OwnerId::new(owner),
        long_url: url.to_string(),
        short_code: code(short_code),
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_and_find_by_code() {
    let fixture = Fixture::start().await;

    let inserted = fixture
        .repo
        .insert(new_url(1, "https://example.com", "abc123"))
        .await
        .unwrap();

    let got = fixture.repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
    assert_eq!(got, inserted);
    assert_eq!(got.long_url, "https://example.com");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn short_codes_are_case_sensitive() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(new_url(1, "https://one.example", "AbCdEf"))
        .await
        .unwrap();
    fixture
        .repo
        .insert(new_url(1, "https://two.example", "abcdef"))
        .await
        .unwrap();

    let upper = fixture.repo.find_by_code(&code("AbCdEf")).await.unwrap().unwrap();
    assert_eq!(upper.long_url, "https://one.example");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_conflicts_when_code_already_exists() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(new_url(1, "https://one.example", "abc123"))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(new_url(2, "https://two.example", "abc123"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::CodeConflict(_)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_conflicts_when_owner_already_shortened_url() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(new_url(1, "https://example.com", "abc123"))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(new_url(1, "https://example.com", "def456"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::OwnerUrlConflict { .. }));

    let existing = fixture
        .repo
        .find_by_owner_and_url(OwnerId::new(1), "https://example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(existing.short_code, code("abc123"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_by_owner_is_scoped() {
    let fixture = Fixture::start().await;

    fixture.repo.insert(new_url(1, "https://a.example", "aaa")).await.unwrap();
    fixture.repo.insert(new_url(2, "https://b.example", "bbb")).await.unwrap();
    fixture.repo.insert(new_url(1, "https://c.example", "ccc")).await.unwrap();

    let rows = fixture.repo.list_by_owner(OwnerId::new(1)).await.unwrap();
    let codes: Vec<&str> = rows.iter().map(|row| row.short_code.as_str()).collect();
    assert_eq!(codes, vec!["aaa", "ccc"]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn delete_removes_the_row() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(new_url(1, "https://example.com", "to-delete"))
        .await
        .unwrap();

    assert!(fixture.repo.delete_by_code(&code("to-delete")).await.unwrap());
    assert!(fixture.repo.find_by_code(&code("to-delete")).await.unwrap().is_none());
    assert!(!fixture.repo.delete_by_code(&code("to-delete")).await.unwrap());

    // Hard delete frees the owner/url pair.
    fixture
        .repo
        .insert(new_url(1, "https://example.com", "again"))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires docker"]
async fn owner_scoped_delete_leaves_other_owners_rows() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(new_url(1, "https://example.com", "owned"))
        .await
        .unwrap();

    assert!(!fixture
        .repo
        .delete_by_owner_and_code(OwnerId::new(2), &code("owned"))
        .await
        .unwrap());
    assert!(fixture.repo.find_by_code(&code("owned")).await.unwrap().is_some());

    assert!(fixture
        .repo
        .delete_by_owner_and_code(OwnerId::new(1), &code("owned"))
        .await
        .unwrap());
    assert!(fixture.repo.find_by_code(&code("owned")).await.unwrap().is_none());
}
