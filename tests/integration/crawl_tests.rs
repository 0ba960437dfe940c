//! End-to-end crawl tests against the fixture site

use crate::fixture::*;
use commentary_harvest::config::MismatchPolicy;
use commentary_harvest::crawler::{crawl, Crawler, HttpRenderer};
use commentary_harvest::{assign_id, HarvestError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn commentary_lines(out: &Path, book: &str) -> Vec<String> {
    read_lines(&out.join("commentaries").join(format!("{}.sql", book)))
}

#[tokio::test]
async fn test_full_crawl_two_books() {
    let server = MockServer::start().await;
    mount_two_books(&server).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, out.path());

    let report = crawl(&config, Vec::new()).await.unwrap();

    assert_eq!(report.books, 2);
    assert_eq!(report.branches, 2);
    assert_eq!(report.leaves_emitted, 6);
    assert!(report.is_clean());
    assert!(report.finished_at.is_some());

    // Roster in discovery order
    let books = read_lines(&out.path().join("books.sql"));
    assert_eq!(books.len(), 3);
    assert_eq!(books[0], "-- Books");
    assert_eq!(
        books[1],
        "insert into \"books\" (\"id\", \"index\", \"name\") values \
         ('411f3239-ffbe-3d44-abd0-8ac9eaec6489', 0, 'Genesis');"
    );
    assert_eq!(
        books[2],
        "insert into \"books\" (\"id\", \"index\", \"name\") values \
         ('0cdf051c-9386-3faa-95cb-c5cd3d2b69fb', 1, 'Exodus');"
    );

    // One artifact per book, three statements each, in chapter order
    let entries: Vec<_> = std::fs::read_dir(out.path().join("commentaries"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 2);

    for book in ["Genesis", "Exodus"] {
        let lines = commentary_lines(out.path(), book);
        assert_eq!(lines.len(), 4, "{} artifact", book);
        assert_eq!(lines[0], "-- Commentaries");
        for (i, line) in lines[1..].iter().enumerate() {
            assert!(line.starts_with("insert into \"commentaries\""));
            assert!(line.contains(&format!("values ({}, '{}'", i + 1, assign_id(book))));
        }
    }
}

#[tokio::test]
async fn test_emitted_content_is_cleaned() {
    let server = MockServer::start().await;
    mount_two_books(&server).await;

    let out = TempDir::new().unwrap();
    crawl(&test_config(&server, out.path()), vec!["Genesis".to_string()])
        .await
        .unwrap();

    let lines = commentary_lines(out.path(), "Genesis");
    let first = &lines[1];
    assert!(first.contains("'Summary of Genesis 1: God''s word.'"));
    assert!(first.contains("Verses 1-5 explained."));
    assert!(!first.contains("<a "));
    assert!(!first.contains("class=\"four\""));
    assert!(!first.contains("Concise"));
}

#[tokio::test]
async fn test_missing_content_region_is_skipped() {
    let server = MockServer::start().await;
    mount_index(&server, &["Genesis"]).await;
    mount_book(&server, 1, &[1, 2, 3]).await;
    mount_chapter(&server, 1, 1, chapter_page("Genesis", 1)).await;
    mount_chapter(&server, 1, 2, chapter_page_without_content("Genesis", 2)).await;
    mount_chapter(&server, 1, 3, chapter_page("Genesis", 3)).await;

    let out = TempDir::new().unwrap();
    let report = crawl(&test_config(&server, out.path()), Vec::new())
        .await
        .unwrap();

    assert_eq!(report.leaves_emitted, 2);
    assert_eq!(report.leaves_skipped, 1);
    assert_eq!(report.failed_branches, 0);

    let lines = commentary_lines(out.path(), "Genesis");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("values (1, "));
    assert!(lines[2].contains("values (3, "));
}

#[tokio::test]
async fn test_selection_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BOOK_PATH))
        .and(query_param("b", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(1, &[1])))
        .expect(0)
        .mount(&server)
        .await;
    mount_book(&server, 2, &[1, 2]).await;
    mount_chapter(&server, 2, 1, chapter_page("Exodus", 1)).await;
    mount_chapter(&server, 2, 2, chapter_page("Exodus", 2)).await;

    let out = TempDir::new().unwrap();
    let leviticus = out.path().join("commentaries").join("Leviticus.sql");
    std::fs::create_dir_all(leviticus.parent().unwrap()).unwrap();
    std::fs::write(&leviticus, "-- Commentaries\nearlier run;\n").unwrap();

    mount_index(&server, &["Genesis", "Exodus", "Leviticus"]).await;
    let report = crawl(
        &test_config(&server, out.path()),
        vec!["exodus".to_string(), "Jude".to_string()],
    )
    .await
    .unwrap();

    // The roster always lists every book
    assert_eq!(report.books, 3);
    assert_eq!(read_lines(&out.path().join("books.sql")).len(), 4);

    assert_eq!(report.branches, 1);
    assert_eq!(report.leaves_emitted, 2);
    assert_eq!(commentary_lines(out.path(), "Exodus").len(), 3);

    // Unselected books get a header-only artifact; earlier output is kept
    assert_eq!(commentary_lines(out.path(), "Genesis"), vec!["-- Commentaries"]);
    assert_eq!(
        commentary_lines(out.path(), "Leviticus"),
        vec!["-- Commentaries", "earlier run;"]
    );
}

#[tokio::test]
async fn test_failed_chapter_page_aborts_rest_of_book() {
    let server = MockServer::start().await;
    mount_index(&server, &["Genesis", "Exodus"]).await;
    mount_book(&server, 1, &[1, 2, 3]).await;
    mount_chapter(&server, 1, 1, chapter_page("Genesis", 1)).await;

    Mock::given(method("GET"))
        .and(path(CHAPTER_PATH))
        .and(query_param("b", "1"))
        .and(query_param("c", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CHAPTER_PATH))
        .and(query_param("b", "1"))
        .and(query_param("c", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chapter_page("Genesis", 3)))
        .expect(0)
        .mount(&server)
        .await;

    mount_book(&server, 2, &[1]).await;
    mount_chapter(&server, 2, 1, chapter_page("Exodus", 1)).await;

    let out = TempDir::new().unwrap();
    let report = crawl(&test_config(&server, out.path()), Vec::new())
        .await
        .unwrap();

    assert_eq!(report.failed_branches, 1);
    assert_eq!(report.leaves_emitted, 2);
    assert_eq!(report.leaves_skipped, 0);

    // Chapter 1 was written before the failure and stays
    let genesis = commentary_lines(out.path(), "Genesis");
    assert_eq!(genesis.len(), 2);
    assert!(genesis[1].contains("values (1, "));

    // The next book is still crawled
    let exodus = commentary_lines(out.path(), "Exodus");
    assert_eq!(exodus.len(), 2);
    assert!(exodus[1].contains(&assign_id("Exodus").to_string()));
}

#[tokio::test]
async fn test_failed_book_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    mount_index(&server, &["Genesis", "Exodus"]).await;

    Mock::given(method("GET"))
        .and(path(BOOK_PATH))
        .and(query_param("b", "1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    mount_book(&server, 2, &[1]).await;
    mount_chapter(&server, 2, 1, chapter_page("Exodus", 1)).await;

    let out = TempDir::new().unwrap();
    let report = crawl(&test_config(&server, out.path()), Vec::new())
        .await
        .unwrap();

    assert_eq!(report.failed_branches, 1);
    assert_eq!(report.leaves_emitted, 1);
    assert!(!report.is_clean());

    // Genesis keeps its header-only artifact
    assert_eq!(commentary_lines(out.path(), "Genesis"), vec!["-- Commentaries"]);
    assert_eq!(commentary_lines(out.path(), "Exodus").len(), 2);
}

#[tokio::test]
async fn test_identity_mismatch_is_reported() {
    let server = MockServer::start().await;
    mount_index(&server, &["Genesis"]).await;
    mount_book(&server, 1, &[1, 2]).await;
    mount_chapter(&server, 1, 1, chapter_page("Genesis", 1)).await;
    mount_chapter(&server, 1, 2, chapter_page("Genesys", 2)).await;

    let out = TempDir::new().unwrap();
    let report = crawl(&test_config(&server, out.path()), Vec::new())
        .await
        .unwrap();

    assert_eq!(report.identity_mismatches, 1);
    assert_eq!(report.leaves_emitted, 2);

    // Written under the name the page itself carries
    let stray = commentary_lines(out.path(), "Genesys");
    assert_eq!(stray.len(), 2);
    assert!(stray[1].contains(&assign_id("Genesys").to_string()));
}

#[tokio::test]
async fn test_identity_mismatch_skip_policy() {
    let server = MockServer::start().await;
    mount_index(&server, &["Genesis"]).await;
    mount_book(&server, 1, &[1, 2]).await;
    mount_chapter(&server, 1, 1, chapter_page("Genesis", 1)).await;
    mount_chapter(&server, 1, 2, chapter_page("Genesys", 2)).await;

    let out = TempDir::new().unwrap();
    let mut config = test_config(&server, out.path());
    config.identity.on_mismatch = MismatchPolicy::Skip;

    let report = crawl(&config, Vec::new()).await.unwrap();

    assert_eq!(report.identity_mismatches, 1);
    assert_eq!(report.leaves_emitted, 1);
    assert_eq!(report.leaves_skipped, 1);
    assert!(!out.path().join("commentaries").join("Genesys.sql").exists());
}

#[tokio::test]
async fn test_unreachable_index_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let result = crawl(&test_config(&server, out.path()), Vec::new()).await;

    assert!(matches!(result, Err(HarvestError::Render(_))));
    assert!(!out.path().join("books.sql").exists());
}

#[tokio::test]
async fn test_crawler_with_explicit_renderer() {
    let server = MockServer::start().await;
    mount_two_books(&server).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, out.path());
    let renderer = HttpRenderer::from_config(&config.navigator).unwrap();

    let crawler = Crawler::new(&config, renderer)
        .unwrap()
        .with_selection(["Genesis"]);
    let report = crawler.run().await.unwrap();

    assert_eq!(report.branches, 1);
    assert_eq!(report.leaves_emitted, 3);
}
