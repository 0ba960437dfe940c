//! Replays emitted scripts into SQLite to check they are valid statements
//!
//! Fixture text avoids backslashes, so every literal is a plain
//! single-quoted string both dialects accept.

use crate::fixture::*;
use commentary_harvest::assign_id;
use commentary_harvest::compose::compose;
use commentary_harvest::crawler::crawl;
use commentary_harvest::reconcile::reconcile;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

const SCHEMA: &str = r#"
create table "books" (
    "id" text primary key,
    "index" integer not null,
    "name" text not null,
    "count" integer
);
create table "commentaries" (
    "book_id" text not null references "books" ("id"),
    "book_chapter" integer not null,
    "content" text not null,
    "description" text not null
);
"#;

fn open_database() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
}

fn replay(conn: &Connection, script: &Path) {
    let sql = fs::read_to_string(script).unwrap();
    conn.execute_batch(&sql)
        .unwrap_or_else(|e| panic!("Failed to replay {}: {}", script.display(), e));
}

#[tokio::test]
async fn test_replay_crawl_compose_and_count() {
    let server = MockServer::start().await;
    mount_two_books(&server).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, out.path());
    crawl(&config, Vec::new()).await.unwrap();

    let combined = Path::new(&config.output.combined_path);
    let composed = compose(Path::new(&config.output.commentaries_dir), combined).unwrap();
    assert_eq!(composed.inputs.len(), 2);

    let conn = open_database();
    replay(&conn, Path::new(&config.output.books_path));
    replay(&conn, combined);

    let names: Vec<String> = conn
        .prepare(r#"select "name" from "books" order by "index""#)
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(names, vec!["Genesis", "Exodus"]);

    let description: String = conn
        .query_row(
            r#"select "description" from "commentaries" where "book_id" = ?1 and "book_chapter" = 2"#,
            [assign_id("Exodus").to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(description, "Summary of Exodus 2: God's word.");

    // Seed data as exported after the crawl: Genesis has 3 chapters, Exodus 2
    let seed_dir = Path::new(&config.output.seed_data_dir);
    fs::create_dir_all(seed_dir).unwrap();
    fs::write(&config.output.seed_books_path, r#"["Genesis", "Exodus"]"#).unwrap();
    fs::write(
        seed_dir.join("Genesis.json"),
        r#"{"book": "Genesis", "chapters": {"1": {}, "2": {}, "3": {}}}"#,
    )
    .unwrap();
    fs::write(
        seed_dir.join("Exodus.json"),
        r#"{"book": "Exodus", "chapters": [{}, {}]}"#,
    )
    .unwrap();

    let counts = Path::new(&config.output.counts_path);
    reconcile(Path::new(&config.output.seed_books_path), seed_dir, counts).unwrap();
    replay(&conn, counts);

    let count: i64 = conn
        .query_row(
            r#"select "count" from "books" where "id" = ?1"#,
            [assign_id("Genesis").to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 3);

    let per_book: i64 = conn
        .query_row(
            r#"select count(*) from "commentaries" where "book_id" = ?1"#,
            [assign_id("Genesis").to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(per_book, 3);
}

#[tokio::test]
async fn test_compose_is_idempotent_after_crawl() {
    let server = MockServer::start().await;
    mount_two_books(&server).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, out.path());
    crawl(&config, Vec::new()).await.unwrap();

    let dir = Path::new(&config.output.commentaries_dir);
    let combined = Path::new(&config.output.combined_path);

    compose(dir, combined).unwrap();
    let first = fs::read(combined).unwrap();
    compose(dir, combined).unwrap();
    let second = fs::read(combined).unwrap();
    assert_eq!(first, second);

    // Header plus 2 x (header + 3 statements)
    assert_eq!(read_lines(combined).len(), 1 + 2 * 4);
}
