//! A small commentary site served by wiremock
//!
//! Layout mirrors the real site: an index page listing books, one page per
//! book listing its chapters, one page per chapter.

use commentary_harvest::config::Config;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INDEX_PATH: &str = "/commentary/index.php";
pub const BOOK_PATH: &str = "/commentary/book.php";
pub const CHAPTER_PATH: &str = "/commentary/chapter.php";

/// Creates a test configuration pointing at `server` and writing under `out`
pub fn test_config(server: &MockServer, out: &Path) -> Config {
    let mut config = Config::default();

    config.site.index_url = format!("{}{}", server.uri(), INDEX_PATH);
    config.site.excluded_links = vec![
        "javascript:void(0);".to_string(),
        "/commentary/help.php?topic=About".to_string(),
    ];

    // Very short for testing
    config.navigator.settle_delay_ms = 0;
    config.navigator.ready_timeout_ms = 40;
    config.navigator.poll_interval_ms = 10;
    config.navigator.max_attempts = 2;
    config.navigator.backoff_base_ms = 1;
    config.navigator.request_timeout_secs = 5;

    let out_str = |name: &str| out.join(name).to_string_lossy().into_owned();
    config.output.books_path = out_str("books.sql");
    config.output.commentaries_dir = out_str("commentaries");
    config.output.combined_path = out_str("commentaries.sql");
    config.output.seed_data_dir = out_str("seed-data");
    config.output.seed_books_path = out_str("seed-data/Books.json");
    config.output.counts_path = out_str("book_counts.sql");

    config
}

pub fn index_page(books: &[&str]) -> String {
    let rows: String = books
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                "<div class=\"row\"><a href=\"{}?b={}\">{}</a></div>\n",
                BOOK_PATH,
                i + 1,
                name
            )
        })
        .collect();

    format!(
        r#"<html><body>
<nav><a href="javascript:void(0);">Menu</a> <a href="/commentary/help.php?topic=About">Help</a></nav>
<div class="col-md-6">
{}</div>
</body></html>"#,
        rows
    )
}

pub fn book_page(book: u32, chapters: &[u32]) -> String {
    let items: String = chapters
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"{}?b={}&amp;c={}\">{}</a></li>\n",
                CHAPTER_PATH, book, c, c
            )
        })
        .collect();

    format!(
        r##"<html><body>
<a href="#top">Top</a>
<ul>
<li><a href="{}?b={}&amp;c=0">Introduction</a></li>
{}</ul>
</body></html>"##,
        CHAPTER_PATH, book, items
    )
}

pub fn chapter_page(name: &str, chapter: u32) -> String {
    format!(
        r#"<html><body>
<a id="read-this-chapter" href="/bible/{lower}/{chapter}">Read all of {name} {chapter} </a>
<div class="text"><p>Summary of {name} {chapter}: God's word.</p>
<p>Verses <a href="/bible/{lower}/{chapter}/1">1-5</a> explained.</p>
    <span class="four">Complete | Concise</span>
</div>
</body></html>"#,
        name = name,
        lower = name.to_lowercase(),
        chapter = chapter
    )
}

/// A chapter page whose content region never rendered
pub fn chapter_page_without_content(name: &str, chapter: u32) -> String {
    format!(
        r#"<html><body>
<a id="read-this-chapter">Read all of {} {} </a>
<div class="loading">Loading...</div>
</body></html>"#,
        name, chapter
    )
}

pub async fn mount_index(server: &MockServer, books: &[&str]) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(books)))
        .mount(server)
        .await;
}

pub async fn mount_book(server: &MockServer, book: u32, chapters: &[u32]) {
    Mock::given(method("GET"))
        .and(path(BOOK_PATH))
        .and(query_param("b", book.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(book, chapters)))
        .mount(server)
        .await;
}

pub async fn mount_chapter(server: &MockServer, book: u32, chapter: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(CHAPTER_PATH))
        .and(query_param("b", book.to_string()))
        .and(query_param("c", chapter.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts two books (Genesis, Exodus), each with chapters 1 to 3
pub async fn mount_two_books(server: &MockServer) {
    mount_index(server, &["Genesis", "Exodus"]).await;
    for (b, name) in [(1, "Genesis"), (2, "Exodus")] {
        mount_book(server, b, &[1, 2, 3]).await;
        for c in 1..=3 {
            mount_chapter(server, b, c, chapter_page(name, c)).await;
        }
    }
}

/// Reads a file's lines
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
        .lines()
        .map(str::to_string)
        .collect()
}
