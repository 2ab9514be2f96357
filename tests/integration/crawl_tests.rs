//! End-to-end crawls against mock documentation sites

use shiori::config::{Config, CrawlerConfig, DocSeed, IndexConfig, OutputConfig, UserAgentConfig};
use shiori::crawler::{crawl, Coordinator};
use shiori::index::{DocumentIndex, TantivyIndex};
use shiori::state::TaskState;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `docs` into `dir`
fn create_test_config(dir: &Path, max_depth: u32, docs: Vec<DocSeed>) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            max_concurrent_fetches: 4,
            fetch_timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            download_path: dir.join("pages").to_string_lossy().into_owned(),
            index_path: dir.join("index").to_string_lossy().into_owned(),
        },
        index: IndexConfig::default(),
        docs,
    }
}

fn doc_seed(name: &str, url: String) -> DocSeed {
    DocSeed {
        name: name.to_string(),
        version: "1.0".to_string(),
        url,
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, page: ResponseTemplate, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(page)
        .expect(expected)
        .mount(server)
        .await;
}

fn open_index(config: &Config) -> TantivyIndex {
    TantivyIndex::open_or_create(Path::new(&config.output.index_path), &config.index)
        .expect("Failed to open index")
}

#[tokio::test]
async fn test_crawl_follows_same_host_links_to_max_depth() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<p>Welcome to the collection guide.</p>
               <a href="/a">Vectors</a>
               <a href="http://other.test/">Elsewhere</a>"#,
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/a",
        html_page(
            "Vectors",
            r#"<p>A contiguous growable array type.</p><a href="/b">Deeper</a>"#,
        ),
        1,
    )
    .await;
    mount_page(&server, "/b", html_page("Too deep", "unreachable"), 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        1,
        vec![doc_seed("guide", format!("{}/", server.uri()))],
    );

    let reports = crawl(config.clone()).await.expect("Crawl failed");
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report.count(TaskState::Fetched), 2);
    assert_eq!(report.pages_indexed, 2);
    assert_eq!(report.links_offsite, 1);
    assert_eq!(report.total_failures(), 0);

    let root = dir.path().join("pages").join("guide").join("1.0");
    assert!(root.join("index.html").exists());
    assert!(root.join("a.html").exists());
    assert!(!root.join("b.html").exists());

    let index = open_index(&config);
    assert_eq!(index.num_docs().unwrap(), 2);

    let hits = index.query("growable").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(Path::new(&hits[0]), root.join("a.html"));

    let hits = index.fuzzy_query("welcom").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(Path::new(&hits[0]), root.join("index.html"));
}

#[tokio::test]
async fn test_page_linked_many_times_is_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/x">x</a> <a href="/y">y</a> <a href="/shared">shared</a>"#,
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/x",
        html_page("X", r#"<a href="/shared">s</a> <a href="/y">y</a> <a href="/">home</a>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/y",
        html_page("Y", r#"<a href="/shared">s</a> <a href="/x">x</a> <a href="/">home</a>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/shared",
        html_page("Shared", r#"<a href="/x">x</a> <a href="/y">y</a> <a href="/">home</a>"#),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        5,
        vec![doc_seed("graph", format!("{}/", server.uri()))],
    );

    let reports = crawl(config.clone()).await.expect("Crawl failed");
    let report = &reports[0];

    assert_eq!(report.count(TaskState::Fetched), 4);
    assert_eq!(report.pages_indexed, 4);
    assert_eq!(open_index(&config).num_docs().unwrap(), 4);
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/missing">gone</a> <a href="/broken">broken</a> <a href="/ok">ok</a>"#,
        ),
        1,
    )
    .await;
    mount_page(&server, "/missing", ResponseTemplate::new(404), 1).await;
    mount_page(&server, "/broken", ResponseTemplate::new(500), 1).await;
    mount_page(&server, "/ok", html_page("Ok", "<p>still indexed</p>"), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        2,
        vec![doc_seed("flaky", format!("{}/", server.uri()))],
    );

    let reports = crawl(config.clone()).await.expect("Crawl failed");
    let report = &reports[0];

    assert_eq!(report.count(TaskState::Fetched), 2);
    assert_eq!(report.count(TaskState::FailedStatus), 2);
    assert_eq!(report.total_tasks(), 4);

    let root = dir.path().join("pages").join("flaky").join("1.0");
    assert!(!root.join("missing.html").exists());

    let hits = open_index(&config).query("indexed").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(Path::new(&hits[0]), root.join("ok.html"));
}

#[tokio::test]
async fn test_recrawl_overwrites_documents() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html_page("Home", r#"<p>reference manual</p><a href="/page">page</a>"#),
        2,
    )
    .await;
    mount_page(&server, "/page", html_page("Page", "<p>details</p>"), 2).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        1,
        vec![doc_seed("manual", format!("{}/", server.uri()))],
    );

    crawl(config.clone()).await.expect("First crawl failed");
    crawl(config.clone()).await.expect("Second crawl failed");

    let index = open_index(&config);
    assert_eq!(index.num_docs().unwrap(), 2);
    assert_eq!(index.query("manual").unwrap().len(), 1);
}

#[tokio::test]
async fn test_doc_sets_share_one_index() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, "/", html_page("Html", "<p>hypertext elements</p>"), 1).await;
    mount_page(&second, "/", html_page("Css", "<p>cascading selectors</p>"), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        1,
        vec![
            doc_seed("html", format!("{}/", first.uri())),
            doc_seed("css", format!("{}/", second.uri())),
        ],
    );

    let reports = crawl(config.clone()).await.expect("Crawl failed");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].name, "html");
    assert_eq!(reports[1].name, "css");

    let index = open_index(&config);
    assert_eq!(index.num_docs().unwrap(), 2);

    let pages = dir.path().join("pages");
    let hits = index.query("selectors").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(
        Path::new(&hits[0]),
        pages.join("css").join("1.0").join("index.html")
    );
}

#[tokio::test]
async fn test_coordinator_with_shared_index() {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/", html_page("Docs", r#"<a href="intro">intro</a>"#), 1).await;
    mount_page(&server, "/docs/intro", html_page("Intro", "<p>getting started</p>"), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 1, vec![]);
    let index = Arc::new(open_index(&config));
    let coordinator =
        Coordinator::new(&config, index.clone()).expect("Failed to create coordinator");

    let seed = doc_seed("book", format!("{}/docs/", server.uri()));
    let report = coordinator.crawl(&seed, 1).await.expect("Crawl failed");
    assert_eq!(report.count(TaskState::Fetched), 2);

    let root = dir.path().join("pages").join("book").join("1.0");
    assert!(root.join("docs").join("index.html").exists());
    assert!(root.join("docs").join("intro.html").exists());

    let hits = index.query("started").unwrap();
    assert_eq!(hits.len(), 1);
    index.close().unwrap();
}
