//! Index behavior as seen through the public trait

use shiori::config::IndexConfig;
use shiori::index::{DocumentIndex, IndexError, TantivyIndex};
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir, fuzzy_distance: u8) -> TantivyIndex {
    let config = IndexConfig {
        fuzzy_distance,
        ..IndexConfig::default()
    };
    TantivyIndex::open_or_create(&dir.path().join("index"), &config).expect("Failed to open index")
}

#[test]
fn test_fuzzy_counts_transposition_as_one_edit() {
    let dir = TempDir::new().unwrap();
    let index = open(&dir, 1);
    index.insert("a/b", "The quick brown fox").unwrap();

    assert_eq!(index.fuzzy_query("qwick").unwrap(), vec!["a/b".to_string()]);
    assert_eq!(index.fuzzy_query("qiuck").unwrap(), vec!["a/b".to_string()]);
    assert!(index.fuzzy_query("qxxck").unwrap().is_empty());
}

#[test]
fn test_fuzzy_distance_zero_is_exact() {
    let dir = TempDir::new().unwrap();
    let index = open(&dir, 0);
    index.insert("a/b", "The quick brown fox").unwrap();

    assert_eq!(index.fuzzy_query("quick").unwrap(), vec!["a/b".to_string()]);
    assert!(index.fuzzy_query("qwick").unwrap().is_empty());
}

#[test]
fn test_path_qualifier_selects_exact_document() {
    let dir = TempDir::new().unwrap();
    let index = open(&dir, 1);
    index.insert("docs/std/vec.html", "growable array").unwrap();
    index.insert("docs/std/slice.html", "array view").unwrap();

    assert_eq!(index.query("array").unwrap().len(), 2);
    assert_eq!(
        index.query(r#"path:"docs/std/vec.html""#).unwrap(),
        vec!["docs/std/vec.html".to_string()]
    );
    assert_eq!(
        index.query("+array -growable").unwrap(),
        vec!["docs/std/slice.html".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_index_across_blocking_tasks() {
    let dir = TempDir::new().unwrap();
    let index: Arc<dyn DocumentIndex> = Arc::new(open(&dir, 1));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let index = Arc::clone(&index);
        tasks.push(tokio::task::spawn_blocking(move || {
            index.insert(&format!("page/{}", i), &format!("shared topic number{}", i))
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(index.num_docs().unwrap(), 8);
    assert_eq!(index.query("topic").unwrap().len(), 8);
    assert_eq!(index.query("number3").unwrap(), vec!["page/3".to_string()]);

    index.close().unwrap();
    assert!(matches!(index.query("topic"), Err(IndexError::Closed)));
}
