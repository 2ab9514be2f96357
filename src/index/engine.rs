//! Tantivy-backed document index
//!
//! Inserts go through a single index writer and are committed immediately, so
//! a document is searchable as soon as `insert` returns. Queries run against a
//! manually reloaded reader that is refreshed after every commit.
//!
//! [`TantivyIndex::open_reader`] opens an existing index without a writer, so
//! searches can run while a crawl holds the writer lock.

use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, QueryParser};
use tantivy::schema::Value;
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::config::IndexConfig;
use crate::index::schema::{build_schema, register_analyzers, Fields};
use crate::index::{DocumentIndex, IndexError, IndexResult};

/// Writer and reader; dropped on close
struct OpenHandles {
    /// Absent for indexes opened read-only
    writer: Option<IndexWriter>,
    reader: IndexReader,
}

/// Full-text index stored in a directory on disk
pub struct TantivyIndex {
    index: Index,
    fields: Fields,
    fuzzy_distance: u8,
    handles: RwLock<Option<OpenHandles>>,
}

impl TantivyIndex {
    /// Opens the index stored at `location`, creating it if absent
    ///
    /// Opening is idempotent: a directory that already holds an index with
    /// the same schema is reused with all its documents. A directory holding
    /// unreadable or incompatible data is an error.
    pub fn open_or_create(location: &Path, config: &IndexConfig) -> IndexResult<Self> {
        std::fs::create_dir_all(location)?;

        let directory = MmapDirectory::open(location).map_err(|e| IndexError::Directory {
            path: location.to_path_buf(),
            message: e.to_string(),
        })?;

        let index = Index::open_or_create(directory, build_schema())?;
        let writer: IndexWriter =
            index.writer_with_num_threads(1, config.writer_heap_mb * 1024 * 1024)?;

        Self::with_handles(index, Some(writer), location, config)
    }

    /// Opens the index stored at `location` for searching only
    ///
    /// No writer is created, so this succeeds while another process is
    /// crawling into the same directory. Nothing is created on disk: a
    /// missing directory or one without an index is an error, and
    /// [`DocumentIndex::insert`] fails with [`IndexError::ReadOnly`].
    pub fn open_reader(location: &Path, config: &IndexConfig) -> IndexResult<Self> {
        let directory = MmapDirectory::open(location).map_err(|e| IndexError::Directory {
            path: location.to_path_buf(),
            message: e.to_string(),
        })?;

        let exists = Index::exists(&directory).map_err(|e| IndexError::Directory {
            path: location.to_path_buf(),
            message: e.to_string(),
        })?;
        if !exists {
            return Err(IndexError::NotFound(location.to_path_buf()));
        }

        let index = Index::open(directory)?;
        Self::with_handles(index, None, location, config)
    }

    fn with_handles(
        index: Index,
        writer: Option<IndexWriter>,
        location: &Path,
        config: &IndexConfig,
    ) -> IndexResult<Self> {
        register_analyzers(&index);
        let fields = Fields::resolve(&index.schema())?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        tracing::info!(
            "Index opened at {} ({} documents{})",
            location.display(),
            reader.searcher().num_docs(),
            if writer.is_some() { "" } else { ", read-only" }
        );

        Ok(Self {
            index,
            fields,
            fuzzy_distance: config.fuzzy_distance,
            handles: RwLock::new(Some(OpenHandles { writer, reader })),
        })
    }

    fn read_handles(&self) -> RwLockReadGuard<'_, Option<OpenHandles>> {
        self.handles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_handles(&self) -> RwLockWriteGuard<'_, Option<OpenHandles>> {
        self.handles.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `query` and returns the stored path of every hit, best first
    fn collect_paths(&self, reader: &IndexReader, query: &dyn Query) -> IndexResult<Vec<String>> {
        let searcher = reader.searcher();

        // Every match is returned, so the limit is the document count
        let limit = (searcher.num_docs() as usize).max(1);
        let hits = searcher.search(query, &TopDocs::with_limit(limit))?;

        let mut paths = Vec::with_capacity(hits.len());
        for (_score, address) in hits {
            let document: TantivyDocument = searcher.doc(address)?;
            if let Some(path) = document
                .get_first(self.fields.path)
                .and_then(|value| value.as_str())
            {
                paths.push(path.to_string());
            }
        }

        Ok(paths)
    }

    /// Splits `text` into the same terms the content field was indexed with
    fn analyze(&self, text: &str) -> IndexResult<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(self.fields.content)?;
        let mut stream = analyzer.token_stream(text);

        let mut terms = Vec::new();
        stream.process(&mut |token| terms.push(token.text.clone()));
        Ok(terms)
    }
}

impl DocumentIndex for TantivyIndex {
    fn insert(&self, path: &str, content: &str) -> IndexResult<()> {
        let mut guard = self.write_handles();
        let handles = guard.as_mut().ok_or(IndexError::Closed)?;
        let writer = handles.writer.as_mut().ok_or(IndexError::ReadOnly)?;

        writer.delete_term(Term::from_field_text(self.fields.path, path));
        writer.add_document(doc!(
            self.fields.path => path,
            self.fields.content => content
        ))?;
        writer.commit()?;
        handles.reader.reload()?;

        tracing::trace!("Indexed {} ({} bytes of text)", path, content.len());
        Ok(())
    }

    fn query(&self, query: &str) -> IndexResult<Vec<String>> {
        let guard = self.read_handles();
        let handles = guard.as_ref().ok_or(IndexError::Closed)?;

        let parser = QueryParser::for_index(&self.index, vec![self.fields.content]);
        let parsed = parser.parse_query(query)?;

        self.collect_paths(&handles.reader, parsed.as_ref())
    }

    fn fuzzy_query(&self, term: &str) -> IndexResult<Vec<String>> {
        let guard = self.read_handles();
        let handles = guard.as_ref().ok_or(IndexError::Closed)?;

        let clauses: Vec<(Occur, Box<dyn Query>)> = self
            .analyze(term)?
            .into_iter()
            .map(|text| {
                let term = Term::from_field_text(self.fields.content, &text);
                let query: Box<dyn Query> =
                    Box::new(FuzzyTermQuery::new(term, self.fuzzy_distance, true));
                (Occur::Should, query)
            })
            .collect();

        // Only stop words, nothing left to match
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        self.collect_paths(&handles.reader, &BooleanQuery::new(clauses))
    }

    fn num_docs(&self) -> IndexResult<u64> {
        let guard = self.read_handles();
        let handles = guard.as_ref().ok_or(IndexError::Closed)?;
        Ok(handles.reader.searcher().num_docs())
    }

    fn close(&self) -> IndexResult<()> {
        let handles = self.write_handles().take().ok_or(IndexError::Closed)?;

        if let Some(mut writer) = handles.writer {
            writer.commit()?;
            writer.wait_merging_threads()?;
        }

        tracing::debug!("Index closed");
        Ok(())
    }
}
