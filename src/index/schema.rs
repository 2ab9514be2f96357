//! Index schema and text analysis
//!
//! Every document has two fields:
//!
//! - `path`: the local file path of the saved page, indexed untokenized and
//!   stored so hits can be mapped back to files and re-inserts can delete the
//!   previous version by exact term
//! - `content`: the extracted page text, analyzed for English

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer,
};
use tantivy::Index;

use crate::index::IndexResult;

pub const PATH_FIELD: &str = "path";
pub const CONTENT_FIELD: &str = "content";

/// Name the English analyzer is registered under
pub const CONTENT_TOKENIZER: &str = "en_stem_stop";

/// Tokens longer than this are almost always minified code or hashes
const MAX_TOKEN_LEN: usize = 40;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
    "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Resolved field handles of an opened index
#[derive(Debug, Clone, Copy)]
pub struct Fields {
    pub path: Field,
    pub content: Field,
}

impl Fields {
    /// Looks the fields up in the schema of an opened index
    pub fn resolve(schema: &Schema) -> IndexResult<Self> {
        Ok(Self {
            path: schema.get_field(PATH_FIELD)?,
            content: schema.get_field(CONTENT_FIELD)?,
        })
    }
}

/// Builds the document schema
pub fn build_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field(PATH_FIELD, STRING | STORED);

    let content_indexing = TextFieldIndexing::default()
        .set_tokenizer(CONTENT_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    builder.add_text_field(
        CONTENT_FIELD,
        TextOptions::default().set_indexing_options(content_indexing),
    );

    builder.build()
}

/// English analyzer: split on non-alphanumerics, lowercase, drop stop words, stem
pub fn content_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            ENGLISH_STOP_WORDS.iter().map(|word| word.to_string()),
        ))
        .filter(Stemmer::new(Language::English))
        .build()
}

/// Registers the analyzers the schema refers to
///
/// Tokenizers are not persisted with the index, so this runs on every open.
pub fn register_analyzers(index: &Index) {
    index
        .tokenizers()
        .register(CONTENT_TOKENIZER, content_analyzer());
}
