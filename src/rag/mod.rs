//! Retrieval-augmented question answering.
//!
//! Build time: [`document`] flattens page records, [`chunker`] splits them,
//! [`embeddings`] embeds the chunks and [`indexer`] stores them in a
//! `ragbot_vector::VectorStore`.
//!
//! Query time: [`qa::RetrievalQa`] answers small talk directly, asks the
//! [`retriever`] whether the dataset covers the question, then stuffs the
//! closest chunks into a prompt for the LLM.

pub mod chunker;
pub mod document;
pub mod embeddings;
pub mod indexer;
pub mod qa;
pub mod retriever;
pub mod small_talk;

pub use chunker::TextChunker;
pub use embeddings::{create_embedder, Embedder};
pub use indexer::build_index;
pub use qa::{QaOutcome, RetrievalQa, NO_CONTEXT_ANSWER};
pub use retriever::{RetrievedChunk, Retriever};
