//! Question answering: small talk, relevance gate, stuffed prompt.

use crate::llm::LLMClient;
use crate::rag::retriever::{RetrievedChunk, Retriever};
use crate::rag::small_talk::{normalize_question, small_talk_reply};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ConfigManager;
use std::sync::Arc;
use tracing::{info, instrument};

/// Reply when the index has nothing related to the question
pub const NO_CONTEXT_ANSWER: &str =
    "Sorry, I couldn't find anything in the dataset related to your question.";

/// How a question was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QaOutcome {
    SmallTalk(String),
    NoContext,
    Answer(String),
}

impl QaOutcome {
    pub fn into_answer(self) -> String {
        match self {
            QaOutcome::SmallTalk(reply) => reply,
            QaOutcome::NoContext => NO_CONTEXT_ANSWER.to_string(),
            QaOutcome::Answer(answer) => answer,
        }
    }
}

/// Fill `{context}` and `{question}` in `template`.
pub fn render_prompt(template: &str, context: &[RetrievedChunk], question: &str) -> String {
    let context = context
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    template
        .replace("{context}", &context)
        .replace("{question}", question)
}

pub struct RetrievalQa {
    retriever: Retriever,
    llm: Arc<dyn LLMClient>,
    config: Arc<ConfigManager>,
}

impl RetrievalQa {
    pub fn new(retriever: Retriever, llm: Arc<dyn LLMClient>, config: Arc<ConfigManager>) -> Self {
        Self {
            retriever,
            llm,
            config,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn llm(&self) -> &Arc<dyn LLMClient> {
        &self.llm
    }

    #[instrument(skip(self, question))]
    pub async fn answer(&self, question: &str) -> Result<QaOutcome> {
        let question = normalize_question(question);
        if question.is_empty() {
            return Err(AppError::InvalidInput("Question must not be empty".to_string()));
        }
        // Read per call so edits to ragbot.toml apply without a restart
        let config = self.config.config();

        if let Some(reply) = small_talk_reply(&config.small_talk, &question) {
            info!(question = %question, outcome = "small_talk", "Answered");
            return Ok(QaOutcome::SmallTalk(reply.to_string()));
        }

        let retrieval = &config.retrieval;
        let query = self.retriever.embed_query(&question).await?;

        let relevant =
            self.retriever
                .search_by_vector(&query, retrieval.relevance_k, retrieval.min_score)?;
        if relevant.is_empty() {
            info!(question = %question, outcome = "blocked", "No related chunks");
            return Ok(QaOutcome::NoContext);
        }

        let context =
            self.retriever
                .search_by_vector(&query, retrieval.context_k, retrieval.min_score)?;
        let prompt = render_prompt(&retrieval.prompt_template, &context, &question);
        let answer = self.llm.generate(&prompt).await?;

        info!(
            question = %question,
            outcome = "answered",
            context_chunks = context.len(),
            "Answered"
        );
        Ok(QaOutcome::Answer(answer.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockLLMClient;
    use crate::rag::embeddings::MockEmbedder;
    use crate::rag::indexer::TEXT_KEY;
    use crate::utils::toml_config::RagbotConfig;
    use mockall::predicate::*;
    use ragbot_vector::{DistanceMetric, HnswConfig, VectorMetadata, VectorStore};

    fn store(texts: &[&str]) -> VectorStore {
        let store = VectorStore::new(2, DistanceMetric::Cosine, HnswConfig::default()).unwrap();
        for (i, text) in texts.iter().enumerate() {
            let angle = i as f32 * 0.3;
            store
                .add(
                    &format!("chunk-{}", i),
                    &[angle.cos(), angle.sin()],
                    Some(VectorMetadata::from_pairs([(TEXT_KEY, *text)])),
                )
                .unwrap();
        }
        store
    }

    fn qa(store: VectorStore, llm: MockLLMClient, config: RagbotConfig) -> RetrievalQa {
        let mut embedder = MockEmbedder::new();
        embedder
            .expect_embed_query()
            .returning(|_| Ok(vec![1.0, 0.0]));
        RetrievalQa::new(
            Retriever::new(Arc::new(embedder), store),
            Arc::new(llm),
            Arc::new(ConfigManager::from_config(config)),
        )
    }

    #[tokio::test]
    async fn test_small_talk_skips_llm() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate().never();

        let qa = qa(store(&["a"]), llm, RagbotConfig::default());
        let outcome = qa.answer("  Hello ").await.unwrap();
        assert_eq!(
            outcome,
            QaOutcome::SmallTalk("Hello! Ask me something from the dataset.".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_index_gives_apology() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate().never();

        let qa = qa(store(&[]), llm, RagbotConfig::default());
        let outcome = qa.answer("What is LDAR?").await.unwrap();
        assert_eq!(outcome, QaOutcome::NoContext);
        assert_eq!(outcome.into_answer(), NO_CONTEXT_ANSWER);
    }

    #[tokio::test]
    async fn test_stuffs_context_and_normalized_question() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate()
            .with(function(|prompt: &str| {
                prompt.contains("first\n\nsecond")
                    && prompt.contains("Question: what is ldar?")
                    && !prompt.contains("fifth")
            }))
            .times(1)
            .returning(|_| Ok("  Leak detection and repair. ".to_string()));

        let qa = qa(
            store(&["first", "second", "third", "fourth", "fifth"]),
            llm,
            RagbotConfig::default(),
        );
        let outcome = qa.answer("What is LDAR?").await.unwrap();
        assert_eq!(
            outcome,
            QaOutcome::Answer("Leak detection and repair.".to_string())
        );
    }

    #[tokio::test]
    async fn test_min_score_can_block() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate().never();

        let mut config = RagbotConfig::default();
        config.retrieval.min_score = Some(1.5);
        let qa = qa(store(&["first"]), llm, config);
        assert_eq!(qa.answer("anything").await.unwrap(), QaOutcome::NoContext);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let qa = qa(store(&["a"]), MockLLMClient::new(), RagbotConfig::default());
        let result = qa.answer("   ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate()
            .returning(|_| Err(AppError::LLM("connection refused".to_string())));

        let qa = qa(store(&["first"]), llm, RagbotConfig::default());
        assert!(matches!(qa.answer("question").await, Err(AppError::LLM(_))));
    }

    #[tokio::test]
    async fn test_small_talk_follows_live_config() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate().never();
        let qa = qa(store(&[]), llm, RagbotConfig::default());

        let mut updated = RagbotConfig::default();
        updated
            .small_talk
            .responses
            .insert("good morning".to_string(), "Morning!".to_string());
        qa.config.store(updated);

        assert_eq!(
            qa.answer("Good Morning").await.unwrap(),
            QaOutcome::SmallTalk("Morning!".to_string())
        );
    }

    #[test]
    fn test_render_prompt() {
        let chunks = vec![
            RetrievedChunk { text: "a".into(), score: 1.0 },
            RetrievedChunk { text: "b".into(), score: 0.5 },
        ];
        assert_eq!(render_prompt("{context}|{question}", &chunks, "q"), "a\n\nb|q");
    }
}
