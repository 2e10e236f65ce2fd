/// Policy analysis pipeline.
///
/// A validated [`AnalysisRequest`] flows through extraction (fetching first when
/// the source is a URL), the English gate, sentence analysis and scoring. Every
/// failure before scoring is an [`AnalysisError`] with a stable error code; the
/// scoring step itself cannot fail. Only the fetch runs on the async runtime;
/// parsing and scoring run on the blocking pool.
use std::sync::Arc;
use std::time::Instant;

use reqwest::Url;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::api::ErrorCode;
use crate::document::ScoredSentence;
use crate::extract::{extract_html, extract_text, ExtractError, ExtractedPolicy};
use crate::fetch::{FetchError, PageKind, PolicyFetcher};
use crate::markup::annotate_blocks;
use crate::nlp::{DocumentAnalyzer, HeuristicAnalyzer, LanguageIdentifier, StopwordLanguageIdentifier};
use crate::scorer::score_document;
use crate::weights::KeywordWeights;

/// Where the policy text comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicySource {
    Url(Url),
    Html(String),
    Text(String),
}

impl PolicySource {
    pub fn kind(&self) -> &'static str {
        match self {
            PolicySource::Url(_) => "url",
            PolicySource::Html(_) => "html",
            PolicySource::Text(_) => "text",
        }
    }
}

/// How results are presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Ordered sentences with max-normalized scores.
    #[default]
    Sentences,
    /// Annotated markup with raw per-block scores.
    Markup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub source: PolicySource,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Sentences(Vec<ScoredSentence>),
    Markup(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Failed to extract a privacy policy from URL: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to extract a privacy policy: {0}")]
    Extract(#[from] ExtractError),

    #[error("The Privacy Policy is not English.")]
    NotEnglish,

    #[error("Failed to extract a privacy policy: analysis task failed: {0}")]
    Task(#[from] JoinError),
}

impl AnalysisError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::Fetch(_) | AnalysisError::Extract(_) | AnalysisError::Task(_) => {
                ErrorCode::ExtractionFailed
            }
            AnalysisError::NotEnglish => ErrorCode::LanguageRejected,
        }
    }
}

/// Long-lived analysis service holding the keyword weights and collaborators.
#[derive(Clone)]
pub struct PolicyAnalyzer {
    weights: Arc<KeywordWeights>,
    fetcher: PolicyFetcher,
    language: Arc<dyn LanguageIdentifier>,
    analyzer: Arc<dyn DocumentAnalyzer>,
}

impl PolicyAnalyzer {
    /// Analyzer with the stopword language gate and the heuristic lemmatizer.
    pub fn new(weights: Arc<KeywordWeights>, fetcher: PolicyFetcher) -> Self {
        let analyzer = Arc::new(HeuristicAnalyzer::for_weights(&weights));
        Self::with_collaborators(
            weights,
            fetcher,
            Arc::new(StopwordLanguageIdentifier::new()),
            analyzer,
        )
    }

    pub fn with_collaborators(
        weights: Arc<KeywordWeights>,
        fetcher: PolicyFetcher,
        language: Arc<dyn LanguageIdentifier>,
        analyzer: Arc<dyn DocumentAnalyzer>,
    ) -> Self {
        Self {
            weights,
            fetcher,
            language,
            analyzer,
        }
    }

    pub fn weights(&self) -> &KeywordWeights {
        &self.weights
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<Analysis, AnalysisError> {
        let started = Instant::now();
        let kind = request.source.kind();
        let format = request.format;

        let body = self.load(request.source).await?;
        let analyzer = self.clone();
        let (blocks, analysis) = tokio::task::spawn_blocking(move || {
            let extracted = body.extract()?;
            let analysis = analyzer.score_extracted(&extracted, format)?;
            Ok::<_, AnalysisError>((extracted.blocks.len(), analysis))
        })
        .await??;

        let items = match &analysis {
            Analysis::Sentences(sentences) => sentences.len(),
            Analysis::Markup(_) => blocks,
        };
        info!(
            source = kind,
            ?format,
            blocks,
            items,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "policy analyzed"
        );
        Ok(analysis)
    }

    /// Turn a source into readable blocks, fetching URLs first.
    pub async fn extract(&self, source: PolicySource) -> Result<ExtractedPolicy, AnalysisError> {
        let body = self.load(source).await?;
        tokio::task::spawn_blocking(move || body.extract()).await?
    }

    async fn load(&self, source: PolicySource) -> Result<PolicyBody, AnalysisError> {
        let body = match source {
            PolicySource::Url(url) => {
                let page = self.fetcher.fetch(&url).await?;
                debug!(requested = %url, resolved = %page.url, "policy page fetched");
                match page.kind {
                    PageKind::Html => PolicyBody::Html(page.body),
                    PageKind::PlainText => PolicyBody::Text(page.body),
                }
            }
            PolicySource::Html(markup) => PolicyBody::Html(markup),
            PolicySource::Text(text) => PolicyBody::Text(text),
        };
        Ok(body)
    }

    /// Gate on language, then score in the requested format.
    pub fn score_extracted(
        &self,
        extracted: &ExtractedPolicy,
        format: OutputFormat,
    ) -> Result<Analysis, AnalysisError> {
        let text = extracted.text();
        if !self.language.is_english(&text) {
            return Err(AnalysisError::NotEnglish);
        }

        let analysis = match format {
            OutputFormat::Sentences => {
                let document = self.analyzer.analyze(&text);
                Analysis::Sentences(score_document(&document, &self.weights))
            }
            OutputFormat::Markup => Analysis::Markup(annotate_blocks(
                &extracted.blocks,
                self.analyzer.as_ref(),
                &self.weights,
            )),
        };
        Ok(analysis)
    }
}

/// Policy content ready for extraction.
enum PolicyBody {
    Html(String),
    Text(String),
}

impl PolicyBody {
    fn extract(&self) -> Result<ExtractedPolicy, AnalysisError> {
        let extracted = match self {
            PolicyBody::Html(markup) => extract_html(markup)?,
            PolicyBody::Text(text) => extract_text(text)?,
        };
        debug!(blocks = extracted.blocks.len(), "policy extracted");
        Ok(extracted)
    }
}
