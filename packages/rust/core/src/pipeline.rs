//! End-to-end `build` pipeline: messages → chunks → knowledge → pages → site.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info, instrument};

use bandsite_knowledge::{Knowledge, prompts};
use bandsite_llm::{ExtractionRequest, StructuredExtractor, TextGenerator};
use bandsite_shared::{BandsiteError, DEFAULT_MAX_CHARS, RawMessage, Result, Variant};
use bandsite_site::{NavLink, markdown_to_html, render_page};
use bandsite_transcript::{Chunk, ChunkOptions, Sanitizer, assign_ids, chunk_messages};

use crate::assembler::{self, AssembleConfig, SitePage};
use crate::cache::FragmentCache;

/// Tuning for the extraction half of the pipeline.
#[derive(Debug, Clone)]
pub struct KnowledgeOptions {
    /// Character budget per chunk.
    pub max_chars: usize,
    /// Extraction calls allowed in flight at once (at least 1).
    pub concurrency: usize,
    /// Model name; part of the fragment cache key.
    pub model: String,
}

impl Default for KnowledgeOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            concurrency: 1,
            model: String::new(),
        }
    }
}

/// Configuration for [`build_site`].
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub out_dir: PathBuf,
    pub title: String,
    pub tool_version: String,
    pub knowledge: KnowledgeOptions,
}

/// Merged knowledge plus run statistics.
#[derive(Debug, Clone)]
pub struct KnowledgeRun<K> {
    pub knowledge: K,
    pub message_count: usize,
    pub chunk_count: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// Result of the `build` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    pub out_dir: PathBuf,
    pub variant: Variant,
    pub message_count: usize,
    pub chunk_count: usize,
    pub page_count: usize,
    /// Records across all list fields of the merged document.
    pub record_count: usize,
    pub cache_hits: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each chunk's fragment is merged, in chunk order.
    fn chunk_merged(&self, current: usize, total: usize, cached: bool);
    /// Called after each page is rendered.
    fn page_rendered(&self, slug: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn chunk_merged(&self, _current: usize, _total: usize, _cached: bool) {}
    fn page_rendered(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Chunk options a variant uses with the given budget.
pub fn chunk_options<K: Knowledge>(options: &KnowledgeOptions) -> ChunkOptions {
    ChunkOptions::for_variant(K::VARIANT).with_max_chars(options.max_chars)
}

/// Assign IDs and chunk with the variant's tuning and redaction.
pub fn prepare_chunks<K: Knowledge>(
    messages: Vec<RawMessage>,
    options: &KnowledgeOptions,
) -> Vec<Chunk> {
    let messages = assign_ids(messages);
    chunk_messages(
        &messages,
        &chunk_options::<K>(options),
        Sanitizer::for_variant(K::VARIANT),
    )
}

/// Shared, per-run inputs of every extraction call.
struct Extraction<'a> {
    extractor: &'a dyn StructuredExtractor,
    cache: Option<&'a FragmentCache>,
    variant: Variant,
    model: &'a str,
    schema: Value,
    empty_json: String,
}

struct Fragment<K> {
    knowledge: K,
    cached: bool,
}

impl Extraction<'_> {
    async fn run<K: Knowledge>(&self, chunk: &Chunk) -> Result<Fragment<K>> {
        let system_prompt = prompts::extraction_system_prompt(self.variant);
        let user_prompt =
            prompts::extraction_user_prompt(self.variant, &chunk.transcript, &self.empty_json);

        let key = self
            .cache
            .map(|_| FragmentCache::key(self.variant, self.model, system_prompt, &user_prompt));
        if let (Some(cache), Some(key)) = (self.cache, key.as_deref()) {
            if let Some(value) = cache.get(key) {
                match K::from_fragment(value) {
                    Ok(knowledge) => {
                        debug!(chunk = chunk.index, "fragment cache hit");
                        return Ok(Fragment {
                            knowledge,
                            cached: true,
                        });
                    }
                    Err(e) => debug!(chunk = chunk.index, error = %e, "stale cache entry"),
                }
            }
        }

        debug!(
            chunk = chunk.index,
            messages = chunk.messages.len(),
            chars = chunk.char_len,
            "extracting chunk"
        );
        let value = self
            .extractor
            .extract(ExtractionRequest {
                name: prompts::extraction_schema_name(self.variant),
                system_prompt,
                user_prompt: &user_prompt,
                schema: &self.schema,
            })
            .await?;
        let knowledge = K::from_fragment(value.clone())?;

        if let (Some(cache), Some(key)) = (self.cache, key.as_deref()) {
            cache.put(key, &value);
        }
        Ok(Fragment {
            knowledge,
            cached: false,
        })
    }
}

/// Run extraction over every chunk and fold the fragments in chunk order.
///
/// Up to `options.concurrency` calls run at once; results are merged in
/// chunk index order regardless of completion order.
#[instrument(skip_all, fields(variant = %K::VARIANT, messages = messages.len()))]
pub async fn build_knowledge<K: Knowledge>(
    messages: Vec<RawMessage>,
    extractor: &dyn StructuredExtractor,
    options: &KnowledgeOptions,
    cache: Option<&FragmentCache>,
    progress: &dyn ProgressReporter,
) -> Result<KnowledgeRun<K>> {
    let message_count = messages.len();

    progress.phase("Chunking transcript");
    let chunks = prepare_chunks::<K>(messages, options);
    let total = chunks.len();
    info!(chunks = total, "transcript chunked");

    progress.phase("Extracting knowledge");
    let extraction = Extraction {
        extractor,
        cache,
        variant: K::VARIANT,
        model: &options.model,
        schema: K::schema(),
        empty_json: K::empty_json()?,
    };
    let extraction = &extraction;

    let mut fragments = futures::stream::iter(chunks.iter())
        .map(move |chunk| extraction.run::<K>(chunk))
        .buffered(options.concurrency.max(1));

    let mut knowledge = K::default();
    let mut cache_hits = 0;
    let mut merged = 0;
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        merged += 1;
        if fragment.cached {
            cache_hits += 1;
        }
        progress.chunk_merged(merged, total, fragment.cached);
        knowledge = knowledge.merge(fragment.knowledge);
    }

    info!(
        records = knowledge.total_records(),
        cache_hits,
        cache_misses = total - cache_hits,
        "knowledge merged"
    );

    Ok(KnowledgeRun {
        knowledge,
        message_count,
        chunk_count: total,
        cache_hits,
        cache_misses: total - cache_hits,
    })
}

/// Render every page of the variant from the merged knowledge.
#[instrument(skip_all, fields(variant = %K::VARIANT))]
pub async fn render_pages<K: Knowledge>(
    knowledge: &K,
    title: &str,
    generator: &dyn TextGenerator,
    progress: &dyn ProgressReporter,
) -> Result<Vec<SitePage>> {
    let variant = K::VARIANT;
    let knowledge_json = to_pretty_json(knowledge)?;
    let specs = variant.pages();
    let nav: Vec<NavLink<'_>> = specs
        .iter()
        .map(|p| NavLink {
            slug: p.slug,
            label: p.label,
        })
        .collect();

    let mut pages = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let user_prompt = prompts::page_user_prompt(variant, spec.slug, &knowledge_json);
        let markdown = generator
            .generate(prompts::writer_system_prompt(variant), &user_prompt)
            .await?;
        let html = render_page(title, &nav, spec.slug, &markdown_to_html(&markdown));
        debug!(slug = spec.slug, bytes = html.len(), "page rendered");
        progress.page_rendered(spec.slug, i + 1, specs.len());
        pages.push(SitePage {
            slug: spec.slug.to_string(),
            html,
        });
    }
    Ok(pages)
}

/// Run the full `build` pipeline.
///
/// 1. Assign IDs and chunk
/// 2. Extract a fragment per chunk and merge in order
/// 3. Generate and render every page
/// 4. Assemble the site directory atomically
#[instrument(skip_all, fields(variant = %K::VARIANT, out_dir = %config.out_dir.display()))]
pub async fn build_site<K: Knowledge>(
    config: &SiteConfig,
    messages: Vec<RawMessage>,
    extractor: &dyn StructuredExtractor,
    generator: &dyn TextGenerator,
    cache: Option<&FragmentCache>,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!(messages = messages.len(), "starting build pipeline");

    let run = build_knowledge::<K>(messages, extractor, &config.knowledge, cache, progress).await?;

    progress.phase("Writing pages");
    let pages = render_pages(&run.knowledge, &config.title, generator, progress).await?;

    progress.phase("Assembling site");
    let assemble_config = AssembleConfig {
        out_dir: config.out_dir.clone(),
        variant: K::VARIANT,
        title: config.title.clone(),
        tool_version: config.tool_version.clone(),
        model: config.knowledge.model.clone(),
        message_count: run.message_count,
        chunk_count: run.chunk_count,
    };
    let assembled =
        assembler::assemble_site(&assemble_config, &to_pretty_json(&run.knowledge)?, &pages)?;

    let result = BuildResult {
        out_dir: assembled.out_dir,
        variant: K::VARIANT,
        message_count: run.message_count,
        chunk_count: run.chunk_count,
        page_count: pages.len(),
        record_count: run.knowledge.total_records(),
        cache_hits: run.cache_hits,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        out_dir = %result.out_dir.display(),
        chunks = result.chunk_count,
        pages = result.page_count,
        elapsed_ms = result.elapsed.as_millis(),
        "build pipeline complete"
    );

    Ok(result)
}

fn to_pretty_json<K: Knowledge>(knowledge: &K) -> Result<String> {
    serde_json::to_string_pretty(knowledge)
        .map_err(|e| BandsiteError::Serialization(format!("knowledge: {e}")))
}
