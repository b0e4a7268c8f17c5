//! Markdown corpus loaded from a docs directory on disk.

use super::{Corpus, DocumentBody, DocumentSource, RawDocument};
use crate::error::SourceError;
use crate::types::section_of;
use anyhow::Context;
use futures::FutureExt;
use futures::future::BoxFuture;
use ignore::WalkBuilder;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Files that live next to the docs but are not part of the corpus.
const EXCLUDED_FILES: &[&str] = &["IMPLEMENTATION.md", "CHANGELOG.md", "CODEBASE_INDEX.md"];

/// Delimiter line for TOML front matter.
const FRONT_MATTER_FENCE: &str = "+++";

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("valid heading regex"));

/// Emoji, their joiners and variation selectors, and other pictographic symbols.
static DECORATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{So}\x{FE0F}\x{200D}]").expect("valid decoration regex")
});

/// Optional metadata block at the top of a markdown file.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    order: Option<i64>,
}

/// Loads every markdown file under a root directory.
#[derive(Debug, Clone)]
pub struct MarkdownSource {
    root: PathBuf,
}

impl MarkdownSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and parse every markdown file. Blocking.
    pub fn load(&self) -> Result<Corpus, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::RootNotFound {
                path: self.root.clone(),
            });
        }

        let mut corpus = Corpus::new();
        for path in self.markdown_files() {
            let doc = parse_file(&self.root, &path)?;
            corpus
                .entry(section_of(&doc.slug).to_string())
                .or_default()
                .push(doc);
        }

        for docs in corpus.values_mut() {
            docs.sort_by(|a, b| {
                (a.order.is_none(), a.order, &a.title).cmp(&(b.order.is_none(), b.order, &b.title))
            });
        }

        Ok(corpus)
    }

    /// Markdown files under the root in deterministic order.
    fn markdown_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable docs entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|path| is_corpus_file(path))
            .collect();

        files.sort();
        files
    }
}

impl DocumentSource for MarkdownSource {
    fn list_all_documents(&self) -> BoxFuture<'_, anyhow::Result<Corpus>> {
        let source = self.clone();
        async move {
            tokio::task::spawn_blocking(move || source.load())
                .await
                .context("Markdown loading task panicked")?
                .context("Failed to load markdown corpus")
        }
        .boxed()
    }
}

fn is_corpus_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".md") && !EXCLUDED_FILES.contains(&name)
}

/// Convert a file path under `root` to its URL slug.
///
/// `guides/sleep.md` → `guides/sleep`, `guides/index.md` → `guides`.
pub(crate) fn path_to_slug(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let without_ext = joined.strip_suffix(".md").unwrap_or(&joined);
    let without_index = without_ext.strip_suffix("/index").unwrap_or(without_ext);

    without_index
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_file(root: &Path, path: &Path) -> Result<RawDocument, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let (front_matter, body) = split_front_matter(&text);
    let meta: FrontMatter = match front_matter {
        Some(raw) => toml::from_str(raw).map_err(|source| SourceError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?,
        None => FrontMatter::default(),
    };

    let title = meta
        .title
        .or_else(|| first_heading(body))
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        });
    let description = meta.description.or_else(|| first_paragraph_line(body));

    Ok(RawDocument {
        slug: path_to_slug(root, path),
        title,
        content: DocumentBody::Text(body.to_string()),
        description,
        tags: meta.tags,
        order: meta.order,
    })
}

/// Split `+++`-fenced TOML front matter from the markdown body.
fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    // Unterminated fence: treat the whole file as body.
    (None, text)
}

fn first_heading(body: &str) -> Option<String> {
    HEADING_RE
        .captures(body)
        .map(|caps| clean_title(&caps[1]))
        .filter(|title| !title.is_empty())
}

/// Strip emoji and other pictographic symbols that decorate headings.
fn clean_title(raw: &str) -> String {
    DECORATION_RE
        .replace_all(raw, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_paragraph_line(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}
