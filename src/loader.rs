//! Reading and writing RO-Crate metadata documents
//!
//! The builder itself never touches the filesystem; these helpers load a
//! crate's `ro-crate-metadata.json` from a directory, file, zip archive or
//! URL, and persist the updated document.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;
use zip::ZipArchive;

use crate::collect::has_type;
use crate::error::EvidenceError;
use crate::id::{canonical_id, classify_id, IdKind};
use crate::vocab::{
    default_context, CONTEXT_KEY, CREATIVE_WORK_TYPE, EVI_NS, GRAPH_KEY, ID_KEY,
    METADATA_DESCRIPTOR_ID,
};

/// Source from which to load an RO-Crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrateSource {
    /// Local directory containing ro-crate-metadata.json
    Directory(PathBuf),
    /// Metadata file given directly
    File(PathBuf),
    /// Zipped crate
    ZipFile(PathBuf),
    /// Remote URL (may or may not end with ro-crate-metadata.json)
    Url(String),
}

impl CrateSource {
    /// Classify a command-line style source string
    pub fn parse(source: &str) -> Self {
        if let Ok(url) = Url::parse(source) {
            if url.scheme() == "http" || url.scheme() == "https" {
                return CrateSource::Url(source.to_string());
            }
        }
        let path = PathBuf::from(source);
        if path.is_dir() {
            CrateSource::Directory(path)
        } else if path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false)
        {
            CrateSource::ZipFile(path)
        } else {
            CrateSource::File(path)
        }
    }

    /// Path of the metadata file this source can be written back to
    pub fn writable_path(&self) -> Result<PathBuf, EvidenceError> {
        match self {
            CrateSource::Directory(dir) => find_metadata_file(dir),
            CrateSource::File(path) => Ok(path.clone()),
            CrateSource::ZipFile(path) => Err(EvidenceError::InvalidPath(path.clone())),
            CrateSource::Url(url) => Err(EvidenceError::LoadError {
                path: url.clone(),
                reason: "remote crates cannot be written in place".to_string(),
            }),
        }
    }
}

/// Load a crate's metadata document from any source
pub fn load_document(source: &CrateSource) -> Result<Value, EvidenceError> {
    match source {
        CrateSource::Directory(dir) => read_metadata(dir),
        CrateSource::File(path) => read_metadata(path),
        CrateSource::ZipFile(path) => load_from_zip(path),
        CrateSource::Url(url) => load_from_url(url),
    }
}

/// Find ro-crate-metadata.json (with optional prefix) in a directory
pub fn find_metadata_file(dir: &Path) -> Result<PathBuf, EvidenceError> {
    let standard = dir.join(METADATA_DESCRIPTOR_ID);
    if standard.exists() {
        return Ok(standard);
    }

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with("-ro-crate-metadata.json") {
                    return Ok(entry.path());
                }
            }
        }
    }

    Err(EvidenceError::LoadError {
        path: dir.display().to_string(),
        reason: "No ro-crate-metadata.json found".to_string(),
    })
}

/// Read a metadata document from a crate directory or a metadata file
pub fn read_metadata(path: &Path) -> Result<Value, EvidenceError> {
    let metadata_path = if path.is_dir() {
        find_metadata_file(path)?
    } else if path.is_file() {
        path.to_path_buf()
    } else {
        return Err(EvidenceError::InvalidPath(path.to_path_buf()));
    };

    let content = fs::read_to_string(&metadata_path).map_err(|e| EvidenceError::LoadError {
        path: metadata_path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!(path = %metadata_path.display(), "read crate metadata");

    parse_document(&content, &metadata_path.display().to_string())
}

/// Parse metadata JSON and check it has an @graph array
pub fn parse_document(content: &str, origin: &str) -> Result<Value, EvidenceError> {
    let document: Value = serde_json::from_str(content).map_err(|e| EvidenceError::LoadError {
        path: origin.to_string(),
        reason: format!("Invalid JSON: {}", e),
    })?;

    match document.get(GRAPH_KEY) {
        Some(Value::Array(_)) => Ok(document),
        _ => Err(EvidenceError::LoadError {
            path: origin.to_string(),
            reason: "Missing @graph array".to_string(),
        }),
    }
}

/// Write a metadata document to `path`
pub fn write_metadata(path: &Path, document: &Value, pretty: bool) -> Result<(), EvidenceError> {
    let content = to_json_string(document, pretty)?;
    fs::write(path, content)?;
    info!(path = %path.display(), "wrote crate metadata");
    Ok(())
}

/// Serialize a document to a JSON string
pub fn to_json_string(document: &Value, pretty: bool) -> Result<String, EvidenceError> {
    if pretty {
        Ok(serde_json::to_string_pretty(document)?)
    } else {
        Ok(serde_json::to_string(document)?)
    }
}

/// Load the root metadata document of a zipped crate
pub fn load_from_zip(path: &Path) -> Result<Value, EvidenceError> {
    if !path.exists() {
        return Err(EvidenceError::InvalidPath(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| EvidenceError::LoadError {
        path: path.display().to_string(),
        reason: format!("Failed to open zip file: {}", e),
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| EvidenceError::LoadError {
        path: path.display().to_string(),
        reason: format!("Failed to read zip archive: {}", e),
    })?;

    let entry_name = find_root_metadata_in_zip(&archive).ok_or_else(|| {
        EvidenceError::LoadError {
            path: path.display().to_string(),
            reason: "No root ro-crate-metadata.json found at archive root".to_string(),
        }
    })?;

    let mut entry = archive
        .by_name(&entry_name)
        .map_err(|e| EvidenceError::LoadError {
            path: path.display().to_string(),
            reason: format!("Failed to extract {}: {}", entry_name, e),
        })?;

    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    debug!(path = %path.display(), entry = %entry_name, "read zipped crate metadata");

    parse_document(&content, &format!("{}!{}", path.display(), entry_name))
}

/// Find the root metadata entry in a zip archive
///
/// The entry is either at the archive root, or directly inside the single
/// top-level folder when the archive was made by zipping a directory.
fn find_root_metadata_in_zip<R: Read + std::io::Seek>(archive: &ZipArchive<R>) -> Option<String> {
    let entries: Vec<String> = archive.file_names().map(String::from).collect();

    if let Some(root) = entries
        .iter()
        .find(|e| !e.contains('/') && e.ends_with(METADATA_DESCRIPTOR_ID))
    {
        return Some(root.clone());
    }

    let top_level: std::collections::HashSet<&str> = entries
        .iter()
        .filter_map(|e| e.split('/').next())
        .filter(|s| !s.is_empty())
        .collect();
    if top_level.len() != 1 {
        return None;
    }

    let prefix = format!("{}/", top_level.into_iter().next()?);
    entries
        .iter()
        .find(|e| {
            e.strip_prefix(&prefix)
                .map(|rest| !rest.contains('/') && rest.ends_with(METADATA_DESCRIPTOR_ID))
                .unwrap_or(false)
        })
        .cloned()
}

/// Load from a URL, handling both direct metadata URLs and crate URLs
pub fn load_from_url(url: &str) -> Result<Value, EvidenceError> {
    if url.ends_with(METADATA_DESCRIPTOR_ID) {
        let content = fetch_url(url)?;
        return parse_document(&content, url);
    }

    let metadata_url = format!("{}/{}", url.trim_end_matches('/'), METADATA_DESCRIPTOR_ID);
    if let Ok(content) = fetch_url(&metadata_url) {
        if content.trim().starts_with('{') {
            return parse_document(&content, &metadata_url);
        }
    }

    // Fall back to the URL itself, which may serve the metadata directly
    let content = fetch_url(url)?;
    parse_document(&content, url)
}

fn fetch_url(url: &str) -> Result<String, EvidenceError> {
    debug!(url, "fetching crate metadata");
    reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|e| EvidenceError::LoadError {
            path: url.to_string(),
            reason: format!("HTTP request failed: {}", e),
        })?
        .text()
        .map_err(|e| EvidenceError::LoadError {
            path: url.to_string(),
            reason: format!("Failed to read response: {}", e),
        })
}

/// Position of the crate's root dataset in `graph`
///
/// The root is the entity the metadata descriptor is `about`; crates
/// without a usable descriptor fall back to the entry right after it.
pub fn root_entity_position(graph: &[Value]) -> Option<usize> {
    let about = graph
        .iter()
        .find(|e| {
            canonical_id(e)
                .map(|id| classify_id(id) == IdKind::MetadataDescriptor)
                .unwrap_or(false)
        })
        .and_then(|descriptor| descriptor.get("about"))
        .and_then(|about| match about {
            Value::String(s) => Some(s.as_str()),
            other => canonical_id(other),
        });

    if let Some(about) = about {
        if let Some(pos) = graph.iter().position(|e| canonical_id(e) == Some(about)) {
            return Some(pos);
        }
    }

    if graph.len() > 1 {
        Some(1)
    } else {
        None
    }
}

/// Make sure a crate document declares the EVI vocabulary
///
/// A missing `@context` is set to the default one. An object context
/// without an `EVI` prefix gains it. Returns whether the context changed.
pub fn ensure_context(document: &mut Value) -> Result<bool, EvidenceError> {
    let doc = document.as_object_mut().ok_or_else(|| {
        EvidenceError::InvalidStructure("document must be a JSON object".to_string())
    })?;

    match doc.get_mut(CONTEXT_KEY) {
        None | Some(Value::Null) => {
            doc.insert(CONTEXT_KEY.to_string(), default_context());
            Ok(true)
        }
        Some(Value::Object(ctx)) if !ctx.contains_key("EVI") => {
            ctx.insert("EVI".to_string(), json!(EVI_NS));
            Ok(true)
        }
        Some(_) => Ok(false),
    }
}

/// Append entities to a crate document and list them in the root's hasPart
///
/// The document's `@context` is completed with [`ensure_context`] first.
/// Returns the number of entities appended.
pub fn append_entities(document: &mut Value, entities: Vec<Value>) -> Result<usize, EvidenceError> {
    if entities.is_empty() {
        return Ok(0);
    }

    ensure_context(document)?;

    let graph = document
        .get_mut(GRAPH_KEY)
        .and_then(|g| g.as_array_mut())
        .ok_or_else(|| EvidenceError::InvalidStructure("document has no @graph".to_string()))?;

    let root_pos = root_entity_position(graph).ok_or_else(|| {
        EvidenceError::InvalidStructure("crate has no root dataset".to_string())
    })?;

    let references: Vec<Value> = entities
        .iter()
        .filter_map(canonical_id)
        .map(|id| json!({ ID_KEY: id }))
        .collect();

    let root = graph[root_pos]
        .as_object_mut()
        .ok_or_else(|| EvidenceError::InvalidStructure("root dataset is not an object".to_string()))?;
    // updated in place so the root keeps its key order
    match root.get_mut("hasPart") {
        Some(Value::Array(has_part)) => has_part.extend(references),
        Some(Value::Null) | None => {
            root.insert("hasPart".to_string(), Value::Array(references));
        }
        Some(other) => {
            let mut has_part = vec![other.take()];
            has_part.extend(references);
            *other = Value::Array(has_part);
        }
    }

    let count = entities.len();
    graph.extend(entities);
    Ok(count)
}
