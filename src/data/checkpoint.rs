//! Versioned JSON containers written at stage boundaries.
//!
//! Every artifact is wrapped in an envelope carrying a schema tag and version. The envelope is
//! checked before the payload is decoded so an incompatible file fails with a clear message
//! rather than deep inside deserialization.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::pipeline::stage::{PipelineError, Stage};

const SCHEMA_PREFIX: &str = "spoiler-scope";

/// A payload type persisted at a stage boundary.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Short kind name, also used as the file stem.
    const KIND: &'static str;
    /// Bumped whenever the payload layout changes.
    const VERSION: u32;
    /// Stage that produces the artifact.
    const STAGE: Stage;

    fn schema() -> String {
        format!("{SCHEMA_PREFIX}/{}", Self::KIND)
    }

    fn file_name() -> String {
        format!("{}.json", Self::KIND)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema: String,
    version: u32,
    stage: Stage,
    written_at: DateTime<Utc>,
    payload: T,
}

#[derive(Debug, Deserialize)]
struct Header {
    schema: String,
    version: u32,
}

/// Write `payload` to `path` inside a schema envelope.
pub fn save<T: Artifact>(path: &Path, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let envelope = Envelope {
        schema: T::schema(),
        version: T::VERSION,
        stage: T::STAGE,
        written_at: Utc::now(),
        payload,
    };
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &envelope)
        .with_context(|| format!("serialise {} checkpoint", T::KIND))?;
    writer.flush()?;
    info!(path = %path.display(), kind = T::KIND, "wrote checkpoint");
    Ok(())
}

/// Read and validate a checkpoint produced by [`save`].
pub fn load<T: Artifact>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(PipelineError::MissingCheckpoint {
            stage: T::STAGE,
            path: path.to_path_buf(),
        }
        .into());
    }
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;

    let header: Header =
        serde_json::from_str(&raw).map_err(|err| mismatch::<T>(path, format!("unreadable header ({err})")))?;
    if header.schema != T::schema() || header.version != T::VERSION {
        return Err(mismatch::<T>(path, format!("{} v{}", header.schema, header.version)).into());
    }

    let envelope: Envelope<T> = serde_json::from_str(&raw)
        .map_err(|err| mismatch::<T>(path, format!("undecodable {} payload ({err})", T::KIND)))?;
    Ok(envelope.payload)
}

fn mismatch<T: Artifact>(path: &Path, found: String) -> PipelineError {
    PipelineError::SchemaMismatch {
        stage: T::STAGE,
        path: path.to_path_buf(),
        expected: expected_tag::<T>(),
        found,
    }
}

/// Default location of an artifact below a checkpoint directory.
pub fn path_in<T: Artifact>(dir: &Path) -> PathBuf {
    dir.join(T::file_name())
}

fn expected_tag<T: Artifact>() -> String {
    format!("{} v{}", T::schema(), T::VERSION)
}
