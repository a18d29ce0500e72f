//! JSON run logs written alongside pipeline outputs.
//!
//! Every pipeline run leaves three documents in `<outdir>/logs/`:
//! `inputs.json` with the resolved input parameters, `outputs.json` with
//! the paths produced, and `runtime.json` with tool and host metadata.
//! The documents are the audit trail a processing run is re-traced from.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::wrapper::ToolVersion;

/// Writer for the three per-run JSON documents
pub struct RunLogger {
    log_dir: PathBuf,
    tool: String,
    started: DateTime<Utc>,
}

impl RunLogger {
    /// Create `<outdir>/logs/` and a logger stamped with the start time
    pub fn new(outdir: &Path, tool: &str) -> Result<Self> {
        let log_dir = outdir.join("logs");
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir,
            tool: tool.to_string(),
            started: Utc::now(),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Write `inputs.json`
    pub fn write_inputs<T: Serialize>(&self, inputs: &T) -> Result<PathBuf> {
        self.write_document("inputs.json", inputs)
    }

    /// Write `outputs.json`
    pub fn write_outputs<T: Serialize>(&self, outputs: &T) -> Result<PathBuf> {
        self.write_document("outputs.json", outputs)
    }

    /// Write `runtime.json`, closing the run with an end timestamp
    pub fn write_runtime(&self, tool_version: Option<&ToolVersion>) -> Result<PathBuf> {
        let finished = Utc::now();
        let runtime = json!({
            "tool": self.tool,
            "tool_version": tool_version.map(ToolVersion::to_string),
            "cli_version": crate::VERSION,
            "hostname": std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string()),
            "cwd": std::env::current_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            "started": self.started.to_rfc3339(),
            "finished": finished.to_rfc3339(),
            "duration_seconds": (finished - self.started).num_milliseconds() as f64 / 1000.0,
        });
        self.write_document("runtime.json", &runtime)
    }

    fn write_document<T: Serialize>(&self, name: &str, document: &T) -> Result<PathBuf> {
        let path = self.log_dir.join(name);
        let content = serde_json::to_string_pretty(document)?;
        fs::write(&path, content)?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}
