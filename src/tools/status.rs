//! Tool availability and version reporting.

use serde::Serialize;

use crate::config::types::Config;
use crate::error::Result;
use crate::wrapper::{ToolVersion, ToolWrapper};

use super::{init_script_for, resolved_program, ToolSpec, Toolchain, REQUIRED_TOOLS};

/// Probed state of one registry entry
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub toolchain: Toolchain,
    pub available: bool,
    pub version: Option<String>,
    pub minimum: Option<String>,
    /// None when the tool declares no minimum or is unavailable
    pub satisfies_minimum: Option<bool>,
}

/// Full status report over the tool registry
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatusReport {
    pub tools: Vec<ToolStatus>,
}

/// Probes every registry entry and assembles a [`ToolStatusReport`]
pub struct ToolStatusReporter<'a> {
    config: &'a Config,
}

impl<'a> ToolStatusReporter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn generate_report(&self) -> ToolStatusReport {
        let tools = REQUIRED_TOOLS.iter().map(|spec| self.probe(spec)).collect();
        ToolStatusReport { tools }
    }

    /// Probe one tool. Every failure mode (missing init script, missing
    /// binary, unparsable banner) degrades to "unavailable" here; hard
    /// failures are for pipelines, not for status reporting.
    fn probe(&self, spec: &ToolSpec) -> ToolStatus {
        let init_script = init_script_for(spec.toolchain, self.config)
            .filter(|script| script.is_file());

        let program = resolved_program(spec.name, spec.toolchain, self.config);
        let version = ToolWrapper::new([program], init_script)
            .map(|wrapper| wrapper.with_version_flag(spec.version_flag))
            .and_then(|wrapper| wrapper.version().cloned());

        match version {
            Ok(version) => {
                let satisfies = spec
                    .minimum
                    .and_then(ToolVersion::parse)
                    .map(|minimum| version >= minimum);
                ToolStatus {
                    name: spec.name.to_string(),
                    toolchain: spec.toolchain,
                    available: true,
                    version: Some(version.to_string()),
                    minimum: spec.minimum.map(str::to_string),
                    satisfies_minimum: satisfies,
                }
            }
            Err(_) => ToolStatus {
                name: spec.name.to_string(),
                toolchain: spec.toolchain,
                available: false,
                version: None,
                minimum: spec.minimum.map(str::to_string),
                satisfies_minimum: None,
            },
        }
    }
}

impl ToolStatusReport {
    pub fn available_count(&self) -> usize {
        self.tools.iter().filter(|tool| tool.available).count()
    }

    /// Print a formatted report to the console
    pub fn print_console_report(&self) {
        println!("\nExternal tool status");
        println!("{}", "=".repeat(60));
        println!(
            "Available: {}/{}",
            self.available_count(),
            self.tools.len()
        );
        println!();

        for tool in &self.tools {
            let marker = if tool.available { "ok " } else { "-- " };
            let version = tool.version.as_deref().unwrap_or("not found");
            print!("  [{marker}] {:<18} {:<12}", tool.name, version);
            match (tool.minimum.as_deref(), tool.satisfies_minimum) {
                (Some(minimum), Some(true)) => println!("(minimum {minimum}: satisfied)"),
                (Some(minimum), Some(false)) => println!("(minimum {minimum}: NOT satisfied)"),
                (Some(minimum), None) => println!("(minimum {minimum}: unknown)"),
                (None, _) => println!(),
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
