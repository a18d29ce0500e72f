//! Tool status reporting.

use crate::cli::{OutputFormat, ToolsCommand};
use crate::config::types::Config;
use crate::error::Result;
use crate::tools::ToolStatusReporter;

pub fn handle_tools(command: ToolsCommand, config: &Config) -> Result<()> {
    match command {
        ToolsCommand::Status { format } => handle_tools_status(format, config),
    }
}

fn handle_tools_status(format: OutputFormat, config: &Config) -> Result<()> {
    let report = ToolStatusReporter::new(config).generate_report();
    match format {
        OutputFormat::Table => report.print_console_report(),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
