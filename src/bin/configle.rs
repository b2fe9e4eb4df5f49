// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command line checker for configuration documents
//!
//! Runs diagnostics, completion or hover over a document with a JSON schema
//! and prints the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configle_analyzer::{AnalyzerConfig, ConfigAnalyzer, Schema, SyntaxTree, scan};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "configle")]
#[command(about = "Check configuration documents against a schema")]
#[command(version)]
struct Cli {
    /// JSON schema with `containers` and `keys`
    #[arg(short, long, global = true, default_value = "schema.json")]
    schema: PathBuf,
    /// Analyzer settings (defaults to `.configle.toml` next to the document)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report diagnostics; exits with status 1 if any error is found
    Check {
        /// Document to check
        file: PathBuf,
    },
    /// List completions at a byte offset
    Complete {
        /// Document to complete in
        file: PathBuf,
        /// Cursor byte offset
        #[arg(short, long)]
        offset: usize,
    },
    /// Show hover breadcrumbs at a byte offset
    Hover {
        /// Document to hover in
        file: PathBuf,
        /// Pointer byte offset
        #[arg(short, long)]
        offset: usize,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let file = match &cli.command {
        Commands::Check { file } | Commands::Complete { file, .. } | Commands::Hover { file, .. } => {
            file.clone()
        }
    };

    let analyzer = load_analyzer(&cli, &file)?;
    let tree = read_document(&file)?;

    match cli.command {
        Commands::Check { .. } => {
            let diagnostics = analyzer.diagnose(&tree);
            print_json(&analyzer.render(&diagnostics), cli.pretty)?;
            Ok(if diagnostics.iter().any(|d| d.is_error()) { 1 } else { 0 })
        }
        Commands::Complete { offset, .. } => {
            let result = analyzer
                .complete_at(&tree, offset)
                .await
                .context("Completion failed")?;
            print_json(&result, cli.pretty)?;
            Ok(0)
        }
        Commands::Hover { offset, .. } => {
            print_json(&analyzer.hover_at(&tree, offset), cli.pretty)?;
            Ok(0)
        }
    }
}

fn load_analyzer(cli: &Cli, document: &Path) -> Result<ConfigAnalyzer> {
    let schema = Schema::from_file(&cli.schema)
        .with_context(|| format!("Failed to load schema: {}", cli.schema.display()))?;

    let config_path = cli.config.clone().or_else(|| {
        document
            .parent()
            .and_then(AnalyzerConfig::find_config_file)
    });
    let config = match config_path {
        Some(path) => {
            log::info!("using config {}", path.display());
            AnalyzerConfig::from_file(&path)?
        }
        None => AnalyzerConfig::default(),
    };

    ConfigAnalyzer::from_config(schema, config).context("Failed to set up analyzer")
}

fn read_document(path: &Path) -> Result<SyntaxTree> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    Ok(scan(&text))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
