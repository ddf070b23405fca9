//! `list` command: enumerate installed fonts grouped by family.

use clap::Args;
use fontshelf::fonts::{list_fonts_in, platform_font_dirs, ListFontsResult};
use std::path::PathBuf;

use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Directory to scan instead of the configured font directories
    /// (repeatable)
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// Directories to scan: explicit `--dir`s, else the configured allowed
/// directories, else the platform font directories.
fn scan_roots(explicit: &[PathBuf], configured: &[PathBuf]) -> Vec<PathBuf> {
    if !explicit.is_empty() {
        explicit.to_vec()
    } else if !configured.is_empty() {
        configured.to_vec()
    } else {
        platform_font_dirs()
    }
}

pub async fn run(args: ListArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("list");

    let roots = scan_roots(&args.dirs, &runner.config().fonts.allowed_dirs);
    let result = tokio::task::spawn_blocking(move || list_fonts_in(&roots))
        .await
        .map_err(|e| CliError::Command(format!("Font scan failed: {}", e)))?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::Command(format!("Failed to encode listing: {}", e)))?;
        println!("{}", json);
    } else {
        print!("{}", render(&result));
    }
    Ok(())
}

fn render(result: &ListFontsResult) -> String {
    let mut out = String::new();
    for family in &result.families {
        out.push_str(&format!("{} ({})\n", family.family, family.variants.len()));
        for variant in &family.variants {
            let system = if variant.is_system_core { "  [system]" } else { "" };
            out.push_str(&format!(
                "  {:<32} {:>3} {:<8} {}{}\n",
                variant.display_name(),
                variant.weight,
                variant.style.as_str(),
                variant.path,
                system
            ));
        }
    }
    out.push_str(&format!(
        "\n{} families, {} variants\n",
        result.total_families, result.total_variants
    ));
    out
}
