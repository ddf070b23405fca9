//! `fetch` command: read one font file through the preview service.

use clap::Args;
use fontshelf::fonts::{preview_family_name, variant_id};
use fontshelf::preview::{decode_face, FaceStyle};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Path to a .ttf or .otf file
    pub path: String,

    /// Print the payload as a data URI
    #[arg(long)]
    pub data_uri: bool,

    /// Allow fonts outside the configured font directories
    #[arg(long)]
    pub anywhere: bool,
}

pub async fn run(args: FetchArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("fetch");
    let service = runner.create_service(args.anywhere);

    let src = service
        .get_preview_src(&args.path)
        .await
        .map_err(|error| CliError::Preview {
            path: args.path.clone(),
            error,
        })?;

    let identifier = preview_family_name(&variant_id(&args.path, ""));
    let face = decode_face(&identifier, &src, &FaceStyle::default()).map_err(|error| {
        CliError::Preview {
            path: args.path.clone(),
            error: error.into(),
        }
    })?;
    info!(path = %args.path, bytes = src.len(), "Fetched preview payload");

    println!("Path:    {}", args.path);
    println!("MIME:    {}", src.mime());
    println!("Size:    {} bytes", src.len());
    println!(
        "Family:  {}",
        face.family_name.as_deref().unwrap_or("(unnamed)")
    );
    println!("Glyphs:  {}", face.glyph_count);
    if args.data_uri {
        println!();
        println!("{}", src.data_uri());
    }

    Ok(())
}

/// File name without extension, the family shown for unparsed files.
pub fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("/fonts/Inter-Bold.ttf"), "Inter-Bold");
        assert_eq!(file_stem("Plain"), "Plain");
    }
}
