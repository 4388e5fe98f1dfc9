//! get command - Download an object or a folder
//!
//! Folders are written to `<dest>/<folder name>/`, keeping key paths
//! relative to the folder.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use bx_core::entry::final_segment;
use bx_core::{BucketPath, DownloadCoordinator, FolderDownload, parse_bucket_path};

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download an object or a folder
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Source as bucket/key, or bucket/prefix/ for a folder
    pub source: String,

    /// Local destination (defaults to the current directory)
    pub destination: Option<PathBuf>,

    /// Treat the source as a folder even without a trailing slash
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
struct GetOutput<'a> {
    status: &'static str,
    source: String,
    #[serde(flatten)]
    result: &'a FolderDownload,
}

pub async fn execute(args: GetArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match parse_bucket_path(&args.source) {
        Ok(p) => p,
        Err(e) => return context::report(&formatter, "Invalid source", &e),
    };
    let base = args.destination.unwrap_or_else(|| PathBuf::from("."));

    let client = match ctx.connect().await {
        Ok(c) => c,
        Err(e) => return context::report(&formatter, "Failed to connect", &e),
    };
    let downloads = DownloadCoordinator::new(client);

    let result = if source.is_dir() || args.recursive {
        let target = folder_destination(&base, &source);
        download_folder(&downloads, &source, &target, &formatter).await
    } else {
        let target = object_destination(&base, &source.key);
        downloads
            .download_object(&source.bucket, &source.key, &target)
            .await
            .map(|()| FolderDownload {
                files: vec![target],
                skipped: Vec::new(),
            })
    };

    let result = match result {
        Ok(r) => r,
        Err(e) => return context::report(&formatter, &format!("Failed to download {source}"), &e),
    };

    for key in &result.skipped {
        formatter.warning(&format!("Skipped {key}: no safe local path"));
    }

    if formatter.is_json() {
        formatter.json(&GetOutput {
            status: "success",
            source: source.to_string(),
            result: &result,
        });
    } else {
        match result.files.as_slice() {
            [single] if !source.is_dir() && !args.recursive => {
                formatter.success(&format!("{source} -> {}", single.display()));
            }
            files => formatter.success(&format!("Downloaded {} file(s) from {source}", files.len())),
        }
    }
    ExitCode::Success
}

async fn download_folder(
    downloads: &DownloadCoordinator,
    source: &BucketPath,
    target: &Path,
    formatter: &Formatter,
) -> bx_core::Result<FolderDownload> {
    let bar = ProgressBar::files(formatter.config(), 0);
    let result = downloads
        .download_folder(&source.bucket, &source.as_prefix(), target, |progress| {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.index as u64);
            bar.set_message(final_segment(&progress.key));
        })
        .await;
    bar.finish_and_clear();
    result
}

/// `<base>/<folder name>`; the bucket name stands in for the root
fn folder_destination(base: &Path, source: &BucketPath) -> PathBuf {
    let name = final_segment(&source.key);
    if name.is_empty() {
        base.join(&source.bucket)
    } else {
        base.join(name)
    }
}

/// An existing directory receives the object under its own name
fn object_destination(base: &Path, key: &str) -> PathBuf {
    if base.is_dir() {
        base.join(final_segment(key))
    } else {
        base.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_folder_destination_uses_folder_name() {
        let source = BucketPath::new("photos", "2024/summer/");
        assert_eq!(
            folder_destination(Path::new("/tmp/out"), &source),
            PathBuf::from("/tmp/out/summer")
        );

        let root = BucketPath::new("photos", "");
        assert_eq!(
            folder_destination(Path::new("/tmp/out"), &root),
            PathBuf::from("/tmp/out/photos")
        );
    }

    #[test]
    fn test_object_destination() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            object_destination(dir.path(), "docs/report.csv"),
            dir.path().join("report.csv")
        );

        let file = dir.path().join("renamed.csv");
        assert_eq!(object_destination(&file, "docs/report.csv"), file);
    }
}
