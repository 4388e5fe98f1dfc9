//! ls command - List one folder of a bucket
//!
//! Loads the folder incrementally, then applies search, sort and paging to
//! the complete listing.

use clap::Args;

use bx_core::{Explorer, ExplorerEvent, SortColumn, SortDirection, parse_bucket_path};

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// List one folder of a bucket
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Location as bucket[/prefix] (an s3:// scheme is accepted)
    pub path: String,

    /// Sort column: name, size, modified or type
    #[arg(short, long)]
    pub sort: Option<SortColumn>,

    /// Sort in descending order
    #[arg(long)]
    pub desc: bool,

    /// Only show entries whose name or type contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

pub async fn execute(args: LsArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_bucket_path(&args.path) {
        Ok(p) => p,
        Err(e) => return context::report(&formatter, "Invalid path", &e),
    };

    let client = match ctx.connect().await {
        Ok(c) => c,
        Err(e) => return context::report(&formatter, "Failed to connect", &e),
    };

    let mut explorer = Explorer::new(client);
    explorer.open(&path.bucket, &path.key).await;
    // Applied once the listing completes
    if let Some(filter) = &args.filter {
        explorer.set_filter(filter);
    }

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Listing {path}..."));
    while let Some(event) = explorer.next_event().await {
        match event {
            ExplorerEvent::Loaded { total, .. } => {
                spinner.set_message(&format!("Listing {path}... {total} entries"));
            }
            ExplorerEvent::Failed(e) => {
                spinner.finish_and_clear();
                return context::report(&formatter, "Failed to list objects", &e);
            }
        }
    }
    spinner.finish_and_clear();

    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    explorer.set_sort(args.sort.unwrap_or_default(), direction);

    if let Err(e) = explorer.set_page(args.page) {
        return context::report(&formatter, "Cannot show page", &e);
    }

    formatter.listing(&path.bucket, explorer.navigation().prefix(), &explorer.snapshot());
    ExitCode::Success
}
