//! buckets command - List buckets with optional search and paging

use clap::Args;

use bx_core::{ObjectStore as _, PAGE_SIZE, bucket_page};

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// List buckets
#[derive(Args, Debug)]
pub struct BucketsArgs {
    /// Only show buckets whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

pub async fn execute(args: BucketsArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match ctx.connect().await {
        Ok(c) => c,
        Err(e) => return context::report(&formatter, "Failed to connect", &e),
    };

    let spinner = ProgressBar::spinner(formatter.config(), "Loading buckets...");
    let buckets = client.list_buckets().await;
    spinner.finish_and_clear();

    let buckets = match buckets {
        Ok(b) => b,
        Err(e) => return context::report(&formatter, "Failed to list buckets", &e),
    };

    let query = args.filter.as_deref().unwrap_or_default();
    let page = match bucket_page(&buckets, query, args.page, PAGE_SIZE) {
        Ok(p) => p,
        Err(e) => return context::report(&formatter, "Cannot show page", &e),
    };

    formatter.buckets(&page);
    ExitCode::Success
}
