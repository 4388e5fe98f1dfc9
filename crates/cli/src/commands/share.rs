//! share command - Print a presigned download URL

use std::time::Duration;

use clap::Args;
use serde::Serialize;

use bx_core::{DownloadCoordinator, Error, parse_bucket_path};

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Print a time-limited download URL for an object
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Object as bucket/key
    pub path: String,

    /// URL lifetime in seconds (defaults to the configured value)
    #[arg(short, long)]
    pub expires: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ShareOutput {
    url: String,
    expires_in_secs: u64,
}

pub async fn execute(args: ShareArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_bucket_path(&args.path) {
        Ok(p) if !p.is_dir() => p,
        Ok(_) => {
            let e = Error::InvalidPath("Only objects can be shared, not folders".into());
            return context::report(&formatter, "Invalid path", &e);
        }
        Err(e) => return context::report(&formatter, "Invalid path", &e),
    };
    let expires = args.expires.unwrap_or(ctx.config.defaults.presign_expiry_secs);

    let client = match ctx.connect().await {
        Ok(c) => c,
        Err(e) => return context::report(&formatter, "Failed to connect", &e),
    };

    let url = match DownloadCoordinator::new(client)
        .share_url(&path.bucket, &path.key, Duration::from_secs(expires))
        .await
    {
        Ok(u) => u,
        Err(e) => return context::report(&formatter, "Failed to create URL", &e),
    };

    if formatter.is_json() {
        formatter.json(&ShareOutput {
            url: url.to_string(),
            expires_in_secs: expires,
        });
    } else {
        formatter.println(url.as_str());
    }
    ExitCode::Success
}
