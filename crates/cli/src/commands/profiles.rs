//! profiles command - List discovered AWS profiles

use serde::Serialize;

use bx_core::{ProfileSources, discover_profiles};

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Debug, Serialize)]
struct ProfilesOutput<'a> {
    profiles: Vec<String>,
    current: &'a str,
}

pub fn execute(ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let profiles = match discover_profiles(&ProfileSources::from_env()) {
        Ok(p) => p,
        Err(e) => return context::report(&formatter, "Failed to read AWS profiles", &e),
    };

    if formatter.is_json() {
        formatter.json(&ProfilesOutput {
            profiles,
            current: &ctx.profile,
        });
        return ExitCode::Success;
    }

    if profiles.is_empty() {
        formatter.warning("No profiles found. Configure one using: aws configure --profile <name>");
        return ExitCode::Success;
    }

    for profile in &profiles {
        let marker = if *profile == ctx.profile { "*" } else { " " };
        formatter.println(&format!("{marker} {profile}"));
    }
    ExitCode::Success
}
