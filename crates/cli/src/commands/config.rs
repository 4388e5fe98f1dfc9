//! config command - Show or change persisted settings

use clap::Subcommand;
use serde::Serialize;

use bx_core::config::Defaults;

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings and the config file location
    Show,

    /// Persist the default AWS profile
    SetProfile { name: String },

    /// Persist the default AWS region
    SetRegion { region: String },
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    path: String,
    defaults: &'a Defaults,
}

pub fn execute(cmd: ConfigCommands, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let update = match cmd {
        ConfigCommands::Show => {
            show(ctx, &formatter);
            return ExitCode::Success;
        }
        ConfigCommands::SetProfile { name } => ctx.manager.update(|c| c.defaults.profile = name),
        ConfigCommands::SetRegion { region } => ctx.manager.update(|c| c.defaults.region = region),
    };

    match update {
        Ok(config) => {
            tracing::info!(path = %ctx.manager.config_path().display(), "Saved configuration");
            formatter.success(&format!(
                "Saved profile '{}' in region '{}'",
                config.defaults.profile, config.defaults.region
            ));
            ExitCode::Success
        }
        Err(e) => context::report(&formatter, "Failed to save config", &e),
    }
}

fn show(ctx: &Context, formatter: &Formatter) {
    let path = ctx.manager.config_path().display().to_string();
    if formatter.is_json() {
        formatter.json(&ShowOutput {
            path,
            defaults: &ctx.config.defaults,
        });
        return;
    }

    let d = &ctx.config.defaults;
    formatter.println(&format!("config file: {path}"));
    formatter.println(&format!("profile:     {}", d.profile));
    formatter.println(&format!("region:      {}", d.region));
    formatter.println(&format!("output:      {}", d.output));
    formatter.println(&format!("color:       {}", d.color));
    formatter.println(&format!("progress:    {}", d.progress));
    formatter.println(&format!("presign:     {}s", d.presign_expiry_secs));
}
