//! Shared command setup: resolved settings and the store client

use std::sync::Arc;

use bx_core::{Config, ConfigManager, Error, ProfileSources, Result, discover_profiles};
use bx_s3::{ClientOptions, S3Client};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

const DEFAULT_PROFILE: &str = "default";

/// Settings every command runs with
#[derive(Debug)]
pub struct Context {
    pub manager: ConfigManager,
    pub config: Config,
    pub profile: String,
    pub region: String,
    pub endpoint: Option<String>,
}

impl Context {
    /// Flags win over the config file
    pub fn new(
        manager: ConfigManager,
        config: Config,
        profile: Option<String>,
        region: Option<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            profile: profile.unwrap_or_else(|| config.defaults.profile.clone()),
            region: region.unwrap_or_else(|| config.defaults.region.clone()),
            manager,
            config,
            endpoint,
        }
    }

    /// Build a client for the resolved profile and verify its credentials
    pub async fn connect(&self) -> Result<Arc<S3Client>> {
        self.check_profile()?;
        let client = S3Client::connect(ClientOptions {
            profile: Some(self.profile.clone()),
            region: Some(self.region.clone()),
            endpoint: self.endpoint.clone(),
        })
        .await?;
        Ok(Arc::new(client))
    }

    // "default" may come from the environment instead of the shared files.
    fn check_profile(&self) -> Result<()> {
        if self.profile == DEFAULT_PROFILE {
            return Ok(());
        }
        let profiles = discover_profiles(&ProfileSources::from_env())?;
        if profiles.iter().any(|p| p == &self.profile) {
            Ok(())
        } else {
            Err(Error::ProfileNotFound(self.profile.clone()))
        }
    }
}

/// Print `error` with a hint where one helps, and map it to an exit code
pub fn report(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    match error {
        Error::InvalidCredentials(_) | Error::ProfileNotFound(_) => {
            formatter.warning(
                "Select another profile with --profile, or configure one using: aws configure --profile <name>",
            );
        }
        Error::PageOutOfRange { total, .. } => {
            formatter.warning(&format!("Valid pages are 1 to {total}"));
        }
        _ => {}
    }
    ExitCode::from_error(error)
}
