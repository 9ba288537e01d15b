//! Provides structs to handle Pacup's configuration.
//!
//! The configuration is first read from the config file located at
//! `/etc/pacstall/pacup.toml`, then environment variables prefixed with
//! `PACUP_` may override the configuration.
//!
//! # Format
//!
//! ```toml
//! [repology]
//! url = "https://repology.org"
//! timeout = 30
//!
//! [eval]
//! timeout = 15
//! ```
//!
//! # Note
//!
//! The default configuration is used if the config file is not found or is
//! empty. Nothing here is process-global: the extracted [`Config`] is passed
//! explicitly into every entry point that needs it.

use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::value::{Dict, Map};
use figment::{Error, Figment, Metadata, Profile, Provider};
use serde::{Deserialize, Serialize};

/// Pacup's configuration.
///
/// Gives access to the [configuration](Config) extracted, and the [Figment]
/// used to generate it.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    /// Allows other libraries making use of the framework to also extract
    /// values from the same [Figment].
    pub figment: Figment,
}

impl App {
    /// Generate a new [App] using the default [Provider].
    ///
    /// # Errors
    ///
    /// Any [Error] occurring while extracting the configuration will be
    /// returned.
    pub fn new() -> Result<App, Error> { App::custom(Config::figment()) }

    /// Generate a new [App] using a custom [Provider].
    ///
    /// # Errors
    ///
    /// Any [Error] occurring while extracting the configuration will be
    /// returned.
    pub fn custom<T: Provider>(provider: T) -> Result<App, Error> {
        let figment = Figment::from(provider);
        Ok(App {
            config: Config::from(&figment)?,
            figment,
        })
    }
}

/// The extracted configuration.
#[derive(Deserialize, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub repology: Repology,
    #[serde(default)]
    pub eval: Eval,
}

impl Config {
    /// Allow the configuration to be extracted from any [Provider].
    ///
    /// # Errors
    ///
    /// Any [Error] occurring while extracting the configuration will be
    /// returned.
    pub fn from<T: Provider>(provider: T) -> Result<Config, Error> {
        Figment::from(provider).extract()
    }

    /// Provide a default provider, a `Figment`.
    pub fn figment() -> Figment {
        Figment::from(Toml::file("/etc/pacstall/pacup.toml"))
            .merge(Env::prefixed("PACUP_").split("_"))
    }

    /// The bound on one catalog round trip.
    pub fn http_timeout(&self) -> Duration { Duration::from_secs(self.repology.timeout) }

    /// The bound on one dynamic-expression subshell.
    pub fn eval_timeout(&self) -> Duration { Duration::from_secs(self.eval.timeout) }
}

impl figment::Provider for Config {
    fn metadata(&self) -> Metadata { figment::Metadata::named("Pacup Config") }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        figment::providers::Serialized::defaults(Config::default()).data()
    }

    fn profile(&self) -> Option<Profile> { None }
}

/// The extracted `repology` table.
#[derive(Deserialize, Debug, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Repology {
    /// Base URL of the version-index service.
    pub url: String,
    /// Seconds allowed for the one query round trip.
    pub timeout: u64,
}

impl Default for Repology {
    fn default() -> Self {
        Self {
            url: "https://repology.org".into(),
            timeout: 30,
        }
    }
}

/// The extracted `eval` table.
#[derive(Deserialize, Debug, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Eval {
    /// Seconds allowed for one dynamic-expression subshell.
    pub timeout: u64,
}

impl Default for Eval {
    fn default() -> Self { Self { timeout: 15 } }
}
