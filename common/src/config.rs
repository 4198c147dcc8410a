//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for the various configuration files for
//! `temblor`.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and with `load()` read the proper file or the default one.
//!
//! The parsed configuration is available with `.inner()` or `.into_inner()`.
//!

use std::fmt::Debug;
use std::path::PathBuf;
use std::fs;

use directories::BaseDirs;
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Config filename
const CONFIG: &str = "config.hcl";

/// Main name for the directory base
const TAG: &str = "temblor";

/// Carrier for a configuration file of shape `T`, plus where it came from.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned> {
    /// This is the base directory for all files.
    basedir: PathBuf,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned,
{
    /// Returns the path of the default config directory
    ///
    #[tracing::instrument]
    pub fn config_path() -> PathBuf {
        let basedir = match BaseDirs::new() {
            Some(base) => base.config_dir().to_path_buf(),
            // Fall back to the current directory, there is nothing better left.
            //
            None => PathBuf::from("."),
        };
        basedir.join(TAG)
    }

    /// Returns the path of the default config file
    ///
    #[tracing::instrument]
    pub fn default_file() -> PathBuf {
        let cfg = Self::config_path().join(CONFIG);
        debug!("default = {cfg:?}");
        cfg
    }

    /// Load the file and return a struct `T` in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI
    /// - default basedir (based on the platform config directory)
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&str>) -> Result<Self> {
        let fname = match fname {
            Some(fname) => PathBuf::from(fname),
            None => Self::default_file(),
        };

        if !fname.exists() {
            return Err(eyre!(
                "Unknown config file {:?} and no default in {:?}",
                fname,
                Self::config_path()
            ));
        }

        trace!("Loading config file {fname:?}");

        let data = fs::read_to_string(&fname)?;
        Self::from_str(&data)
    }

    /// Parse an in-memory configuration, used for embedded defaults as well.
    ///
    #[tracing::instrument(skip(data))]
    pub fn from_str(data: &str) -> Result<Self> {
        let data: T = hcl::from_str(data)?;
        debug!("struct data = {data:?}");

        Ok(ConfigFile {
            basedir: Self::config_path(),
            inner: data,
        })
    }

    /// Base directory for all our files.
    ///
    pub fn basedir(&self) -> &PathBuf {
        &self.basedir
    }

    /// Return the inner configuration struct
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the carrier, keep the configuration
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Foo {
        pub version: usize,
        pub name: String,
    }

    #[test]
    fn test_config_from_str() -> Result<()> {
        let data = r##"
version = 1
name = "foo"
"##;
        let cfg = ConfigFile::<Foo>::from_str(data)?;
        assert_eq!(1, cfg.inner().version);
        assert_eq!("foo", cfg.inner().name);
        Ok(())
    }

    #[test]
    fn test_config_load_missing_file() {
        let cfg = ConfigFile::<Foo>::load(Some("/nonexistent/no.hcl"));
        assert!(cfg.is_err());
    }
}
