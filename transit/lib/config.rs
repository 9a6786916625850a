//! Numerical tolerances and ceilings shared by the rest of the crate.
//!
//! A [`Config`] is passed explicitly to every constructor and builder that
//! depends on a tolerance; nothing in this crate reads global state. Values can
//! come from [defaults][Config::default], from `TRANSIT_`-prefixed environment
//! variables ([`Config::from_env`]), or from a TOML document
//! ([`Config::from_toml_str`]):
//!
//! ```
//! use transit::config::Config;
//!
//! let config = Config::from_toml_str("
//!     harmonic_oscillator_max_n = 20
//!     float_tol = 1e-9
//! ").unwrap();
//! assert_eq!(config.harmonic_oscillator_max_n, 20);
//! assert_eq!(config.small_number, 1e-8);
//! ```
//!
//! The cache fields are carried for an external memoization layer; nothing in
//! this crate reads or writes a cache.

use std::{ fs, path::{ Path, PathBuf }, str::FromStr };
use serde::{ Deserialize, Serialize };
use tracing::warn;
use crate::{ error::ConfigError, utils::Quad };

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Prefix shared by all recognized environment variables.
pub const ENV_PREFIX: &str = "TRANSIT_";

/// Tolerances, ceilings, and reporting switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest quantum number accepted for a harmonic oscillator basis
    /// function (default: `50`).
    pub harmonic_oscillator_max_n: usize,
    /// Amplitude below which a basis function is considered negligible
    /// (default: `1e-8`).
    pub small_number: f64,
    /// Bound used for asymptotic checks (default: `1000`).
    pub large_number: f64,
    /// General float-comparison tolerance (default: `1e-6`).
    pub float_tol: f64,
    /// Log a line per completed matrix row (default: `false`).
    pub enable_progress: bool,
    /// Directory for an external memoization cache (default:
    /// `$HOME/.transit_chem_cache`).
    pub cache_dir: PathBuf,
    /// Verbosity of the external memoization cache (default: `0`).
    pub cache_verbosity: u32,
    /// Absolute error bound for quadrature (default: `1e-10`).
    pub quad_epsabs: f64,
    /// Relative error bound for quadrature (default: `1e-10`).
    pub quad_epsrel: f64,
    /// Maximum number of quadrature subintervals (default: `2000`).
    pub quad_max_subdivisions: usize,
}

fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".transit_chem_cache")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            harmonic_oscillator_max_n: 50,
            small_number: 1e-8,
            large_number: 1000.0,
            float_tol: 1e-6,
            enable_progress: false,
            cache_dir: default_cache_dir(),
            cache_verbosity: 0,
            quad_epsabs: 1e-10,
            quad_epsrel: 1e-10,
            quad_max_subdivisions: 2000,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse()
        .map_err(|_| {
            ConfigError::BadValue { key: key.to_string(), value: value.to_string() }
        })
}

// only a case-insensitive "true" switches a flag on
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

impl Config {
    /// Build from an iterator of `(key, value)` pairs, as produced by
    /// [`std::env::vars`].
    ///
    /// Keys without the [`ENV_PREFIX`] are ignored; unrecognized prefixed keys
    /// are logged and skipped. Missing keys keep their defaults.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            let value = value.as_ref();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else { continue; };
            match name {
                "HARMONIC_OSCILLATOR_MAX_N" => {
                    config.harmonic_oscillator_max_n = parse_var(key, value)?;
                },
                "SMALL_NUMBER" => {
                    config.small_number = parse_var(key, value)?;
                },
                "LARGE_NUMBER" => {
                    config.large_number = parse_var(key, value)?;
                },
                "FLOAT_TOL" => {
                    config.float_tol = parse_var(key, value)?;
                },
                "ENABLE_PROGRESSBAR" => {
                    config.enable_progress = parse_flag(value);
                },
                "CACHE_DIR" => {
                    config.cache_dir = PathBuf::from(value);
                },
                "CACHE_VERBOSITY" | "JOBLIB_VERBOSITY" => {
                    config.cache_verbosity = parse_var(key, value)?;
                },
                "QUAD_EPSABS" => {
                    config.quad_epsabs = parse_var(key, value)?;
                },
                "QUAD_EPSREL" => {
                    config.quad_epsrel = parse_var(key, value)?;
                },
                "QUAD_MAX_SUBDIVISIONS" => {
                    config.quad_max_subdivisions = parse_var(key, value)?;
                },
                _ => { warn!(key, "ignoring unrecognized configuration variable"); },
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Build from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Parse from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file<P>(path: P) -> ConfigResult<Self>
    where P: AsRef<Path>
    {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Check that all tolerances and bounds are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_positive("small_number", self.small_number)?;
        (self.small_number < 1.0).then_some(())
            .ok_or(ConfigError::BadSmall(self.small_number))?;
        ConfigError::check_positive("large_number", self.large_number)?;
        ConfigError::check_positive("float_tol", self.float_tol)?;
        ConfigError::check_positive("quad_epsabs", self.quad_epsabs)?;
        ConfigError::check_positive("quad_epsrel", self.quad_epsrel)?;
        (self.quad_max_subdivisions > 0).then_some(())
            .ok_or(ConfigError::BadSubdivisions)?;
        Ok(())
    }

    /// Quadrature settings derived from this configuration.
    pub fn quad(&self) -> Quad {
        Quad {
            epsabs: self.quad_epsabs,
            epsrel: self.quad_epsrel,
            max_subdivisions: self.quad_max_subdivisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.harmonic_oscillator_max_n, 50);
        assert_eq!(config.large_number, 1000.0);
        assert!(!config.enable_progress);
        assert!(config.cache_dir.ends_with(".transit_chem_cache"));
    }

    #[test]
    fn vars_override_defaults() {
        let vars = [
            ("TRANSIT_HARMONIC_OSCILLATOR_MAX_N", "12"),
            ("TRANSIT_FLOAT_TOL", "1e-9"),
            ("TRANSIT_ENABLE_PROGRESSBAR", "True"),
            ("TRANSIT_CACHE_DIR", "/tmp/transit"),
            ("PATH", "/usr/bin"),
        ];
        let config = Config::from_vars(vars).unwrap();
        assert_eq!(config.harmonic_oscillator_max_n, 12);
        assert_eq!(config.float_tol, 1e-9);
        assert!(config.enable_progress);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/transit"));
        assert_eq!(config.small_number, 1e-8);
    }

    #[test]
    fn bad_vars_are_rejected() {
        let res = Config::from_vars([("TRANSIT_SMALL_NUMBER", "tiny")]);
        assert!(matches!(res, Err(ConfigError::BadValue { .. })));
        let res = Config::from_vars([("TRANSIT_FLOAT_TOL", "-1")]);
        assert!(matches!(res, Err(ConfigError::NonPositive("float_tol", _))));
        let res = Config::from_vars([("TRANSIT_SMALL_NUMBER", "2")]);
        assert!(matches!(res, Err(ConfigError::BadSmall(_))));
    }

    #[test]
    fn progress_flag_needs_literal_true() {
        let flag = |value: &str| {
            Config::from_vars([("TRANSIT_ENABLE_PROGRESSBAR", value)])
                .unwrap()
                .enable_progress
        };
        assert!(flag("true"));
        assert!(flag("TRUE"));
        assert!(flag(" True "));
        assert!(!flag("1"));
        assert!(!flag("yes"));
        assert!(!flag("maybe"));
        assert!(!flag(""));
    }

    #[test]
    fn from_file_reads_toml() {
        let path = std::env::temp_dir()
            .join(format!("transit-config-{}.toml", std::process::id()));
        fs::write(&path, "small_number = 1e-10\nenable_progress = true\n").unwrap();
        let res = Config::from_file(&path);
        fs::remove_file(&path).unwrap();
        let config = res.unwrap();
        assert_eq!(config.small_number, 1e-10);
        assert!(config.enable_progress);
        assert_eq!(config.harmonic_oscillator_max_n, 50);
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn from_env_ignores_foreign_vars() {
        // the process environment may carry TRANSIT_ overrides of its own
        let vars: Vec<(String, String)> = std::env::vars().collect();
        assert_eq!(Config::from_env().ok(), Config::from_vars(vars).ok());
    }

    #[test]
    fn toml_partial() {
        let config = Config::from_toml_str("quad_max_subdivisions = 10").unwrap();
        assert_eq!(config.quad_max_subdivisions, 10);
        assert_eq!(config.quad().max_subdivisions, 10);
        assert_eq!(config.float_tol, 1e-6);
        assert!(Config::from_toml_str("quad_max_subdivisions = 0").is_err());
        assert!(Config::from_toml_str("float_tol = \"x\"").is_err());
    }
}
