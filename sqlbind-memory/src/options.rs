use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use sqlbind_core::options::{ConnectOptions, LogSettings};
use url::Url;

use crate::connection::MemoryConnection;
use crate::error::Error;

/// Options and flags which can be used to configure an in-memory connection.
///
/// A value of `MemoryConnectOptions` can be parsed from a connection URL:
///
/// ```text
/// memory:[?bulk=true|false][&fetch_buffer=<bytes>][&statement_logging=on|off]
/// ```
///
/// Every connection owns a fresh, empty database.
///
/// ```rust,ignore
/// let options: MemoryConnectOptions = "memory:?bulk=false".parse()?;
///
/// // is equivalent to
/// let options = MemoryConnectOptions::new().bulk(false);
/// ```
#[derive(Clone, Debug)]
pub struct MemoryConnectOptions {
    pub(crate) bulk: bool,
    pub(crate) fetch_buffer: Option<usize>,
    pub(crate) log_settings: LogSettings,
}

impl Default for MemoryConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnectOptions {
    pub fn new() -> Self {
        Self {
            bulk: true,
            fetch_buffer: None,
            log_settings: LogSettings::default(),
        }
    }

    /// Whether a batch of rows is handed to the backend in one call.
    ///
    /// With `false` the connection reports no bulk support, and the binding engine executes
    /// batches one row at a time.
    pub fn bulk(mut self, bulk: bool) -> Self {
        self.bulk = bulk;
        self
    }

    /// Caps every fetched text or blob value at `bytes`; longer values are cut short and
    /// flagged as truncated.
    pub fn fetch_buffer(mut self, bytes: usize) -> Self {
        self.fetch_buffer = Some(bytes);
        self
    }
}

impl FromStr for MemoryConnectOptions {
    type Err = Error;

    fn from_str(mut uri: &str) -> Result<Self, Self::Err> {
        let mut options = Self::new();

        if !uri.starts_with("memory:") {
            return Err(Error::Configuration(
                format!("expected a `memory:` URL, got {uri:?}").into(),
            ));
        }

        // remove scheme from the URI
        uri = uri
            .trim_start_matches("memory://")
            .trim_start_matches("memory:");

        // whatever names the database is ignored; each connection is its own database
        let params = uri.split_once('?').map(|(_, params)| params);

        if let Some(params) = params {
            for (key, value) in url::form_urlencoded::parse(params.as_bytes()) {
                match &*key {
                    "bulk" => {
                        options.bulk = parse_flag(&key, &value)?;
                    }

                    "fetch_buffer" => {
                        let bytes = value.parse::<usize>().map_err(|err| {
                            Error::Configuration(
                                format!("invalid value {value:?} for `fetch_buffer`: {err}").into(),
                            )
                        })?;

                        options.fetch_buffer = Some(bytes);
                    }

                    "statement_logging" => {
                        if !parse_flag(&key, &value)? {
                            options = options.disable_statement_logging();
                        }
                    }

                    _ => {
                        return Err(Error::Configuration(
                            format!("unknown query parameter `{key}` while parsing connection URI")
                                .into(),
                        ));
                    }
                }
            }
        }

        Ok(options)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(Error::Configuration(
            format!("unknown value {value:?} for `{key}`").into(),
        )),
    }
}

impl ConnectOptions for MemoryConnectOptions {
    type Connection = MemoryConnection;

    fn from_url(url: &Url) -> Result<Self, Error> {
        Self::from_str(url.as_str())
    }

    fn connect(&self) -> Result<Self::Connection, Error> {
        Ok(MemoryConnection::establish(self))
    }

    fn log_statements(mut self, level: LevelFilter) -> Self {
        self.log_settings.log_statements(level);
        self
    }

    fn log_slow_statements(mut self, level: LevelFilter, duration: Duration) -> Self {
        self.log_settings.log_slow_statements(level, duration);
        self
    }

    fn log_settings(&self) -> &LogSettings {
        &self.log_settings
    }
}

#[test]
fn test_parse_defaults() -> Result<(), Error> {
    let options: MemoryConnectOptions = "memory:".parse()?;
    assert!(options.bulk);
    assert_eq!(options.fetch_buffer, None);

    let options: MemoryConnectOptions = "memory://".parse()?;
    assert!(options.bulk);

    Ok(())
}

#[test]
fn test_parse_query_parameters() -> Result<(), Error> {
    let options: MemoryConnectOptions =
        "memory:?bulk=false&fetch_buffer=8&statement_logging=off".parse()?;

    assert!(!options.bulk);
    assert_eq!(options.fetch_buffer, Some(8));
    assert_eq!(options.log_settings.statements_level, LevelFilter::Off);

    Ok(())
}

#[test]
fn test_parse_rejects_unknown_parameters() {
    assert!(matches!(
        "memory:?mode=ro".parse::<MemoryConnectOptions>(),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        "memory:?bulk=maybe".parse::<MemoryConnectOptions>(),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        "sqlite::memory:".parse::<MemoryConnectOptions>(),
        Err(Error::Configuration(_))
    ));
}
