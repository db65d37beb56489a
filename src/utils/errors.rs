#![forbid(unsafe_code)]

use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("numclass_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to initialize Log4rs using configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Unable to build the Numbers API http client: {}", .0)]
    HttpClientInit(String),
}

// ***************************************************************************
//                               Request Errors
// ***************************************************************************
/// Rejections produced while validating the `number` query parameter.
/// Any of these halts the request before classification or fact lookup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Missing required query parameter: number")]
    Missing,

    #[error("Invalid number format")]
    InvalidFormat(String),

    #[error("Negative numbers are not supported")]
    Negative(String),

    #[error("Number is too large, the maximum is {max}", max = u64::MAX)]
    OutOfRange(String),
}

impl InputError {
    /// The raw input that was rejected, if there was one.
    pub fn raw_input(&self) -> Option<&str> {
        match self {
            InputError::Missing => None,
            InputError::InvalidFormat(s)
            | InputError::Negative(s)
            | InputError::OutOfRange(s) => Some(s.as_str()),
        }
    }
}

/// Transport failure talking to the Numbers API.
#[derive(Error, Debug)]
#[error("Error fetching from Numbers API: {}", .0)]
pub struct UpstreamError(#[from] pub reqwest::Error);
