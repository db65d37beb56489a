#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::{env, fs, path::Path};
use structopt::StructOpt;

use crate::utils::{errors::Errors, fact_fetcher::DEFAULT_NUMBERS_API_URL};
use crate::utils::server_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const ENV_CONFIG_FILE      : &str = "NUMCLASS_CONFIG_FILE";
const DEFAULT_CONFIG_FILE  : &str = "~/.numclass/numclass.toml";
const DEFAULT_LOG4RS_FILE  : &str = "~/.numclass/log4rs.yml";

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "http://localhost";
const DEFAULT_HTTP_PORT    : u16  = 8081;

// Used when no log4rs file is available.
const CONSOLE_LOG_PATTERN  : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ServerArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "numclass_server", about = "Command line arguments for the Number Classification Server.")]
pub struct ServerArgs {
    /// Specify the server's TOML configuration file.
    ///
    /// The configuration file is located using the following priority order:
    ///
    ///   1. If set, the value of the NUMCLASS_CONFIG_FILE environment variable,
    ///
    ///   2. Otherwise, if set, the value of the --config-file command line argument,
    ///
    ///   3. Otherwise, ~/.numclass/numclass.toml
    ///
    /// Default values are used when the file does not exist.
    #[structopt(short, long)]
    pub config_file: Option<String>,

    /// Listen on this port, overriding the configuration file.
    #[structopt(short, long)]
    pub port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub args: ServerArgs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub numbers_api_url: String,
    pub log4rs_config: String,
    pub tls_cert_file: Option<String>,
    pub tls_key_file: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Both tls files must be configured to serve https.
    pub fn tls_files(&self) -> Option<(&str, &str)> {
        match (&self.tls_cert_file, &self.tls_key_file) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Number Classification Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            numbers_api_url: DEFAULT_NUMBERS_API_URL.to_string(),
            log4rs_config: DEFAULT_LOG4RS_FILE.to_string(),
            tls_cert_file: None,
            tls_key_file: None,
        }
    }
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the configured file.  If the file doesn't exist we
 * fall back to info level logging on the console.  A file that exists but
 * can't be loaded is fatal.
 */
pub fn init_log(config: &Config) -> Result<()> {
    let logconfig = get_absolute_path(&config.log4rs_config);
    if Path::new(&logconfig).exists() {
        if let Err(e) = log4rs::init_file(&logconfig, Default::default()) {
            println!("{}", e);
            return Err(anyhow!(Errors::Log4rsInitialization(logconfig)));
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
            .build();
        let log_config = log4rs::Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info))
            .map_err(|e| anyhow!(Errors::Log4rsInitialization(e.to_string())))?;
        log4rs::init_config(log_config)
            .map_err(|e| anyhow!(Errors::Log4rsInitialization(e.to_string())))?;
        info!("Log4rs file {} not found, logging to console.", logconfig);
    }
    Ok(())
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_config_file:
// ---------------------------------------------------------------------------
fn get_config_file(env_file: Option<String>, args: &ServerArgs) -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --config-file argument
    //  3. Default location
    //
    let config_file = env_file.unwrap_or_else(
        || {
            match args.config_file.clone() {
                Some(f) => f,
                None => DEFAULT_CONFIG_FILE.to_string(),
            }
        });

    get_absolute_path(&config_file)
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c)  => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file.  A
 * missing file means default values, a malformed file is an error.  The
 * --port argument wins over the file's http_port.
 */
fn get_parms(env_file: Option<String>, args: &ServerArgs) -> Result<Parms> {
    let config_file = get_config_file(env_file, args);

    // Logging is not up yet, so report on stdout.
    println!("{}", Errors::ReadingConfigFile(config_file.clone()));
    let mut config = match fs::read_to_string(&config_file) {
        Ok(contents) => parse_config(&contents, &config_file)?,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file);
            Config::new()
        }
    };

    if let Some(port) = args.port {
        config.http_port = port;
    }

    Ok(Parms { config_file, config })
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // The application aborts if the configuration can't be used.
    let args = ServerArgs::from_args();
    let parms = get_parms(env::var(ENV_CONFIG_FILE).ok(), &args)
        .expect("FAILED to read configuration file.");
    RuntimeCtx {parms, args}
}
