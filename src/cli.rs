use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "classic_api_client.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Prints an access token for the member.
    Token {
        #[arg(short, long)]
        member: String,
        /// Also verifies the member assertion against the configured public key.
        #[arg(long)]
        verify: bool,
    },
    /// Performs an authenticated GET and prints the response body.
    Get {
        #[arg(short, long)]
        member: String,
        /// Host and path of the resource, e.g. `api.example.com/v1/users`.
        #[arg(short, long)]
        path: String,
        /// Query parameter as `key=value`. Can be repeated.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Performs an authenticated POST and prints the response body.
    Post {
        #[arg(short, long)]
        member: String,
        #[arg(short, long)]
        path: String,
        #[arg(short, long, default_value = "")]
        body: String,
    },
}

impl Cli {
    /// Parses command line arguments
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone()
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

fn parse_param(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("`{value}` is not a key=value pair"))
}
