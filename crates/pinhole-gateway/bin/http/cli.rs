use clap::builder::TypedValueParser;
use clap::{Parser, ValueEnum};
use pinhole_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "PINHOLE_GATEWAY_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "PINHOLE_GATEWAY_PUBLIC_BASE_URL";
pub const JWT_SECRET_ENV: &str = "PINHOLE_GATEWAY_JWT_SECRET";
pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_GATEWAY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "PINHOLE_GATEWAY_MYSQL_DSN";
pub const CODE_LENGTH_ENV: &str = "PINHOLE_GATEWAY_CODE_LENGTH";
pub const LOG_FILTER_ENV: &str = "PINHOLE_LOG_FILTER";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "PINHOLE_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pinhole-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(long, env = JWT_SECRET_ENV, hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = pinhole_generator::hash::DEFAULT_CODE_LENGTH,
        value_parser = clap::value_parser!(u8).range(6..=16).map(usize::from)
    )]
    pub code_length: usize,

    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Compact)]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
