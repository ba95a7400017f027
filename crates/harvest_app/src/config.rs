//! Environment-sourced application configuration.

use std::env;
use std::path::PathBuf;

use anyhow::Context;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    pub pin: String,
}

impl DeviceConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// All durable state lives under one data directory: the candidate list,
/// the ledger, and both output directories.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn candidates_path(&self) -> PathBuf {
        self.data_dir.join("relevantNumbers.json")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("processedNumbers.json")
    }

    pub fn invoices_dir(&self) -> PathBuf {
        self.data_dir.join("invoices")
    }

    pub fn credit_notes_dir(&self) -> PathBuf {
        self.data_dir.join("credit-notes")
    }
}

impl AppConfig {
    /// Loads configuration from environment variables. Everything has a
    /// default except the device address.
    pub fn from_env() -> anyhow::Result<Self> {
        let device_host = env::var("DEVICE_IP").context("DEVICE_IP must be set")?;
        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_port("SERVER_PORT", 3000),
            },
            device: DeviceConfig {
                host: device_host,
                port: parse_port("DEVICE_PORT", 8086),
                pin: env::var("DEVICE_PIN").unwrap_or_else(|_| "0000".to_string()),
            },
            storage: StorageConfig {
                data_dir: env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(".")),
            },
        })
    }
}

fn parse_port(key: &str, default: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
