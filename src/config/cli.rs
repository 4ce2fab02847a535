use crate::config::toml_config::BridgeConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

/// Command-line flags shared by both binaries. Every flag overrides the
/// matching field of the optional TOML file.
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about = "Send emotion commands to the robot over a serial port")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "EMOTION_BRIDGE_CONFIG")]
    pub config: Option<String>,

    /// Serial device, e.g. COM8 or /dev/ttyUSB0
    #[arg(long, env = "EMOTION_BRIDGE_DEVICE")]
    pub device_path: Option<String>,

    #[arg(long)]
    pub baud_rate: Option<u32>,

    #[arg(long, env = "EMOTION_BRIDGE_PORT")]
    pub http_port: Option<u16>,

    #[arg(long)]
    pub host: Option<String>,

    /// Directory of static assets served next to the API ("" disables it)
    #[arg(long)]
    pub static_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    /// 載入設定檔 (若有)、套用命令列覆蓋後驗證
    pub fn load_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                BridgeConfig::from_file(path)?
            }
            None => BridgeConfig::default(),
        };

        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut BridgeConfig) {
        if let Some(device_path) = &self.device_path {
            config.device_path = device_path.clone();
        }
        if let Some(baud_rate) = self.baud_rate {
            config.baud_rate = baud_rate;
        }
        if let Some(http_port) = self.http_port {
            config.http_port = http_port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(static_dir) = &self.static_dir {
            config.static_dir = Some(static_dir.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"device_path = \"COM3\"\nhttp_port = 8080\n")
            .unwrap();

        let args = CliArgs::parse_from([
            "emotion-server",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--device-path",
            "/dev/ttyUSB1",
        ]);
        let config = args.load_config().unwrap();

        assert_eq!(config.device_path, "/dev/ttyUSB1");
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn test_defaults_without_file() {
        let args = CliArgs {
            baud_rate: Some(9600),
            ..CliArgs::default()
        };
        let config = args.load_config().unwrap();

        assert_eq!(config.device_path, "COM8");
        assert_eq!(config.baud_rate, 9600);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = CliArgs {
            baud_rate: Some(0),
            ..CliArgs::default()
        };
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let args = CliArgs {
            config: Some("/nonexistent/emotion-bridge.toml".to_string()),
            ..CliArgs::default()
        };
        assert!(matches!(
            args.load_config(),
            Err(crate::utils::error::BridgeError::IoError(_))
        ));
    }
}
