use crate::adapters::serial::DEFAULT_BAUD_RATE;
use crate::app::script::{EmotionScript, DEMO_SEQUENCE};
use crate::core::line_reader::DEFAULT_MAX_LINE_LENGTH;
use crate::core::{Command, ConfigProvider};
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEVICE_PATH: &str = "COM8";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub device_path: String,
    pub baud_rate: u32,
    pub http_port: u16,
    pub host: String,
    /// 靜態檔案目錄；設為空字串即停用
    pub static_dir: Option<String>,
    pub max_line_length: usize,
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub warmup_ms: u64,
    pub interval_ms: u64,
    pub commands: Vec<String>,
    /// 未設定時為最後一個指令之後再等 2 秒
    pub completion_ms: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_path: DEFAULT_DEVICE_PATH.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            http_port: DEFAULT_HTTP_PORT,
            host: DEFAULT_HOST.to_string(),
            static_dir: Some(DEFAULT_STATIC_DIR.to_string()),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            script: ScriptConfig::default(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 2000,
            interval_ms: 3000,
            commands: DEMO_SEQUENCE.iter().map(|c| c.to_string()).collect(),
            completion_ms: None,
        }
    }
}

impl BridgeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BridgeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BridgeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ROBOT_PORT})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BridgeError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("device_path", &self.device_path)?;
        validation::validate_positive_number("baud_rate", self.baud_rate, 1)?;
        validation::validate_range("http_port", self.http_port, 1, u16::MAX)?;
        validation::validate_host("host", &self.host)?;
        validation::validate_positive_number("max_line_length", self.max_line_length, 1)?;

        if let Some(dir) = &self.static_dir {
            if !dir.is_empty() {
                validation::validate_path("static_dir", dir)?;
            }
        }

        self.script.validate()
    }

    pub fn static_dir(&self) -> Option<&str> {
        self.static_dir.as_deref().filter(|dir| !dir.is_empty())
    }

    pub fn script(&self) -> EmotionScript {
        self.script.to_script()
    }
}

impl ScriptConfig {
    pub fn to_script(&self) -> EmotionScript {
        EmotionScript::evenly_spaced(
            Duration::from_millis(self.warmup_ms),
            Duration::from_millis(self.interval_ms),
            self.commands.iter().map(Command::new),
            self.completion_ms.map(Duration::from_millis),
        )
    }
}

impl Validate for ScriptConfig {
    fn validate(&self) -> Result<()> {
        if self.commands.is_empty() {
            return Err(BridgeError::MissingConfigError {
                field: "script.commands".to_string(),
            });
        }

        for command in &self.commands {
            validation::validate_non_empty_string("script.commands", command)?;
        }

        Ok(())
    }
}

impl ConfigProvider for BridgeConfig {
    fn device_path(&self) -> &str {
        &self.device_path
    }

    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Validate for BridgeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
