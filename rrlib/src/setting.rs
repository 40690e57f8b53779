use crate::errors::SettingError;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_TTL: u32 = 86400;
pub const DEFAULT_CLASS: &str = "IN";

#[derive(Debug, Validate, PartialEq, Deserialize, Clone)]
pub struct CodecSetting {
    #[validate(range(min = 1, max = 2147483647))]
    pub default_ttl: u32,
    #[validate(custom = "validate_class")]
    pub default_class: String,
    pub compression: bool,
}

impl Default for CodecSetting {
    fn default() -> Self {
        CodecSetting {
            default_ttl: DEFAULT_TTL,
            default_class: DEFAULT_CLASS.to_owned(),
            compression: true,
        }
    }
}

#[derive(Debug, Validate, PartialEq, Deserialize, Clone)]
pub struct LogSetting {
    #[validate(custom = "validate_log_target")]
    pub target: String,
    #[validate(custom = "validate_log_level")]
    pub level: String,
}

impl Default for LogSetting {
    fn default() -> Self {
        LogSetting {
            target: "stdout".to_owned(),
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
pub struct Settings {
    pub codec: CodecSetting,
    pub log: LogSetting,
}

impl Settings {
    /// Read the file at `filename` on top of the built-in defaults, so a
    /// config file only needs to carry the keys it changes.
    pub fn new(filename: &str) -> Result<Self, ConfigError> {
        let mut config_obj = Config::new();
        config_obj.set_default("codec.default_ttl", DEFAULT_TTL as i64)?;
        config_obj.set_default("codec.default_class", DEFAULT_CLASS)?;
        config_obj.set_default("codec.compression", true)?;
        config_obj.set_default("log.target", "stdout")?;
        config_obj.set_default("log.level", "info")?;
        config_obj.merge(File::with_name(filename))?;
        config_obj.try_into()
    }

    pub fn validation(&self) -> Result<(), ValidationErrors> {
        self.codec.validate()?;
        self.log.validate()
    }

    pub fn load(filename: &str) -> Result<Self, SettingError> {
        let setting =
            Settings::new(filename).map_err(|e| SettingError::ParseConfigError(e.to_string()))?;
        setting
            .validation()
            .map_err(|e| SettingError::ValidationError(e.to_string()))?;
        Ok(setting)
    }
}

fn validate_class(class: &str) -> Result<(), ValidationError> {
    let class = class.to_uppercase();
    let desired_class = ["IN", "CS", "CH", "HS", "NONE", "ANY"];
    if desired_class.iter().any(|c| class.eq(*c)) {
        return Ok(());
    }
    Err(ValidationError::new("unknown_class"))
}

fn validate_log_target(target: &str) -> Result<(), ValidationError> {
    match target {
        "stdout" | "stderr" => Ok(()),
        _ => Err(ValidationError::new("unknown_log_target")),
    }
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let level = level.to_lowercase();
    let desired_level = ["critical", "error", "warning", "info", "debug", "trace"];
    for i in desired_level.iter() {
        if level.eq(*i) {
            return Ok(());
        }
    }
    Err(ValidationError::new("unknown_log_level"))
}

#[cfg(test)]
mod test {
    use crate::errors::SettingError;
    use crate::setting::{CodecSetting, LogSetting, Settings};

    #[test]
    fn test_read_config() {
        match Settings::new("example.config.yaml") {
            Ok(setting) => match setting.validation() {
                Ok(_) => {}
                Err(err) => panic!("should validate success, but got: {}", err.to_string()),
            },
            Err(err) => panic!("should read success, but got: {}", err.to_string()),
        }
    }

    #[test]
    fn test_config_attribute() {
        let setting = Settings::new("example.config.yaml").unwrap();
        assert_eq!(
            setting.codec,
            CodecSetting {
                default_ttl: 3600,
                default_class: "IN".to_string(),
                compression: false,
            }
        );
        assert_eq!(
            setting.log,
            LogSetting {
                target: "stderr".to_string(),
                level: "debug".to_string(),
            }
        );
    }

    #[test]
    fn test_default_setting() {
        let setting = Settings::default();
        assert_eq!(setting.codec.default_ttl, 86400);
        assert_eq!(setting.codec.default_class, "IN");
        assert_eq!(setting.codec.compression, true);
        assert_eq!(setting.log.level, "info");
        assert!(setting.validation().is_ok());
    }

    #[test]
    fn test_invalid_setting() {
        let mut setting = Settings::default();
        setting.codec.default_class = "XX".to_owned();
        assert!(setting.validation().is_err());

        let mut setting = Settings::default();
        setting.codec.default_ttl = 0;
        assert!(setting.validation().is_err());

        let mut setting = Settings::default();
        setting.log.level = "verbose".to_owned();
        assert!(setting.validation().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        match Settings::load("not-exist.config.yaml") {
            Err(SettingError::ParseConfigError(_)) => {}
            other => panic!("expect parse config error, got {:?}", other),
        }
    }
}
