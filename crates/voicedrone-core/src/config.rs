use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub sensor: SensorConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Which skeleton drives the hand position when several are tracked at once.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The last tracked skeleton in enumeration order.
    #[default]
    LastTracked,
    FirstTracked,
    /// The tracked skeleton closest to the sensor.
    Nearest,
}

/// Holt double-exponential smoothing applied to reported joints.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SmoothingParameters {
    #[serde(default = "default_half")]
    pub smoothing: f32,

    #[serde(default = "default_half")]
    pub correction: f32,

    #[serde(default)]
    pub prediction: f32,

    #[serde(default = "default_jitter_radius")]
    pub jitter_radius: f32,

    #[serde(default = "default_max_deviation_radius")]
    pub max_deviation_radius: f32,
}

impl Default for SmoothingParameters {
    fn default() -> Self {
        Self {
            smoothing: default_half(),
            correction: default_half(),
            prediction: 0.0,
            jitter_radius: default_jitter_radius(),
            max_deviation_radius: default_max_deviation_radius(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    #[serde(default = "default_sensor_source")]
    pub source: String,

    #[serde(default)]
    pub selection: SelectionPolicy,

    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    #[serde(default)]
    pub smoothing: SmoothingParameters,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: default_sensor_source(),
            selection: SelectionPolicy::default(),
            frame_rate: default_frame_rate(),
            smoothing: SmoothingParameters::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default)]
    pub automatic_gain_control: bool,

    #[serde(default)]
    pub echo_cancellation: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            device_name: default_device_name(),
            automatic_gain_control: false,
            echo_cancellation: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    #[serde(default = "default_culture")]
    pub culture: String,

    #[serde(default = "default_true")]
    pub require_sensor_optimized: bool,

    #[serde(default)]
    pub recognizer: Option<String>,

    #[serde(default = "default_transcript_confidence")]
    pub transcript_confidence: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            culture: default_culture(),
            require_sensor_optimized: default_true(),
            recognizer: None,
            transcript_confidence: default_transcript_confidence(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PresentationConfig {
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            headless: false,
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sensor_source() -> String {
    "simulated".to_string()
}

fn default_frame_rate() -> u32 {
    30
}

fn default_half() -> f32 {
    0.5
}

fn default_jitter_radius() -> f32 {
    0.05
}

fn default_max_deviation_radius() -> f32 {
    0.04
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_culture() -> String {
    "en-US".to_string()
}

fn default_true() -> bool {
    true
}

fn default_transcript_confidence() -> f32 {
    0.9
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    720.0
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor.frame_rate == 0 || self.sensor.frame_rate > 120 {
            return Err(ConfigError::Invalid(format!(
                "sensor.frame_rate must be in 1..=120, got {}",
                self.sensor.frame_rate
            )));
        }

        let s = &self.sensor.smoothing;
        for (name, value) in [
            ("smoothing", s.smoothing),
            ("correction", s.correction),
            ("prediction", s.prediction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "sensor.smoothing.{name} must be in 0.0..=1.0, got {value}"
                )));
            }
        }
        if s.jitter_radius < 0.0 || s.max_deviation_radius < 0.0 {
            return Err(ConfigError::Invalid(
                "sensor.smoothing radii must not be negative".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.speech.transcript_confidence) {
            return Err(ConfigError::Invalid(format!(
                "speech.transcript_confidence must be in 0.0..=1.0, got {}",
                self.speech.transcript_confidence
            )));
        }

        if self.presentation.width <= 0.0 || self.presentation.height <= 0.0 {
            return Err(ConfigError::Invalid(
                "presentation width and height must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
