use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor not found: {0}")]
    NotFound(String),

    #[error("skeleton stream failed: {0}")]
    StreamFailed(String),

    #[error("sensor not started: {0}")]
    NotStarted(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to enumerate devices: {0}")]
    DeviceEnumeration(String),

    #[error("failed to build stream: {0}")]
    StreamBuild(String),

    #[error("stream error: {0}")]
    StreamError(String),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("no installed recognizer matches culture '{culture}' (sensor optimized: {sensor_optimized})")]
    RecognizerNotFound {
        culture: String,
        sensor_optimized: bool,
    },

    #[error("recognition engine not found: {0}")]
    EngineNotFound(String),

    #[error("recognizer initialization failed: {0}")]
    InitializationFailed(String),

    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("recognition failed: {0}")]
    ProcessingFailed(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("session already started")]
    AlreadyStarted,
}
