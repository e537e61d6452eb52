use crate::engine_trait::RecognitionEngine;
use std::collections::HashMap;
use voicedrone_core::config::SpeechConfig;
use voicedrone_core::SpeechError;

/// Capability key set on recognizers with an acoustic model tuned for the
/// sensor's microphone array.
pub const SENSOR_OPTIMIZED_KEY: &str = "Kinect";

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerInfo {
    pub id: String,
    pub name: String,
    pub culture: String,
    pub additional_info: HashMap<String, String>,
}

impl RecognizerInfo {
    pub fn new(id: &str, name: &str, culture: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            culture: culture.to_string(),
            additional_info: HashMap::new(),
        }
    }

    pub fn with_info(mut self, key: &str, value: &str) -> Self {
        self.additional_info
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_sensor_optimized(&self) -> bool {
        self.additional_info
            .get(SENSOR_OPTIMIZED_KEY)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// What a recognizer must offer to be selected.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerRequirements {
    pub culture: String,
    pub sensor_optimized: bool,
    pub preferred_id: Option<String>,
}

impl RecognizerRequirements {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            culture: config.culture.clone(),
            sensor_optimized: config.require_sensor_optimized,
            preferred_id: config.recognizer.clone(),
        }
    }

    pub fn matches(&self, info: &RecognizerInfo) -> bool {
        if self.sensor_optimized && !info.is_sensor_optimized() {
            return false;
        }
        if !info.culture.eq_ignore_ascii_case(&self.culture) {
            return false;
        }
        match &self.preferred_id {
            Some(id) => info.id == *id,
            None => true,
        }
    }
}

type EngineFactory = fn(&RecognizerInfo, &SpeechConfig) -> Box<dyn RecognitionEngine>;

struct Installed {
    info: RecognizerInfo,
    factory: EngineFactory,
}

/// The set of installed recognizers, in installation order.
pub struct RecognizerRegistry {
    installed: Vec<Installed>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            installed: Vec::new(),
        };
        registry.register(
            RecognizerInfo::new("transcript", "Transcript Recognizer (en-US)", "en-US")
                .with_info(SENSOR_OPTIMIZED_KEY, "True"),
            |info, config| {
                Box::new(crate::transcript_engine::TranscriptEngine::new(
                    info,
                    config.transcript_confidence,
                ))
            },
        );
        registry.register(
            RecognizerInfo::new("null", "Null Recognizer (en-US)", "en-US")
                .with_info(SENSOR_OPTIMIZED_KEY, "False"),
            |info, _| Box::new(crate::null_engine::NullEngine::new(info)),
        );
        registry
    }

    /// Install a recognizer. Re-registering an id replaces it in place.
    pub fn register(&mut self, info: RecognizerInfo, factory: EngineFactory) {
        if let Some(existing) = self.installed.iter_mut().find(|i| i.info.id == info.id) {
            existing.info = info;
            existing.factory = factory;
        } else {
            self.installed.push(Installed { info, factory });
        }
    }

    pub fn installed_recognizers(&self) -> Vec<&RecognizerInfo> {
        self.installed.iter().map(|i| &i.info).collect()
    }

    /// The first installed recognizer meeting `requirements`.
    pub fn select(
        &self,
        requirements: &RecognizerRequirements,
    ) -> Result<RecognizerInfo, SpeechError> {
        self.installed
            .iter()
            .map(|i| &i.info)
            .find(|info| requirements.matches(info))
            .cloned()
            .ok_or_else(|| SpeechError::RecognizerNotFound {
                culture: requirements.culture.clone(),
                sensor_optimized: requirements.sensor_optimized,
            })
    }

    pub fn create(
        &self,
        id: &str,
        config: &SpeechConfig,
    ) -> Result<Box<dyn RecognitionEngine>, SpeechError> {
        self.installed
            .iter()
            .find(|i| i.info.id == id)
            .map(|i| (i.factory)(&i.info, config))
            .ok_or_else(|| SpeechError::EngineNotFound(id.to_string()))
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
