use crate::sensor_trait::SkeletonSensor;
use std::collections::HashMap;
use voicedrone_core::config::SensorConfig;
use voicedrone_core::SensorError;

type SensorFactory = fn(&SensorConfig) -> Box<dyn SkeletonSensor>;

pub struct SensorRegistry {
    factories: HashMap<String, SensorFactory>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("simulated", |config| {
            Box::new(crate::simulated::SimulatedSensor::with_frame_rate(
                config.frame_rate,
            ))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: SensorFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, config: &SensorConfig) -> Result<Box<dyn SkeletonSensor>, SensorError> {
        self.factories
            .get(&config.source)
            .map(|f| f(config))
            .ok_or_else(|| SensorError::NotFound(config.source.clone()))
    }

    pub fn list_sensors(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
