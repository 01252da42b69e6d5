//! Test data builders for creating test objects

use imu_blocks::config::AppConfig;
use imu_blocks::types::SensorKind;

/// Builder for creating test configs
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn sensors(mut self, sensors: &[SensorKind]) -> Self {
        self.config.graph.sensors = sensors.to_vec();
        self
    }

    pub fn norm(mut self, enabled: bool) -> Self {
        self.config.graph.norm = enabled;
        self
    }

    pub fn moving_average(mut self, window: usize) -> Self {
        self.config.graph.moving_average_window = window;
        self
    }

    pub fn sample_rate(mut self, hz: u32) -> Self {
        self.config.collection.sample_rate_hz = hz;
        self
    }

    pub fn channel_buffer(mut self, size: usize) -> Self {
        self.config.collection.channel_buffer_size = size;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .sensors(&[SensorKind::Gyrometer])
            .moving_average(4)
            .sample_rate(100)
            .build();

        assert_eq!(config.graph.sensors, vec![SensorKind::Gyrometer]);
        assert_eq!(config.graph.moving_average_window, 4);
        assert_eq!(config.collection.sample_rate_hz, 100);
        assert!(config.validate().is_ok());
    }
}
