use std::time::Duration;

use async_trait::async_trait;

use super::Point;

/// Delay before the simulated fix resolves
pub const SIMULATED_DELAY: Duration = Duration::from_millis(1500);

/// Where the simulated visitor stands: the main entrance on the map image
pub const SIMULATED_POSITION: Point = Point::new(600.0, 720.0);

/// Source of the visitor's position in map image coordinates
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> anyhow::Result<Point>;
}

/// Stand-in provider until real positioning (beacons, GPS) exists
#[derive(Debug, Clone)]
pub struct SimulatedLocation {
    delay: Duration,
    position: Point,
}

impl SimulatedLocation {
    pub fn new(delay: Duration, position: Point) -> Self {
        Self { delay, position }
    }
}

impl Default for SimulatedLocation {
    fn default() -> Self {
        Self::new(SIMULATED_DELAY, SIMULATED_POSITION)
    }
}

#[async_trait]
impl LocationProvider for SimulatedLocation {
    async fn locate(&self) -> anyhow::Result<Point> {
        tokio::time::sleep(self.delay).await;
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_location_waits_then_resolves() {
        let provider = SimulatedLocation::new(Duration::from_millis(30), SIMULATED_POSITION);
        let started = std::time::Instant::now();

        let position = provider.locate().await.unwrap();

        assert_eq!(position, SIMULATED_POSITION);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_default_delay() {
        let provider = SimulatedLocation::default();
        assert_eq!(provider.delay, Duration::from_millis(1500));
    }
}
