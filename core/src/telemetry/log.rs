use log::{debug, info, warn};

/// Stage-scoped wrapper around the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct LogManager {
    stage: &'static str,
}

impl LogManager {
    pub fn new(stage: &'static str) -> Self {
        Self { stage }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.stage, message);
    }

    pub fn detail(&self, message: &str) {
        debug!("[{}] {}", self.stage, message);
    }

    pub fn degeneracy(&self, quantity: &str) {
        warn!("[{}] {} is zero; coefficients will not be finite", self.stage, quantity);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("pmodes")
    }
}
