use std::sync::Arc;

use crate::auth::clock::{Clock, SystemClock};
use crate::auth::exempt::ExemptRoutes;
use crate::auth::gate::Gatekeeper;

use super::security_config::SecurityConfig;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    /// Authentication gate shared by every worker
    pub gatekeeper: Arc<Gatekeeper>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new AppState on the system clock
    pub fn new(security: SecurityConfig, exemptions: ExemptRoutes) -> Self {
        Self::with_clock(security, exemptions, Arc::new(SystemClock))
    }

    /// Create a new AppState whose gate and token minting share `clock`
    pub fn with_clock(
        security: SecurityConfig,
        exemptions: ExemptRoutes,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gatekeeper = Gatekeeper::new(
            crate::auth::jwt::TokenDecoder::new(&security),
            exemptions,
            clock.clone(),
        );

        Self {
            security,
            gatekeeper: Arc::new(gatekeeper),
            clock,
        }
    }

    /// Create a test AppState with default security and exemptions
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(SecurityConfig::default(), ExemptRoutes::with_defaults())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("signature", &self.security.signature)
            .field("gatekeeper", &self.gatekeeper)
            .finish_non_exhaustive()
    }
}
