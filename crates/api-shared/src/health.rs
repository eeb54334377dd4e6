use crate::types::HealthRes;

/// Health check shared by every server binary.
pub struct HealthService;

impl HealthService {
    /// Report the service as alive.
    ///
    /// # Returns
    /// * `HealthRes` - Always `ok: true` with a short status message
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "WikiNav search backend is alive".into(),
        }
    }
}
