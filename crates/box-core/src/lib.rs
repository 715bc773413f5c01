pub mod config;
pub mod constants;
pub mod driver;
pub mod elements;
pub mod enclosure;
pub mod error;
pub mod frequency_response;
pub mod network;
pub mod radiation;
pub mod special;
pub mod transfer_matrix;

pub use config::{DiaphragmRadiation, EngineConfig};
pub use constants::Medium;
pub use driver::{Driver, DriverParams};
pub use enclosure::{CabinetSpec, Enclosure, EnclosureSpec, PortShape, PortSpec};
pub use error::{Result, SimError};
pub use frequency_response::FrequencyResponse;
pub use network::SpeakerSystem;

use serde::{Deserialize, Serialize};

/// A complete, SI-unit description of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimRequest {
    pub driver: DriverParams,
    pub enclosure: EnclosureSpec,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub medium: Medium,
}

impl SimRequest {
    /// Request with the default engine configuration and medium.
    pub fn new(driver: DriverParams, enclosure: EnclosureSpec) -> Self {
        Self {
            driver,
            enclosure,
            config: EngineConfig::default(),
            medium: Medium::default(),
        }
    }
}

/// A stage of the electro-mechano-acoustic chain that can produce its 2×2
/// transfer matrix at angular frequency `omega` (rad/s).
pub trait NetworkElement: Send + Sync {
    fn transfer_matrix(&self, omega: f64, medium: &Medium) -> transfer_matrix::TransferMatrix;
}

/// Run the full pipeline: validate, build the driver and enclosure, then
/// sweep the log-spaced grid.
///
/// Every error is raised before the first frequency is evaluated.
pub fn compute(request: &SimRequest) -> Result<FrequencyResponse> {
    let config = &request.config;
    config.validate()?;
    request.medium.validate()?;

    let driver = Driver::new(&request.driver, &request.medium)?;
    let enclosure = Enclosure::from_spec(&request.enclosure)?;
    log::debug!(
        "{}: Qts = {:.3}, f_res = {:.2} Hz",
        enclosure.scenario(),
        driver.qts(),
        driver.resonance_frequency()
    );

    let system = SpeakerSystem::new(driver, enclosure, request.medium, config.clone());
    let grid = frequency_response::log_grid(config.f_min, config.f_max, config.points);
    let response = frequency_response::sweep(&system, &grid);

    let non_finite = response
        .spl
        .iter()
        .chain(&response.impedance)
        .filter(|v| !v.is_finite())
        .count();
    if non_finite > 0 {
        log::warn!("{}: {non_finite} non-finite values in the response", response.scenario);
    }
    log::info!(
        "{}: {} points from {} Hz to {} Hz",
        response.scenario,
        response.len(),
        config.f_min,
        config.f_max
    );

    Ok(response)
}
