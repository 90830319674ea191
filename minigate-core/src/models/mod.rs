//! Domain models for Minigate.
//!
//! ## Submodules
//!
//! - [`envelope`] - Response envelope and pagination shapes
//! - [`device`] - Launch parameters, device environment, `x-device` payload

mod device;
mod envelope;

pub use device::{DeviceEnvironment, DeviceInfo, LaunchParams};
pub use envelope::{PaginationRequest, PaginationResponse, ResponseEnvelope, SUCCESS_CODE};
