pub mod controller;
pub mod error;
pub mod output;
pub mod router;
pub mod session;
pub mod ticker;

pub use controller::{CaptureController, SensorHub, ToggleOutcome};
pub use error::CaptureError;
pub use router::{RouteOutcome, SampleRouter};
pub use session::SessionHandle;
pub use ticker::DisplayEvent;
