//! Hardware abstraction layer: the still camera and the shutter button.
//!
//! Both devices sit behind small blocking traits so the pipeline can be
//! exercised without the appliance attached.  The printer has its own
//! module ([`crate::printer`]) because it carries a wire protocol, not just
//! a device handle.

pub mod camera;
pub mod trigger;

pub use camera::{Camera, CameraError, StillCamera};
pub use trigger::{GpioButton, StdinTrigger, TriggerError, TriggerSource};
