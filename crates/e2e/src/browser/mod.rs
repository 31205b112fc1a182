//! Browser automation layer
//!
//! ```text
//! page objects ──► InteractionKit<D> ──► D: Driver ──► PlaywrightSession
//!                                                        │  JSON lines
//!                                                        ▼
//!                                                  node bridge.js ──► browser
//! ```

pub mod driver;
pub mod kit;
pub mod playwright;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::Driver;
pub use kit::{BoundingBox, DeviceClass, InteractionKit, Locator, Viewport};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightSession};
pub use protocol::{BrowserStep, Expectation, LoadState, MouseButton, WaitState};
