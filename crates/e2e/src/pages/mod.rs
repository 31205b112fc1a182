//! Page objects for the Pump Master UI
//!
//! Each page holds an `Arc<InteractionKit<D>>` plus the locators for its
//! elements, so several pages can drive the same browser tab.

pub mod layout;
pub mod login;
pub mod pump_edit_modal;
pub mod pumps_overview;

pub use login::LoginPage;
pub use pump_edit_modal::{PumpEditModalPage, ValidationField};
pub use pumps_overview::PumpsOverviewPage;
