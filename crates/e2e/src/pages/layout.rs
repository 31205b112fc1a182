//! Responsive layout heuristics
//!
//! Width ratios between an element and the viewport stand in for "the
//! layout is right for this device". A missing bounding box or viewport
//! means the element is not rendered and the check is skipped.

use crate::browser::{BoundingBox, DeviceClass, Viewport};
use crate::error::{E2eError, E2eResult};

fn violation(device: DeviceClass, reason: impl Into<String>) -> E2eError {
    E2eError::Layout {
        device: device.as_str().to_string(),
        reason: reason.into(),
    }
}

/// Login form: at most 400px on mobile, 400-600px on tablet, at least 400px on desktop
pub fn check_login_form(device: DeviceClass, form: Option<BoundingBox>) -> E2eResult<()> {
    let Some(form) = form else {
        return Ok(());
    };
    match device {
        DeviceClass::Mobile if form.width > 400.0 => Err(violation(
            device,
            format!("login form is {}px wide, too wide for mobile", form.width),
        )),
        DeviceClass::Tablet if form.width < 400.0 || form.width > 600.0 => Err(violation(
            device,
            format!("login form is {}px wide, expected 400-600px", form.width),
        )),
        DeviceClass::Desktop if form.width < 400.0 => Err(violation(
            device,
            format!("login form is {}px wide, too narrow for desktop", form.width),
        )),
        _ => Ok(()),
    }
}

/// Pump cards on mobile leave a margin: no wider than 95% of the viewport
pub fn check_mobile_card(viewport: Option<Viewport>, card: Option<BoundingBox>) -> E2eResult<()> {
    let (Some(viewport), Some(card)) = (viewport, card) else {
        return Ok(());
    };
    let limit = f64::from(viewport.width) * 0.95;
    if card.width > limit {
        return Err(violation(
            DeviceClass::Mobile,
            format!("pump card is {}px wide, above {}px", card.width, limit),
        ));
    }
    Ok(())
}

/// Edit modal: near full screen on mobile, 60-80% wide on tablet, 40-60% wide on desktop
pub fn check_modal(
    device: DeviceClass,
    viewport: Option<Viewport>,
    modal: Option<BoundingBox>,
) -> E2eResult<()> {
    let (Some(viewport), Some(modal)) = (viewport, modal) else {
        return Ok(());
    };
    let (vw, vh) = (f64::from(viewport.width), f64::from(viewport.height));
    let ratio = modal.width / vw;

    match device {
        DeviceClass::Mobile if modal.width < vw * 0.9 || modal.height < vh * 0.8 => Err(violation(
            device,
            format!(
                "modal is {}x{}, expected nearly full screen on {}x{}",
                modal.width, modal.height, vw, vh
            ),
        )),
        DeviceClass::Tablet if modal.width > vw * 0.8 || modal.width < vw * 0.6 => Err(violation(
            device,
            format!("modal covers {:.0}% of the width, expected 60-80%", ratio * 100.0),
        )),
        DeviceClass::Desktop if modal.width > vw * 0.6 || modal.width < vw * 0.4 => Err(violation(
            device,
            format!("modal covers {:.0}% of the width, expected 40-60%", ratio * 100.0),
        )),
        _ => Ok(()),
    }
}
