//! Create/edit pump modal

use std::str::FromStr;
use std::sync::Arc;

use pumpmaster_common::{PumpRecord, PumpUpdate};

use crate::browser::{BrowserStep, DeviceClass, Driver, InteractionKit, Locator};
use crate::error::{E2eError, E2eResult};

use super::layout;

/// Form field with its own inline validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationField {
    Name,
    Type,
    Area,
    Latitude,
    Longitude,
    FlowRate,
    Offset,
    Pressure,
}

impl ValidationField {
    pub fn test_id(&self) -> &'static str {
        match self {
            ValidationField::Name => "name-validation-error",
            ValidationField::Type => "type-validation-error",
            ValidationField::Area => "area-validation-error",
            ValidationField::Latitude => "latitude-validation-error",
            ValidationField::Longitude => "longitude-validation-error",
            ValidationField::FlowRate => "flow-rate-validation-error",
            ValidationField::Offset => "offset-validation-error",
            ValidationField::Pressure => "pressure-validation-error",
        }
    }
}

impl FromStr for ValidationField {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(ValidationField::Name),
            "type" => Ok(ValidationField::Type),
            "area" => Ok(ValidationField::Area),
            "latitude" => Ok(ValidationField::Latitude),
            "longitude" => Ok(ValidationField::Longitude),
            "flowrate" | "flow rate" | "flow-rate" | "flow_rate" => Ok(ValidationField::FlowRate),
            "offset" => Ok(ValidationField::Offset),
            "pressure" => Ok(ValidationField::Pressure),
            _ => Err(E2eError::UnknownField(s.to_string())),
        }
    }
}

pub struct PumpEditModalPage<D: Driver> {
    kit: Arc<InteractionKit<D>>,
    modal: Locator,
    modal_title: Locator,
    close_button: Locator,
    name_input: Locator,
    type_dropdown: Locator,
    area_dropdown: Locator,
    latitude_input: Locator,
    longitude_input: Locator,
    flow_rate_input: Locator,
    offset_input: Locator,
    current_pressure_input: Locator,
    min_pressure_input: Locator,
    max_pressure_input: Locator,
    save_button: Locator,
    cancel_button: Locator,
    delete_button: Locator,
    error_message: Locator,
    success_message: Locator,
    loading_spinner: Locator,
    required_field_indicator: Locator,
    mobile_modal_overlay: Locator,
    mobile_close_button: Locator,
}

impl<D: Driver> PumpEditModalPage<D> {
    pub fn new(kit: Arc<InteractionKit<D>>) -> Self {
        Self {
            kit,
            modal: Locator::test_id("pump-edit-modal"),
            modal_title: Locator::test_id("modal-title"),
            close_button: Locator::test_id("close-button"),
            name_input: Locator::test_id("pump-name-input"),
            type_dropdown: Locator::test_id("pump-type-dropdown"),
            area_dropdown: Locator::test_id("pump-area-dropdown"),
            latitude_input: Locator::test_id("pump-latitude-input"),
            longitude_input: Locator::test_id("pump-longitude-input"),
            flow_rate_input: Locator::test_id("pump-flow-rate-input"),
            offset_input: Locator::test_id("pump-offset-input"),
            current_pressure_input: Locator::test_id("pump-current-pressure-input"),
            min_pressure_input: Locator::test_id("pump-min-pressure-input"),
            max_pressure_input: Locator::test_id("pump-max-pressure-input"),
            save_button: Locator::test_id("save-button"),
            cancel_button: Locator::test_id("cancel-button"),
            delete_button: Locator::test_id("delete-button"),
            error_message: Locator::test_id("error-message"),
            success_message: Locator::test_id("success-message"),
            loading_spinner: Locator::test_id("loading-spinner"),
            required_field_indicator: Locator::test_id("required-field-indicator"),
            mobile_modal_overlay: Locator::test_id("mobile-modal-overlay"),
            mobile_close_button: Locator::test_id("mobile-close-button"),
        }
    }

    pub fn kit(&self) -> &Arc<InteractionKit<D>> {
        &self.kit
    }

    pub async fn wait_for_modal_to_open(&self) -> E2eResult<()> {
        self.kit.verify_element_visible(&self.modal).await?;
        self.kit.wait_for_element(&self.name_input).await
    }

    pub async fn close_modal(&self) -> E2eResult<()> {
        let button = if self.kit.is_mobile() {
            &self.mobile_close_button
        } else {
            &self.close_button
        };
        self.kit.click_element(button).await?;
        self.verify_modal_closed().await
    }

    /// Dismiss by clicking outside the dialog
    pub async fn close_modal_with_overlay(&self) -> E2eResult<()> {
        if self.kit.is_mobile() {
            self.kit.click_element(&self.mobile_modal_overlay).await?;
        } else {
            self.kit.mouse_move(50.0, 50.0, 1).await?;
            self.kit.run(BrowserStep::MouseDown).await?;
            self.kit.run(BrowserStep::MouseUp).await?;
        }
        self.verify_modal_closed().await
    }

    // --- field entry ---

    pub async fn enter_pump_name(&self, name: &str) -> E2eResult<()> {
        self.kit.fill_input(&self.name_input, name).await
    }

    pub async fn select_pump_type(&self, pump_type: &str) -> E2eResult<()> {
        self.kit
            .select_dropdown_option(&self.type_dropdown, pump_type)
            .await
    }

    pub async fn enter_pump_area(&self, area: &str) -> E2eResult<()> {
        self.kit.select_dropdown_option(&self.area_dropdown, area).await
    }

    pub async fn enter_pump_latitude(&self, latitude: f64) -> E2eResult<()> {
        self.kit
            .fill_input(&self.latitude_input, &latitude.to_string())
            .await
    }

    pub async fn enter_pump_longitude(&self, longitude: f64) -> E2eResult<()> {
        self.kit
            .fill_input(&self.longitude_input, &longitude.to_string())
            .await
    }

    pub async fn enter_pump_flow_rate(&self, flow_rate: &str) -> E2eResult<()> {
        self.kit.fill_input(&self.flow_rate_input, flow_rate).await
    }

    pub async fn enter_pump_offset(&self, offset: f64) -> E2eResult<()> {
        self.kit
            .fill_input(&self.offset_input, &offset.to_string())
            .await
    }

    pub async fn enter_pump_current_pressure(&self, pressure: f64) -> E2eResult<()> {
        self.kit
            .fill_input(&self.current_pressure_input, &pressure.to_string())
            .await
    }

    pub async fn enter_pump_min_pressure(&self, pressure: f64) -> E2eResult<()> {
        self.kit
            .fill_input(&self.min_pressure_input, &pressure.to_string())
            .await
    }

    pub async fn enter_pump_max_pressure(&self, pressure: f64) -> E2eResult<()> {
        self.kit
            .fill_input(&self.max_pressure_input, &pressure.to_string())
            .await
    }

    // --- form actions ---

    /// Click save and wait for the spinner to come and go
    pub async fn save_changes(&self) -> E2eResult<()> {
        self.kit.click_element(&self.save_button).await?;
        self.kit.verify_element_visible(&self.loading_spinner).await?;
        self.kit.verify_element_hidden(&self.loading_spinner).await
    }

    pub async fn cancel_changes(&self) -> E2eResult<()> {
        self.kit.click_element(&self.cancel_button).await?;
        self.verify_modal_closed().await
    }

    pub async fn delete_pump(&self) -> E2eResult<()> {
        self.kit.click_element(&self.delete_button).await
    }

    pub async fn fill_pump_form(&self, pump: &PumpRecord) -> E2eResult<()> {
        self.enter_pump_name(&pump.name).await?;
        self.select_pump_type(&pump.pump_type).await?;
        self.enter_pump_area(&pump.area).await?;
        self.enter_pump_latitude(pump.latitude).await?;
        self.enter_pump_longitude(pump.longitude).await?;
        self.enter_pump_flow_rate(&pump.flow_rate).await?;
        self.enter_pump_offset(pump.offset).await?;
        self.enter_pump_current_pressure(pump.current_pressure).await?;
        self.enter_pump_min_pressure(pump.min_pressure).await?;
        self.enter_pump_max_pressure(pump.max_pressure).await
    }

    pub async fn create_new_pump(&self, pump: &PumpRecord) -> E2eResult<()> {
        self.wait_for_modal_to_open().await?;
        self.fill_pump_form(pump).await?;
        self.save_changes().await
    }

    /// Touch only the fields present in `update`; zero is a real value
    pub async fn edit_existing_pump(&self, update: &PumpUpdate) -> E2eResult<()> {
        self.wait_for_modal_to_open().await?;

        if let Some(name) = &update.name {
            self.enter_pump_name(name).await?;
        }
        if let Some(pump_type) = &update.pump_type {
            self.select_pump_type(pump_type).await?;
        }
        if let Some(area) = &update.area {
            self.enter_pump_area(area).await?;
        }
        if let Some(latitude) = update.latitude {
            self.enter_pump_latitude(latitude).await?;
        }
        if let Some(longitude) = update.longitude {
            self.enter_pump_longitude(longitude).await?;
        }
        if let Some(flow_rate) = &update.flow_rate {
            self.enter_pump_flow_rate(flow_rate).await?;
        }
        if let Some(offset) = update.offset {
            self.enter_pump_offset(offset).await?;
        }
        if let Some(pressure) = update.current_pressure {
            self.enter_pump_current_pressure(pressure).await?;
        }
        if let Some(pressure) = update.min_pressure {
            self.enter_pump_min_pressure(pressure).await?;
        }
        if let Some(pressure) = update.max_pressure {
            self.enter_pump_max_pressure(pressure).await?;
        }

        self.save_changes().await
    }

    // --- verification ---

    pub async fn verify_modal_opened(&self) -> E2eResult<()> {
        for locator in [
            &self.modal,
            &self.name_input,
            &self.save_button,
            &self.cancel_button,
        ] {
            self.kit.verify_element_visible(locator).await?;
        }
        Ok(())
    }

    pub async fn verify_modal_closed(&self) -> E2eResult<()> {
        self.kit.verify_element_hidden(&self.modal).await
    }

    pub async fn verify_modal_title(&self, expected: &str) -> E2eResult<()> {
        self.kit
            .verify_element_contains_text(&self.modal_title, expected)
            .await
    }

    pub async fn verify_save_button_enabled(&self) -> E2eResult<()> {
        self.kit.verify_element_enabled(&self.save_button).await
    }

    pub async fn verify_save_button_disabled(&self) -> E2eResult<()> {
        self.kit.verify_element_disabled(&self.save_button).await
    }

    pub async fn verify_success_message(&self, expected: &str) -> E2eResult<()> {
        self.kit.verify_element_visible(&self.success_message).await?;
        self.kit
            .verify_element_contains_text(&self.success_message, expected)
            .await
    }

    pub async fn verify_error_message(&self, expected: &str) -> E2eResult<()> {
        self.kit.verify_element_visible(&self.error_message).await?;
        self.kit
            .verify_element_contains_text(&self.error_message, expected)
            .await
    }

    /// `field` is parsed with [`ValidationField::from_str`]
    pub async fn verify_validation_error(&self, field: &str, expected: &str) -> E2eResult<()> {
        let field: ValidationField = field.parse()?;
        let locator = Locator::test_id(field.test_id());
        self.kit.verify_element_visible(&locator).await?;
        self.kit.verify_element_contains_text(&locator, expected).await
    }

    /// Every required-field marker on the form is visible
    pub async fn verify_required_fields(&self) -> E2eResult<()> {
        let total = self.kit.count(&self.required_field_indicator).await?;
        for index in 0..total {
            self.kit
                .verify_element_visible(&self.required_field_indicator.nth(index))
                .await?;
        }
        Ok(())
    }

    // --- getters ---

    pub async fn get_pump_name_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.name_input).await
    }

    pub async fn get_pump_type_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.type_dropdown).await
    }

    pub async fn get_pump_area_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.area_dropdown).await
    }

    pub async fn get_pump_latitude_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.latitude_input).await
    }

    pub async fn get_pump_longitude_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.longitude_input).await
    }

    pub async fn get_pump_flow_rate_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.flow_rate_input).await
    }

    pub async fn get_pump_offset_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.offset_input).await
    }

    pub async fn get_pump_current_pressure_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.current_pressure_input).await
    }

    pub async fn get_pump_min_pressure_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.min_pressure_input).await
    }

    pub async fn get_pump_max_pressure_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.max_pressure_input).await
    }

    pub async fn get_modal_title_text(&self) -> E2eResult<String> {
        self.kit.get_text(&self.modal_title).await
    }

    // --- responsive ---

    pub async fn verify_mobile_layout(&self) -> E2eResult<()> {
        if !self.kit.is_mobile() {
            return Ok(());
        }
        self.kit.verify_element_visible(&self.mobile_close_button).await?;
        self.check_modal_size(DeviceClass::Mobile).await
    }

    pub async fn verify_tablet_layout(&self) -> E2eResult<()> {
        if !self.kit.is_tablet() {
            return Ok(());
        }
        self.check_modal_size(DeviceClass::Tablet).await
    }

    pub async fn verify_desktop_layout(&self) -> E2eResult<()> {
        if !self.kit.is_desktop() {
            return Ok(());
        }
        self.kit.verify_element_visible(&self.delete_button).await?;
        self.check_modal_size(DeviceClass::Desktop).await
    }

    async fn check_modal_size(&self, device: DeviceClass) -> E2eResult<()> {
        let modal = self.kit.bounding_box(&self.modal).await?;
        layout::check_modal(device, self.kit.viewport(), modal)
    }

    // --- keyboard ---

    pub async fn navigate_with_tab(&self) -> E2eResult<()> {
        self.kit.press_key("Tab").await
    }

    pub async fn submit_with_enter(&self) -> E2eResult<()> {
        self.kit.press_key("Enter").await
    }

    pub async fn cancel_with_escape(&self) -> E2eResult<()> {
        self.kit.press_key("Escape").await?;
        self.verify_modal_closed().await
    }
}
