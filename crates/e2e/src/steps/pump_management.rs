//! Given/When/Then clauses for creating, editing, and deleting pumps

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pumpmaster_common::TestDataFactory;
use tracing::debug;

use crate::browser::{Driver, InteractionKit, Locator};
use crate::error::{E2eError, E2eResult};
use crate::pages::{PumpEditModalPage, PumpsOverviewPage};

/// Upper bound for the modal to render while the system is busy
const RESPONSE_BUDGET: Duration = Duration::from_secs(3);

pub struct PumpManagementSteps<D: Driver> {
    kit: Arc<InteractionKit<D>>,
    modal: PumpEditModalPage<D>,
    overview: PumpsOverviewPage<D>,
    factory: Mutex<TestDataFactory>,
}

impl<D: Driver> PumpManagementSteps<D> {
    pub fn new(kit: Arc<InteractionKit<D>>, factory: TestDataFactory) -> Self {
        Self {
            modal: PumpEditModalPage::new(kit.clone()),
            overview: PumpsOverviewPage::new(kit.clone()),
            kit,
            factory: Mutex::new(factory),
        }
    }

    pub fn modal(&self) -> &PumpEditModalPage<D> {
        &self.modal
    }

    pub fn overview(&self) -> &PumpsOverviewPage<D> {
        &self.overview
    }

    async fn expect_message(&self, test_id: &str, text: &str) -> E2eResult<()> {
        let locator = Locator::test_id(test_id);
        self.kit.verify_element_visible(&locator).await?;
        self.kit.verify_element_contains_text(&locator, text).await
    }

    // --- given ---

    pub async fn given_i_am_on_the_pumps_overview_page(&self) -> E2eResult<()> {
        self.overview.navigate_to_pumps_overview().await
    }

    pub async fn given_i_have_selected_a_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.overview.verify_pump_exists(pump_name).await
    }

    pub async fn given_there_is_an_existing_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.overview.verify_pump_exists(pump_name).await
    }

    // --- when ---

    pub async fn when_i_click_the_add_new_pump_button(&self) -> E2eResult<()> {
        self.overview.click_new_pump_button().await
    }

    pub async fn when_i_click_the_edit_button_for_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.overview.click_edit_pump(pump_name).await
    }

    pub async fn when_i_click_the_delete_button_for_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.overview.click_delete_pump(pump_name).await
    }

    pub async fn when_i_fill_in_the_pump_details_with_valid_data(&self) -> E2eResult<()> {
        let pump = self.factory.lock().create_pump();
        self.modal.fill_pump_form(&pump).await
    }

    pub async fn when_i_fill_in_the_pump_details_with_invalid_data(&self) -> E2eResult<()> {
        self.modal.enter_pump_name("").await?;
        self.modal.enter_pump_flow_rate("-100").await
    }

    pub async fn when_i_leave_required_fields_empty(&self) -> E2eResult<()> {
        self.modal.enter_pump_name("").await?;
        self.modal.enter_pump_flow_rate("").await
    }

    pub async fn when_i_enter_a_pump_name_that_already_exists(&self) -> E2eResult<()> {
        self.modal.enter_pump_name("Existing Pump Name").await
    }

    pub async fn when_i_enter_an_invalid_flow_rate_value(&self) -> E2eResult<()> {
        self.modal.enter_pump_flow_rate("invalid").await
    }

    pub async fn when_i_select_an_invalid_location(&self) -> E2eResult<()> {
        self.modal.enter_pump_area("Invalid Area").await
    }

    pub async fn when_i_update_the_pump_information(&self) -> E2eResult<()> {
        let pump = self.factory.lock().create_pump();
        self.modal
            .enter_pump_name(&format!("Updated {}", pump.name))
            .await?;
        self.modal
            .enter_pump_area(&format!("Updated {}", pump.area))
            .await
    }

    pub async fn when_i_click_save(&self) -> E2eResult<()> {
        self.modal.save_changes().await
    }

    pub async fn when_i_click_cancel(&self) -> E2eResult<()> {
        self.modal.cancel_changes().await
    }

    pub async fn when_i_click_delete(&self) -> E2eResult<()> {
        self.modal.delete_pump().await
    }

    pub async fn when_i_confirm_the_deletion(&self) -> E2eResult<()> {
        self.kit
            .click_element(&Locator::test_id("confirm-delete-button"))
            .await
    }

    pub async fn when_i_cancel_the_deletion(&self) -> E2eResult<()> {
        self.kit
            .click_element(&Locator::test_id("cancel-delete-button"))
            .await
    }

    pub async fn when_i_try_to_save_without_changing_anything(&self) -> E2eResult<()> {
        self.modal.save_changes().await
    }

    pub async fn when_i_navigate_away_without_saving(&self) -> E2eResult<()> {
        self.kit.go_back().await
    }

    pub async fn when_i_use_keyboard_navigation_to_complete_the_form(&self) -> E2eResult<()> {
        self.kit.press_key("Tab").await?;
        self.kit
            .type_text(&Locator::css(":focus"), "Test Pump", Duration::ZERO)
            .await?;
        self.kit.press_key("Tab").await?;
        self.kit.press_key("ArrowDown").await?;
        self.kit.press_key("Enter").await
    }

    /// One create round; a single tab cannot open the modal twice at once
    pub async fn when_i_try_to_create_multiple_pumps_simultaneously(&self) -> E2eResult<()> {
        self.when_i_click_the_add_new_pump_button().await?;
        self.when_i_fill_in_the_pump_details_with_valid_data().await?;
        self.when_i_click_save().await
    }

    pub async fn when_the_system_is_under_heavy_load(&self) -> E2eResult<()> {
        debug!("load generation is out of scope for browser tests; step skipped");
        Ok(())
    }

    // --- then ---

    pub async fn then_the_add_new_pump_modal_should_open(&self) -> E2eResult<()> {
        self.modal.verify_modal_opened().await?;
        self.modal.verify_modal_title("Add New Pump").await
    }

    pub async fn then_the_edit_pump_modal_should_open(&self) -> E2eResult<()> {
        self.modal.verify_modal_opened().await?;
        self.modal.verify_modal_title("Edit Pump").await
    }

    pub async fn then_the_delete_confirmation_dialog_should_appear(&self) -> E2eResult<()> {
        self.kit
            .verify_element_visible(&Locator::test_id("delete-confirmation-dialog"))
            .await
    }

    pub async fn then_the_new_pump_should_be_created_successfully(&self) -> E2eResult<()> {
        self.expect_message("success-message", "Pump created successfully")
            .await?;
        self.modal.verify_modal_closed().await
    }

    pub async fn then_the_pump_should_be_updated_successfully(&self) -> E2eResult<()> {
        self.expect_message("success-message", "Pump updated successfully")
            .await?;
        self.modal.verify_modal_closed().await
    }

    pub async fn then_the_pump_should_be_deleted_successfully(&self) -> E2eResult<()> {
        self.expect_message("success-message", "Pump deleted successfully")
            .await
    }

    pub async fn then_i_should_see_validation_errors(&self) -> E2eResult<()> {
        self.modal.verify_required_fields().await
    }

    pub async fn then_i_should_see_an_error_message(&self, message: &str) -> E2eResult<()> {
        self.expect_message("error-message", message).await
    }

    pub async fn then_the_save_button_should_be_disabled(&self) -> E2eResult<()> {
        self.modal.verify_save_button_disabled().await
    }

    pub async fn then_the_modal_should_close(&self) -> E2eResult<()> {
        self.modal.verify_modal_closed().await
    }

    pub async fn then_the_original_data_should_be_preserved(&self) -> E2eResult<()> {
        self.overview.verify_pumps_overview_page_loaded().await
    }

    pub async fn then_the_pump_should_still_exist(&self) -> E2eResult<()> {
        self.expect_non_empty_list().await
    }

    pub async fn then_the_pump_should_not_be_created(&self) -> E2eResult<()> {
        self.modal.verify_modal_opened().await
    }

    pub async fn then_i_should_see_a_confirmation_dialog(&self) -> E2eResult<()> {
        self.kit
            .verify_element_visible(&Locator::test_id("confirmation-dialog"))
            .await
    }

    pub async fn then_i_should_be_able_to_complete_the_form_using_only_keyboard(
        &self,
    ) -> E2eResult<()> {
        self.modal.verify_modal_opened().await
    }

    pub async fn then_the_system_should_handle_multiple_operations_gracefully(
        &self,
    ) -> E2eResult<()> {
        self.kit
            .verify_element_hidden(&Locator::test_id("error-message"))
            .await
    }

    pub async fn then_the_system_should_respond_within_acceptable_time_limits(
        &self,
    ) -> E2eResult<()> {
        let started = Instant::now();
        self.modal.verify_modal_opened().await?;
        let elapsed = started.elapsed();
        if elapsed >= RESPONSE_BUDGET {
            return Err(E2eError::AssertionFailed(format!(
                "modal took {:?} to open, budget is {:?}",
                elapsed, RESPONSE_BUDGET
            )));
        }
        Ok(())
    }

    pub async fn then_the_new_pump_should_appear_in_the_list(&self) -> E2eResult<()> {
        self.overview.verify_pumps_overview_page_loaded().await?;
        self.expect_non_empty_list().await
    }

    pub async fn then_the_updated_information_should_be_displayed(&self) -> E2eResult<()> {
        self.overview.verify_pumps_overview_page_loaded().await
    }

    pub async fn then_the_pump_should_no_longer_appear_in_the_list(&self) -> E2eResult<()> {
        self.overview.verify_pumps_overview_page_loaded().await
    }

    pub async fn then_the_form_fields_should_be_accessible_via_keyboard(&self) -> E2eResult<()> {
        self.modal.navigate_with_tab().await
    }

    pub async fn then_the_mobile_layout_should_be_optimized(&self) -> E2eResult<()> {
        self.modal.verify_mobile_layout().await
    }

    pub async fn then_the_tablet_layout_should_be_optimized(&self) -> E2eResult<()> {
        self.modal.verify_tablet_layout().await
    }

    async fn expect_non_empty_list(&self) -> E2eResult<()> {
        if self.overview.get_pump_count().await? == 0 {
            return Err(E2eError::AssertionFailed(
                "expected at least one pump in the list".to_string(),
            ));
        }
        Ok(())
    }
}
