//! Pumps overview: list, search, filter, sort, and pagination

use std::sync::Arc;
use std::time::Duration;

use crate::browser::kit::millis;
use crate::browser::{BrowserStep, Driver, InteractionKit, Locator, MouseButton};
use crate::error::{E2eError, E2eResult};

use super::layout;

/// Truthy once the loading spinner is gone or styled hidden
const RESULTS_SETTLED: &str = "(() => { \
    const spinner = document.querySelector('[data-testid=\"loading-spinner\"]'); \
    return !spinner || (spinner.getAttribute('style') || '').includes('display: none'); \
})()";

const RESULTS_TIMEOUT: Duration = Duration::from_secs(30);

pub struct PumpsOverviewPage<D: Driver> {
    kit: Arc<InteractionKit<D>>,
    new_pump_button: Locator,
    search_input: Locator,
    filter_dropdown: Locator,
    pumps_list: Locator,
    pump_card: Locator,
    sort_dropdown: Locator,
    refresh_button: Locator,
    pagination_container: Locator,
    previous_page_button: Locator,
    next_page_button: Locator,
    items_per_page_dropdown: Locator,
    total_items_count: Locator,
    no_data_message: Locator,
    mobile_filter_toggle: Locator,
    mobile_sort_toggle: Locator,
    pump_name: Locator,
}

impl<D: Driver> PumpsOverviewPage<D> {
    pub fn new(kit: Arc<InteractionKit<D>>) -> Self {
        Self {
            kit,
            new_pump_button: Locator::test_id("new-pump-button"),
            search_input: Locator::test_id("search-input"),
            filter_dropdown: Locator::test_id("filter-dropdown"),
            pumps_list: Locator::test_id("pumps-list"),
            pump_card: Locator::test_id("pump-card"),
            sort_dropdown: Locator::test_id("sort-dropdown"),
            refresh_button: Locator::test_id("refresh-button"),
            pagination_container: Locator::test_id("pagination-container"),
            previous_page_button: Locator::test_id("previous-page-button"),
            next_page_button: Locator::test_id("next-page-button"),
            items_per_page_dropdown: Locator::test_id("items-per-page-dropdown"),
            total_items_count: Locator::test_id("total-items-count"),
            no_data_message: Locator::test_id("no-data-message"),
            mobile_filter_toggle: Locator::test_id("mobile-filter-toggle"),
            mobile_sort_toggle: Locator::test_id("mobile-sort-toggle"),
            pump_name: Locator::test_id("pump-name"),
        }
    }

    pub fn kit(&self) -> &Arc<InteractionKit<D>> {
        &self.kit
    }

    /// The card whose text contains `pump_name`
    pub fn pump_card_by_name(&self, pump_name: &str) -> Locator {
        self.pump_card.has_text(pump_name)
    }

    fn card_part(&self, pump_name: &str, test_id: &str) -> Locator {
        self.pump_card_by_name(pump_name)
            .within(&Locator::test_id(test_id))
    }

    pub async fn navigate_to_pumps_overview(&self) -> E2eResult<()> {
        self.kit.navigate("/pumps").await?;
        self.kit.verify_element_visible(&self.pumps_list).await
    }

    pub async fn click_new_pump_button(&self) -> E2eResult<()> {
        self.kit.click_element(&self.new_pump_button).await
    }

    /// Wait until the list has finished loading
    pub async fn wait_for_results(&self) -> E2eResult<()> {
        self.kit
            .run(BrowserStep::WaitForFunction {
                script: RESULTS_SETTLED.to_string(),
                timeout_ms: millis(RESULTS_TIMEOUT),
            })
            .await?;
        Ok(())
    }

    pub async fn search_pumps(&self, term: &str) -> E2eResult<()> {
        self.kit.fill_input(&self.search_input, term).await?;
        self.kit.press_key("Enter").await?;
        self.wait_for_results().await
    }

    pub async fn clear_search(&self) -> E2eResult<()> {
        self.search_pumps("").await
    }

    pub async fn filter_pumps_by_type(&self, pump_type: &str) -> E2eResult<()> {
        self.kit
            .select_dropdown_option(&self.filter_dropdown, pump_type)
            .await?;
        self.wait_for_results().await
    }

    pub async fn sort_pumps(&self, option: &str) -> E2eResult<()> {
        self.kit
            .select_dropdown_option(&self.sort_dropdown, option)
            .await?;
        self.wait_for_results().await
    }

    pub async fn refresh_pumps_list(&self) -> E2eResult<()> {
        self.kit.click_element(&self.refresh_button).await?;
        self.wait_for_results().await
    }

    pub async fn toggle_mobile_filter(&self) -> E2eResult<()> {
        if self.kit.is_mobile() {
            self.kit.click_element(&self.mobile_filter_toggle).await?;
        }
        Ok(())
    }

    pub async fn toggle_mobile_sort(&self) -> E2eResult<()> {
        if self.kit.is_mobile() {
            self.kit.click_element(&self.mobile_sort_toggle).await?;
        }
        Ok(())
    }

    /// Drag down from near the top to mid-screen; mobile only
    pub async fn pull_to_refresh(&self) -> E2eResult<()> {
        if !self.kit.is_mobile() {
            return Ok(());
        }
        let Some(viewport) = self.kit.viewport() else {
            return Ok(());
        };
        let x = f64::from(viewport.width) / 2.0;
        self.kit.mouse_move(x, 100.0, 1).await?;
        self.kit.run(BrowserStep::MouseDown).await?;
        self.kit
            .mouse_move(x, f64::from(viewport.height) / 2.0, 10)
            .await?;
        self.kit.run(BrowserStep::MouseUp).await?;
        self.wait_for_results().await
    }

    pub async fn click_edit_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.kit
            .click_element(&self.card_part(pump_name, "edit-pump-button"))
            .await
    }

    pub async fn click_delete_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.kit
            .click_element(&self.card_part(pump_name, "delete-pump-button"))
            .await
    }

    pub async fn click_view_pump_details(&self, pump_name: &str) -> E2eResult<()> {
        self.kit
            .click_element(&self.card_part(pump_name, "view-pump-details-button"))
            .await
    }

    pub async fn hover_pump(&self, pump_name: &str) -> E2eResult<()> {
        self.kit.hover(&self.pump_card_by_name(pump_name)).await
    }

    pub async fn right_click_pump(&self, pump_name: &str) -> E2eResult<()> {
        let card = self.pump_card_by_name(pump_name);
        self.kit.wait_for_element(&card).await?;
        self.kit.click_with(&card, MouseButton::Right, 1).await
    }

    pub async fn double_click_pump(&self, pump_name: &str) -> E2eResult<()> {
        let card = self.pump_card_by_name(pump_name);
        self.kit.wait_for_element(&card).await?;
        self.kit.click_with(&card, MouseButton::Left, 2).await
    }

    /// No-op on the last page
    pub async fn go_to_next_page(&self) -> E2eResult<()> {
        if self.kit.is_element_enabled(&self.next_page_button).await? {
            self.kit.click_element(&self.next_page_button).await?;
            self.wait_for_results().await?;
        }
        Ok(())
    }

    /// No-op on the first page
    pub async fn go_to_previous_page(&self) -> E2eResult<()> {
        if self.kit.is_element_enabled(&self.previous_page_button).await? {
            self.kit.click_element(&self.previous_page_button).await?;
            self.wait_for_results().await?;
        }
        Ok(())
    }

    pub async fn change_items_per_page(&self, items: &str) -> E2eResult<()> {
        self.kit
            .select_dropdown_option(&self.items_per_page_dropdown, items)
            .await?;
        self.wait_for_results().await
    }

    pub async fn verify_pumps_overview_page_loaded(&self) -> E2eResult<()> {
        self.kit.verify_element_visible(&self.new_pump_button).await?;
        self.kit.verify_element_visible(&self.search_input).await?;
        self.kit.verify_element_visible(&self.pumps_list).await
    }

    pub async fn verify_pump_exists(&self, pump_name: &str) -> E2eResult<()> {
        self.kit
            .verify_element_visible(&self.pump_card_by_name(pump_name))
            .await
    }

    pub async fn verify_pump_does_not_exist(&self, pump_name: &str) -> E2eResult<()> {
        self.kit
            .verify_element_hidden(&self.pump_card_by_name(pump_name))
            .await
    }

    pub async fn verify_search_results(&self, expected: usize) -> E2eResult<()> {
        let actual = self.get_pump_count().await?;
        if actual != expected {
            return Err(E2eError::AssertionFailed(format!(
                "Expected {} search results, but found {}",
                expected, actual
            )));
        }
        Ok(())
    }

    pub async fn verify_no_data_message(&self) -> E2eResult<()> {
        self.kit.verify_element_visible(&self.no_data_message).await
    }

    pub async fn verify_pump_details(
        &self,
        pump_name: &str,
        expected_type: &str,
        expected_status: &str,
    ) -> E2eResult<()> {
        self.kit
            .verify_element_contains_text(&self.card_part(pump_name, "pump-type"), expected_type)
            .await?;
        self.kit
            .verify_element_contains_text(
                &self.card_part(pump_name, "pump-status"),
                expected_status,
            )
            .await
    }

    pub async fn verify_pagination_visible(&self) -> E2eResult<()> {
        self.kit
            .verify_element_visible(&self.pagination_container)
            .await
    }

    pub async fn get_pump_count(&self) -> E2eResult<usize> {
        self.kit.count(&self.pump_card).await
    }

    pub async fn get_total_items_count(&self) -> E2eResult<String> {
        self.kit.get_text(&self.total_items_count).await
    }

    pub async fn get_search_input_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.search_input).await
    }

    pub async fn get_current_filter_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.filter_dropdown).await
    }

    pub async fn get_current_sort_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.sort_dropdown).await
    }

    /// Names of every rendered card, skipping empty ones
    pub async fn get_all_pump_names(&self) -> E2eResult<Vec<String>> {
        let names = self.kit.all_texts(&self.pump_name).await?;
        Ok(names.into_iter().filter(|n| !n.is_empty()).collect())
    }

    pub async fn verify_mobile_layout(&self) -> E2eResult<()> {
        if !self.kit.is_mobile() {
            return Ok(());
        }
        self.kit
            .verify_element_visible(&self.mobile_filter_toggle)
            .await?;
        self.kit.verify_element_visible(&self.mobile_sort_toggle).await?;
        let card = self.kit.bounding_box(&self.pump_card.first()).await?;
        layout::check_mobile_card(self.kit.viewport(), card)
    }
}
