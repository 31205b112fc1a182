//! Given/When/Then clauses for login scenarios

use std::sync::Arc;

use pumpmaster_common::Credentials;
use tracing::debug;

use crate::browser::{Driver, InteractionKit, Locator};
use crate::error::E2eResult;
use crate::pages::LoginPage;

pub struct LoginSteps<D: Driver> {
    page: LoginPage<D>,
    valid: Credentials,
    invalid: Credentials,
}

impl<D: Driver> LoginSteps<D> {
    /// `valid` is normally `SuiteConfig::ui_credentials`
    pub fn new(kit: Arc<InteractionKit<D>>, valid: Credentials) -> Self {
        Self {
            page: LoginPage::new(kit),
            valid,
            invalid: Credentials::new("invalid@example.com", "wrongpassword"),
        }
    }

    pub fn page(&self) -> &LoginPage<D> {
        &self.page
    }

    // --- given ---

    pub async fn given_i_am_on_the_login_page(&self) -> E2eResult<()> {
        self.page.navigate_to_login().await
    }

    /// Device emulation comes from the launch profile
    pub async fn given_i_am_using_a_mobile_device(&self) -> E2eResult<()> {
        debug!("mobile device selected by launch profile");
        Ok(())
    }

    pub async fn given_i_am_using_a_tablet_device(&self) -> E2eResult<()> {
        debug!("tablet device selected by launch profile");
        Ok(())
    }

    // --- when ---

    pub async fn when_i_enter_valid_username_and_password(&self) -> E2eResult<()> {
        self.page.enter_username(&self.valid.username).await?;
        self.page.enter_password(&self.valid.password).await
    }

    pub async fn when_i_enter_invalid_username_and_password(&self) -> E2eResult<()> {
        self.page.enter_username(&self.invalid.username).await?;
        self.page.enter_password(&self.invalid.password).await
    }

    pub async fn when_i_leave_username_and_password_empty(&self) -> E2eResult<()> {
        self.page.enter_username("").await?;
        self.page.enter_password("").await
    }

    pub async fn when_i_check_the_remember_me_checkbox(&self) -> E2eResult<()> {
        debug!("remember me was removed from the product; step skipped");
        Ok(())
    }

    pub async fn when_i_click_the_login_button(&self) -> E2eResult<()> {
        self.page.click_login_button().await
    }

    pub async fn when_i_tap_the_login_button(&self) -> E2eResult<()> {
        self.page.click_login_button().await
    }

    pub async fn when_i_click_the_forgot_password_link(&self) -> E2eResult<()> {
        debug!("forgot password was removed from the product; step skipped");
        Ok(())
    }

    pub async fn when_i_tap_the_touch_id_button(&self) -> E2eResult<()> {
        self.page.login_with_touch_id().await
    }

    pub async fn when_i_navigate_using_only_keyboard(&self) -> E2eResult<()> {
        self.page.kit().press_key("Tab").await
    }

    pub async fn when_i_tab_through_all_form_elements(&self) -> E2eResult<()> {
        for _ in 0..3 {
            self.page.kit().press_key("Tab").await?;
        }
        Ok(())
    }

    pub async fn when_i_enter_credentials_using_keyboard(&self) -> E2eResult<()> {
        self.when_i_enter_valid_username_and_password().await
    }

    pub async fn when_i_press_enter_to_submit(&self) -> E2eResult<()> {
        self.page.kit().press_key("Enter").await
    }

    /// Submit bad credentials `attempts` times, waiting for the error between tries
    pub async fn when_i_enter_invalid_credentials(&self, attempts: usize) -> E2eResult<()> {
        let error = Locator::test_id("error-message");
        for attempt in 0..attempts {
            self.when_i_enter_invalid_username_and_password().await?;
            self.page.click_login_button().await?;
            if attempt + 1 < attempts {
                self.page.kit().wait_for_element(&error).await?;
            }
        }
        Ok(())
    }

    // --- then ---

    pub async fn then_i_should_be_redirected_to_the_pumps_overview_page(&self) -> E2eResult<()> {
        self.page.kit().wait_for_url("**/pumps").await
    }

    pub async fn then_i_should_see_a_welcome_message(&self) -> E2eResult<()> {
        debug!("welcome message is not part of the UI; step skipped");
        Ok(())
    }

    pub async fn then_i_should_see_an_error_message(&self, expected: &str) -> E2eResult<()> {
        self.page.verify_error_message(expected).await
    }

    pub async fn then_i_should_remain_on_the_login_page(&self) -> E2eResult<()> {
        self.page.verify_login_page_loaded().await
    }

    pub async fn then_the_login_button_should_be_disabled(&self) -> E2eResult<()> {
        self.page.verify_login_button_disabled().await
    }

    pub async fn then_i_should_see_validation_messages_for_required_fields(&self) -> E2eResult<()> {
        self.page.verify_username_field_empty().await?;
        self.page.verify_password_field_empty().await
    }

    pub async fn then_my_login_should_be_remembered_for_future_sessions(&self) -> E2eResult<()> {
        debug!("remember me was removed from the product; step skipped");
        Ok(())
    }

    pub async fn then_i_should_be_redirected_to_the_password_reset_page(&self) -> E2eResult<()> {
        self.page.kit().wait_for_url("**/reset-password").await
    }

    pub async fn then_i_should_be_authenticated_using_biometric_authentication(
        &self,
    ) -> E2eResult<()> {
        debug!("biometric verification is not observable from the browser; step skipped");
        Ok(())
    }

    pub async fn then_the_mobile_navigation_should_be_visible(&self) -> E2eResult<()> {
        self.page.verify_mobile_layout().await
    }

    pub async fn then_the_layout_should_be_optimized_for_tablet_viewing(&self) -> E2eResult<()> {
        self.page.verify_tablet_layout().await
    }

    pub async fn then_i_should_be_able_to_complete_login_without_using_mouse(
        &self,
    ) -> E2eResult<()> {
        self.page.kit().wait_for_url("**/pumps").await
    }

    pub async fn then_my_account_should_be_temporarily_locked(&self) -> E2eResult<()> {
        self.page
            .verify_error_message("Account temporarily locked")
            .await
    }

    pub async fn then_i_should_see_a_message_about_account_lockout(&self) -> E2eResult<()> {
        self.page.verify_error_message("Too many failed attempts").await
    }
}
