//! Login screen

use std::sync::Arc;

use crate::browser::{DeviceClass, Driver, InteractionKit, Locator};
use crate::error::{E2eError, E2eResult};

use super::layout;

pub struct LoginPage<D: Driver> {
    kit: Arc<InteractionKit<D>>,
    username_input: Locator,
    password_input: Locator,
    login_button: Locator,
    error_message: Locator,
    login_form: Locator,
    page_title: Locator,
    mobile_menu_toggle: Locator,
    touch_id_button: Locator,
}

impl<D: Driver> LoginPage<D> {
    pub fn new(kit: Arc<InteractionKit<D>>) -> Self {
        Self {
            kit,
            username_input: Locator::test_id("username-input"),
            password_input: Locator::test_id("password-input"),
            login_button: Locator::test_id("login-button"),
            error_message: Locator::test_id("error-message"),
            login_form: Locator::test_id("login-form"),
            page_title: Locator::css("h1"),
            mobile_menu_toggle: Locator::test_id("mobile-menu-toggle"),
            touch_id_button: Locator::test_id("touch-id-button"),
        }
    }

    pub fn kit(&self) -> &Arc<InteractionKit<D>> {
        &self.kit
    }

    pub async fn navigate_to_login(&self) -> E2eResult<()> {
        self.kit.navigate("/login").await?;
        self.kit.verify_element_visible(&self.login_form).await
    }

    pub async fn enter_username(&self, username: &str) -> E2eResult<()> {
        self.kit.fill_input(&self.username_input, username).await
    }

    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.kit.fill_input(&self.password_input, password).await
    }

    pub async fn click_login_button(&self) -> E2eResult<()> {
        self.kit.click_element(&self.login_button).await
    }

    pub async fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login_button().await
    }

    /// Mobile only; no-op elsewhere
    pub async fn login_with_touch_id(&self) -> E2eResult<()> {
        if self.kit.is_mobile() {
            self.kit.click_element(&self.touch_id_button).await?;
        }
        Ok(())
    }

    /// Mobile only; no-op elsewhere
    pub async fn toggle_mobile_menu(&self) -> E2eResult<()> {
        if self.kit.is_mobile() {
            self.kit.click_element(&self.mobile_menu_toggle).await?;
        }
        Ok(())
    }

    pub async fn verify_login_page_loaded(&self) -> E2eResult<()> {
        for locator in [
            &self.login_form,
            &self.username_input,
            &self.password_input,
            &self.login_button,
        ] {
            self.kit.verify_element_visible(locator).await?;
        }
        Ok(())
    }

    pub async fn verify_page_title(&self, expected: &str) -> E2eResult<()> {
        self.kit
            .verify_element_contains_text(&self.page_title, expected)
            .await
    }

    pub async fn verify_error_message(&self, expected: &str) -> E2eResult<()> {
        self.kit.verify_element_visible(&self.error_message).await?;
        self.kit
            .verify_element_contains_text(&self.error_message, expected)
            .await
    }

    pub async fn verify_error_message_hidden(&self) -> E2eResult<()> {
        self.kit.verify_element_hidden(&self.error_message).await
    }

    pub async fn verify_login_button_enabled(&self) -> E2eResult<()> {
        self.kit.verify_element_enabled(&self.login_button).await
    }

    pub async fn verify_login_button_disabled(&self) -> E2eResult<()> {
        self.kit.verify_element_disabled(&self.login_button).await
    }

    pub async fn verify_username_field_empty(&self) -> E2eResult<()> {
        if !self.get_username_value().await?.is_empty() {
            return Err(E2eError::AssertionFailed(
                "Username field is not empty".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn verify_password_field_empty(&self) -> E2eResult<()> {
        if !self.get_password_value().await?.is_empty() {
            return Err(E2eError::AssertionFailed(
                "Password field is not empty".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn get_error_message_text(&self) -> E2eResult<String> {
        self.kit.get_text(&self.error_message).await
    }

    pub async fn get_username_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.username_input).await
    }

    pub async fn get_password_value(&self) -> E2eResult<String> {
        self.kit.input_value(&self.password_input).await
    }

    pub async fn verify_mobile_layout(&self) -> E2eResult<()> {
        if !self.kit.is_mobile() {
            return Ok(());
        }
        self.kit.verify_element_visible(&self.mobile_menu_toggle).await?;
        let form = self.kit.bounding_box(&self.login_form).await?;
        layout::check_login_form(DeviceClass::Mobile, form)
    }

    pub async fn verify_tablet_layout(&self) -> E2eResult<()> {
        if !self.kit.is_tablet() {
            return Ok(());
        }
        let form = self.kit.bounding_box(&self.login_form).await?;
        layout::check_login_form(DeviceClass::Tablet, form)
    }

    pub async fn verify_desktop_layout(&self) -> E2eResult<()> {
        if !self.kit.is_desktop() {
            return Ok(());
        }
        let form = self.kit.bounding_box(&self.login_form).await?;
        layout::check_login_form(DeviceClass::Desktop, form)
    }
}
