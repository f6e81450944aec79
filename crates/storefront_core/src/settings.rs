use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use shared::error::StorefrontError;

const ENV_PREFIX: &str = "STOREFRONT__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_debounce_ms: u64,
    pub search_min_chars: usize,
    pub gallery_fade_ms: u64,
    pub dashboard_refresh_secs: u64,
    pub stats_fade_ms: u64,
    pub stats_dim_opacity: String,
    pub back_to_top_threshold_px: f64,
    pub preview_max_width_px: u32,
    pub admin_path_prefix: String,
    pub admin_dashboard_path: String,
    pub add_to_cart_action: String,
    /// Put a status select back to its last confirmed value when the admin
    /// declines the change.
    pub revert_declined_status: bool,
    pub messages: Messages,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
            search_min_chars: 2,
            gallery_fade_ms: 150,
            dashboard_refresh_secs: 30,
            stats_fade_ms: 500,
            stats_dim_opacity: "0.8".into(),
            back_to_top_threshold_px: 300.0,
            preview_max_width_px: 200,
            admin_path_prefix: "/admin".into(),
            admin_dashboard_path: "/admin".into(),
            add_to_cart_action: shared::protocol::ADD_TO_CART_ACTION.into(),
            revert_declined_status: false,
            messages: Messages::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub remove_from_cart: String,
    /// `{item}` is replaced by the item name.
    pub delete_confirm: String,
    pub delete_fallback_item: String,
    pub order_status_confirm: String,
    pub invalid_phone: String,
    pub adding_to_cart: String,
    pub back_to_top_icon: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            remove_from_cart: "هل أنت متأكد من حذف هذا المنتج من السلة؟".into(),
            delete_confirm: "هل أنت متأكد من حذف {item}؟".into(),
            delete_fallback_item: "هذا العنصر".into(),
            order_status_confirm: "هل تريد تحديث حالة الطلب؟".into(),
            invalid_phone: "يرجى إدخال رقم هاتف جزائري صحيح".into(),
            adding_to_cart: r#"<i class="fas fa-spinner fa-spin"></i> جارِ الإضافة..."#.into(),
            back_to_top_icon: r#"<i class="fas fa-arrow-up"></i>"#.into(),
        }
    }
}

impl Messages {
    pub fn delete_confirmation(&self, item_name: Option<&str>) -> String {
        let item = item_name
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.delete_fallback_item);
        self.delete_confirm.replace("{item}", item)
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self, StorefrontError> {
        let settings: Settings =
            toml::from_str(raw).map_err(|err| StorefrontError::Settings(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StorefrontError> {
        let settings: Settings = serde_json::from_str(raw)
            .map_err(|err| StorefrontError::Settings(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), StorefrontError> {
        if self.dashboard_refresh_secs == 0 {
            return Err(StorefrontError::Settings(
                "dashboard_refresh_secs must be positive".into(),
            ));
        }
        if !self.back_to_top_threshold_px.is_finite() || self.back_to_top_threshold_px < 0.0 {
            return Err(StorefrontError::Settings(format!(
                "back_to_top_threshold_px must be a non-negative number, got {}",
                self.back_to_top_threshold_px
            )));
        }
        if self.add_to_cart_action.trim().is_empty() {
            return Err(StorefrontError::Settings(
                "add_to_cart_action must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Applies `STOREFRONT__*` overrides. Unparseable numbers are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("SEARCH_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.search_debounce_ms = v;
        }
        if let Some(v) = var("SEARCH_MIN_CHARS").and_then(|v| v.parse().ok()) {
            self.search_min_chars = v;
        }
        if let Some(v) = var("GALLERY_FADE_MS").and_then(|v| v.parse().ok()) {
            self.gallery_fade_ms = v;
        }
        if let Some(v) = var("DASHBOARD_REFRESH_SECS").and_then(|v| v.parse().ok()) {
            self.dashboard_refresh_secs = v;
        }
        if let Some(v) = var("BACK_TO_TOP_THRESHOLD_PX").and_then(|v| v.parse().ok()) {
            self.back_to_top_threshold_px = v;
        }
        if let Some(v) = var("ADD_TO_CART_ACTION") {
            self.add_to_cart_action = v;
        }
        if let Some(v) = var("REVERT_DECLINED_STATUS") {
            self.revert_declined_status = matches!(v.trim(), "1" | "true" | "yes");
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn gallery_fade(&self) -> Duration {
        Duration::from_millis(self.gallery_fade_ms)
    }

    pub fn dashboard_refresh(&self) -> Duration {
        Duration::from_secs(self.dashboard_refresh_secs)
    }

    pub fn stats_fade(&self) -> Duration {
        Duration::from_millis(self.stats_fade_ms)
    }
}

/// Defaults, then the TOML file if it exists, then the process environment.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, StorefrontError> {
    let mut settings = match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(raw) => toml::from_str::<Settings>(&raw).map_err(|err| {
                StorefrontError::Settings(format!("{}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(err) => {
                return Err(StorefrontError::Settings(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        },
        None => Settings::default(),
    };

    settings.apply_env_overrides(|name| std::env::var(name).ok());
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
