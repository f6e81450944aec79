//! Contract with the server: the markup hooks the behaviors look for, and the
//! form submissions they send back.

use serde::{Deserialize, Serialize};

use crate::domain::{ProductId, Quantity};

pub const ADD_TO_CART_ACTION: &str = "/add_to_cart";

pub mod selectors {
    pub const CART_QUANTITY_INPUT: &str = ".cart-quantity-input";
    pub const REMOVE_FROM_CART: &str = ".remove-from-cart";
    pub const ADD_TO_CART_BUTTON: &str = ".add-to-cart-btn";
    pub const QUANTITY_INPUT: &str = ".quantity-input";
    pub const QUANTITY_DECREASE: &str = ".quantity-decrease";
    pub const QUANTITY_INCREASE: &str = ".quantity-increase";
    pub const PRODUCT_THUMBNAIL: &str = ".product-thumbnail";
    pub const MAIN_PRODUCT_IMAGE: &str = ".main-product-image";
    pub const NEEDS_VALIDATION: &str = ".needs-validation";
    pub const PHONE_INPUT: &str = r#"input[type="tel"], input[name="phone"]"#;
    pub const DELETE_BUTTON: &str = ".delete-btn";
    pub const STATS_CARD: &str = ".stats-card";
    pub const IMAGE_UPLOAD: &str = r#"input[type="file"][name="image"]"#;
    pub const IMAGE_PREVIEW: &str = ".image-preview";
    pub const STATUS_SELECT: &str = ".status-select";
    pub const SEARCH_INPUT: &str = ".search-input";
    pub const SEARCH_FORM: &str = ".search-form";
    pub const HASH_ANCHOR: &str = r##"a[href^="#"]"##;
    pub const LAZY_IMAGE: &str = "img[data-src]";
    pub const FORM: &str = "form";
    pub const TOOLTIP_TOGGLE: &str = r#"[data-bs-toggle="tooltip"]"#;
}

pub mod classes {
    pub const ACTIVE: &str = "active";
    pub const WAS_VALIDATED: &str = "was-validated";
    pub const LAZY: &str = "lazy";
    pub const BACK_TO_TOP: &str = "btn btn-primary back-to-top";
    pub const IMAGE_PREVIEW: &str = "image-preview img-thumbnail mt-2";
}

pub mod attributes {
    pub const CLASS: &str = "class";
    pub const SRC: &str = "src";
    pub const HREF: &str = "href";
    pub const TYPE: &str = "type";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const METHOD: &str = "method";
    pub const ACTION: &str = "action";
    pub const DATA_FULL_IMAGE: &str = "data-full-image";
    pub const DATA_ITEM_NAME: &str = "data-item-name";
    pub const DATA_PRODUCT_ID: &str = "data-product-id";
    pub const DATA_QUANTITY: &str = "data-quantity";
    pub const DATA_SRC: &str = "data-src";
}

pub mod fields {
    pub const PRODUCT_ID: &str = "product_id";
    pub const QUANTITY: &str = "quantity";
    pub const SEARCH: &str = "search";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    #[default]
    Get,
    Post,
}

impl FormMethod {
    /// Reads a `method` attribute the way browsers do: anything but POST is GET.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        match raw {
            Some(method) if method.trim().eq_ignore_ascii_case("post") => FormMethod::Post,
            _ => FormMethod::Get,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormMethod::Get => "GET",
            FormMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub method: FormMethod,
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl AddToCartRequest {
    pub fn to_submission(self, action: &str) -> FormSubmission {
        FormSubmission {
            method: FormMethod::Post,
            action: action.to_string(),
            fields: vec![
                (fields::PRODUCT_ID.to_string(), self.product_id.to_string()),
                (fields::QUANTITY.to_string(), self.quantity.to_string()),
            ],
        }
    }
}
