//! Promotional offers — draft record, type configuration table, reconcile.
//!
//! DESIGN
//! ======
//! An offer is one flat record whose `offer_type` discriminant selects
//! which optional nested configs apply. A static table maps each of the
//! ten types to its legal discount types and visible form sections;
//! `reconcile` keeps the four nested sub-configs (countdown, voucher,
//! buy-X-get-Y, stack rule) consistent with that table. A sub-config that
//! stops applying is cleared outright, so switching a type away and back
//! yields fresh defaults — prior values are not restored.
//!
//! The upstream API takes offers as multipart form data: scalar fields as
//! strings, arrays and nested configs as JSON-encoded strings, plus an
//! optional banner image part.

use serde::{Deserialize, Serialize};

// =============================================================================
// DISCRIMINANTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    RegularDiscount,
    Voucher,
    CountdownDeal,
    FlashSale,
    BuyXGetY,
    FreeShipping,
    BundleDeal,
    SeasonalSale,
    LoyaltyReward,
    ReferralBonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    FreeItem,
    FreeShipping,
}

/// Optional form sections the admin dialog shows per offer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OfferSection {
    MaxDiscountCap,
    UsageLimits,
    Targeting,
    Priority,
    Countdown,
    Voucher,
    BuyXGetY,
    StackRules,
}

// =============================================================================
// TYPE CONFIGURATION TABLE
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct OfferTypeConfig {
    pub discount_types: &'static [DiscountType],
    pub sections: &'static [OfferSection],
}

/// The static table the dialogs and `reconcile` are driven by.
#[must_use]
pub fn type_config(offer_type: OfferType) -> OfferTypeConfig {
    use DiscountType as D;
    use OfferSection as S;
    match offer_type {
        OfferType::RegularDiscount => OfferTypeConfig {
            discount_types: &[D::Percentage, D::FixedAmount],
            sections: &[S::MaxDiscountCap, S::UsageLimits, S::Targeting, S::Priority, S::StackRules],
        },
        OfferType::Voucher => OfferTypeConfig {
            discount_types: &[D::Percentage, D::FixedAmount],
            sections: &[S::MaxDiscountCap, S::UsageLimits, S::Targeting, S::Voucher, S::StackRules],
        },
        OfferType::CountdownDeal => OfferTypeConfig {
            discount_types: &[D::Percentage, D::FixedAmount],
            sections: &[S::MaxDiscountCap, S::Targeting, S::Countdown],
        },
        OfferType::FlashSale => OfferTypeConfig {
            discount_types: &[D::Percentage],
            sections: &[S::MaxDiscountCap, S::UsageLimits, S::Targeting, S::Priority, S::Countdown],
        },
        OfferType::BuyXGetY => OfferTypeConfig {
            discount_types: &[D::FreeItem],
            sections: &[S::UsageLimits, S::Targeting, S::BuyXGetY],
        },
        OfferType::FreeShipping => OfferTypeConfig {
            discount_types: &[D::FreeShipping],
            sections: &[S::UsageLimits, S::Targeting, S::StackRules],
        },
        OfferType::BundleDeal => OfferTypeConfig {
            discount_types: &[D::Percentage, D::FixedAmount],
            sections: &[S::Targeting, S::Priority],
        },
        OfferType::SeasonalSale => OfferTypeConfig {
            discount_types: &[D::Percentage],
            sections: &[S::MaxDiscountCap, S::Targeting, S::Priority, S::Countdown],
        },
        OfferType::LoyaltyReward => OfferTypeConfig {
            discount_types: &[D::Percentage, D::FixedAmount],
            sections: &[S::UsageLimits, S::StackRules],
        },
        OfferType::ReferralBonus => OfferTypeConfig {
            discount_types: &[D::FixedAmount],
            sections: &[S::UsageLimits, S::StackRules],
        },
    }
}

// =============================================================================
// NESTED CONFIGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownConfig {
    /// RFC 3339 end time; unset until the merchant picks one.
    pub ends_at: Option<String>,
    pub show_timer: bool,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self { ends_at: None, show_timer: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherConfig {
    pub code: String,
    pub min_order_value: Option<f64>,
    pub auto_apply: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyXGetYConfig {
    pub buy_quantity: u32,
    pub get_quantity: u32,
    pub get_product_ids: Vec<String>,
}

impl Default for BuyXGetYConfig {
    fn default() -> Self {
        Self { buy_quantity: 1, get_quantity: 1, get_product_ids: Vec::new() }
    }
}

/// Whether and how far this offer combines with others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRuleConfig {
    pub stackable: bool,
    pub max_stack_count: u32,
}

impl Default for StackRuleConfig {
    fn default() -> Self {
        Self { stackable: false, max_stack_count: 1 }
    }
}

// =============================================================================
// DRAFT
// =============================================================================

/// The offer admin form, as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDraft {
    pub offer_type: OfferType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: f64,
    pub max_discount_cap: Option<f64>,
    pub usage_limit_total: Option<u32>,
    pub usage_limit_per_customer: Option<u32>,
    #[serde(default)]
    pub target_product_ids: Vec<String>,
    #[serde(default)]
    pub target_categories: Vec<String>,
    pub priority: Option<i32>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub countdown: Option<CountdownConfig>,
    pub voucher: Option<VoucherConfig>,
    pub buy_x_get_y: Option<BuyXGetYConfig>,
    pub stack_rule: Option<StackRuleConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum OfferValidationError {
    #[error("offer name must not be empty")]
    EmptyName,
    #[error("discount type {discount:?} is not available for {offer:?} offers")]
    IllegalDiscountType { offer: OfferType, discount: DiscountType },
    #[error("discount value must be positive")]
    NonPositiveDiscountValue,
    #[error("percentage discount cannot exceed 100")]
    PercentageOutOfRange,
    #[error("banner image must be png, jpeg, or webp (got {0})")]
    InvalidImageType(String),
    #[error("banner image exceeds {max_bytes} bytes")]
    ImageTooLarge { max_bytes: usize },
}

// =============================================================================
// RECONCILE
// =============================================================================

/// Align the nested sub-configs with the current offer type: required and
/// absent → default instance; not required and present → cleared. Clearing
/// is what makes re-selecting a type produce fresh defaults.
pub fn reconcile(draft: &mut OfferDraft) {
    let sections = type_config(draft.offer_type).sections;
    let wants = |section: OfferSection| sections.contains(&section);

    reconcile_slot(&mut draft.countdown, wants(OfferSection::Countdown));
    reconcile_slot(&mut draft.voucher, wants(OfferSection::Voucher));
    reconcile_slot(&mut draft.buy_x_get_y, wants(OfferSection::BuyXGetY));
    reconcile_slot(&mut draft.stack_rule, wants(OfferSection::StackRules));
}

fn reconcile_slot<T: Default>(slot: &mut Option<T>, wanted: bool) {
    if wanted {
        if slot.is_none() {
            *slot = Some(T::default());
        }
    } else {
        *slot = None;
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Allowed banner image content types.
const IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Banner image size cap.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// An uploaded banner image, as received from the multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Submit-time checks for the offer form.
///
/// # Errors
///
/// The first failed check, in form order.
pub fn validate(draft: &OfferDraft) -> Result<(), OfferValidationError> {
    if draft.name.trim().is_empty() {
        return Err(OfferValidationError::EmptyName);
    }
    let config = type_config(draft.offer_type);
    if !config.discount_types.contains(&draft.discount_type) {
        return Err(OfferValidationError::IllegalDiscountType {
            offer: draft.offer_type,
            discount: draft.discount_type,
        });
    }
    match draft.discount_type {
        DiscountType::Percentage => {
            if draft.discount_value <= 0.0 {
                return Err(OfferValidationError::NonPositiveDiscountValue);
            }
            if draft.discount_value > 100.0 {
                return Err(OfferValidationError::PercentageOutOfRange);
            }
        }
        DiscountType::FixedAmount => {
            if draft.discount_value <= 0.0 {
                return Err(OfferValidationError::NonPositiveDiscountValue);
            }
        }
        // Free-item and free-shipping offers carry no discount value.
        DiscountType::FreeItem | DiscountType::FreeShipping => {}
    }
    Ok(())
}

/// Check an uploaded banner image before it ever leaves the admin layer.
///
/// # Errors
///
/// `InvalidImageType` or `ImageTooLarge`.
pub fn validate_image(image: &ImageUpload) -> Result<(), OfferValidationError> {
    if !IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(OfferValidationError::InvalidImageType(image.content_type.clone()));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(OfferValidationError::ImageTooLarge { max_bytes: MAX_IMAGE_BYTES });
    }
    Ok(())
}

// =============================================================================
// FORM ENCODING
// =============================================================================

/// Encode a draft as the flat text fields of the upstream multipart form.
/// Arrays and nested configs become JSON-encoded strings; absent optionals
/// are omitted entirely.
#[must_use]
pub fn encode_form(draft: &OfferDraft) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: String| fields.push((key.to_string(), value));

    push("offerType", enum_tag(&draft.offer_type));
    push("name", draft.name.clone());
    push("description", draft.description.clone());
    push("discountType", enum_tag(&draft.discount_type));
    push("discountValue", format!("{}", draft.discount_value));
    if let Some(cap) = draft.max_discount_cap {
        push("maxDiscountCap", format!("{cap}"));
    }
    if let Some(total) = draft.usage_limit_total {
        push("usageLimitTotal", total.to_string());
    }
    if let Some(per) = draft.usage_limit_per_customer {
        push("usageLimitPerCustomer", per.to_string());
    }
    push("targetProductIds", json_string(&draft.target_product_ids));
    push("targetCategories", json_string(&draft.target_categories));
    if let Some(priority) = draft.priority {
        push("priority", priority.to_string());
    }
    if let Some(starts) = &draft.starts_at {
        push("startsAt", starts.clone());
    }
    if let Some(ends) = &draft.ends_at {
        push("endsAt", ends.clone());
    }
    if let Some(countdown) = &draft.countdown {
        push("countdownConfig", json_string(countdown));
    }
    if let Some(voucher) = &draft.voucher {
        push("voucherConfig", json_string(voucher));
    }
    if let Some(bxgy) = &draft.buy_x_get_y {
        push("buyXGetYConfig", json_string(bxgy));
    }
    if let Some(stack) = &draft.stack_rule {
        push("stackRuleConfig", json_string(stack));
    }
    fields
}

fn json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Serde tag of a unit enum variant, e.g. `OfferType::FlashSale → "FLASH_SALE"`.
fn enum_tag<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "offers_test.rs"]
mod tests;
