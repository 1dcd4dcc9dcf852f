//! Per-module-type settings.
//!
//! DESIGN
//! ======
//! Settings are a tagged union keyed on the module type tag, so every
//! variant carries only its own field set. A value entered for one module
//! type cannot leak into another: switching types means constructing a
//! different variant, and `LayoutSequence::configure` rejects a variant
//! whose tag does not match the instance it targets.

use serde::{Deserialize, Serialize};

use crate::catalog;

// =============================================================================
// NESTED PIECES
// =============================================================================

/// One slide or banner cell: an image linking somewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerSlot {
    pub image_url: String,
    pub link_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryBarStyle {
    #[default]
    Tabs,
    Pills,
}

// =============================================================================
// SETTINGS UNION
// =============================================================================

/// Configuration for one placed module, discriminated by the type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ModuleSettings {
    CategoryBar {
        style: CategoryBarStyle,
        show_icons: bool,
    },
    CategoryList {
        columns: u8,
        category_ids: Vec<String>,
    },
    NoticeBar {
        text: String,
    },
    GraphicCarousel {
        slides: Vec<BannerSlot>,
        autoplay: bool,
        interval_secs: u32,
    },
    SingleBanner {
        banner: BannerSlot,
    },
    ThreeBanners {
        banners: Vec<BannerSlot>,
    },
    ProductGrid {
        title: String,
        columns: u8,
        product_ids: Vec<String>,
    },
    Voucher {
        title: String,
        voucher_ids: Vec<String>,
    },
    Countdown {
        title: String,
        /// RFC 3339 end time; unset until the merchant picks one.
        ends_at: Option<String>,
        background_color: String,
    },
    FlashSale {
        title: String,
        product_ids: Vec<String>,
    },
}

impl ModuleSettings {
    /// The catalog tag this variant belongs to.
    #[must_use]
    pub fn module_type(&self) -> &'static str {
        match self {
            Self::CategoryBar { .. } => catalog::CATEGORY_BAR,
            Self::CategoryList { .. } => "categoryList",
            Self::NoticeBar { .. } => "noticeBar",
            Self::GraphicCarousel { .. } => "graphicCarousel",
            Self::SingleBanner { .. } => "singleBanner",
            Self::ThreeBanners { .. } => "threeBanners",
            Self::ProductGrid { .. } => "productGrid",
            Self::Voucher { .. } => "voucher",
            Self::Countdown { .. } => "countdown",
            Self::FlashSale { .. } => "flashSale",
        }
    }

    /// Default settings seeded when a module of `tag` is placed.
    /// `None` for tags the catalog does not know.
    #[must_use]
    pub fn default_for(tag: &str) -> Option<Self> {
        let settings = match tag {
            catalog::CATEGORY_BAR => Self::CategoryBar { style: CategoryBarStyle::Tabs, show_icons: true },
            "categoryList" => Self::CategoryList { columns: 2, category_ids: Vec::new() },
            "noticeBar" => Self::NoticeBar { text: String::new() },
            "graphicCarousel" => {
                Self::GraphicCarousel { slides: Vec::new(), autoplay: true, interval_secs: 5 }
            }
            "singleBanner" => Self::SingleBanner { banner: BannerSlot::default() },
            "threeBanners" => Self::ThreeBanners {
                banners: vec![BannerSlot::default(), BannerSlot::default(), BannerSlot::default()],
            },
            "productGrid" => Self::ProductGrid { title: String::new(), columns: 2, product_ids: Vec::new() },
            "voucher" => Self::Voucher { title: String::new(), voucher_ids: Vec::new() },
            "countdown" => Self::Countdown {
                title: String::new(),
                ends_at: None,
                background_color: "#FF5722".into(),
            },
            "flashSale" => Self::FlashSale { title: String::new(), product_ids: Vec::new() },
            _ => return None,
        };
        Some(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exists_for_every_catalog_entry() {
        for descriptor in catalog::all() {
            let settings = ModuleSettings::default_for(descriptor.tag)
                .unwrap_or_else(|| panic!("no default settings for {}", descriptor.tag));
            assert_eq!(settings.module_type(), descriptor.tag);
        }
    }

    #[test]
    fn default_for_unknown_tag_is_none() {
        assert!(ModuleSettings::default_for("holograms").is_none());
    }

    #[test]
    fn serde_tag_matches_module_type() {
        let settings = ModuleSettings::default_for("graphicCarousel").unwrap();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("graphicCarousel"));
        assert_eq!(json.get("intervalSecs").and_then(serde_json::Value::as_u64), Some(5));
    }

    #[test]
    fn countdown_round_trips_with_end_time() {
        let settings = ModuleSettings::Countdown {
            title: "Ends soon".into(),
            ends_at: Some("2026-09-01T00:00:00Z".into()),
            background_color: "#000000".into(),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let restored: ModuleSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn three_banners_default_has_three_slots() {
        let ModuleSettings::ThreeBanners { banners } = ModuleSettings::default_for("threeBanners").unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(banners.len(), 3);
    }
}
