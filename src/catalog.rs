//! Module catalog — static descriptors of placeable storefront modules.
//!
//! DESIGN
//! ======
//! Descriptors are reference data fixed at build time. The editor never
//! creates or destroys them; it only instantiates them into a layout.
//! Tags are the camelCase identifiers the storefront renderer keys on,
//! so they travel as plain strings on the wire.

use serde::Serialize;

/// Type tag of the category navigation bar. The only module with a
/// positional rule: an instance of this type occupying slot 0 is pinned.
pub const CATEGORY_BAR: &str = "categoryBar";

// =============================================================================
// TYPES
// =============================================================================

/// Catalog grouping shown in the module picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    Navigation,
    Banners,
    Commerce,
    Marketing,
}

/// One placeable module type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModuleDescriptor {
    /// Stable camelCase tag, e.g. `"graphicCarousel"`.
    pub tag: &'static str,
    /// Human-readable picker label.
    pub name: &'static str,
    /// Icon reference resolved by the admin frontend.
    pub icon: &'static str,
    pub category: ModuleCategory,
    /// Disabled descriptors stay visible in the picker but cannot be placed.
    pub enabled: bool,
}

// =============================================================================
// CATALOG DATA
// =============================================================================

const CATALOG: &[ModuleDescriptor] = &[
    ModuleDescriptor {
        tag: CATEGORY_BAR,
        name: "Category Bar",
        icon: "icon-category-bar",
        category: ModuleCategory::Navigation,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "categoryList",
        name: "Category List",
        icon: "icon-category-list",
        category: ModuleCategory::Navigation,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "noticeBar",
        name: "Notice Bar",
        icon: "icon-notice-bar",
        category: ModuleCategory::Navigation,
        enabled: false,
    },
    ModuleDescriptor {
        tag: "graphicCarousel",
        name: "Graphic Carousel",
        icon: "icon-carousel",
        category: ModuleCategory::Banners,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "singleBanner",
        name: "Single Banner",
        icon: "icon-banner",
        category: ModuleCategory::Banners,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "threeBanners",
        name: "Three Banners",
        icon: "icon-three-banners",
        category: ModuleCategory::Banners,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "productGrid",
        name: "Product Grid",
        icon: "icon-product-grid",
        category: ModuleCategory::Commerce,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "voucher",
        name: "Voucher Strip",
        icon: "icon-voucher",
        category: ModuleCategory::Marketing,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "countdown",
        name: "Countdown",
        icon: "icon-countdown",
        category: ModuleCategory::Marketing,
        enabled: true,
    },
    ModuleDescriptor {
        tag: "flashSale",
        name: "Flash Sale",
        icon: "icon-flash-sale",
        category: ModuleCategory::Marketing,
        enabled: false,
    },
];

// =============================================================================
// LOOKUP
// =============================================================================

/// Look up a descriptor by tag.
#[must_use]
pub fn find(tag: &str) -> Option<&'static ModuleDescriptor> {
    CATALOG.iter().find(|d| d.tag == tag)
}

/// All descriptors in picker order.
#[must_use]
pub fn all() -> &'static [ModuleDescriptor] {
    CATALOG
}

/// Descriptors for one picker group, in catalog order.
#[must_use]
pub fn by_category(category: ModuleCategory) -> Vec<&'static ModuleDescriptor> {
    CATALOG.iter().filter(|d| d.category == category).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_tag() {
        let d = find("graphicCarousel").unwrap();
        assert_eq!(d.name, "Graphic Carousel");
        assert!(d.enabled);
    }

    #[test]
    fn find_unknown_tag() {
        assert!(find("holograms").is_none());
    }

    #[test]
    fn category_bar_is_first_and_enabled() {
        let d = find(CATEGORY_BAR).unwrap();
        assert!(d.enabled);
        assert_eq!(CATALOG[0].tag, CATEGORY_BAR);
    }

    #[test]
    fn disabled_entries_exist() {
        assert!(!find("flashSale").unwrap().enabled);
        assert!(!find("noticeBar").unwrap().enabled);
    }

    #[test]
    fn tags_are_unique() {
        for (i, d) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG.iter().skip(i + 1).all(|other| other.tag != d.tag),
                "duplicate tag {}",
                d.tag
            );
        }
    }

    #[test]
    fn by_category_filters() {
        let banners = by_category(ModuleCategory::Banners);
        assert_eq!(banners.len(), 3);
        assert!(banners.iter().all(|d| d.category == ModuleCategory::Banners));
    }
}
