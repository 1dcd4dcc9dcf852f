//! Preview renderer — pure projection of a layout to preview blocks.
//!
//! DESIGN
//! ======
//! The admin frontend shows the composed page inside a mobile or desktop
//! viewport frame. This module produces the device-independent structure:
//! for each placed module, in render order, resolve the type tag through a
//! registry of block builders; tags without a builder degrade to a generic
//! fallback block carrying the instance name and icon, so an unrendered
//! module is still visible and orderable. No state beyond the inputs.

use serde::{Deserialize, Serialize};

use crate::layout::{ActiveModule, LayoutSequence, Selection};
use crate::settings::{BannerSlot, CategoryBarStyle, ModuleSettings};

// =============================================================================
// TYPES
// =============================================================================

/// Which viewport frame the preview is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Mobile,
    Desktop,
}

impl ViewMode {
    /// Parse the `mode` query value; anything unrecognized falls back to
    /// mobile, the storefront's primary surface.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desktop") => Self::Desktop,
            _ => Self::Mobile,
        }
    }
}

/// The rendered page: one block per placed module, in render order.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewDocument {
    pub mode: ViewMode,
    pub blocks: Vec<PreviewBlock>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBlock {
    pub instance_id: String,
    pub module_type: String,
    /// Highlight flag for the currently focused module.
    pub selected: bool,
    pub body: BlockBody,
}

/// Typed render payload per module kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BlockBody {
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
    Carousel {
        slides: Vec<BannerSlot>,
        autoplay: bool,
        interval_secs: u32,
    },
    BannerRow {
        banners: Vec<BannerSlot>,
    },
    ProductGrid {
        title: String,
        columns: u8,
        product_ids: Vec<String>,
    },
    VoucherStrip {
        title: String,
        voucher_ids: Vec<String>,
    },
    Countdown {
        title: String,
        ends_at: Option<String>,
        background_color: String,
    },
    /// Generic placeholder for tags with no registered builder.
    Fallback {
        name: String,
        icon: String,
    },
}

// =============================================================================
// RENDERING
// =============================================================================

/// Grid columns are clamped on the narrow viewport.
const MOBILE_MAX_COLUMNS: u8 = 2;

/// Project a layout into a preview document for one view mode.
#[must_use]
pub fn render(layout: &LayoutSequence, mode: ViewMode) -> PreviewDocument {
    let blocks = layout
        .modules()
        .iter()
        .map(|module| PreviewBlock {
            instance_id: module.id.clone(),
            module_type: module.module_type.clone(),
            selected: matches!(layout.selection(), Selection::Module { id } if *id == module.id),
            body: block_body(module, mode),
        })
        .collect();
    PreviewDocument { mode, blocks }
}

/// Resolve a module to its block body. The registry is a match on the
/// settings variant; instances whose settings carry no dedicated block
/// render as the fallback.
fn block_body(module: &ActiveModule, mode: ViewMode) -> BlockBody {
    match &module.settings {
        ModuleSettings::CategoryBar { style, show_icons } => {
            BlockBody::CategoryBar { style: *style, show_icons: *show_icons }
        }
        ModuleSettings::CategoryList { columns, category_ids } => BlockBody::CategoryList {
            columns: clamp_columns(*columns, mode),
            category_ids: category_ids.clone(),
        },
        ModuleSettings::NoticeBar { text } => BlockBody::NoticeBar { text: text.clone() },
        ModuleSettings::GraphicCarousel { slides, autoplay, interval_secs } => BlockBody::Carousel {
            slides: slides.clone(),
            autoplay: *autoplay,
            interval_secs: *interval_secs,
        },
        ModuleSettings::SingleBanner { banner } => BlockBody::BannerRow { banners: vec![banner.clone()] },
        ModuleSettings::ThreeBanners { banners } => BlockBody::BannerRow { banners: banners.clone() },
        ModuleSettings::ProductGrid { title, columns, product_ids } => BlockBody::ProductGrid {
            title: title.clone(),
            columns: clamp_columns(*columns, mode),
            product_ids: product_ids.clone(),
        },
        ModuleSettings::Voucher { title, voucher_ids } => {
            BlockBody::VoucherStrip { title: title.clone(), voucher_ids: voucher_ids.clone() }
        }
        ModuleSettings::Countdown { title, ends_at, background_color } => BlockBody::Countdown {
            title: title.clone(),
            ends_at: ends_at.clone(),
            background_color: background_color.clone(),
        },
        ModuleSettings::FlashSale { .. } => {
            BlockBody::Fallback { name: module.name.clone(), icon: module.icon.clone() }
        }
    }
}

fn clamp_columns(columns: u8, mode: ViewMode) -> u8 {
    match mode {
        ViewMode::Mobile => columns.min(MOBILE_MAX_COLUMNS),
        ViewMode::Desktop => columns,
    }
}

#[cfg(test)]
#[path = "preview_test.rs"]
mod tests;
