//! Layout sequence — the ordered storefront page composition.
//!
//! DESIGN
//! ======
//! A `LayoutSequence` owns the ordered list of placed modules plus the
//! single transient selection. All mutations are synchronous, in-memory,
//! and return explicit outcomes: a typed `LayoutError` when the request is
//! rejected (unknown tag, disabled module, pinned slot) versus
//! `Shift::AtBoundary` when there is legitimately nothing to do. Callers
//! decide whether a rejection becomes a user-facing warning or a quiet ack.
//!
//! INVARIANT
//! =========
//! One structural rule, deliberately not generalized: a category-bar
//! instance occupying slot 0 cannot be removed, moved away, or displaced.
//! A category bar anywhere else in the sequence is an ordinary module.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, CATEGORY_BAR};
use crate::frame::now_ms;
use crate::settings::ModuleSettings;

// =============================================================================
// TYPES
// =============================================================================

/// One placed, orderable unit of storefront content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveModule {
    /// Unique per placement: descriptor tag + mint timestamp.
    pub id: String,
    pub name: String,
    pub icon: String,
    pub module_type: String,
    pub settings: ModuleSettings,
}

/// At most one module instance or one catalog item is focused at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    /// A placed module, open in the configuration panel.
    Module { id: String },
    /// A catalog entry being previewed before placement.
    CatalogItem { tag: String },
}

/// Result of a neighbor-swap request that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Moved { from: usize, to: usize },
    /// Already at the sequence edge; the sequence is unchanged.
    AtBoundary,
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown module type: {0}")]
    UnknownModule(String),
    #[error("module type is disabled: {0}")]
    ModuleDisabled(String),
    #[error("module instance not found: {0}")]
    InstanceNotFound(String),
    #[error("the category bar is pinned to the top of the page")]
    PinnedModule,
    #[error("settings for {got} cannot be applied to a {expected} module")]
    SettingsMismatch { expected: String, got: String },
}

impl crate::frame::ErrorCode for LayoutError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownModule(_) => "E_UNKNOWN_MODULE",
            Self::ModuleDisabled(_) => "E_MODULE_DISABLED",
            Self::InstanceNotFound(_) => "E_INSTANCE_NOT_FOUND",
            Self::PinnedModule => "E_PINNED_MODULE",
            Self::SettingsMismatch { .. } => "E_SETTINGS_MISMATCH",
        }
    }
}

// =============================================================================
// SEQUENCE
// =============================================================================

/// Ordered sequence of placed modules; order is render order.
#[derive(Debug, Default)]
pub struct LayoutSequence {
    modules: Vec<ActiveModule>,
    selection: Selection,
    /// Mint clock for instance ids. Wall-clock ms, bumped monotonically so
    /// two placements in the same millisecond still get distinct ids.
    id_clock: i64,
}

impl LayoutSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh storefront starts with the category bar in slot 0.
    #[must_use]
    pub fn seeded() -> Self {
        let mut seq = Self::new();
        // The seed tag is a known, enabled catalog entry.
        seq.insert(CATEGORY_BAR, 0).expect("category bar seed");
        seq.selection = Selection::None;
        seq
    }

    #[must_use]
    pub fn modules(&self) -> &[ActiveModule] {
        &self.modules
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn index_of(&self, instance_id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == instance_id)
    }

    fn mint_id(&mut self, tag: &str) -> String {
        self.id_clock = now_ms().max(self.id_clock + 1);
        format!("{tag}-{}", self.id_clock)
    }

    /// True when slot 0 is occupied by a category bar.
    fn pinned_at_zero(&self) -> bool {
        self.modules.first().is_some_and(|m| m.module_type == CATEGORY_BAR)
    }
}

// =============================================================================
// PLACEMENT OPERATIONS
// =============================================================================

impl LayoutSequence {
    /// Instantiate a catalog module and splice it in at `at`, shifting
    /// later modules right. `at` past the end clamps to append — drop-zone
    /// geometry is the caller's concern, positions stay total here.
    ///
    /// # Errors
    ///
    /// `UnknownModule` for tags not in the catalog, `ModuleDisabled` for
    /// catalog entries that cannot currently be placed.
    pub fn insert(&mut self, tag: &str, at: usize) -> Result<(usize, ActiveModule), LayoutError> {
        let descriptor = catalog::find(tag).ok_or_else(|| LayoutError::UnknownModule(tag.into()))?;
        if !descriptor.enabled {
            return Err(LayoutError::ModuleDisabled(tag.into()));
        }
        let settings =
            ModuleSettings::default_for(tag).ok_or_else(|| LayoutError::UnknownModule(tag.into()))?;

        let at = at.min(self.modules.len());
        let module = ActiveModule {
            id: self.mint_id(tag),
            name: descriptor.name.to_string(),
            icon: descriptor.icon.to_string(),
            module_type: descriptor.tag.to_string(),
            settings,
        };
        self.modules.insert(at, module.clone());
        Ok((at, module))
    }

    /// Swap an instance with its predecessor.
    ///
    /// # Errors
    ///
    /// `InstanceNotFound`, or `PinnedModule` when the swap would displace a
    /// category bar out of slot 0.
    pub fn move_up(&mut self, instance_id: &str) -> Result<Shift, LayoutError> {
        let idx = self
            .index_of(instance_id)
            .ok_or_else(|| LayoutError::InstanceNotFound(instance_id.into()))?;
        if idx == 0 {
            return Ok(Shift::AtBoundary);
        }
        if idx == 1 && self.pinned_at_zero() {
            return Err(LayoutError::PinnedModule);
        }
        self.modules.swap(idx - 1, idx);
        Ok(Shift::Moved { from: idx, to: idx - 1 })
    }

    /// Swap an instance with its successor.
    ///
    /// # Errors
    ///
    /// `InstanceNotFound`, or `PinnedModule` when the instance is the
    /// category bar sitting in slot 0.
    pub fn move_down(&mut self, instance_id: &str) -> Result<Shift, LayoutError> {
        let idx = self
            .index_of(instance_id)
            .ok_or_else(|| LayoutError::InstanceNotFound(instance_id.into()))?;
        if idx + 1 == self.modules.len() {
            return Ok(Shift::AtBoundary);
        }
        if idx == 0 && self.pinned_at_zero() {
            return Err(LayoutError::PinnedModule);
        }
        self.modules.swap(idx, idx + 1);
        Ok(Shift::Moved { from: idx, to: idx + 1 })
    }

    /// Clone an instance (fresh id, identical name/icon/type/settings) and
    /// place the clone immediately after the original.
    ///
    /// # Errors
    ///
    /// `InstanceNotFound`.
    pub fn duplicate(&mut self, instance_id: &str) -> Result<(usize, ActiveModule), LayoutError> {
        let idx = self
            .index_of(instance_id)
            .ok_or_else(|| LayoutError::InstanceNotFound(instance_id.into()))?;
        let original = self.modules[idx].clone();
        let copy = ActiveModule { id: self.mint_id(&original.module_type), ..original };
        self.modules.insert(idx + 1, copy.clone());
        Ok((idx + 1, copy))
    }

    /// Remove an instance. Clears the selection if it pointed at the
    /// removed instance.
    ///
    /// # Errors
    ///
    /// `InstanceNotFound`, or `PinnedModule` when the target is the
    /// category bar in slot 0 — surfaced to the merchant as a warning.
    pub fn remove(&mut self, instance_id: &str) -> Result<ActiveModule, LayoutError> {
        let idx = self
            .index_of(instance_id)
            .ok_or_else(|| LayoutError::InstanceNotFound(instance_id.into()))?;
        if idx == 0 && self.modules[idx].module_type == CATEGORY_BAR {
            return Err(LayoutError::PinnedModule);
        }
        let removed = self.modules.remove(idx);
        if matches!(&self.selection, Selection::Module { id } if *id == removed.id) {
            self.selection = Selection::None;
        }
        Ok(removed)
    }
}

// =============================================================================
// SELECTION + CONFIGURATION
// =============================================================================

impl LayoutSequence {
    /// Focus a placed module for configuration.
    ///
    /// # Errors
    ///
    /// `InstanceNotFound`.
    pub fn select_module(&mut self, instance_id: &str) -> Result<(), LayoutError> {
        if self.index_of(instance_id).is_none() {
            return Err(LayoutError::InstanceNotFound(instance_id.into()));
        }
        self.selection = Selection::Module { id: instance_id.into() };
        Ok(())
    }

    /// Focus a catalog entry for pre-placement preview. Mutually exclusive
    /// with a module selection.
    ///
    /// # Errors
    ///
    /// `UnknownModule`.
    pub fn select_catalog_item(&mut self, tag: &str) -> Result<(), LayoutError> {
        if catalog::find(tag).is_none() {
            return Err(LayoutError::UnknownModule(tag.into()));
        }
        self.selection = Selection::CatalogItem { tag: tag.into() };
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Replace an instance's settings.
    ///
    /// # Errors
    ///
    /// `InstanceNotFound`, or `SettingsMismatch` when the settings variant
    /// belongs to a different module type.
    pub fn configure(
        &mut self,
        instance_id: &str,
        settings: ModuleSettings,
    ) -> Result<ActiveModule, LayoutError> {
        let idx = self
            .index_of(instance_id)
            .ok_or_else(|| LayoutError::InstanceNotFound(instance_id.into()))?;
        let module = &mut self.modules[idx];
        if settings.module_type() != module.module_type {
            return Err(LayoutError::SettingsMismatch {
                expected: module.module_type.clone(),
                got: settings.module_type().to_string(),
            });
        }
        module.settings = settings;
        Ok(module.clone())
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
