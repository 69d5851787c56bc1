// Catalog View - derived display state for the asset list screen
//
// A pure function of (catalog contents, selected category). The only state
// kept here is the cursor: which category is selected, which group panel is
// showing, and how many entry slots the screen has.

use crate::catalog::AssetCatalog;
use crate::entities::{AssetGroup, AssetRecord, AssetType};
use crate::persistence::PersistenceGateway;
use serde::Serialize;
use tracing::debug;

/// Entry slots on the list screen when nothing else is configured
pub const DEFAULT_SLOT_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// No records at all
    Empty,

    /// Records exist but no category is selected
    NoSelection,

    /// A category is selected but has no records (its last one was removed)
    SelectedButNoEntries { asset_type: AssetType },

    /// Records of the selected category, at most `capacity` of them
    ShowingEntries {
        asset_type: AssetType,
        entries: Vec<AssetRecord>,
        /// Records of this category past the last slot
        hidden: usize,
    },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Empty => "Empty",
            ViewState::NoSelection => "NoSelection",
            ViewState::SelectedButNoEntries { .. } => "SelectedButNoEntries",
            ViewState::ShowingEntries { .. } => "ShowingEntries",
        }
    }

    /// Records to render, empty unless entries are showing
    pub fn entries(&self) -> &[AssetRecord] {
        match self {
            ViewState::ShowingEntries { entries, .. } => entries.as_slice(),
            _ => &[],
        }
    }
}

/// Category button state: does the category hold any records?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryIndicator {
    pub asset_type: AssetType,
    pub has_entries: bool,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogView {
    selected_type: AssetType,
    active_group: AssetGroup,
    capacity: usize,
}

impl CatalogView {
    /// View with `capacity` entry slots (at least one)
    pub fn new(capacity: usize) -> Self {
        CatalogView {
            selected_type: AssetType::None,
            active_group: AssetGroup::Personal,
            capacity: capacity.max(1),
        }
    }

    pub fn selected_type(&self) -> AssetType {
        self.selected_type
    }

    pub fn active_group(&self) -> AssetGroup {
        self.active_group
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Category button clicked
    ///
    /// Also switches the group panel to the one holding the category.
    pub fn select_category(&mut self, asset_type: AssetType) {
        self.selected_type = asset_type;
        if let Some(group) = asset_type.group() {
            self.active_group = group;
        }
        debug!(selected = asset_type.key(), "category selected");
    }

    /// Personal/Business tab clicked; the category selection is kept
    pub fn select_group(&mut self, group: AssetGroup) {
        self.active_group = group;
    }

    pub fn clear_selection(&mut self) {
        self.selected_type = AssetType::None;
    }

    /// Keep the cursor consistent with the catalog after a mutation
    ///
    /// An empty catalog drops the selection; otherwise it is retained.
    pub fn reconcile<G: PersistenceGateway>(&mut self, catalog: &AssetCatalog<G>) {
        if catalog.is_empty() && !self.selected_type.is_none() {
            debug!(previous = self.selected_type.key(), "catalog empty, clearing selection");
            self.clear_selection();
        }
    }

    pub fn compute<G: PersistenceGateway>(&self, catalog: &AssetCatalog<G>) -> ViewState {
        if catalog.is_empty() {
            return ViewState::Empty;
        }

        if self.selected_type.is_none() {
            return ViewState::NoSelection;
        }

        let mut entries = catalog.all_of_type(self.selected_type);
        if entries.is_empty() {
            return ViewState::SelectedButNoEntries {
                asset_type: self.selected_type,
            };
        }

        let hidden = entries.len().saturating_sub(self.capacity);
        entries.truncate(self.capacity);

        ViewState::ShowingEntries {
            asset_type: self.selected_type,
            entries,
            hidden,
        }
    }

    /// One indicator per category of the active group
    pub fn indicators<G: PersistenceGateway>(
        &self,
        catalog: &AssetCatalog<G>,
    ) -> Vec<CategoryIndicator> {
        self.indicators_for(catalog, self.active_group.types())
    }

    /// One indicator per real category
    pub fn all_indicators<G: PersistenceGateway>(
        &self,
        catalog: &AssetCatalog<G>,
    ) -> Vec<CategoryIndicator> {
        self.indicators_for(catalog, &AssetType::ALL)
    }

    fn indicators_for<G: PersistenceGateway>(
        &self,
        catalog: &AssetCatalog<G>,
        types: &[AssetType],
    ) -> Vec<CategoryIndicator> {
        let present = catalog.types_present();
        types
            .iter()
            .map(|&asset_type| CategoryIndicator {
                asset_type,
                has_entries: present.contains(&asset_type),
                selected: asset_type == self.selected_type,
            })
            .collect()
    }
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_CAPACITY)
    }
}
