// 📦 Asset Entity - Stable identity + immutable values
//
// "The asset id is IDENTITY (never changes), the fields are a VALUE (replaced wholesale)"
//
// Problem solved:
// - Two assets with identical fields are still two different assets
// - Editing an asset swaps its value but keeps its identity and position
// - Ids survive the serialization boundary (no reliance on reference equality)

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ASSET GROUP
// ============================================================================

/// Super-group a category belongs to (the Personal / Business panels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetGroup {
    Personal,
    Business,
}

impl AssetGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetGroup::Personal => "Personal",
            AssetGroup::Business => "Business",
        }
    }

    /// Categories shown on this group's panel, in display order
    pub fn types(&self) -> &'static [AssetType] {
        match self {
            AssetGroup::Personal => &AssetType::PERSONAL,
            AssetGroup::Business => &AssetType::BUSINESS,
        }
    }

    /// The other panel
    pub fn toggle(&self) -> Self {
        match self {
            AssetGroup::Personal => AssetGroup::Business,
            AssetGroup::Business => AssetGroup::Personal,
        }
    }
}

// ============================================================================
// ASSET TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    // Personal
    RealEstate,
    Transport,
    Valuables,
    Electronics,
    Personal,
    Hobby,
    Furniture,
    OtherPersonal,

    // Business
    FixedAssets,
    ComRealEstate,
    Vehicles,
    IntellectualProperty,
    Supplies,
    FinancialAssets,
    Contracts,
    OtherBusiness,

    /// Unselected marker - never valid on a committed record
    None,
}

impl AssetType {
    pub const PERSONAL: [AssetType; 8] = [
        AssetType::RealEstate,
        AssetType::Transport,
        AssetType::Valuables,
        AssetType::Electronics,
        AssetType::Personal,
        AssetType::Hobby,
        AssetType::Furniture,
        AssetType::OtherPersonal,
    ];

    pub const BUSINESS: [AssetType; 8] = [
        AssetType::FixedAssets,
        AssetType::ComRealEstate,
        AssetType::Vehicles,
        AssetType::IntellectualProperty,
        AssetType::Supplies,
        AssetType::FinancialAssets,
        AssetType::Contracts,
        AssetType::OtherBusiness,
    ];

    /// Every real category, personal first, in declaration order
    pub const ALL: [AssetType; 16] = [
        AssetType::RealEstate,
        AssetType::Transport,
        AssetType::Valuables,
        AssetType::Electronics,
        AssetType::Personal,
        AssetType::Hobby,
        AssetType::Furniture,
        AssetType::OtherPersonal,
        AssetType::FixedAssets,
        AssetType::ComRealEstate,
        AssetType::Vehicles,
        AssetType::IntellectualProperty,
        AssetType::Supplies,
        AssetType::FinancialAssets,
        AssetType::Contracts,
        AssetType::OtherBusiness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::RealEstate => "Real Estate",
            AssetType::Transport => "Transport",
            AssetType::Valuables => "Valuables",
            AssetType::Electronics => "Electronics",
            AssetType::Personal => "Personal",
            AssetType::Hobby => "Hobby",
            AssetType::Furniture => "Furniture",
            AssetType::OtherPersonal => "Other Personal",
            AssetType::FixedAssets => "Fixed Assets",
            AssetType::ComRealEstate => "Commercial Real Estate",
            AssetType::Vehicles => "Vehicles",
            AssetType::IntellectualProperty => "Intellectual Property",
            AssetType::Supplies => "Supplies",
            AssetType::FinancialAssets => "Financial Assets",
            AssetType::Contracts => "Contracts",
            AssetType::OtherBusiness => "Other Business",
            AssetType::None => "None",
        }
    }

    /// Variant name, the form used on the command line and in storage
    pub fn key(&self) -> &'static str {
        match self {
            AssetType::RealEstate => "RealEstate",
            AssetType::Transport => "Transport",
            AssetType::Valuables => "Valuables",
            AssetType::Electronics => "Electronics",
            AssetType::Personal => "Personal",
            AssetType::Hobby => "Hobby",
            AssetType::Furniture => "Furniture",
            AssetType::OtherPersonal => "OtherPersonal",
            AssetType::FixedAssets => "FixedAssets",
            AssetType::ComRealEstate => "ComRealEstate",
            AssetType::Vehicles => "Vehicles",
            AssetType::IntellectualProperty => "IntellectualProperty",
            AssetType::Supplies => "Supplies",
            AssetType::FinancialAssets => "FinancialAssets",
            AssetType::Contracts => "Contracts",
            AssetType::OtherBusiness => "OtherBusiness",
            AssetType::None => "None",
        }
    }

    pub fn group(&self) -> Option<AssetGroup> {
        match self {
            AssetType::None => None,
            t if AssetType::PERSONAL.contains(t) => Some(AssetGroup::Personal),
            _ => Some(AssetGroup::Business),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == AssetType::None
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    /// Accepts the variant name in any case ("electronics", "RealEstate", "none")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AssetType::ALL
            .iter()
            .chain(std::iter::once(&AssetType::None))
            .find(|t| t.key().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("unknown asset type '{}'", wanted))
    }
}

// ============================================================================
// ASSET ID
// ============================================================================

/// Stable opaque identity (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(uuid::Uuid);

impl AssetId {
    pub fn new() -> Self {
        AssetId(uuid::Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AssetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s.trim()).map(AssetId)
    }
}

// ============================================================================
// ASSET RECORD
// ============================================================================

/// Largest value a record may hold (the range every store can represent)
pub const MAX_VALUE: u64 = i64::MAX as u64;

/// One tracked asset
///
/// Immutable after construction: an edit builds a new record and the catalog
/// swaps it in under the old id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    id: AssetId,
    #[serde(rename = "type")]
    asset_type: AssetType,
    value: u64,
    name: String,
    description: String,
}

impl AssetRecord {
    /// Create a record with a fresh id. Invariants are checked by `validate`,
    /// which the catalog runs before accepting the record.
    pub fn new(asset_type: AssetType, value: u64, name: &str, description: &str) -> Self {
        AssetRecord {
            id: AssetId::new(),
            asset_type,
            value,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Rebuild a stored record without touching its identity
    pub(crate) fn from_parts(
        id: AssetId,
        asset_type: AssetType,
        value: u64,
        name: String,
        description: String,
    ) -> Self {
        AssetRecord {
            id,
            asset_type,
            value,
            name,
            description,
        }
    }

    /// Same values under another identity
    pub(crate) fn with_id(mut self, id: AssetId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check the committed-record invariants
    ///
    /// `value >= 0` holds by construction (unsigned).
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.asset_type.is_none() {
            errors.push(ValidationError::new("type", "a category must be selected"));
        }
        if self.value > MAX_VALUE {
            errors.push(ValidationError::new("value", "value is too large"));
        }
        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "must not be blank"));
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError::new("description", "must not be blank"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
