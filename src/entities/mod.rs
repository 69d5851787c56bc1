// Entity Models
// "Identity persists, values change"
//
// An asset has a stable identity (UUID) and an immutable value that is
// replaced wholesale on edit.

pub mod asset;

pub use asset::{AssetGroup, AssetId, AssetRecord, AssetType, MAX_VALUE};
