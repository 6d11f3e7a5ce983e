pub mod asset;
pub mod category;
pub mod manifest;
pub mod outcome;
pub mod wire;

pub use asset::{Asset, AssetOrigin, AssetPayload, RemoteMeta, SelectionSet};
pub use category::Category;
pub use manifest::{load_manifest, OutfitEntry, OutfitManifest};
pub use outcome::{BatchOutcome, CountMismatch, OutcomeRecord, PersistenceResult};
pub use wire::{CatalogEntry, WardrobeItem};
