pub mod fingerprint;
pub mod identity;
pub mod info;
pub mod manifest;
pub mod oxum;
pub mod transfer;

pub use fingerprint::Fingerprint;
pub use identity::{Generation, Identity};
pub use info::InfoMap;
pub use manifest::ManifestEntry;
pub use oxum::PayloadOxum;
pub use transfer::{NewTransfer, TransferRecord};
