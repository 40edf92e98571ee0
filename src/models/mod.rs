mod bucket;
mod holding;

pub use bucket::{Bucket, StaticBucketMap};
pub use holding::{HoldingKind, HoldingRecord};
