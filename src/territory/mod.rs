mod municipality;
mod snapshot;
mod territory;
mod unit;
mod validate;

pub use municipality::{MunAttributes, Municipality};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotNode};
pub use territory::Territory;
pub use unit::Unit;
pub use validate::IntegrityError;
