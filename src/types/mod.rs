mod codes;

pub use codes::{MunCode, UnitId};
