//! Glob-import this module to bring the driver traits into scope.

pub use crate::bus::Bus as _;
pub use crate::Read as _;
pub use crate::Write as _;
