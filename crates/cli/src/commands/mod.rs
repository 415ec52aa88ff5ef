pub mod scenarios;
pub mod segments;
pub mod verify;

pub use scenarios::*;
pub use segments::*;
pub use verify::*;
