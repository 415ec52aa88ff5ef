pub mod check;
pub mod parser;
pub mod verifier;

pub use check::{CheckError, PlacementCheck, PlacementReport};
pub use parser::{OutputParser, ParsedOutput, SegmentAnnouncement};
pub use verifier::{HotExpectation, PlacementPolicy, PlacementVerifier, Violation, ViolationKind};
