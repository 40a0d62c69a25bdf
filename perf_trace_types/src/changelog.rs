//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.1.0
/// - Initial extraction of the EventHeader wire types (`EventHeader`,
///   `EventHeaderExtension`, `HeaderFlags`, `Opcode`, `Level`,
///   `ExtensionKind`) and the tracefs field enums (`FieldEncoding`,
///   `FieldFormat`) into their own crate, shared by the decode and
///   file-reading crates.
/// - Added `Guid`, a Microsoft-layout 128-bit identifier used by `Uuid`-
///   formatted fields and by EventHeader activity ids.
pub mod v0_1_0 {}
