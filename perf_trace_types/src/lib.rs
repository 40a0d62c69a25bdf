// Licensed under the MIT license.

#![no_std]
#![warn(missing_docs)]
#![allow(clippy::needless_return)]

//! Wire-level types shared by the tracepoint/EventHeader decode and
//! perf.data file-reading crates: the EventHeader prelude and extension
//! block headers, the field-encoding and field-format enums used by both
//! tracefs and EventHeader metadata, and a Microsoft-layout GUID.

pub use descriptors::EventHeader;
pub use descriptors::EventHeaderExtension;
pub use enums::ExtensionKind;
pub use enums::FieldEncoding;
pub use enums::FieldFormat;
pub use enums::HeaderFlags;
pub use enums::Level;
pub use enums::Opcode;
pub use guid::Guid;

pub mod changelog;

mod descriptors;
mod enums;
mod guid;
