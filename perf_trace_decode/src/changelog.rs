// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.1.0
/// - Initial extraction of the tracefs `format`-file parser
///   (`PerfEventFormat`, `PerfFieldFormat`), the typed field-value view
///   (`PerfItemMetadata`/`PerfItemValue`), `PerfByteReader`, and the
///   EventHeader metadata-chain enumerator (`EventHeaderEnumeratorContext`)
///   into their own crate, built on the wire types in `perf_trace_types`.
/// - Added the `writers`/`filters`/`display` text- and JSON-rendering
///   layer used by `PerfItemValue`'s `Display` adapters.
pub mod v0_1_0 {}
