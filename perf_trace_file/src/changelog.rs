// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//! Release history

#[allow(unused_imports)]
use crate::*; // For docs

/// # v0.1.0
/// - Initial extraction of `PerfDataFileReader` (normal and pipe `perf.data`
///   layouts, feature-header index, synthesized-record dispatch),
///   `PerfSessionInfo`/`PerfEventDesc`/`EventInfoResolver`, and the
///   time-ordering merge (`PerfDataFileEventOrder::TimeOrder`) into their
///   own crate, built on `perf_trace_types` and `perf_trace_decode`.
pub mod v0_1_0 {}
