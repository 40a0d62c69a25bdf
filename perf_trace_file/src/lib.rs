// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![warn(missing_docs)]
#![allow(clippy::needless_return)]

//! perf.data file decoding

pub use file_reader::PerfDataFileError;
pub use file_reader::PerfDataFileEventOrder;
pub use file_reader::PerfDataFileReader;
pub use header_index::PerfHeaderIndex;

pub mod changelog;

mod file_abi;
mod file_reader;
mod header_index;
mod input_file;
