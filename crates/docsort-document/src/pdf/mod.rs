// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — opening uploaded PDFs and rasterising their first page.

pub mod pdfium;
pub mod raster;
pub mod reader;

pub use pdfium::PdfiumRasterizer;
pub use raster::LopdfRasterizer;
pub use reader::PdfReader;
