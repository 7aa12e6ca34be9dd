// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open uploaded PDFs and pull the scanned image out of a page
// using the `lopdf` crate.
//
// Uploaded identity documents are usually scans: each page carries one large
// image XObject, which is re-encoded as PNG for the OCR backend. Pages drawn
// from text and vector operators have no such image; for those the reader
// only reports the page size.

use docsort_core::error::DocsortError;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, instrument, warn};

use crate::image::processor::ImageProcessor;

/// Guard against malicious /Parent cycles when looking up inherited resources.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// US Letter, used when no /MediaBox is found up the page tree.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Reads uploaded PDF files.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, DocsortError> {
        let document = Document::load_mem(data).map_err(|err| {
            DocsortError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    // -- Rasterisation --------------------------------------------------------

    /// Re-encode the largest image embedded in a page (1-indexed) as PNG.
    ///
    /// `Ok(None)` means the page carries no image XObject at all.
    #[instrument(skip(self), fields(page_number))]
    pub fn page_image(&self, page_number: u32) -> Result<Option<Vec<u8>>, DocsortError> {
        let page_id = self.page_id(page_number)?;

        let Some(stream) = self.largest_image_on_page(page_id) else {
            debug!(page_number, "Page has no embedded image");
            return Ok(None);
        };
        let image = decode_image_stream(&self.document, stream)?;
        let png = ImageProcessor::from_dynamic(image).to_png_bytes()?;

        debug!(page_number, png_bytes = png.len(), "Page rasterised");
        Ok(Some(png))
    }

    /// Width and height of a page (1-indexed) in PDF points, from its
    /// possibly inherited /MediaBox.
    pub fn page_size(&self, page_number: u32) -> Result<(f32, f32), DocsortError> {
        let page_id = self.page_id(page_number)?;
        let media_box = inherited_entry(&self.document, page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|corners| {
                let corners: Vec<f32> = corners
                    .iter()
                    .filter_map(|c| resolve(&self.document, c))
                    .filter_map(|c| c.as_float().ok())
                    .collect();
                match corners.as_slice() {
                    [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
                    _ => None,
                }
            });
        Ok(media_box.unwrap_or_else(|| {
            warn!(page_number, "page has no usable /MediaBox, assuming US Letter");
            DEFAULT_PAGE_SIZE
        }))
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId, DocsortError> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            DocsortError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    /// Find the image XObject with the largest pixel area on a page.
    fn largest_image_on_page(&self, page_id: ObjectId) -> Option<&Stream> {
        let xobjects = inherited_entry(&self.document, page_id, b"Resources")
            .and_then(|obj| obj.as_dict().ok())?
            .get(b"XObject")
            .ok()
            .and_then(|obj| resolve(&self.document, obj))
            .and_then(|obj| obj.as_dict().ok())?;

        let mut largest: Option<(i64, &Stream)> = None;
        for (_name, entry) in xobjects.iter() {
            let Some(Object::Stream(stream)) = resolve(&self.document, entry) else {
                continue;
            };
            if !is_image_subtype(&stream.dict) {
                continue;
            }
            let area = dict_int(&stream.dict, b"Width").unwrap_or(0)
                * dict_int(&stream.dict, b"Height").unwrap_or(0);
            if largest.is_none_or(|(best, _)| area > best) {
                largest = Some((area, stream));
            }
        }

        largest.map(|(_, stream)| stream)
    }
}

/// Follow a single indirect reference. Direct objects are returned as-is.
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up a page attribute, walking up /Parent for inherited entries
/// (/Resources, /MediaBox).
fn inherited_entry<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok();
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let dict = current?;
        if let Ok(entry) = dict.get(key) {
            return resolve(doc, entry);
        }
        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => doc.get_dictionary(*parent).ok(),
            _ => None,
        };
    }
    warn!("page tree deeper than {MAX_PAGE_TREE_DEPTH} levels, giving up");
    None
}

fn is_image_subtype(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn dict_int(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|obj| obj.as_i64().ok())
}

/// Whether the stream's /Filter (single name or array) includes `filter`.
fn has_filter(dict: &Dictionary, filter: &[u8]) -> bool {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name == filter,
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(name) if name == filter)),
        _ => false,
    }
}

/// Decode an image XObject stream into a `DynamicImage`.
fn decode_image_stream(doc: &Document, stream: &Stream) -> Result<DynamicImage, DocsortError> {
    if has_filter(&stream.dict, b"DCTDecode") {
        // DCTDecode = JPEG; the stream content is a complete JPEG file.
        return image::load_from_memory(&stream.content).map_err(|err| {
            DocsortError::PdfError(format!("embedded JPEG could not be decoded: {}", err))
        });
    }

    let content = if stream.dict.has(b"Filter") {
        stream.decompressed_content().map_err(|err| {
            DocsortError::PdfError(format!("image stream could not be decompressed: {}", err))
        })?
    } else {
        stream.content.clone()
    };

    // Some producers embed complete PNG/TIFF files.
    if let Ok(image) = image::load_from_memory(&content) {
        return Ok(image);
    }

    reconstruct_raw_image(doc, &stream.dict, content)
}

/// Rebuild an image from raw samples using /Width, /Height,
/// /BitsPerComponent, and /ColorSpace.
fn reconstruct_raw_image(
    doc: &Document,
    dict: &Dictionary,
    samples: Vec<u8>,
) -> Result<DynamicImage, DocsortError> {
    let width = dict_int(dict, b"Width")
        .and_then(|w| u32::try_from(w).ok())
        .ok_or_else(|| DocsortError::PdfError("image has no valid /Width".into()))?;
    let height = dict_int(dict, b"Height")
        .and_then(|h| u32::try_from(h).ok())
        .ok_or_else(|| DocsortError::PdfError("image has no valid /Height".into()))?;
    let bpc = dict_int(dict, b"BitsPerComponent").unwrap_or(8);
    if bpc != 8 {
        return Err(DocsortError::PdfError(format!(
            "unsupported bits per component: {bpc}"
        )));
    }

    let channels = color_channels(doc, dict)?;
    let expected = width as usize * height as usize * channels;
    if samples.len() < expected {
        return Err(DocsortError::PdfError(format!(
            "raw image buffer too small: {} bytes, expected {} ({}x{}x{})",
            samples.len(),
            expected,
            width,
            height,
            channels
        )));
    }
    let mut samples = samples;
    samples.truncate(expected);

    let image = match channels {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).map(DynamicImage::ImageRgb8),
        _ => None,
    };
    image.ok_or_else(|| {
        DocsortError::PdfError(format!("cannot build a {channels}-channel image"))
    })
}

/// Number of colour components from /ColorSpace. Indexed palettes are not
/// supported.
fn color_channels(doc: &Document, dict: &Dictionary) -> Result<usize, DocsortError> {
    let Some(space) = dict.get(b"ColorSpace").ok().and_then(|cs| resolve(doc, cs)) else {
        return Ok(3);
    };

    match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Ok(1),
            b"DeviceRGB" | b"CalRGB" => Ok(3),
            b"DeviceCMYK" => Ok(4),
            other => Err(DocsortError::PdfError(format!(
                "unsupported colour space: {}",
                String::from_utf8_lossy(other)
            ))),
        },
        Object::Array(parts) => match parts.first() {
            Some(Object::Name(name)) if name == b"ICCBased" => {
                let components = parts
                    .get(1)
                    .and_then(|profile| resolve(doc, profile))
                    .and_then(|profile| profile.as_stream().ok())
                    .and_then(|profile| dict_int(&profile.dict, b"N"))
                    .unwrap_or(3);
                Ok(components as usize)
            }
            Some(Object::Name(name)) if name == b"DeviceGray" || name == b"CalGray" => Ok(1),
            Some(Object::Name(name)) if name == b"CalRGB" => Ok(3),
            _ => Err(DocsortError::PdfError("unsupported colour space array".into())),
        },
        _ => Err(DocsortError::PdfError("malformed /ColorSpace".into())),
    }
}

/// Naive CMYK to RGB conversion. Colour accuracy does not matter for OCR.
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u16;
            let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
            [channel(px[0]), channel(px[1]), channel(px[2])]
        })
        .collect()
}
