//! PDF assembly from page images
//!
//! Each page becomes one PDF page holding a single JPEG image XObject that
//! fills the page. Page size follows the image size at the configured
//! resolution: 800 px at 100 dpi is 576 pt.

use crate::config::ImageConfig;
use crate::document::page::PageImage;
use crate::document::DocumentError;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const POINTS_PER_INCH: u32 = 72;
const IMAGE_NAME: &str = "Im0";

/// Renders pages, in the given order, into one PDF
///
/// The first page is the base document and the rest are appended after it.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The PDF file content
/// * `Err(DocumentError::Empty)` - No pages were given
/// * `Err(DocumentError)` - A page could not be encoded or the PDF written
pub fn render_pdf(pages: &[PageImage], settings: &ImageConfig) -> Result<Vec<u8>, DocumentError> {
    if pages.is_empty() {
        return Err(DocumentError::Empty);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, page, settings)?;
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;
    Ok(out)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    page: &PageImage,
    settings: &ImageConfig,
) -> Result<ObjectId, DocumentError> {
    let jpeg = encode_jpeg(page, settings.jpeg_quality)?;

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(page.width()),
            "Height" => i64::from(page.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let width_pt = to_points(page.width(), settings.resolution_dpi);
    let height_pt = to_points(page.height(), settings.resolution_dpi);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width_pt.into(),
                    0.into(),
                    0.into(),
                    height_pt.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    }))
}

fn encode_jpeg(page: &PageImage, quality: u8) -> Result<Vec<u8>, DocumentError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&page.image)
        .map_err(|e| DocumentError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Converts a pixel length to PDF points at `dpi`, rounding to the nearest point
fn to_points(pixels: u32, dpi: u32) -> i64 {
    let scaled = u64::from(pixels) * u64::from(POINTS_PER_INCH);
    ((scaled + u64::from(dpi) / 2) / u64::from(dpi)) as i64
}
