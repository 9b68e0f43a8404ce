use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::page_range::PageSet;
use crate::pdf::crop::PdfCrop;

#[derive(Debug, Clone)]
pub struct CropOutcome {
    pub output: PathBuf,
    pub source_pages: u32,
    pub page_count: u32,
}

/// Load `input`, drop the pages in `remove`, and write the result
pub fn crop<P: AsRef<Path>>(input: P, remove: PageSet, output: Option<&Path>) -> Result<CropOutcome> {
    let mut cropper = PdfCrop::new();
    cropper.load(input)?;
    cropper.set_page_filter(remove);
    cropper.crop()?;

    let page_count = cropper.cropped_page_count().unwrap_or_default();
    let output = cropper.write(output)?;
    let source_pages = cropper
        .source()
        .map(|doc| doc.page_count())
        .unwrap_or_default();

    Ok(CropOutcome {
        output,
        source_pages,
        page_count,
    })
}

pub fn run<P: AsRef<Path>>(input: P, remove: PageSet, output: Option<&Path>) -> Result<()> {
    let outcome = crop(input, remove, output)?;
    println!(
        "Removed {} of {} page(s); wrote {} page(s) to {}",
        outcome.source_pages - outcome.page_count,
        outcome.source_pages,
        outcome.page_count,
        outcome.output.display()
    );
    Ok(())
}
