use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::page_range::PageSet;
use crate::paths::{resolve_output, validate_input};
use crate::pdf::PdfDocument;

/// Where a [`PdfCrop`] is in its load → crop → write sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CropStage {
    Uninitialized,
    Loaded,
    Cropped,
    Written,
}

impl fmt::Display for CropStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CropStage::Uninitialized => "not loaded",
            CropStage::Loaded => "loaded",
            CropStage::Cropped => "cropped",
            CropStage::Written => "written",
        };
        f.write_str(name)
    }
}

enum State {
    Uninitialized,
    Loaded { source: PdfDocument },
    Cropped { source: PdfDocument, output: PdfDocument },
    Written { source: PdfDocument },
}

/// Removes a set of pages from a PDF. One crop per load.
pub struct PdfCrop {
    state: State,
    /// `None` until a filter is set; an empty set is a plain copy
    filter: Option<PageSet>,
}

impl Default for PdfCrop {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfCrop {
    pub fn new() -> Self {
        PdfCrop {
            state: State::Uninitialized,
            filter: None,
        }
    }

    pub fn stage(&self) -> CropStage {
        match self.state {
            State::Uninitialized => CropStage::Uninitialized,
            State::Loaded { .. } => CropStage::Loaded,
            State::Cropped { .. } => CropStage::Cropped,
            State::Written { .. } => CropStage::Written,
        }
    }

    /// Load (or reload) the source document, discarding any earlier crop
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.state = State::Uninitialized;
        validate_input(path, "pdf")?;
        let mut source = PdfDocument::open(path)?;
        source.unlock(None)?;
        self.state = State::Loaded { source };
        Ok(())
    }

    /// Replace the pages to remove; an existing crop goes back to `Loaded`
    pub fn set_page_filter(&mut self, filter: PageSet) {
        self.filter = Some(filter);
        if let State::Cropped { .. } = self.state {
            if let State::Cropped { source, .. } =
                std::mem::replace(&mut self.state, State::Uninitialized)
            {
                self.state = State::Loaded { source };
            }
        }
    }

    pub fn source(&self) -> Option<&PdfDocument> {
        match &self.state {
            State::Uninitialized => None,
            State::Loaded { source }
            | State::Cropped { source, .. }
            | State::Written { source } => Some(source),
        }
    }

    /// Copy every page not in the filter into a new document, in order
    pub fn crop(&mut self) -> Result<()> {
        let stage = self.stage();
        let source = match &self.state {
            State::Loaded { source } => source,
            _ => {
                return Err(Error::InvalidState {
                    operation: "crop",
                    stage,
                })
            }
        };
        let filter = self.filter.as_ref().ok_or(Error::EmptyFilter)?;

        let output = source.without_pages(filter)?;
        if output.page_count() == 0 {
            return Err(Error::EmptyContent("every page would be removed"));
        }
        debug!(
            "Cropped {} of {} pages from {}",
            filter.len(),
            source.page_count(),
            source.path.display()
        );

        if let State::Loaded { source } = std::mem::replace(&mut self.state, State::Uninitialized)
        {
            self.state = State::Cropped { source, output };
        }
        Ok(())
    }

    /// Pages in the cropped document, once cropped
    pub fn cropped_page_count(&self) -> Option<u32> {
        match &self.state {
            State::Cropped { output, .. } => Some(output.page_count()),
            _ => None,
        }
    }

    /// Write the cropped document to `path`, or `<input>_cropped.pdf` beside the input
    pub fn write(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let stage = self.stage();
        let (source, output) = match &mut self.state {
            State::Cropped { source, output } => (source, output),
            _ => {
                return Err(Error::InvalidState {
                    operation: "write",
                    stage,
                })
            }
        };

        let target = resolve_output(path, &source.path, "_cropped", "pdf")?;
        let written = output.save(&target)?;
        info!(
            "Wrote {} page(s) to {}",
            output.page_count(),
            written.display()
        );

        if let State::Cropped { source, .. } =
            std::mem::replace(&mut self.state, State::Uninitialized)
        {
            self.state = State::Written { source };
        }
        Ok(written)
    }
}
