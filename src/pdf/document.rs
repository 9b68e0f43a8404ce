use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::output::write_atomically;
use crate::page_range::PageSet;

/// Page tree nodes walked before giving up on an inherited attribute
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug)]
pub struct PdfDocument {
    pub doc: Document,
    pub path: PathBuf,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)?;
        debug!(
            "Loaded PDF with {} pages from {}",
            doc.get_pages().len(),
            path.display()
        );
        Ok(PdfDocument {
            doc,
            path: path.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub fn from_document<P: AsRef<Path>>(doc: Document, path: P) -> Self {
        PdfDocument {
            doc,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        // get_pages is a BTreeMap, so this is already in page order
        self.doc.get_pages().into_iter().collect()
    }

    /// Make an encrypted document readable; unencrypted documents ignore the password.
    ///
    /// `Document::load` already decrypts files whose user password is empty, so
    /// those only shed their /Encrypt entry here and need no password.
    pub fn unlock(&mut self, password: Option<&str>) -> Result<()> {
        if !self.doc.is_encrypted() {
            return Ok(());
        }
        if self.doc.encryption_state.is_some() {
            self.drop_encryption_dict();
            debug!("{} opened with the empty user password", self.path.display());
            return Ok(());
        }

        let password = password.ok_or(Error::PasswordRequired)?;
        if self.doc.authenticate_password(password).is_err() {
            return Err(Error::InvalidPassword);
        }
        self.doc.decrypt(password)?;
        if self.page_count() == 0 {
            return Err(Error::Extraction(
                "the encrypted objects could not be decoded".to_string(),
            ));
        }
        debug!("Decrypted {}", self.path.display());
        Ok(())
    }

    // Objects are already plaintext; saving with /Encrypt would mislabel them
    fn drop_encryption_dict(&mut self) {
        if let Some(Object::Reference(id)) = self.doc.trailer.remove(b"Encrypt") {
            self.doc.objects.remove(&id);
        }
    }

    /// Remove the given 1-based pages in place, keeping the rest in their original order
    pub fn remove_pages(&mut self, pages: &PageSet) -> Result<()> {
        if pages.is_empty() {
            return Ok(());
        }
        let total = self.page_count();
        pages.check_within(total)?;

        let doomed: Vec<u32> = (1..=total).filter(|&page| pages.contains(page)).collect();
        self.doc.delete_pages(&doomed);
        self.doc.prune_objects();
        Ok(())
    }

    /// Copy of this document without the given pages
    pub fn without_pages(&self, pages: &PageSet) -> Result<PdfDocument> {
        let mut copy = PdfDocument {
            doc: self.doc.clone(),
            path: self.path.clone(),
        };
        copy.remove_pages(pages)?;
        Ok(copy)
    }

    /// Keep only the first `max` pages
    pub fn truncate(&mut self, max: u32) {
        let total = self.page_count();
        if max >= total {
            return;
        }
        let extra: Vec<u32> = (max + 1..=total).collect();
        self.doc.delete_pages(&extra);
    }

    /// Add `degrees` (a multiple of 90) to every page's /Rotate
    pub fn rotate_pages(&mut self, degrees: i64) -> Result<()> {
        if degrees % 90 != 0 {
            return Err(Error::Argument(format!(
                "Rotation must be a multiple of 90 degrees, got {}",
                degrees
            )));
        }
        let degrees = degrees.rem_euclid(360);
        if degrees == 0 {
            return Ok(());
        }

        for (_, page_id) in self.page_ids() {
            let current = self.page_rotation(page_id).rem_euclid(360);
            let page = self.doc.get_dictionary_mut(page_id)?;
            page.set("Rotate", Object::Integer((current + degrees) % 360));
        }
        Ok(())
    }

    /// Effective /Rotate of a page, inherited from the page tree when the page has none
    pub fn page_rotation(&self, page_id: ObjectId) -> i64 {
        let mut node = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let Some(dict) = node else { break };
            if let Ok(rotate) = dict.get(b"Rotate").and_then(Object::as_i64) {
                return rotate;
            }
            node = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|parent| self.doc.get_dictionary(parent))
                .ok();
        }
        0
    }

    /// Text of every page straight from the content streams, without layout analysis
    pub fn raw_text(&self) -> Result<String> {
        let pages: Vec<u32> = (1..=self.page_count()).collect();
        if pages.is_empty() {
            return Ok(String::new());
        }
        Ok(self.doc.extract_text(&pages)?)
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf)?;
        Ok(buf)
    }

    /// Save to a file, replacing it only once the whole document has been written
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf> {
        write_atomically(path, |file| {
            self.doc.save_to(file)?;
            Ok(())
        })
    }
}
