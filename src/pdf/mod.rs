pub mod crop;
pub mod document;
pub mod text;

#[cfg(test)]
pub(crate) mod testutil;

pub use document::PdfDocument;
