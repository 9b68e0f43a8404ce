use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, StringFormat};
use std::path::{Path, PathBuf};

/// An `n`-page document; page `i` reads "Page i" and is `100 + i` points wide.
pub fn sample_document(pages: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![10.into(), 50.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", i))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), (100 + i as i64).into(), 100.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a sample document to `dir/name`
pub fn write_sample(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let path = dir.join(name);
    let mut doc = sample_document(pages);
    doc.save(&path).expect("save sample");
    path
}

/// Write an RC4-encrypted sample document to `dir/name`
pub fn write_encrypted_sample(
    dir: &Path,
    name: &str,
    pages: u32,
    owner_password: &str,
    user_password: &str,
) -> PathBuf {
    let path = dir.join(name);
    let mut doc = sample_document(pages);
    // the file key is derived from the first /ID string
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(vec![7u8; 16], StringFormat::Literal),
            Object::String(vec![9u8; 16], StringFormat::Literal),
        ]),
    );
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).expect("encryption state");
    doc.encrypt(&state).expect("encrypt sample");
    doc.save(&path).expect("save sample");
    path
}

/// MediaBox width of each page, in page order; identifies the original page
pub fn page_widths(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("media box");
            media_box[2].as_i64().expect("width")
        })
        .collect()
}
