use midoku_orm::Model;

use crate::schema::blob;

record! {
    /// Binary payload, in practice PNG cover art.
    Blob => blob
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self::create(blob::Row { id: None, data })
    }

    pub fn data(&self) -> &[u8] {
        self.get(blob::data)
    }

    pub fn is_png(&self) -> bool {
        self.data().starts_with(PNG_SIGNATURE)
    }
}
