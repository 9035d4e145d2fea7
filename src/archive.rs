use std::io::{Cursor, Write};

use anyhow::Context as _;
use zip::{
    CompressionMethod,
    write::{FileOptions, ZipWriter},
};

use crate::foundation::error::FramemarkResult;

/// Package ordered `(name, bytes)` pairs into one in-memory ZIP archive.
/// Entry names are kept verbatim: no renaming, no deduplication of
/// collisions. Zero entries yields a valid empty archive.
pub fn zip_archive(entries: &[(String, Vec<u8>)]) -> FramemarkResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (name, data) in entries {
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("add '{name}' to archive"))?;
            zip.write_all(data)
                .with_context(|| format!("write '{name}' into archive"))?;
        }

        zip.finish().context("finalize archive")?;
    }

    Ok(buffer)
}
