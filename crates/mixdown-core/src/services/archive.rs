//! Archive service: fetch stored files and package them into one zip

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::{ProcessingConfig, ServiceConfig};
use crate::error::{MixdownError, Result};
use crate::storage::{validate_key, BlobStore};

use super::fetch::scratch_dir;
use super::messages::{ArchiveEntry, ZipRequest, ZipResponse};
use super::{blob_store_from_config, require_store};

const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Runs archive requests against a blob store
pub struct ArchiveService {
    store: Option<Arc<dyn BlobStore>>,
    processing: ProcessingConfig,
}

impl ArchiveService {
    pub fn new(store: Option<Arc<dyn BlobStore>>, processing: ProcessingConfig) -> Self {
        Self { store, processing }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(blob_store_from_config(config)?, config.processing.clone()))
    }

    /// Process one archive request
    ///
    /// Entries without a URL or filename are skipped. The response counts only
    /// the entries written to the archive.
    pub fn process(&self, request: &ZipRequest) -> Result<ZipResponse> {
        let store = require_store(&self.store)?;

        if request.files.is_empty() {
            return Err(MixdownError::invalid("no files provided"));
        }
        validate_key(&request.output_key)?;

        let entries = usable_entries(&request.files)?;
        log::info!(
            "Archive request: {} of {} entries -> {}",
            entries.len(),
            request.files.len(),
            request.output_key
        );

        let scratch = scratch_dir(self.processing.scratch_dir.as_deref())?;
        let zip_path = scratch.path().join("archive.zip");

        let mut zip = ZipWriter::new(File::create(&zip_path)?);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &entries {
            let data = store.fetch(&entry.url)?;
            zip.start_file(entry.filename.as_str(), options)
                .map_err(|e| MixdownError::Archive(format!("adding {}: {}", entry.filename, e)))?;
            zip.write_all(&data)?;
            log::debug!("Archived {} as {} ({} bytes)", entry.url, entry.filename, data.len());
        }
        zip.finish()
            .map_err(|e| MixdownError::Archive(format!("finalizing: {}", e)))?;

        let bytes = std::fs::read(&zip_path)?;
        let output_url = store.store(&request.output_key, &bytes, ZIP_CONTENT_TYPE)?;
        log::info!("Archive stored at {} ({} bytes)", output_url, bytes.len());

        Ok(ZipResponse {
            output_url,
            size: bytes.len() as u64,
            file_count: entries.len(),
        })
    }
}

/// Drop incomplete entries and reject names that would escape the archive root
fn usable_entries(files: &[ArchiveEntry]) -> Result<Vec<&ArchiveEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(files.len());

    for (index, entry) in files.iter().enumerate() {
        if entry.url.trim().is_empty() || entry.filename.trim().is_empty() {
            log::warn!("Skipping archive entry {}: missing url or filename", index);
            continue;
        }
        check_entry_name(&entry.filename)?;
        if !seen.insert(entry.filename.as_str()) {
            return Err(MixdownError::invalid(format!(
                "filename '{}' appears more than once",
                entry.filename
            )));
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn check_entry_name(name: &str) -> Result<()> {
    let bad = name.starts_with('/')
        || name.contains('\\')
        || name.chars().any(char::is_control)
        || name.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(MixdownError::invalid(format!("unsafe archive filename '{}'", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TestDoubleBlobStore;
    use std::io::{Cursor, Read};

    fn entry(url: &str, filename: &str) -> ArchiveEntry {
        ArchiveEntry {
            url: url.to_string(),
            filename: filename.to_string(),
        }
    }

    fn setup() -> (tempfile::TempDir, Arc<TestDoubleBlobStore>, ArchiveService) {
        let scratch = tempfile::tempdir().unwrap();
        let store = Arc::new(TestDoubleBlobStore::default());
        store.insert("https://x.test/master.wav", vec![1u8; 4096]);
        store.insert("https://x.test/master.flac", b"fLaC not really".to_vec());
        let shared: Arc<dyn BlobStore> = store.clone();
        let processing = ProcessingConfig {
            scratch_dir: Some(scratch.path().to_path_buf()),
            ..Default::default()
        };
        (scratch, store, ArchiveService::new(Some(shared), processing))
    }

    fn read_entry(data: &[u8], name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_unconfigured_store_refused() {
        let service = ArchiveService::new(None, ProcessingConfig::default());
        let request = ZipRequest {
            files: vec![entry("https://x.test/master.wav", "master.wav")],
            output_key: "pack.zip".to_string(),
        };
        assert!(matches!(
            service.process(&request),
            Err(MixdownError::UnconfiguredDependency(_))
        ));
    }

    #[test]
    fn test_empty_file_list_rejected() {
        let (_scratch, store, service) = setup();
        let request = ZipRequest {
            files: vec![],
            output_key: "pack.zip".to_string(),
        };
        assert!(matches!(service.process(&request), Err(MixdownError::InvalidInput(_))));
        assert_eq!(store.stored_count(), 0);
    }

    #[test]
    fn test_archive_contents() {
        let (scratch, store, service) = setup();
        let request = ZipRequest {
            files: vec![
                entry("https://x.test/master.wav", "Night Drive.wav"),
                entry("https://x.test/master.flac", "lossless/Night Drive.flac"),
            ],
            output_key: "releases/pack.zip".to_string(),
        };
        let response = service.process(&request).unwrap();

        assert_eq!(response.output_url, "memory://blobs/releases/pack.zip");
        assert_eq!(response.file_count, 2);

        let stored = store.stored("releases/pack.zip").unwrap();
        assert_eq!(stored.content_type, "application/zip");
        assert_eq!(response.size, stored.data.len() as u64);
        assert_eq!(read_entry(&stored.data, "Night Drive.wav"), vec![1u8; 4096]);
        assert_eq!(read_entry(&stored.data, "lossless/Night Drive.flac"), b"fLaC not really");
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_incomplete_entries_skipped() {
        let (_scratch, store, service) = setup();
        let request = ZipRequest {
            files: vec![
                entry("", "orphan.wav"),
                entry("https://x.test/master.wav", "master.wav"),
                entry("https://x.test/master.flac", ""),
            ],
            output_key: "pack.zip".to_string(),
        };
        let response = service.process(&request).unwrap();
        assert_eq!(response.file_count, 1);

        let stored = store.stored("pack.zip").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(stored.data)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_all_entries_incomplete_gives_empty_archive() {
        let (_scratch, store, service) = setup();
        let request = ZipRequest {
            files: vec![entry("", "a.wav"), entry("https://x.test/master.wav", " ")],
            output_key: "pack.zip".to_string(),
        };
        let response = service.process(&request).unwrap();
        assert_eq!(response.file_count, 0);

        let archive = zip::ZipArchive::new(Cursor::new(store.stored("pack.zip").unwrap().data)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_unsafe_and_duplicate_names_rejected() {
        let (_scratch, store, service) = setup();
        for files in [
            vec![entry("https://x.test/master.wav", "../escape.wav")],
            vec![entry("https://x.test/master.wav", "/abs.wav")],
            vec![
                entry("https://x.test/master.wav", "same.wav"),
                entry("https://x.test/master.flac", "same.wav"),
            ],
        ] {
            let request = ZipRequest {
                files,
                output_key: "pack.zip".to_string(),
            };
            assert!(matches!(service.process(&request), Err(MixdownError::InvalidInput(_))));
        }
        assert_eq!(store.stored_count(), 0);
    }

    #[test]
    fn test_missing_object_fails_without_upload() {
        let (scratch, store, service) = setup();
        let request = ZipRequest {
            files: vec![
                entry("https://x.test/master.wav", "master.wav"),
                entry("https://x.test/gone.wav", "gone.wav"),
            ],
            output_key: "pack.zip".to_string(),
        };
        assert!(matches!(service.process(&request), Err(MixdownError::Storage(_))));
        assert_eq!(store.stored_count(), 0);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
