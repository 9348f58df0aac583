//! File-based storage backend implementation for the mealflow service.
//!
//! Each namespace maps to a subdirectory of the base path and each value is
//! written as a single JSON document. Writes go to a temp file and are
//! renamed into place, so a crash mid-write never leaves a torn document
//! behind. Nothing here expires: orders are an append-only audit trail.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use mealflow_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
///
/// This implementation stores data as files on the filesystem, providing
/// simple persistence without requiring external dependencies.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at the given path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem path.
	///
	/// The namespace portion of the key (`orders:<id>`) becomes a
	/// subdirectory, which keeps prefix scans a plain directory read.
	fn file_path(&self, key: &str) -> PathBuf {
		match key.split_once(':') {
			Some((namespace, id)) => self
				.base_path
				.join(namespace)
				.join(format!("{}.json", sanitize(id))),
			None => self.base_path.join(format!("{}.json", sanitize(key))),
		}
	}

	/// Directory holding a namespace, if the key prefix names one.
	fn namespace_dir(&self, prefix: &str) -> PathBuf {
		let namespace = prefix.strip_suffix(':').unwrap_or(prefix);
		self.base_path.join(namespace)
	}
}

/// Replaces path-hostile characters so an id is safe as a file name.
fn sanitize(id: &str) -> String {
	id.replace(['/', '\\', ':'], "_")
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write atomically by writing to a temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.file_path(key).exists())
	}

	async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let dir = self.namespace_dir(prefix);
		let namespace = prefix.strip_suffix(':').unwrap_or(prefix);

		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			// A namespace nothing has been written to yet is just empty.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut keys = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() == Some(std::ffi::OsStr::new("json")) {
				if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
					keys.push(format!("{}:{}", namespace, stem));
				}
			}
		}

		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("storage_path", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}
