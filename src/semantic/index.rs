//! Embedding Index file: precomputed vectors plus their records.
//!
//! # File Format
//!
//! One file per category, little-endian:
//! - Header (24 bytes): magic `NBIX`, version (u32), dimension (u32),
//!   vector count (u32), manifest length (u64)
//! - Vectors: `count * dimension` contiguous f32 values
//! - Manifest: UTF-8 JSON with the model name, category, creation time and
//!   the records, in the same order as the vectors
//!
//! `vectors[i]` belongs to `records[i]`. Nothing ever filters or reorders a
//! persisted index, and a file whose counts disagree is rejected on load.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};
use crate::types::{Category, Record};
use crate::vector::VectorDimension;

/// Current index format version.
const INDEX_VERSION: u32 = 1;

/// Magic bytes to identify embedding index files.
const MAGIC_BYTES: &[u8; 4] = b"NBIX";

/// Size of the header in bytes.
const HEADER_SIZE: usize = 24;

/// Number of bytes per f32 value.
const BYTES_PER_F32: usize = 4;

/// JSON trailer of an index file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Embedding model the vectors were produced with
    pub model_name: String,

    pub category: Category,

    /// RFC 3339 timestamp of the build
    pub created_at: String,

    pub records: Vec<Record>,
}

/// In-memory embedding index for one category.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    dimension: VectorDimension,
    vectors: Vec<Vec<f32>>,
    manifest: IndexManifest,
}

impl EmbeddingIndex {
    /// Pair vectors with records, checking the positional invariant.
    ///
    /// # Errors
    /// `LengthMismatch` when the counts differ, or a dimension error when
    /// any vector has the wrong width.
    pub fn new(
        category: Category,
        model_name: impl Into<String>,
        dimension: VectorDimension,
        vectors: Vec<Vec<f32>>,
        records: Vec<Record>,
    ) -> IndexResult<Self> {
        if vectors.len() != records.len() {
            return Err(IndexError::LengthMismatch {
                vectors: vectors.len(),
                records: records.len(),
            });
        }
        for vector in &vectors {
            dimension.validate_vector(vector)?;
        }

        Ok(Self {
            dimension,
            vectors,
            manifest: IndexManifest {
                model_name: model_name.into(),
                category,
                created_at: chrono::Utc::now().to_rfc3339(),
                records,
            },
        })
    }

    pub fn category(&self) -> Category {
        self.manifest.category
    }

    pub fn model_name(&self) -> &str {
        &self.manifest.model_name
    }

    pub fn created_at(&self) -> &str {
        &self.manifest.created_at
    }

    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn records(&self) -> &[Record] {
        &self.manifest.records
    }

    /// Load and validate the index for `category` at `path`.
    ///
    /// A missing file is [`IndexError::NotFound`]; every other failure means
    /// the file exists but is unreadable or cannot be trusted.
    pub fn load(path: &Path, category: Category) -> IndexResult<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound {
                    category,
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(IndexError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let file_len = file
            .metadata()
            .map_err(|source| IndexError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if file_len < HEADER_SIZE as u64 {
            return Err(invalid(path, "File too small to contain header"));
        }

        // SAFETY: index files are written once by rename and never modified
        // in place, so the mapping cannot change underneath us.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| IndexError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let index = Self::from_bytes(&mmap, path, category)?;
        tracing::debug!(
            "Loaded {category} index from {}: {} records, dimension {}, model {}",
            path.display(),
            index.len(),
            index.dimension.get(),
            index.model_name()
        );
        Ok(index)
    }

    fn from_bytes(bytes: &[u8], path: &Path, category: Category) -> IndexResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(invalid(path, "File too small to contain header"));
        }

        // Check magic bytes
        if &bytes[0..4] != MAGIC_BYTES {
            return Err(invalid(path, "Invalid magic bytes"));
        }

        let version = read_u32(bytes, 4);
        if version != INDEX_VERSION {
            return Err(IndexError::VersionMismatch {
                expected: INDEX_VERSION,
                actual: version,
            });
        }

        let dimension = VectorDimension::new(read_u32(bytes, 8) as usize)
            .map_err(|_| invalid(path, "Vector dimension is zero"))?;
        let vector_count = read_u32(bytes, 12) as usize;
        let manifest_len = u64::from_le_bytes([
            bytes[16], bytes[17], bytes[18], bytes[19], bytes[20], bytes[21], bytes[22], bytes[23],
        ]);

        let vectors_len = vector_count
            .checked_mul(dimension.get())
            .and_then(|n| n.checked_mul(BYTES_PER_F32))
            .ok_or_else(|| invalid(path, "Vector section size overflows"))?;
        let expected_len = usize::try_from(manifest_len)
            .ok()
            .and_then(|m| HEADER_SIZE.checked_add(vectors_len)?.checked_add(m))
            .ok_or_else(|| invalid(path, "Manifest size overflows"))?;
        if expected_len != bytes.len() {
            return Err(invalid(
                path,
                &format!(
                    "Expected {expected_len} bytes from header, found {}",
                    bytes.len()
                ),
            ));
        }

        let manifest_start = HEADER_SIZE + vectors_len;
        let vectors: Vec<Vec<f32>> = bytes[HEADER_SIZE..manifest_start]
            .chunks_exact(dimension.get() * BYTES_PER_F32)
            .map(|chunk| {
                chunk
                    .chunks_exact(BYTES_PER_F32)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect()
            })
            .collect();

        let manifest: IndexManifest = serde_json::from_slice(&bytes[manifest_start..])
            .map_err(|e| invalid(path, &format!("Manifest is not valid JSON: {e}")))?;

        if manifest.records.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                vectors: vectors.len(),
                records: manifest.records.len(),
            });
        }
        if manifest.category != category {
            return Err(IndexError::CategoryMismatch {
                path: path.to_path_buf(),
                expected: category,
                actual: manifest.category,
            });
        }

        Ok(Self {
            dimension,
            vectors,
            manifest,
        })
    }

    /// Write the index to `path`, replacing any existing file atomically.
    pub fn save(&self, path: &Path) -> IndexResult<()> {
        let write_err = |source| IndexError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let manifest = serde_json::to_vec(&self.manifest)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        let vector_count = u32::try_from(self.vectors.len()).map_err(|_| {
            write_err(std::io::Error::other("Too many vectors for one index file"))
        })?;

        let temp_path = temp_path_for(path);
        let result = (|| -> std::io::Result<()> {
            let mut writer = BufWriter::new(File::create(&temp_path)?);

            writer.write_all(MAGIC_BYTES)?;
            writer.write_all(&INDEX_VERSION.to_le_bytes())?;
            writer.write_all(&(self.dimension.get() as u32).to_le_bytes())?;
            writer.write_all(&vector_count.to_le_bytes())?;
            writer.write_all(&(manifest.len() as u64).to_le_bytes())?;

            for vector in &self.vectors {
                for &value in vector {
                    writer.write_all(&value.to_le_bytes())?;
                }
            }
            writer.write_all(&manifest)?;

            writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
            std::fs::rename(&temp_path, path)
        })();

        if let Err(source) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(source));
        }

        tracing::debug!(
            "Wrote {} index to {}: {} records",
            self.category(),
            path.display(),
            self.len()
        );
        Ok(())
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn invalid(path: &Path, reason: &str) -> IndexError {
    IndexError::InvalidFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
