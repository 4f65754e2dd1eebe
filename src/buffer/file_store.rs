//! File-backed page store
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/base/<database>/<object>
//! ```
//!
//! Each relation file is a sequence of `BLOCK_SIZE` blocks. A file whose
//! length is not a whole number of blocks is reported as an I/O error.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{BufferError, BufferResult};
use super::store::{check_block_len, PageStore};
use crate::ids::{BlockNumber, DatabaseId, ObjectId, BLOCK_SIZE};

/// Page store persisting relations as files
#[derive(Debug, Clone)]
pub struct FilePageStore {
    base_dir: PathBuf,
}

impl FilePageStore {
    /// Opens the store rooted at `<data_dir>/base`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `HC_HOST_IO_ERROR` if the directory cannot be created.
    pub fn open(data_dir: &Path) -> BufferResult<Self> {
        let base_dir = data_dir.join("base");
        fs::create_dir_all(&base_dir).map_err(|e| {
            BufferError::io_error(
                format!("Failed to create base directory: {}", base_dir.display()),
                e,
            )
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn database_dir(&self, database: DatabaseId) -> PathBuf {
        self.base_dir.join(database.to_string())
    }

    fn relation_path(&self, database: DatabaseId, object: ObjectId) -> PathBuf {
        self.database_dir(database).join(object.to_string())
    }

    fn open_existing(&self, database: DatabaseId, object: ObjectId, write: bool) -> BufferResult<File> {
        let path = self.relation_path(database, object);
        OpenOptions::new()
            .read(true)
            .write(write)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => BufferError::object_not_found(database, object),
                _ => BufferError::io_error(format!("Failed to open {}", path.display()), e),
            })
    }
}

impl PageStore for FilePageStore {
    fn create_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<()> {
        let dir = self.database_dir(database);
        fs::create_dir_all(&dir).map_err(|e| {
            BufferError::io_error(format!("Failed to create {}", dir.display()), e)
        })?;

        let path = self.relation_path(database, object);
        OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|e| BufferError::io_error(format!("Failed to create {}", path.display()), e))?;
        Ok(())
    }

    fn drop_relation(&self, database: DatabaseId, object: ObjectId) -> BufferResult<()> {
        let path = self.relation_path(database, object);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BufferError::object_not_found(database, object),
            _ => BufferError::io_error(format!("Failed to remove {}", path.display()), e),
        })
    }

    fn relation_exists(&self, database: DatabaseId, object: ObjectId) -> bool {
        self.relation_path(database, object).is_file()
    }

    fn relations(&self, database: DatabaseId) -> BufferResult<Vec<ObjectId>> {
        let dir = self.database_dir(database);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BufferError::io_error(
                    format!("Failed to list {}", dir.display()),
                    e,
                ))
            }
        };

        let mut objects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BufferError::io_error("Failed to read directory entry", e))?;
            // Foreign files in the database directory are not relations
            if let Some(object) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            {
                objects.push(ObjectId::new(object));
            }
        }
        objects.sort();
        Ok(objects)
    }

    fn block_count(&self, database: DatabaseId, object: ObjectId) -> BufferResult<BlockNumber> {
        let file = self.open_existing(database, object, false)?;
        let len = file
            .metadata()
            .map_err(|e| BufferError::io_error("Failed to read relation metadata", e))?
            .len();

        if len % BLOCK_SIZE as u64 != 0 {
            return Err(BufferError::io_error_no_source(format!(
                "relation {} has partial block (length {})",
                object, len
            )));
        }
        Ok((len / BLOCK_SIZE as u64) as BlockNumber)
    }

    fn read_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        buf: &mut [u8],
    ) -> BufferResult<()> {
        check_block_len(buf.len())?;
        let mut file = self.open_existing(database, object, false)?;
        file.seek(SeekFrom::Start(block as u64 * BLOCK_SIZE as u64))
            .and_then(|_| file.read_exact(buf))
            .map_err(|e| {
                BufferError::io_error("Failed to read block", e).at_block(database, object, block)
            })
    }

    fn write_block(
        &self,
        database: DatabaseId,
        object: ObjectId,
        block: BlockNumber,
        data: &[u8],
    ) -> BufferResult<()> {
        check_block_len(data.len())?;
        let current = self.block_count(database, object)?;
        if block > current {
            return Err(BufferError::io_error_no_source("write leaves a hole in relation")
                .at_block(database, object, block));
        }

        let mut file = self.open_existing(database, object, true)?;
        file.seek(SeekFrom::Start(block as u64 * BLOCK_SIZE as u64))
            .and_then(|_| file.write_all(data))
            .map_err(|e| {
                BufferError::io_error("Failed to write block", e).at_block(database, object, block)
            })
    }

    fn sync_database(&self, database: DatabaseId) -> BufferResult<()> {
        for object in self.relations(database)? {
            let file = match self.open_existing(database, object, false) {
                Ok(file) => file,
                // Dropped since the listing; nothing left to sync
                Err(e) if e.is_object_not_found() => continue,
                Err(e) => return Err(e),
            };
            file.sync_all().map_err(|e| {
                BufferError::io_error(format!("Failed to fsync relation {}", object), e)
            })?;
        }
        Ok(())
    }
}
