//! # Edits Module
//!
//! The edit store is a sparse overlay of explicit user changes on top of the
//! generated terrain. It is re-applied every time a chunk materializes, so a
//! mined voxel stays mined and a placed block stays placed across regeneration
//! and across sessions.
//!
//! ## File Format
//!
//! All integers are little-endian:
//!
//! ```text
//! header:  u32 entry_count
//! entry*:  i32 x, i32 y, i32 z, u8 block_type_or_sentinel   (255 = forced air)
//! ```
//!
//! Loading is best-effort: a truncated trailing record ends the read without
//! an error, and whatever was parsed before it is kept.

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use cgmath::Point3;
use log::{debug, info, warn};
use thiserror::Error;

use super::{
    block::{block_type::BlockType, BlockTypeSize},
    coordinates::{voxel_to_chunk, ChunkPosition, VoxelPosition},
};

/// Byte written in place of a block type id for a forced-air edit.
pub const FORCED_AIR_SENTINEL: BlockTypeSize = 255;
/// Size of one persisted entry in bytes.
pub const RECORD_SIZE: usize = 3 * std::mem::size_of::<i32>() + std::mem::size_of::<u8>();
/// Default file name for the persisted edit store.
pub const DEFAULT_SAVE_FILE: &str = "world.dat";

/// A single user edit of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edit {
    /// A block was placed (or generated terrain replaced) with this material.
    Place(BlockType),
    /// The voxel was mined and must stay empty even if terrain would fill it.
    ForcedAir,
}

impl Edit {
    /// The block this edit leaves at its voxel, `None` for forced air.
    pub fn block_type(self) -> Option<BlockType> {
        match self {
            Edit::Place(block_type) => Some(block_type),
            Edit::ForcedAir => None,
        }
    }

    fn encode(self) -> BlockTypeSize {
        match self {
            Edit::Place(block_type) => block_type.id(),
            Edit::ForcedAir => FORCED_AIR_SENTINEL,
        }
    }

    fn decode(byte: BlockTypeSize) -> Option<Self> {
        if byte == FORCED_AIR_SENTINEL {
            return Some(Edit::ForcedAir);
        }
        BlockType::from_id(byte).map(Edit::Place)
    }
}

impl From<Option<BlockType>> for Edit {
    fn from(block_type: Option<BlockType>) -> Self {
        block_type.map_or(Edit::ForcedAir, Edit::Place)
    }
}

/// Failures of edit store persistence.
#[derive(Debug, Error)]
pub enum EditStoreError {
    /// The save file exists but could not be read.
    #[error("failed to read edit store {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The save file could not be written.
    #[error("failed to write edit store {path}: {source}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Sparse `voxel → edit` overlay, persisted to disk on save.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditStore {
    edits: HashMap<VoxelPosition, Edit>,
}

impl EditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The edit recorded at `position`, if any.
    pub fn get(&self, position: VoxelPosition) -> Option<Edit> {
        self.edits.get(&position).copied()
    }

    /// Records an edit, replacing any earlier edit of the same voxel.
    pub fn record(&mut self, position: VoxelPosition, edit: Edit) -> Option<Edit> {
        self.edits.insert(position, edit)
    }

    /// Forgets the edit at `position` so the voxel reverts to generated terrain.
    pub fn remove(&mut self, position: VoxelPosition) -> Option<Edit> {
        self.edits.remove(&position)
    }

    /// Number of recorded edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edit is recorded.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Iterates every edit in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPosition, Edit)> + '_ {
        self.edits.iter().map(|(position, edit)| (*position, *edit))
    }

    /// Every edit that falls inside the bounds of `chunk`.
    pub fn edits_in_chunk(&self, chunk: ChunkPosition) -> Vec<(VoxelPosition, Edit)> {
        self.iter()
            .filter(|(position, _)| voxel_to_chunk(*position) == chunk)
            .collect()
    }

    /// The set of chunks holding at least one edit.
    pub fn chunks_with_edits(&self) -> HashSet<ChunkPosition> {
        self.edits.keys().map(|position| voxel_to_chunk(*position)).collect()
    }

    /// Serializes the store in the on-disk layout.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&(self.edits.len() as u32).to_le_bytes())?;
        for (position, edit) in &self.edits {
            writer.write_all(&position.x.to_le_bytes())?;
            writer.write_all(&position.y.to_le_bytes())?;
            writer.write_all(&position.z.to_le_bytes())?;
            writer.write_all(&[edit.encode()])?;
        }
        Ok(())
    }

    /// Parses a store from the on-disk layout.
    ///
    /// A missing or short header yields an empty store. Reading stops at the
    /// first truncated record. Records carrying an unknown block id are skipped.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut store = EditStore::new();

        let mut header = [0u8; 4];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(store),
            Err(error) => return Err(error),
        }
        let entry_count = u32::from_le_bytes(header);

        let mut record = [0u8; RECORD_SIZE];
        for index in 0..entry_count {
            match reader.read_exact(&mut record) {
                Ok(()) => {}
                Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                    warn!(
                        "Edit store truncated after {} of {} records",
                        index, entry_count
                    );
                    break;
                }
                Err(error) => return Err(error),
            }

            let position = Point3::new(
                i32::from_le_bytes([record[0], record[1], record[2], record[3]]),
                i32::from_le_bytes([record[4], record[5], record[6], record[7]]),
                i32::from_le_bytes([record[8], record[9], record[10], record[11]]),
            );
            match Edit::decode(record[12]) {
                Some(edit) => {
                    store.edits.insert(position, edit);
                }
                None => warn!(
                    "Skipping edit at {:?} with unknown block id {}",
                    position, record[12]
                ),
            }
        }

        Ok(store)
    }

    /// Writes the store to `path`, replacing any previous file.
    ///
    /// Failures are returned rather than logged and dropped: losing edits on
    /// shutdown must be visible to the caller.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditStoreError> {
        let path = path.as_ref();
        let write_error = |source| EditStoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;

        info!("Saved {} edits to {}", self.edits.len(), path.display());
        Ok(())
    }

    /// Reads the store from `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditStoreError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("No edit store at {}, starting fresh", path.display());
                return Ok(EditStore::new());
            }
            Err(source) => {
                return Err(EditStoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let store = Self::read_from(&mut BufReader::new(file)).map_err(|source| {
            EditStoreError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        info!("Loaded {} edits from {}", store.len(), path.display());
        Ok(store)
    }
}
