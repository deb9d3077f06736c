//! Save/Load of generated layouts
//!
//! A snapshot stores what is needed to rebuild a round exactly: the round
//! config, its seed, the wall flags and the decoration placements. Pooled
//! geometry and the navigation surface are derived data and are rebuilt on
//! load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use labyrinth_logic::grid::CellGrid;
use serde::{Deserialize, Serialize};

use crate::config::RoundConfig;
use crate::engine::{GenerationReport, MazeEngine};
use crate::error::MazeError;
use crate::generation::DecorationRecord;
use crate::navigation::NavigationBackend;

/// Version number for the snapshot format (increment when format changes)
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable record of one generated round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeSnapshot {
    pub version: u32,
    pub round: RoundConfig,
    pub seed: u64,
    pub grid: CellGrid,
    pub decorations: Vec<DecorationRecord>,
}

impl MazeSnapshot {
    /// Snapshot of the engine's current maze, if one is built.
    pub fn capture<B: NavigationBackend>(engine: &MazeEngine<B>) -> Option<Self> {
        Some(Self {
            version: SNAPSHOT_VERSION,
            round: engine.round()?,
            seed: engine.round_seed()?,
            grid: engine.grid()?.clone(),
            decorations: engine.decoration_placements().to_vec(),
        })
    }

    /// Rebuild this layout in `engine`, replacing its current maze.
    pub fn restore<B: NavigationBackend>(
        &self,
        engine: &mut MazeEngine<B>,
    ) -> Result<GenerationReport, MazeError> {
        engine.rebuild(self.round, self.seed, self.grid.clone(), &self.decorations)
    }
}

/// Write a snapshot to a writer
pub fn save_snapshot<W: Write>(writer: W, snapshot: &MazeSnapshot) -> Result<(), MazeError> {
    bincode::serialize_into(writer, snapshot)?;
    Ok(())
}

/// Read a snapshot from a reader
pub fn load_snapshot<R: Read>(reader: R) -> Result<MazeSnapshot, MazeError> {
    let snapshot: MazeSnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(MazeError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    if !snapshot.grid.is_consistent()
        || snapshot.grid.rows() != snapshot.round.rows
        || snapshot.grid.cols() != snapshot.round.cols
    {
        return Err(MazeError::InvalidDimensions {
            rows: snapshot.grid.rows(),
            cols: snapshot.grid.cols(),
        });
    }
    Ok(snapshot)
}

pub fn save_snapshot_file(path: impl AsRef<Path>, snapshot: &MazeSnapshot) -> Result<(), MazeError> {
    let mut writer = BufWriter::new(File::create(path)?);
    save_snapshot(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}

pub fn load_snapshot_file(path: impl AsRef<Path>) -> Result<MazeSnapshot, MazeError> {
    load_snapshot(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MazeConfig;
    use crate::engine::MazeQueries;
    use labyrinth_logic::connectivity::{reachable_count, shortest_path};
    use labyrinth_logic::grid::{Cell, CellCoord};

    fn generated() -> MazeEngine {
        let mut engine = MazeEngine::new(MazeConfig::default().with_seed(5));
        engine.generate(RoundConfig::new(6, 4, 55)).unwrap();
        engine
    }

    #[test]
    fn test_save_load_roundtrip() {
        let engine = generated();
        let snapshot = MazeSnapshot::capture(&engine).unwrap();

        let mut buf = Vec::new();
        save_snapshot(&mut buf, &snapshot).unwrap();
        let loaded = load_snapshot(buf.as_slice()).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_restore_into_fresh_engine() {
        let engine = generated();
        let snapshot = MazeSnapshot::capture(&engine).unwrap();

        let mut other = MazeEngine::new(MazeConfig::default());
        let report = snapshot.restore(&mut other).unwrap();
        assert_eq!(other.grid(), engine.grid());
        assert_eq!(other.decoration_placements(), engine.decoration_placements());
        assert_eq!(report.decorations.placed, snapshot.decorations.len());
        assert_eq!(other.maze_size(), engine.maze_size());
        assert!(other.navigation().is_baked());
    }

    #[test]
    fn test_version_mismatch() {
        let engine = generated();
        let mut snapshot = MazeSnapshot::capture(&engine).unwrap();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let mut buf = Vec::new();
        save_snapshot(&mut buf, &snapshot).unwrap();
        assert!(matches!(
            load_snapshot(buf.as_slice()),
            Err(MazeError::VersionMismatch { found, .. }) if found == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn test_truncated_data() {
        let engine = generated();
        let snapshot = MazeSnapshot::capture(&engine).unwrap();
        let mut buf = Vec::new();
        save_snapshot(&mut buf, &snapshot).unwrap();
        buf.truncate(buf.len() / 2);
        assert!(matches!(
            load_snapshot(buf.as_slice()),
            Err(MazeError::Serialization(_))
        ));
    }

    #[test]
    fn test_nothing_to_capture() {
        let engine = MazeEngine::new(MazeConfig::default());
        assert!(MazeSnapshot::capture(&engine).is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let engine = generated();
        let snapshot = MazeSnapshot::capture(&engine).unwrap();
        let path = std::env::temp_dir().join(format!("labyrinth-snapshot-{}.bin", std::process::id()));
        save_snapshot_file(&path, &snapshot).unwrap();
        let loaded = load_snapshot_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, snapshot);
    }

    /// Same field layout as `CellGrid`, so bincode output decodes as one.
    #[derive(Serialize)]
    struct RawGrid {
        rows: usize,
        cols: usize,
        cells: Vec<Cell>,
    }

    /// A 3×3 grid whose cell list holds only its first cell.
    fn truncated_grid() -> RawGrid {
        let full = CellGrid::new(3, 3);
        RawGrid {
            rows: 3,
            cols: 3,
            cells: full.cells().take(1).copied().collect(),
        }
    }

    #[test]
    fn test_load_rejects_inconsistent_grid() {
        #[derive(Serialize)]
        struct RawSnapshot {
            version: u32,
            round: RoundConfig,
            seed: u64,
            grid: RawGrid,
            decorations: Vec<DecorationRecord>,
        }

        let raw = RawSnapshot {
            version: SNAPSHOT_VERSION,
            round: RoundConfig::new(3, 3, 50),
            seed: 9,
            grid: truncated_grid(),
            decorations: Vec::new(),
        };
        let mut buf = Vec::new();
        bincode::serialize_into(&mut buf, &raw).unwrap();
        assert!(matches!(
            load_snapshot(buf.as_slice()),
            Err(MazeError::InvalidDimensions { rows: 3, cols: 3 })
        ));
    }

    #[test]
    fn test_rebuild_rejects_inconsistent_grid() {
        let bytes = bincode::serialize(&truncated_grid()).unwrap();
        let grid: CellGrid = bincode::deserialize(&bytes).unwrap();
        assert!(!grid.is_consistent());

        // Lookups on the broken grid stay in bounds.
        assert!(shortest_path(&grid, CellCoord::new(2, 2), CellCoord::new(0, 0)).is_none());
        assert_eq!(reachable_count(&grid, 0, 0), 1);

        let mut engine = generated();
        let before = engine.grid().cloned();
        let result = engine.rebuild(RoundConfig::new(3, 3, 50), 9, grid, &[]);
        assert!(matches!(result, Err(MazeError::InvalidDimensions { .. })));
        assert_eq!(engine.grid().cloned(), before);
    }
}
