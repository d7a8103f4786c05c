/*
 * Persistence Module
 *
 * Agent lists are saved as a JSON document holding one record per agent:
 *
 *   { "agents": [ { "position": [x, y], "velocity": [vx, vy] }, ... ] }
 *
 * Saves made from the viewer go into a directory of timestamped files; the
 * newest one is the one that gets loaded back.
 */

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Local;
use nannou::prelude::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PersistenceError;

pub const DEFAULT_SAVE_DIRECTORY: &str = "simulation-saves";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

impl AgentRecord {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
        }
    }

    pub fn position(&self) -> Vec2 {
        vec2(self.position[0], self.position[1])
    }

    pub fn velocity(&self) -> Vec2 {
        vec2(self.velocity[0], self.velocity[1])
    }
}

#[derive(Serialize, Deserialize)]
struct SaveFile {
    agents: Vec<AgentRecord>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn save_records(path: &Path, records: &[AgentRecord]) -> Result<(), PersistenceError> {
    let file = File::create(path).map_err(io_error(path))?;
    let save = SaveFile {
        agents: records.to_vec(),
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &save)?;
    Ok(())
}

pub fn load_records(path: &Path) -> Result<Vec<AgentRecord>, PersistenceError> {
    let file = File::open(path).map_err(io_error(path))?;
    let save: SaveFile = serde_json::from_reader(BufReader::new(file))?;
    Ok(save.agents)
}

// A directory of timestamped save files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDirectory {
    root: PathBuf,
}

impl Default for SaveDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DIRECTORY)
    }
}

impl SaveDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Write the records to a new file named after the current local time
    pub fn write_new(&self, records: &[AgentRecord]) -> Result<PathBuf, PersistenceError> {
        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;

        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let mut path = self.root.join(format!("{stamp}.json"));
        // Two saves in the same second get a counter; "_1" sorts after "."
        let mut counter = 1;
        while path.exists() {
            path = self.root.join(format!("{stamp}_{counter}.json"));
            counter += 1;
        }

        save_records(&path, records)?;
        info!(path = %path.display(), agents = records.len(), "saved simulation");
        Ok(path)
    }

    // The save file whose name sorts last, which is the newest one
    pub fn latest(&self) -> Result<PathBuf, PersistenceError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NoSaves(self.root.clone()))
            }
            Err(err) => return Err(io_error(&self.root)(err)),
        };

        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .max()
            .ok_or_else(|| PersistenceError::NoSaves(self.root.clone()))
    }

    pub fn load_latest(&self) -> Result<Vec<AgentRecord>, PersistenceError> {
        let path = self.latest()?;
        let records = load_records(&path)?;
        info!(path = %path.display(), agents = records.len(), "loaded simulation");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AgentRecord> {
        vec![
            AgentRecord::new(vec2(1.5, 2.25), vec2(-3.0, 4.0)),
            AgentRecord::new(vec2(879.9, 0.0), vec2(0.0, -300.0)),
        ]
    }

    #[test]
    fn records_survive_a_file_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("agents.json");
        save_records(&path, &sample()).expect("save");
        assert_eq!(load_records(&path).expect("load"), sample());
    }

    #[test]
    fn file_format_is_an_agents_list() {
        let json = r#"{ "agents": [ { "position": [10.0, 20.0], "velocity": [1.0, -1.0] } ] }"#;
        let save: SaveFile = serde_json::from_str(json).expect("parse");
        assert_eq!(save.agents[0].position(), vec2(10.0, 20.0));
        assert_eq!(save.agents[0].velocity(), vec2(1.0, -1.0));
    }

    #[test]
    fn missing_and_corrupt_files_are_errors() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_records(&missing), Err(PersistenceError::Io { .. })));

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ \"agents\": [ 1, 2").expect("write");
        assert!(matches!(load_records(&corrupt), Err(PersistenceError::Format(_))));
    }

    #[test]
    fn save_directory_loads_the_newest_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let saves = SaveDirectory::new(dir.path().join("saves"));
        assert!(matches!(saves.latest(), Err(PersistenceError::NoSaves(_))));

        let first = saves.write_new(&sample()[..1]).expect("first save");
        let second = saves.write_new(&sample()).expect("second save");
        assert_ne!(first, second);
        assert_eq!(saves.latest().expect("latest"), second);
        assert_eq!(saves.load_latest().expect("load"), sample());
    }
}
