use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Identifies one timetable occurrence of a lecture. Sessions are opened
/// against a key, and at most one session may be live per key at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LectureKey {
    pub branch: String,
    pub semester: u8,
    pub day: String,
    pub slot: u8,
    pub subject: String,
}

/// Boundary to the timetable collaborator. The attendance core only needs to
/// know whether a lecture slot exists; timetable CRUD lives elsewhere.
pub trait TimetableDirectory: Send + Sync {
    fn contains(&self, key: &LectureKey) -> bool;
}

/// Timetable snapshot held in memory, loadable from a JSON array of
/// `LectureKey` entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTimetable {
    entries: HashSet<LectureKey>,
}

impl InMemoryTimetable {
    pub fn new(entries: impl IntoIterator<Item = LectureKey>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<LectureKey> = serde_json::from_str(&raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self::new(entries))
    }

    pub fn insert(&mut self, key: LectureKey) {
        self.entries.insert(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TimetableDirectory for InMemoryTimetable {
    fn contains(&self, key: &LectureKey) -> bool {
        self.entries.contains(key)
    }
}
