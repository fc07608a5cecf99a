//! Table persistence in JSON, gzip-compressed JSON or MessagePack

use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{
    Error, Result,
    config::LearnerConfig,
    q_learning::learner::{DualQLearner, PositionPreference},
    types::{ActionValues, CanonicalKey},
};

/// Decimal places used when deciding whether a vector equals the default.
const COMPRESSION_PRECISION: f64 = 1e6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingStats {
    pub episodes_trained: u64,
    pub total_steps: u64,
    pub final_alpha: f64,
    pub final_epsilon: f64,
    pub experience_buffer_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedAnalytics {
    pub strategic_preferences: BTreeMap<String, PositionPreference>,
    pub move_patterns: HashMap<String, u64>,
    pub training_stats: TrainingStats,
}

/// On-disk form of a learner: one combined vector per canonical key.
///
/// Tables A and B are merged before saving, so a reloaded learner starts
/// with two identical tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTable {
    #[serde(default = "SavedTable::current_version")]
    pub version: u32,
    pub q_table: BTreeMap<String, ActionValues>,
    #[serde(default)]
    pub analytics: Option<SavedAnalytics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    GzipJson,
    MessagePack,
}

impl TableFormat {
    /// `.msgpack`/`.mp` select MessagePack, `.gz` compressed JSON; everything
    /// else is plain JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("msgpack") | Some("mp") => TableFormat::MessagePack,
            Some("gz") => TableFormat::GzipJson,
            _ => TableFormat::Json,
        }
    }
}

fn is_default_vector(values: &ActionValues) -> bool {
    values
        .iter()
        .all(|v| (v * COMPRESSION_PRECISION).round() == 0.0)
}

impl SavedTable {
    pub const VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::VERSION
    }

    /// Merge the learner's tables into one combined map.
    ///
    /// Keys whose rounded combined vector is all zeros are dropped: they read
    /// back identically as absent keys.
    pub fn from_learner(learner: &DualQLearner) -> Self {
        let mut q_table = BTreeMap::new();
        for key in learner.keys() {
            let combined = learner.value(key);
            if !is_default_vector(&combined) {
                q_table.insert(key.as_str().to_string(), combined);
            }
        }

        let analytics = SavedAnalytics {
            strategic_preferences: learner.strategic_preferences(),
            move_patterns: learner.move_frequency().clone(),
            training_stats: TrainingStats {
                episodes_trained: learner.episodes_trained(),
                total_steps: learner.total_steps(),
                final_alpha: learner.alpha(),
                final_epsilon: learner.epsilon(),
                experience_buffer_size: learner.buffer().len(),
            },
        };

        Self {
            version: Self::VERSION,
            q_table,
            analytics: Some(analytics),
        }
    }

    /// Build a learner with `config` and these values loaded into both tables.
    pub fn into_learner(self, config: LearnerConfig) -> Result<DualQLearner> {
        if self.version > Self::VERSION {
            return Err(Error::SerializationContext {
                operation: "restore table".to_string(),
                message: format!(
                    "unsupported format version {} (expected <= {})",
                    self.version,
                    Self::VERSION
                ),
            });
        }

        let mut entries = Vec::with_capacity(self.q_table.len());
        for (raw, values) in self.q_table {
            entries.push((CanonicalKey::parse(&raw)?, values));
        }

        let analytics = self.analytics.unwrap_or_default();
        let mut learner = DualQLearner::new(config);
        learner.restore(
            entries,
            analytics.training_stats.episodes_trained,
            analytics.training_stats.total_steps,
            analytics.move_patterns,
        );
        Ok(learner)
    }

    /// Write atomically: the payload goes to a sibling temp file which is
    /// renamed over `path` only after a successful flush.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let persistence = |message: String| Error::Persistence {
            path: path.to_path_buf(),
            message,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir).map_err(|e| persistence(e.to_string()))?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            match TableFormat::from_path(path) {
                TableFormat::Json => serde_json::to_writer_pretty(&mut writer, self)
                    .map_err(|e| persistence(e.to_string()))?,
                TableFormat::GzipJson => {
                    let mut encoder = GzEncoder::new(&mut writer, Compression::default());
                    serde_json::to_writer(&mut encoder, self)
                        .map_err(|e| persistence(e.to_string()))?;
                    encoder.finish().map_err(|e| persistence(e.to_string()))?;
                }
                TableFormat::MessagePack => rmp_serde::encode::write_named(&mut writer, self)
                    .map_err(|e| persistence(e.to_string()))?,
            }
            writer.flush().map_err(|e| persistence(e.to_string()))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| persistence(e.to_string()))?;
        temp.persist(path).map_err(|e| persistence(e.error.to_string()))?;
        Ok(())
    }

    /// Read a saved table. A bare key-to-vector map is accepted as a table
    /// without analytics.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let persistence = |message: String| Error::Persistence {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| persistence(e.to_string()))?;
        let reader = BufReader::new(file);

        match TableFormat::from_path(path) {
            TableFormat::MessagePack => {
                rmp_serde::decode::from_read(reader).map_err(|e| persistence(e.to_string()))
            }
            TableFormat::GzipJson => {
                Self::from_json_reader(GzDecoder::new(reader)).map_err(persistence)
            }
            TableFormat::Json => Self::from_json_reader(reader).map_err(persistence),
        }
    }

    fn from_json_reader<R: Read>(reader: R) -> std::result::Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_reader(reader).map_err(|e| e.to_string())?;
        if value.get("q_table").is_some() {
            serde_json::from_value(value).map_err(|e| e.to_string())
        } else {
            let q_table: BTreeMap<String, ActionValues> =
                serde_json::from_value(value).map_err(|e| e.to_string())?;
            Ok(Self {
                version: Self::VERSION,
                q_table,
                analytics: None,
            })
        }
    }
}

impl DualQLearner {
    /// Save the combined table and analytics to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let saved = SavedTable::from_learner(self);
        saved.save_to_file(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            states = saved.q_table.len(),
            total_states = self.keys().len(),
            episodes = self.episodes_trained(),
            steps = self.total_steps(),
            "saved table"
        );
        Ok(())
    }

    /// Load a learner from `path`.
    pub fn load<P: AsRef<Path>>(path: P, config: LearnerConfig) -> Result<Self> {
        let learner = SavedTable::load_from_file(path.as_ref())?.into_learner(config)?;
        info!(
            path = %path.as_ref().display(),
            states = learner.keys().len(),
            "loaded table"
        );
        Ok(learner)
    }

    /// Load a learner, falling back to an empty one when the file is missing
    /// or unreadable.
    pub fn load_or_empty<P: AsRef<Path>>(path: P, config: LearnerConfig) -> Self {
        match Self::load(path.as_ref(), config.clone()) {
            Ok(learner) => learner,
            Err(err) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %err,
                    "could not load table, starting empty"
                );
                DualQLearner::new(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::tictactoe::{GameState, canonicalize};

    fn trained() -> DualQLearner {
        let mut learner = DualQLearner::new(LearnerConfig::default()).with_seed(3);
        let mut state = GameState::new();
        for action in [4, 0, 8, 2] {
            let key = canonicalize(&state);
            let ctx = state.canonical_context();
            state.apply(action).unwrap();
            let next = canonicalize(&state);
            learner.record_move(&key, ctx.map_to_canonical(action));
            learner
                .observe(key, ctx.map_to_canonical(action), 1.5, next, false)
                .unwrap();
        }
        learner.finish_episode();
        learner
    }

    fn assert_round_trip(file_name: &str) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(file_name);
        let learner = trained();
        learner.save(&path).unwrap();

        let loaded = DualQLearner::load(&path, LearnerConfig::default()).unwrap();
        assert_eq!(loaded.episodes_trained(), learner.episodes_trained());
        assert_eq!(loaded.total_steps(), learner.total_steps());
        assert_eq!(loaded.move_frequency(), learner.move_frequency());
        for key in learner.keys() {
            let before = learner.value(key);
            let after = loaded.value(key);
            for (b, a) in before.iter().zip(after.iter()) {
                assert!((a - b).abs() < 1e-6, "{key}: {b} vs {a}");
            }
        }
        // Both tables hold the same values after a load.
        for key in loaded.keys() {
            assert_eq!(loaded.table_a().get(key), loaded.table_b().get(key));
        }
    }

    #[test]
    fn test_json_round_trip() {
        assert_round_trip("table.json");
    }

    #[test]
    fn test_msgpack_round_trip() {
        assert_round_trip("table.msgpack");
    }

    #[test]
    fn test_gzip_round_trip() {
        assert_round_trip("table.json.gz");
    }

    #[test]
    fn test_gzip_file_is_compressed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.json.gz");
        trained().save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["q_table"].is_object());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("t.json")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("t.json.gz")), TableFormat::GzipJson);
        assert_eq!(TableFormat::from_path(Path::new("t.msgpack")), TableFormat::MessagePack);
        assert_eq!(TableFormat::from_path(Path::new("table")), TableFormat::Json);
    }

    #[test]
    fn test_missing_analytics_reads_as_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bare.json");
        std::fs::write(
            &path,
            r#"{"[0, 0, 0, 0, 0, 0, 0, 0, 0]": [0, 0, 0, 0, 1.5, 0, 0, 0, 0]}"#,
        )
        .unwrap();
        let loaded = DualQLearner::load(&path, LearnerConfig::default()).unwrap();
        assert_eq!(loaded.episodes_trained(), 0);
        assert_eq!(loaded.total_steps(), 0);
        let key = canonicalize(&GameState::new());
        assert_eq!(loaded.value(&key)[4], 1.5);
    }

    #[test]
    fn test_zero_vectors_are_not_stored() {
        let mut learner = DualQLearner::new(LearnerConfig::default()).with_seed(3);
        let key = canonicalize(&GameState::new());
        let next = canonicalize(&GameState::new().with_action(4).unwrap());
        learner.observe(key, 4, 0.0, next, false).unwrap();
        let saved = SavedTable::from_learner(&learner);
        assert!(saved.q_table.is_empty());
        assert_eq!(learner.keys().len(), 1);
    }

    #[test]
    fn test_missing_file_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let learner =
            DualQLearner::load_or_empty(dir.path().join("nope.json"), LearnerConfig::default());
        assert_eq!(learner.keys().len(), 0);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            DualQLearner::load(&path, LearnerConfig::default()),
            Err(Error::Persistence { .. })
        ));
        let learner = DualQLearner::load_or_empty(&path, LearnerConfig::default());
        assert_eq!(learner.episodes_trained(), 0);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.json");
        trained().save(&path).unwrap();
        let before = std::fs::read(&path).unwrap();

        let missing_dir = dir.path().join("absent").join("table.json");
        assert!(trained().save(&missing_dir).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"q_table": {"nonsense": [0,0,0,0,0,0,0,0,0]}}"#).unwrap();
        assert!(matches!(
            DualQLearner::load(&path, LearnerConfig::default()),
            Err(Error::InvalidKey { .. })
        ));
    }
}
