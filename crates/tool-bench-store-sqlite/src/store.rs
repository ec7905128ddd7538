// crates/tool-bench-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Experiment Store
// Description: Durable ExperimentStore backed by SQLite WAL.
// Purpose: Persist experiments and ordered iteration results.
// Dependencies: rusqlite, serde, serde_json, thiserror, tool-bench-core
// ============================================================================

//! ## Overview
//! Experiments live in an `experiments` table keyed by identifier; results
//! live in `iteration_results` keyed by `(experiment_id, iteration_index)`
//! with a foreign key to their owner. Every write runs in its own
//! transaction, so each result is durable as soon as it is appended. Reads
//! always order results by index, never by insertion order.
//!
//! Stored rows are treated as untrusted on the way out: unparsable argument
//! JSON, unknown status labels, and out-of-range integers surface as
//! [`SqliteStoreError::Corrupt`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use tool_bench_core::Experiment;
use tool_bench_core::ExperimentId;
use tool_bench_core::ExperimentStore;
use tool_bench_core::ExperimentSummary;
use tool_bench_core::IterationResult;
use tool_bench_core::IterationStatus;
use tool_bench_core::StoreError;
use tool_bench_core::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms) for `SQLite` connections.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default number of read connections.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` experiment store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `read_pool_size` is greater than zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    pub sync_mode: SqliteSyncMode,
    /// Number of read connections.
    pub read_pool_size: usize,
}

impl SqliteStoreConfig {
    /// Creates a configuration with default tuning for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: DEFAULT_READ_POOL_SIZE,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored rows fail integrity checks.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Experiment identifier already exists.
    #[error("sqlite store duplicate experiment: {0}")]
    DuplicateId(ExperimentId),
    /// Result references a missing experiment.
    #[error("sqlite store unknown experiment: {0}")]
    UnknownExperiment(ExperimentId),
    /// Result index already written.
    #[error("sqlite store duplicate result: {experiment_id} index {index}")]
    DuplicateResult {
        /// Owning experiment.
        experiment_id: ExperimentId,
        /// Conflicting index.
        index: u32,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::DuplicateId(id) => Self::DuplicateId(id),
            SqliteStoreError::UnknownExperiment(id) => Self::UnknownExperiment(id),
            SqliteStoreError::DuplicateResult {
                experiment_id,
                index,
            } => Self::DuplicateResult {
                experiment_id,
                index,
            },
        }
    }
}

/// Maps a rusqlite error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err adapter.")]
fn db_err(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed experiment store.
///
/// # Invariants
/// - All writes are serialized through the writer mutex.
/// - Each write commits in its own transaction.
#[derive(Clone)]
pub struct SqliteExperimentStore {
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read connection pool.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
}

impl SqliteExperimentStore {
    /// Opens (and if needed creates) an `SQLite` experiment store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the schema version is unsupported.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        if config.read_pool_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "read_pool_size must be greater than zero".to_string(),
            ));
        }
        ensure_parent_dir(&config.path)?;
        let mut write_connection = open_connection(config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(config)?));
        }
        Ok(Self {
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns the next read connection using round-robin selection.
    fn read_connection(&self) -> &Mutex<Connection> {
        let len = self.read_connections.len();
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        &self.read_connections[index]
    }

    /// Runs a closure against a pooled read connection.
    fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let guard = self
            .read_connection()
            .lock()
            .map_err(|_| SqliteStoreError::Db("read mutex poisoned".to_string()))?;
        f(&guard)
    }

    /// Runs a closure inside a write transaction and commits it.
    fn with_writer<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut guard = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("write mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(db_err)?;
        let value = f(&tx)?;
        tx.commit().map_err(db_err)?;
        drop(guard);
        Ok(value)
    }

    /// Inserts a new experiment row.
    fn insert_experiment(&self, experiment: &Experiment) -> Result<(), SqliteStoreError> {
        let arguments_json = serde_json::to_string(&experiment.arguments)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        self.with_writer(|tx| {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM experiments WHERE id = ?1",
                    params![experiment.id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_err)?;
            if exists.is_some() {
                return Err(SqliteStoreError::DuplicateId(experiment.id.clone()));
            }
            tx.execute(
                "INSERT INTO experiments (id, endpoint_url, tool_name, arguments_json, \
                 iteration_count, created_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    experiment.id.as_str(),
                    experiment.endpoint_url,
                    experiment.tool_name,
                    arguments_json,
                    i64::from(experiment.iteration_count),
                    experiment.created_at.unix_millis(),
                ],
            )
            .map_err(db_err)?;
            Ok(())
        })
    }

    /// Inserts one iteration result row.
    fn insert_result(&self, result: &IterationResult) -> Result<(), SqliteStoreError> {
        if !result.duration_millis.is_finite() || result.duration_millis < 0.0 {
            return Err(SqliteStoreError::Invalid(
                "duration must be a non-negative finite number".to_string(),
            ));
        }
        self.with_writer(|tx| {
            let iteration_count: Option<i64> = tx
                .query_row(
                    "SELECT iteration_count FROM experiments WHERE id = ?1",
                    params![result.experiment_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_err)?;
            let Some(iteration_count) = iteration_count else {
                return Err(SqliteStoreError::UnknownExperiment(result.experiment_id.clone()));
            };
            if i64::from(result.index) >= iteration_count {
                return Err(SqliteStoreError::Invalid(format!(
                    "result index {} exceeds iteration count {iteration_count}",
                    result.index
                )));
            }
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM iteration_results WHERE experiment_id = ?1 AND \
                     iteration_index = ?2",
                    params![result.experiment_id.as_str(), i64::from(result.index)],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_err)?;
            if exists.is_some() {
                return Err(SqliteStoreError::DuplicateResult {
                    experiment_id: result.experiment_id.clone(),
                    index: result.index,
                });
            }
            tx.execute(
                "INSERT INTO iteration_results (experiment_id, iteration_index, duration_ms, \
                 status, response_text) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    result.experiment_id.as_str(),
                    i64::from(result.index),
                    result.duration_millis,
                    result.status.as_str(),
                    result.response_text,
                ],
            )
            .map_err(db_err)?;
            Ok(())
        })
    }

    /// Loads an experiment row.
    fn load_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>, SqliteStoreError> {
        self.with_reader(|connection| {
            let row = connection
                .query_row(
                    "SELECT id, endpoint_url, tool_name, arguments_json, iteration_count, \
                     created_at_ms FROM experiments WHERE id = ?1",
                    params![id.as_str()],
                    map_experiment_row,
                )
                .optional()
                .map_err(db_err)?;
            row.map(ExperimentRow::into_experiment).transpose()
        })
    }

    /// Loads all result rows for an experiment in index order.
    fn load_results(&self, id: &ExperimentId) -> Result<Vec<IterationResult>, SqliteStoreError> {
        self.with_reader(|connection| {
            let mut stmt = connection
                .prepare(
                    "SELECT iteration_index, duration_ms, status, response_text FROM \
                     iteration_results WHERE experiment_id = ?1 ORDER BY iteration_index ASC",
                )
                .map_err(db_err)?;
            let rows = stmt
                .query_map(params![id.as_str()], |row| {
                    let index: i64 = row.get(0)?;
                    let duration_ms: f64 = row.get(1)?;
                    let status: String = row.get(2)?;
                    let response_text: String = row.get(3)?;
                    Ok((index, duration_ms, status, response_text))
                })
                .map_err(db_err)?;
            let mut results = Vec::new();
            for row in rows {
                let (index, duration_millis, status, response_text) = row.map_err(db_err)?;
                let index = u32::try_from(index).map_err(|_| {
                    SqliteStoreError::Corrupt(format!("iteration index out of range: {index}"))
                })?;
                let status = IterationStatus::from_label(&status).ok_or_else(|| {
                    SqliteStoreError::Corrupt(format!("unknown iteration status: {status}"))
                })?;
                results.push(IterationResult {
                    experiment_id: id.clone(),
                    index,
                    duration_millis,
                    status,
                    response_text,
                });
            }
            Ok(results)
        })
    }

    /// Lists experiment summaries, newest first.
    fn load_summaries(&self) -> Result<Vec<ExperimentSummary>, SqliteStoreError> {
        self.with_reader(|connection| {
            let mut stmt = connection
                .prepare(
                    "SELECT experiments.id, experiments.endpoint_url, experiments.tool_name, \
                     experiments.iteration_count, experiments.created_at_ms, \
                     COUNT(iteration_results.iteration_index)
                     FROM experiments
                     LEFT JOIN iteration_results
                       ON iteration_results.experiment_id = experiments.id
                     GROUP BY experiments.id
                     ORDER BY experiments.created_at_ms DESC, experiments.id ASC",
                )
                .map_err(db_err)?;
            let rows = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    let endpoint_url: String = row.get(1)?;
                    let tool_name: String = row.get(2)?;
                    let iteration_count: i64 = row.get(3)?;
                    let created_at_ms: i64 = row.get(4)?;
                    let recorded: i64 = row.get(5)?;
                    Ok((id, endpoint_url, tool_name, iteration_count, created_at_ms, recorded))
                })
                .map_err(db_err)?;
            let mut summaries = Vec::new();
            for row in rows {
                let (id, endpoint_url, tool_name, iteration_count, created_at_ms, recorded) =
                    row.map_err(db_err)?;
                summaries.push(ExperimentSummary {
                    id: ExperimentId::new(id),
                    endpoint_url,
                    tool_name,
                    iteration_count: to_u32(iteration_count, "iteration count")?,
                    recorded_results: to_u32(recorded, "result count")?,
                    created_at: Timestamp::from_unix_millis(created_at_ms),
                });
            }
            Ok(summaries)
        })
    }

    /// Verifies both the read pool and the writer can execute a statement.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        self.with_reader(|connection| {
            connection.execute_batch("SELECT 1").map_err(db_err)
        })?;
        let guard = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("write mutex poisoned".to_string()))?;
        guard.execute_batch("SELECT 1").map_err(db_err)
    }
}

impl ExperimentStore for SqliteExperimentStore {
    fn create_experiment(&self, experiment: &Experiment) -> Result<(), StoreError> {
        self.insert_experiment(experiment).map_err(StoreError::from)
    }

    fn append_result(&self, result: &IterationResult) -> Result<(), StoreError> {
        self.insert_result(result).map_err(StoreError::from)
    }

    fn get_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>, StoreError> {
        self.load_experiment(id).map_err(StoreError::from)
    }

    fn get_results(&self, id: &ExperimentId) -> Result<Vec<IterationResult>, StoreError> {
        self.load_results(id).map_err(StoreError::from)
    }

    fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, StoreError> {
        self.load_summaries().map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.check_connection().map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Raw experiment row prior to validation.
struct ExperimentRow {
    /// Identifier column.
    id: String,
    /// Endpoint column.
    endpoint_url: String,
    /// Tool name column.
    tool_name: String,
    /// Serialized arguments column.
    arguments_json: String,
    /// Iteration count column.
    iteration_count: i64,
    /// Creation time column (unix ms).
    created_at_ms: i64,
}

impl ExperimentRow {
    /// Validates the row and converts it into an experiment.
    fn into_experiment(self) -> Result<Experiment, SqliteStoreError> {
        let arguments = serde_json::from_str(&self.arguments_json).map_err(|err| {
            SqliteStoreError::Corrupt(format!("experiment {} arguments: {err}", self.id))
        })?;
        Ok(Experiment {
            iteration_count: to_u32(self.iteration_count, "iteration count")?,
            id: ExperimentId::new(self.id),
            endpoint_url: self.endpoint_url,
            tool_name: self.tool_name,
            arguments,
            created_at: Timestamp::from_unix_millis(self.created_at_ms),
        })
    }
}

/// Maps a query row into an experiment row.
fn map_experiment_row(row: &Row<'_>) -> rusqlite::Result<ExperimentRow> {
    Ok(ExperimentRow {
        id: row.get(0)?,
        endpoint_url: row.get(1)?,
        tool_name: row.get(2)?,
        arguments_json: row.get(3)?,
        iteration_count: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}

/// Converts a stored integer into `u32`, flagging corruption when out of range.
fn to_u32(value: i64, label: &str) -> Result<u32, SqliteStoreError> {
    u32::try_from(value)
        .map_err(|_| SqliteStoreError::Corrupt(format!("{label} out of range: {value}")))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_err)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_err)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_err)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_err)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_err)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_err)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_err)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_err)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_err)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS experiments (
                    id TEXT PRIMARY KEY NOT NULL,
                    endpoint_url TEXT NOT NULL,
                    tool_name TEXT NOT NULL,
                    arguments_json TEXT NOT NULL,
                    iteration_count INTEGER NOT NULL,
                    created_at_ms INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS iteration_results (
                    experiment_id TEXT NOT NULL,
                    iteration_index INTEGER NOT NULL,
                    duration_ms REAL NOT NULL,
                    status TEXT NOT NULL,
                    response_text TEXT NOT NULL,
                    PRIMARY KEY (experiment_id, iteration_index),
                    FOREIGN KEY (experiment_id) REFERENCES experiments(id)
                );
                CREATE INDEX IF NOT EXISTS idx_experiments_created_at
                    ON experiments (created_at_ms);",
            )
            .map_err(db_err)?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(other) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version {other} (expected {SCHEMA_VERSION})"
            )));
        }
    }
    tx.commit().map_err(db_err)?;
    Ok(())
}
