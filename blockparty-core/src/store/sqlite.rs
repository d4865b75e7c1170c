//! SQLite-backed store implementation.
//!
//! Events, users, interactions, and RSVPs live in ordinary tables;
//! embeddings and taste vectors are bincode blobs so the fixed-width
//! float payloads round-trip exactly. Popularity and trust mutation uses
//! single-statement `UPDATE ... SET x = x + ?` increments, which SQLite
//! serialises, so concurrent feedback never loses updates.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Mutex, MutexGuard},
};

use bincode::Options;
use chrono::{DateTime, TimeZone, Utc};
use geo::Coord;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::{
    AgeRestriction, Embedding, Event, EventLocation, EventType, Interaction, InteractionAction,
    Rsvp, TimeWindow, User,
};

use super::{EventStore, InteractionStore, StoreError, UserStore};

/// Kilometres per degree of latitude.
const KM_PER_DEG_LAT: f64 = 110.574;
/// Kilometres per degree of longitude at the equator.
const KM_PER_DEG_LNG: f64 = 111.320;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    start_time INTEGER NOT NULL,
    end_time INTEGER,
    lat REAL,
    lng REAL,
    venue TEXT,
    address TEXT,
    neighbourhood TEXT,
    vibes TEXT NOT NULL DEFAULT '[]',
    event_type TEXT NOT NULL,
    capacity INTEGER,
    age_restriction TEXT,
    popularity REAL NOT NULL DEFAULT 0,
    trust REAL NOT NULL DEFAULT 0,
    host_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_time);
CREATE INDEX IF NOT EXISTS idx_events_lat_lng ON events(lat, lng);
CREATE TABLE IF NOT EXISTS event_embeddings (
    event_id TEXT PRIMARY KEY,
    vector BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    vibe_prefs TEXT NOT NULL DEFAULT '[]',
    taste BLOB,
    trust REAL NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    action TEXT NOT NULL,
    dwell_ms INTEGER,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_interactions_user ON interactions(user_id);
CREATE TABLE IF NOT EXISTS rsvps (
    user_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (user_id, event_id)
);
";

const EVENT_COLUMNS: &str = "id, title, description, start_time, end_time, lat, lng, venue, \
     address, neighbourhood, vibes, event_type, capacity, age_restriction, popularity, trust, \
     host_id";

/// Bincode options used for embedding and taste-vector blobs.
fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new()
}

/// Errors raised when opening a [`SqliteStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Opening the `SQLite` database failed.
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Requested database path.
        path: PathBuf,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the schema failed.
    #[error("failed to create schema")]
    CreateSchema {
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// The connection mutex was poisoned by a panicking writer.
#[derive(Debug, Error)]
#[error("connection lock poisoned")]
struct LockPoisoned;

/// Store backed by a single `SQLite` database file.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the supplied path, creating the
    /// schema when missing.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteStoreError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Open an in-memory store, used by tests and demos.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when schema creation fails.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| {
            SqliteStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            }
        })?;
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteStoreError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Backend {
            operation,
            source: Box::new(LockPoisoned),
        })
    }
}

fn backend(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |source| StoreError::Backend {
        operation,
        source: Box::new(source),
    }
}

fn decode_timestamp(id: &str, raw: i64) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_opt(raw, 0)
        .single()
        .ok_or_else(|| StoreError::Decode {
            entity: "timestamp",
            id: id.to_owned(),
            source: format!("{raw} is not a valid unix timestamp").into(),
        })
}

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<Event, rusqlite::Error> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let description: String = row.get(2)?;
    let start_raw: i64 = row.get(3)?;
    let end_raw: Option<i64> = row.get(4)?;
    let lat: Option<f64> = row.get(5)?;
    let lng: Option<f64> = row.get(6)?;
    let venue: Option<String> = row.get(7)?;
    let address: Option<String> = row.get(8)?;
    let neighbourhood: Option<String> = row.get(9)?;
    let vibes_json: String = row.get(10)?;
    let event_type_raw: String = row.get(11)?;
    let capacity: Option<u32> = row.get(12)?;
    let age_raw: Option<String> = row.get(13)?;
    let popularity: f32 = row.get(14)?;
    let trust: f32 = row.get(15)?;
    let host_id: String = row.get(16)?;

    let column_error = |index: usize, message: String| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            message.into(),
        )
    };

    let start_time = Utc
        .timestamp_opt(start_raw, 0)
        .single()
        .ok_or_else(|| column_error(3, format!("invalid start timestamp {start_raw}")))?;
    let end_time = match end_raw {
        Some(raw) => Some(
            Utc.timestamp_opt(raw, 0)
                .single()
                .ok_or_else(|| column_error(4, format!("invalid end timestamp {raw}")))?,
        ),
        None => None,
    };
    let vibes: Vec<String> = serde_json::from_str(&vibes_json)
        .map_err(|err| column_error(10, format!("invalid vibes payload: {err}")))?;
    let event_type = EventType::from_str(&event_type_raw)
        .map_err(|err| column_error(11, err.to_string()))?;
    let age_restriction = match age_raw {
        Some(raw) => {
            Some(AgeRestriction::from_str(&raw).map_err(|err| column_error(13, err.to_string()))?)
        }
        None => None,
    };
    let coord = match (lat, lng) {
        (Some(y), Some(x)) => Some(Coord { x, y }),
        _ => None,
    };

    Ok(Event {
        id,
        title,
        description,
        start_time,
        end_time,
        location: EventLocation {
            coord,
            venue,
            address,
            neighbourhood,
        },
        vibes,
        event_type,
        capacity,
        age_restriction,
        popularity_score: popularity,
        trust_score: trust,
        host_id,
    })
}

impl EventStore for SqliteStore {
    fn event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let connection = self.lock("query event")?;
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
        connection
            .query_row(&query, params![id], row_to_event)
            .optional()
            .map_err(backend("query event"))
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "bounding-box prefilter converts kilometres to degrees"
    )]
    fn events_near(
        &self,
        center: Coord<f64>,
        radius_km: f64,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<Event>, StoreError> {
        let d_lat = radius_km / KM_PER_DEG_LAT;
        let d_lng = radius_km / (KM_PER_DEG_LNG * center.y.to_radians().cos().abs().max(1e-6));
        let (lat_lo, lat_hi) = (center.y - d_lat, center.y + d_lat);
        let (lng_lo, lng_hi) = (center.x - d_lng, center.x + d_lng);

        let connection = self.lock("query events near")?;
        let mut events = Vec::new();
        if let Some(window) = window {
            let query = format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE lat BETWEEN ?1 AND ?2 AND lng BETWEEN ?3 AND ?4
                   AND start_time BETWEEN ?5 AND ?6
                 ORDER BY start_time"
            );
            let mut statement = connection
                .prepare(&query)
                .map_err(backend("prepare events near"))?;
            let rows = statement
                .query_map(
                    params![
                        lat_lo,
                        lat_hi,
                        lng_lo,
                        lng_hi,
                        window.start.timestamp(),
                        window.end.timestamp()
                    ],
                    row_to_event,
                )
                .map_err(backend("query events near"))?;
            for row in rows {
                events.push(row.map_err(backend("read event row"))?);
            }
        } else {
            let query = format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE lat BETWEEN ?1 AND ?2 AND lng BETWEEN ?3 AND ?4
                 ORDER BY start_time"
            );
            let mut statement = connection
                .prepare(&query)
                .map_err(backend("prepare events near"))?;
            let rows = statement
                .query_map(params![lat_lo, lat_hi, lng_lo, lng_hi], row_to_event)
                .map_err(backend("query events near"))?;
            for row in rows {
                events.push(row.map_err(backend("read event row"))?);
            }
        }
        Ok(events)
    }

    fn events_in_window(&self, window: &TimeWindow) -> Result<Vec<Event>, StoreError> {
        let connection = self.lock("query events in window")?;
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE start_time BETWEEN ?1 AND ?2
             ORDER BY start_time"
        );
        let mut statement = connection
            .prepare(&query)
            .map_err(backend("prepare events in window"))?;
        let rows = statement
            .query_map(
                params![window.start.timestamp(), window.end.timestamp()],
                row_to_event,
            )
            .map_err(backend("query events in window"))?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(backend("read event row"))?);
        }
        Ok(events)
    }

    fn upsert_event(&self, event: &Event, embedding: &Embedding) -> Result<(), StoreError> {
        let vibes_json = serde_json::to_string(&event.vibes).map_err(|source| {
            StoreError::Decode {
                entity: "vibes",
                id: event.id.clone(),
                source: Box::new(source),
            }
        })?;
        let vector = bincode_options()
            .serialize(embedding)
            .map_err(|source| StoreError::Decode {
                entity: "embedding",
                id: event.id.clone(),
                source: Box::new(source),
            })?;

        let connection = self.lock("upsert event")?;
        connection
            .execute(
                "INSERT OR REPLACE INTO events
                 (id, title, description, start_time, end_time, lat, lng, venue, address,
                  neighbourhood, vibes, event_type, capacity, age_restriction, popularity,
                  trust, host_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    event.id,
                    event.title,
                    event.description,
                    event.start_time.timestamp(),
                    event.end_time.map(|t| t.timestamp()),
                    event.location.coord.map(|c| c.y),
                    event.location.coord.map(|c| c.x),
                    event.location.venue,
                    event.location.address,
                    event.location.neighbourhood,
                    vibes_json,
                    event.event_type.as_str(),
                    event.capacity,
                    event.age_restriction.map(AgeRestriction::as_str),
                    event.popularity_score,
                    event.trust_score,
                    event.host_id,
                ],
            )
            .map_err(backend("upsert event"))?;
        connection
            .execute(
                "INSERT OR REPLACE INTO event_embeddings (event_id, vector) VALUES (?1, ?2)",
                params![event.id, vector],
            )
            .map_err(backend("upsert embedding"))?;
        Ok(())
    }

    fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        let connection = self.lock("delete event")?;
        let deleted = connection
            .execute("DELETE FROM events WHERE id = ?1", params![id])
            .map_err(backend("delete event"))?;
        if deleted == 0 {
            return Err(StoreError::EventNotFound { id: id.to_owned() });
        }
        connection
            .execute(
                "DELETE FROM event_embeddings WHERE event_id = ?1",
                params![id],
            )
            .map_err(backend("delete embedding"))?;
        Ok(())
    }

    fn embedding(&self, event_id: &str) -> Result<Option<Embedding>, StoreError> {
        let connection = self.lock("query embedding")?;
        let blob: Option<Vec<u8>> = connection
            .query_row(
                "SELECT vector FROM event_embeddings WHERE event_id = ?1",
                params![event_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend("query embedding"))?;
        blob.map(|bytes| {
            bincode_options()
                .deserialize(&bytes)
                .map_err(|source| StoreError::Decode {
                    entity: "embedding",
                    id: event_id.to_owned(),
                    source: Box::new(source),
                })
        })
        .transpose()
    }
}

impl UserStore for SqliteStore {
    fn user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let connection = self.lock("query user")?;
        let row: Option<(String, String, String, Option<Vec<u8>>, f32)> = connection
            .query_row(
                "SELECT id, display_name, vibe_prefs, taste, trust FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()
            .map_err(backend("query user"))?;

        row.map(|(user_id, display_name, prefs_json, taste_blob, trust)| {
            let vibe_prefs: Vec<String> =
                serde_json::from_str(&prefs_json).map_err(|source| StoreError::Decode {
                    entity: "vibe preferences",
                    id: user_id.clone(),
                    source: Box::new(source),
                })?;
            let taste_vector: Vec<f32> = match taste_blob {
                Some(bytes) => bincode_options().deserialize(&bytes).map_err(|source| {
                    StoreError::Decode {
                        entity: "taste vector",
                        id: user_id.clone(),
                        source: Box::new(source),
                    }
                })?,
                None => Vec::new(),
            };
            Ok(User {
                id: user_id,
                display_name,
                vibe_prefs,
                taste_vector,
                trust_score: trust,
            })
        })
        .transpose()
    }

    fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        let prefs_json =
            serde_json::to_string(&user.vibe_prefs).map_err(|source| StoreError::Decode {
                entity: "vibe preferences",
                id: user.id.clone(),
                source: Box::new(source),
            })?;
        let taste_blob = if user.taste_vector.is_empty() {
            None
        } else {
            Some(bincode_options().serialize(&user.taste_vector).map_err(
                |source| StoreError::Decode {
                    entity: "taste vector",
                    id: user.id.clone(),
                    source: Box::new(source),
                },
            )?)
        };
        let connection = self.lock("upsert user")?;
        connection
            .execute(
                "INSERT OR REPLACE INTO users (id, display_name, vibe_prefs, taste, trust)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.display_name,
                    prefs_json,
                    taste_blob,
                    user.trust_score
                ],
            )
            .map_err(backend("upsert user"))?;
        Ok(())
    }

    fn save_taste_vector(&self, user_id: &str, taste: &[f32]) -> Result<(), StoreError> {
        let blob = bincode_options()
            .serialize(taste)
            .map_err(|source| StoreError::Decode {
                entity: "taste vector",
                id: user_id.to_owned(),
                source: Box::new(source),
            })?;
        let connection = self.lock("save taste vector")?;
        let updated = connection
            .execute(
                "UPDATE users SET taste = ?1 WHERE id = ?2",
                params![blob, user_id],
            )
            .map_err(backend("save taste vector"))?;
        if updated == 0 {
            return Err(StoreError::UserNotFound {
                id: user_id.to_owned(),
            });
        }
        Ok(())
    }
}

impl InteractionStore for SqliteStore {
    fn record_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        let connection = self.lock("record interaction")?;
        connection
            .execute(
                "INSERT INTO interactions (user_id, event_id, action, dwell_ms, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    interaction.user_id,
                    interaction.event_id,
                    interaction.action.as_str(),
                    interaction.dwell_ms,
                    interaction.created_at.timestamp(),
                ],
            )
            .map_err(backend("record interaction"))?;
        Ok(())
    }

    fn interactions_for(&self, user_id: &str) -> Result<Vec<Interaction>, StoreError> {
        let connection = self.lock("query interactions")?;
        let mut statement = connection
            .prepare(
                "SELECT user_id, event_id, action, dwell_ms, created_at
                 FROM interactions WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(backend("prepare interactions"))?;
        let rows = statement
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<u32>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(backend("query interactions"))?;

        let mut interactions = Vec::new();
        for row in rows {
            let (user, event_id, action_raw, dwell_ms, created_raw) =
                row.map_err(backend("read interaction row"))?;
            let action =
                InteractionAction::from_str(&action_raw).map_err(|source| StoreError::Decode {
                    entity: "interaction action",
                    id: event_id.clone(),
                    source: Box::new(source),
                })?;
            let created_at = decode_timestamp(&event_id, created_raw)?;
            interactions.push(Interaction {
                user_id: user,
                event_id,
                action,
                dwell_ms,
                created_at,
            });
        }
        Ok(interactions)
    }

    fn add_popularity(&self, event_id: &str, delta: f32) -> Result<(), StoreError> {
        let connection = self.lock("add popularity")?;
        let updated = connection
            .execute(
                "UPDATE events SET popularity = popularity + ?1 WHERE id = ?2",
                params![delta, event_id],
            )
            .map_err(backend("add popularity"))?;
        if updated == 0 {
            return Err(StoreError::EventNotFound {
                id: event_id.to_owned(),
            });
        }
        Ok(())
    }

    fn raise_host_trust(&self, host_id: &str, delta: f32) -> Result<(), StoreError> {
        if delta <= 0.0 {
            return Ok(());
        }
        let connection = self.lock("raise host trust")?;
        let updated = connection
            .execute(
                "UPDATE users SET trust = MIN(1.0, trust + ?1) WHERE id = ?2",
                params![delta, host_id],
            )
            .map_err(backend("raise host trust"))?;
        if updated == 0 {
            return Err(StoreError::UserNotFound {
                id: host_id.to_owned(),
            });
        }
        Ok(())
    }

    fn rsvp_count(&self, event_id: &str) -> Result<u64, StoreError> {
        let connection = self.lock("count rsvps")?;
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM rsvps WHERE event_id = ?1",
                params![event_id],
                |row| row.get(0),
            )
            .map_err(backend("count rsvps"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn upsert_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError> {
        let connection = self.lock("upsert rsvp")?;
        connection
            .execute(
                "INSERT OR REPLACE INTO rsvps (user_id, event_id, status) VALUES (?1, ?2, ?3)",
                params![rsvp.user_id, rsvp.event_id, rsvp.status.as_str()],
            )
            .map_err(backend("upsert rsvp"))?;
        Ok(())
    }

    fn cancel_rsvp(&self, user_id: &str, event_id: &str) -> Result<(), StoreError> {
        let connection = self.lock("cancel rsvp")?;
        connection
            .execute(
                "DELETE FROM rsvps WHERE user_id = ?1 AND event_id = ?2",
                params![user_id, event_id],
            )
            .map_err(backend("cancel rsvp"))?;
        Ok(())
    }
}
