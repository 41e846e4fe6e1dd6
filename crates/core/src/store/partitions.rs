//! Partition and entry operations.
//!
//! A [`Partition`] is a named container of request→response entries; the
//! engine keeps one for static assets and one for dynamic data per
//! deployment version. Entries are immutable once written except by
//! overwrite (last-write-wins) and die only with their partition or an
//! explicit clear.

use super::connection::CacheDb;
use crate::Error;
use crate::message::PartitionStatus;
use crate::request::RequestKey;
use crate::response::ResponseSnapshot;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// What a partition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionKind {
    StaticAssets,
    DynamicData,
}

impl PartitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionKind::StaticAssets => "static-assets",
            PartitionKind::DynamicData => "dynamic-data",
        }
    }
}

/// Handle onto one named partition of the store.
///
/// Cheap to clone; all operations go through the shared [`CacheDb`].
#[derive(Debug, Clone)]
pub struct Partition {
    db: CacheDb,
    name: String,
}

impl CacheDb {
    /// Open (or create) a named partition.
    ///
    /// Idempotent: re-opening an existing partition returns a handle to it
    /// without touching its entries or its recorded kind.
    pub async fn open_partition(&self, name: &str, kind: PartitionKind) -> Result<Partition, Error> {
        let partition = name.to_string();
        let kind = kind.as_str();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO partitions (name, kind, created_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(name) DO NOTHING",
                    params![partition, kind, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Partition { db: self.clone(), name: name.to_string() })
    }

    /// List the names of all existing partitions.
    pub async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Entry counts for every existing partition, ordered by name.
    pub async fn partition_status(&self) -> Result<Vec<PartitionStatus>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PartitionStatus>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT p.name, COUNT(e.key)
                     FROM partitions p LEFT JOIN entries e ON e.partition = p.name
                     GROUP BY p.name ORDER BY p.name",
                )?;
                let statuses = stmt
                    .query_map([], |row| {
                        Ok(PartitionStatus { name: row.get(0)?, entries: row.get::<_, i64>(1)? as u64 })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(statuses)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and (via cascade) all of its entries.
    ///
    /// Returns true if the partition existed.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

impl Partition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for a request.
    ///
    /// Returns None on a miss. Hits carry the write timestamp in
    /// `stored_at`.
    pub async fn match_entry(&self, request: &RequestKey) -> Result<Option<ResponseSnapshot>, Error> {
        let partition = self.name.clone();
        let key = request.cache_key();
        self.db
            .conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, stored_at
                     FROM entries WHERE partition = ?1 AND key = ?2",
                    params![partition, key],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                );

                match result {
                    Ok((status, headers_json, body, stored_at)) => {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json).unwrap_or_default();
                        Ok(Some(ResponseSnapshot { status, headers, body, stored_at: Some(stored_at) }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store a copy of a response under the request's key.
    ///
    /// Only successful (2xx) responses are persisted; anything else is
    /// refused and the call returns false. Overwrites race with
    /// last-write-wins semantics; the newest `stored_at` stands.
    pub async fn put_entry(&self, request: &RequestKey, response: &ResponseSnapshot) -> Result<bool, Error> {
        if !response.is_success() {
            tracing::debug!(url = %request.url, status = response.status, "refusing to cache non-success response");
            return Ok(false);
        }

        let partition = self.name.clone();
        let key = request.cache_key();
        let method = request.method.as_str();
        let url = request.url.clone();
        let status = response.status;
        let headers_json = serde_json::to_string(&response.headers).unwrap_or_else(|_| "[]".to_string());
        let body = response.body.clone();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (partition, key, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(partition, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        partition,
                        key,
                        method,
                        url,
                        status,
                        headers_json,
                        body,
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(true)
    }

    /// Number of entries in this partition.
    pub async fn count_entries(&self) -> Result<u64, Error> {
        let partition = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE partition = ?1",
                    params![partition],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry in this partition, keeping the partition itself.
    ///
    /// Returns the number of deleted entries. Safe to call repeatedly.
    pub async fn clear(&self) -> Result<u64, Error> {
        let partition = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let deleted = conn.execute("DELETE FROM entries WHERE partition = ?1", params![partition])?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }
}
