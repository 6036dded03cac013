//! SQLite-backed settings store.
//!
//! One row per guild holding the settings as a JSON document. The
//! connection is blocking, so every call hops onto the blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlite::{Connection, State};

use super::{GuildSettings, GuildSettingsUpdate, SettingsStore};
use crate::gateway::GuildId;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS guild_settings (
        guild_id INTEGER PRIMARY KEY,
        settings TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

#[derive(Clone)]
pub struct SqliteSettingsStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSettingsStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let connection = sqlite::open(path)
            .with_context(|| format!("Failed to open settings database {}", path.display()))?;
        connection.execute(SCHEMA)?;
        info!("🗄️ Settings database ready at {}", path.display());
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let connection = sqlite::open(":memory:")?;
        connection.execute(SCHEMA)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || {
            let guard = connection
                .lock()
                .map_err(|_| anyhow!("settings database lock poisoned"))?;
            f(&guard)
        })
        .await?
    }
}

fn read_settings(connection: &Connection, guild: GuildId) -> Result<GuildSettings> {
    let mut statement =
        connection.prepare("SELECT settings FROM guild_settings WHERE guild_id = ?")?;
    statement.bind((1, guild.0 as i64))?;

    if let State::Row = statement.next()? {
        let raw = statement.read::<String, _>(0)?;
        let settings = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt settings for guild {}", guild.0))?;
        Ok(settings)
    } else {
        Ok(GuildSettings::default())
    }
}

fn write_settings(connection: &Connection, guild: GuildId, settings: &GuildSettings) -> Result<()> {
    let raw = serde_json::to_string(settings)?;
    let now = chrono::Utc::now().to_rfc3339();
    let mut statement = connection.prepare(
        "INSERT INTO guild_settings (guild_id, settings, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(guild_id) DO UPDATE SET settings = excluded.settings, updated_at = excluded.updated_at",
    )?;
    statement.bind((1, guild.0 as i64))?;
    statement.bind((2, raw.as_str()))?;
    statement.bind((3, now.as_str()))?;
    while statement.next()? != State::Done {}
    Ok(())
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get_guild_settings(&self, guild: GuildId) -> Result<GuildSettings> {
        self.with_connection(move |conn| read_settings(conn, guild)).await
    }

    async fn update_guild_settings(
        &self,
        guild: GuildId,
        update: GuildSettingsUpdate,
    ) -> Result<GuildSettings> {
        self.with_connection(move |conn| {
            let mut settings = read_settings(conn, guild)?;
            update.apply(&mut settings);
            write_settings(conn, guild, &settings)?;
            debug!("Updated settings for guild {}", guild.0);
            Ok(settings)
        })
        .await
    }
}
