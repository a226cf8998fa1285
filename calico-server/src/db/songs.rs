//! Song repository
//!
//! Parameterized queries against the `songs` table.

use calico_common::{NewSong, Result, Song};
use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const SONG_COLUMNS: &str = "id, title, artist, audio_file, image_url, description, \
     spotify_url, youtube_url, genre, duration, votes, play_count, created_at";

/// Counter columns that may be incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Votes,
    PlayCount,
}

impl Counter {
    fn column(self) -> &'static str {
        match self {
            Counter::Votes => "votes",
            Counter::PlayCount => "play_count",
        }
    }
}

fn song_from_row(row: &SqliteRow) -> std::result::Result<Song, sqlx::Error> {
    Ok(Song {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        audio_file: row.try_get("audio_file")?,
        image_url: row.try_get("image_url")?,
        description: row.try_get("description")?,
        spotify_url: row.try_get("spotify_url")?,
        youtube_url: row.try_get("youtube_url")?,
        genre: row.try_get("genre")?,
        duration: row.try_get("duration")?,
        votes: row.try_get("votes")?,
        play_count: row.try_get("play_count")?,
        created_at: row.try_get("created_at")?,
    })
}

/// All songs, most played first, newest first among equals
pub async fn list_songs(pool: &SqlitePool) -> Result<Vec<Song>> {
    let sql = format!(
        "SELECT {} FROM songs ORDER BY play_count DESC NULLS LAST, created_at DESC",
        SONG_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let songs = rows
        .iter()
        .map(song_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(songs)
}

/// Load one song by id
pub async fn get_song(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    let sql = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(song_from_row).transpose()?)
}

/// Increment a counter by exactly one and return the updated row
///
/// Read-modify-write happens inside one UPDATE statement. Returns `None`
/// when no row has this id.
pub async fn increment(pool: &SqlitePool, id: i64, counter: Counter) -> Result<Option<Song>> {
    let column = counter.column();
    let sql = format!(
        "UPDATE songs SET {col} = COALESCE({col}, 0) + 1 WHERE id = ? RETURNING {cols}",
        col = column,
        cols = SONG_COLUMNS
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    let song = row.as_ref().map(song_from_row).transpose()?;
    if let Some(song) = &song {
        tracing::debug!(
            song_id = id,
            counter = column,
            votes = song.votes,
            play_count = song.play_count,
            "Counter incremented"
        );
    }
    Ok(song)
}

pub async fn increment_votes(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    increment(pool, id, Counter::Votes).await
}

pub async fn increment_play_count(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    increment(pool, id, Counter::PlayCount).await
}

/// Store a resolved cover image
pub async fn set_image_url(pool: &SqlitePool, id: i64, image_url: &str) -> Result<Option<Song>> {
    let sql = format!(
        "UPDATE songs SET image_url = ? WHERE id = ? RETURNING {}",
        SONG_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(image_url)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(song_from_row).transpose()?)
}

/// Insert a song created out of band
pub async fn insert_song(pool: &SqlitePool, song: &NewSong) -> Result<Song> {
    let sql = format!(
        r#"
        INSERT INTO songs (
            title, artist, audio_file, image_url, description,
            spotify_url, youtube_url, genre, duration, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?,
            COALESCE(?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
        RETURNING {}
        "#,
        SONG_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.audio_file)
        .bind(&song.image_url)
        .bind(&song.description)
        .bind(&song.spotify_url)
        .bind(&song.youtube_url)
        .bind(&song.genre)
        .bind(&song.duration)
        .bind(
            song.created_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        )
        .fetch_one(pool)
        .await?;

    Ok(song_from_row(&row)?)
}

/// Current database time, used as a connectivity check
pub async fn ping(pool: &SqlitePool) -> Result<String> {
    let now: String = sqlx::query_scalar("SELECT strftime('%Y-%m-%dT%H:%M:%fZ', 'now')")
        .fetch_one(pool)
        .await?;
    Ok(now)
}
