// Database module - SQLite connection and whole-aggregate profile storage

pub mod models;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use crate::ledger::{CalculationMethod, LedgerProfile, LineRecord, LineType};
pub use models::ProfileSummary;

/// Get the default database path (~/.costbook/data.db)
pub fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let costbook_dir = PathBuf::from(home).join(".costbook");

    std::fs::create_dir_all(&costbook_dir).context("Failed to create .costbook directory")?;

    Ok(costbook_dir.join("data.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = db_path.unwrap_or(default_db_path()?);
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Initialize the database with schema
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let path = db_path.unwrap_or(default_db_path()?);

    info!("Initializing database at: {:?}", path);

    let conn = open_db(Some(path))?;

    let schema_sql = include_str!("schema.sql");
    conn.execute_batch(schema_sql)
        .context("Failed to execute schema")?;

    info!("Database initialized successfully");
    Ok(())
}

/// Save the whole aggregate: upsert the profile row and rewrite its lines
/// in one transaction. Assigns the profile's id on first save and returns it.
pub fn save_profile(conn: &mut Connection, profile: &mut LedgerProfile) -> Result<i64> {
    let tx = conn.transaction()?;

    let profile_id = match profile.id {
        Some(id) => {
            let updated = tx.execute(
                "UPDATE profiles SET
                    name = ?1, asset_name = ?2, currency = ?3, precision = ?4,
                    visible = ?5, icon = ?6, calculation_method = ?7,
                    next_line_id = ?8, updated_at = datetime('now')
                 WHERE id = ?9",
                params![
                    profile.name(),
                    profile.asset_name(),
                    profile.currency(),
                    profile.precision(),
                    profile.visible(),
                    profile.icon(),
                    profile.method().as_str(),
                    profile.next_line_id(),
                    id,
                ],
            )?;
            if updated == 0 {
                anyhow::bail!("profile {} no longer exists in the database", id);
            }
            id
        }
        None => {
            tx.execute(
                "INSERT INTO profiles (
                    name, asset_name, currency, precision, visible, icon,
                    calculation_method, next_line_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    profile.name(),
                    profile.asset_name(),
                    profile.currency(),
                    profile.precision(),
                    profile.visible(),
                    profile.icon(),
                    profile.method().as_str(),
                    profile.next_line_id(),
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    tx.execute(
        "DELETE FROM profile_lines WHERE profile_id = ?1",
        params![profile_id],
    )?;

    for line in profile.lines() {
        tx.execute(
            "INSERT INTO profile_lines (
                profile_id, line_id, display_order, line_date, line_type,
                quantity, amount, comment, avg_cost, total_cost,
                total_quantity, realized_gain
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                profile_id,
                line.id,
                line.display_order as i64,
                line.date,
                line.line_type.as_str(),
                line.quantity.to_string(),
                line.amount.to_string(),
                line.comment,
                line.avg_cost.to_string(),
                line.total_cost.to_string(),
                line.total_quantity.to_string(),
                line.realized_gain.to_string(),
            ],
        )?;
    }

    tx.commit()?;
    profile.id = Some(profile_id);

    debug!(
        "Saved profile {} with {} lines",
        profile_id,
        profile.lines().len()
    );
    Ok(profile_id)
}

/// Load one profile with its lines, or None if absent
pub fn get_profile(conn: &Connection, profile_id: i64) -> Result<Option<LedgerProfile>> {
    let row = conn
        .query_row(
            "SELECT name, asset_name, currency, precision, visible, icon,
                    calculation_method, next_line_id
             FROM profiles WHERE id = ?1",
            params![profile_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, i64>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((name, asset_name, currency, precision, visible, icon, method_str, next_id)) = row
    else {
        return Ok(None);
    };

    let method = CalculationMethod::from_str(&method_str)
        .map_err(|_| anyhow::anyhow!("Unknown calculation method '{}' in database", method_str))?;

    let lines = load_lines(conn, profile_id)?;

    let profile = LedgerProfile::from_parts(
        profile_id, name, asset_name, currency, precision, visible, icon, method, lines, next_id,
    )
    .context(format!("Stored lines of profile {} failed replay", profile_id))?;

    Ok(Some(profile))
}

/// Load every profile, ordered by name
pub fn get_all_profiles(conn: &Connection) -> Result<Vec<LedgerProfile>> {
    let mut stmt = conn.prepare("SELECT id FROM profiles ORDER BY name ASC, id ASC")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut profiles = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(profile) = get_profile(conn, id)? {
            profiles.push(profile);
        }
    }
    Ok(profiles)
}

/// List profile summaries without loading line sequences
pub fn list_profiles(conn: &Connection) -> Result<Vec<ProfileSummary>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.asset_name, p.currency, p.visible,
                p.calculation_method,
                (SELECT COUNT(*) FROM profile_lines l WHERE l.profile_id = p.id)
         FROM profiles p
         ORDER BY p.name ASC, p.id ASC",
    )?;

    let summaries = stmt
        .query_map([], |row| {
            Ok(ProfileSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                asset_name: row.get(2)?,
                currency: row.get(3)?,
                visible: row.get(4)?,
                calculation_method: row.get(5)?,
                line_count: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summaries)
}

/// Delete a profile; its lines go with it via cascade
pub fn delete_profile(conn: &Connection, profile_id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM profiles WHERE id = ?1", params![profile_id])?;
    Ok(deleted > 0)
}

fn load_lines(conn: &Connection, profile_id: i64) -> Result<Vec<LineRecord>> {
    let mut stmt = conn.prepare(
        "SELECT line_id, line_date, display_order, line_type, quantity,
                amount, comment, avg_cost, total_cost, total_quantity,
                realized_gain
         FROM profile_lines
         WHERE profile_id = ?1
         ORDER BY display_order ASC",
    )?;

    let lines = stmt
        .query_map(params![profile_id], |row| {
            let type_str: String = row.get(3)?;
            let line_type = LineType::from_str(&type_str).map_err(|_| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    format!("unknown line type '{}'", type_str).into(),
                )
            })?;
            Ok(LineRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                display_order: row.get::<_, i64>(2)? as usize,
                line_type,
                quantity: get_decimal_value(row, 4)?,
                amount: get_decimal_value(row, 5)?,
                comment: row.get(6)?,
                avg_cost: get_decimal_value(row, 7)?,
                total_cost: get_decimal_value(row, 8)?,
                total_quantity: get_decimal_value(row, 9)?,
                realized_gain: get_decimal_value(row, 10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines)
}

/// Helper to read Decimal from SQLite (handles both TEXT and INTEGER)
fn get_decimal_value(row: &rusqlite::Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    if let Ok(s) = row.get::<_, String>(idx) {
        return Decimal::from_str(&s)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)));
    }

    if let Ok(i) = row.get::<_, i64>(idx) {
        return Ok(Decimal::from(i));
    }

    if let Ok(f) = row.get::<_, f64>(idx) {
        return Decimal::try_from(f)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)));
    }

    Err(rusqlite::Error::InvalidColumnType(
        idx,
        "decimal".to_string(),
        rusqlite::types::Type::Null,
    ))
}
