use crate::db::models::{Preset, PresetFields, PresetSummary};
use duckdb::{params, Connection, Result as DbResult, Row};

const PRESET_COLUMNS: &str = "id, name, model, temperature, max_tokens, top_p, \
     presence_penalty, frequency_penalty, n, system_message";

pub struct DbService;

impl DbService {
    fn row_to_preset(row: &Row) -> DbResult<Preset> {
        Ok(Preset {
            id: row.get(0)?,
            name: row.get(1)?,
            model: row.get(2)?,
            temperature: row.get(3)?,
            max_tokens: row.get(4)?,
            top_p: row.get(5)?,
            presence_penalty: row.get(6)?,
            frequency_penalty: row.get(7)?,
            n: row.get(8)?,
            system_message: row.get(9)?,
        })
    }

    /// Inserts a preset and returns the generated id.
    pub fn insert_preset(conn: &Connection, fields: &PresetFields) -> DbResult<i64> {
        conn.query_row(
            "INSERT INTO presets (name, model, temperature, max_tokens, top_p, presence_penalty, frequency_penalty, n, system_message)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                fields.name,
                fields.model,
                fields.temperature,
                fields.max_tokens,
                fields.top_p,
                fields.presence_penalty,
                fields.frequency_penalty,
                fields.n,
                fields.system_message,
            ],
            |row| row.get(0),
        )
    }

    pub fn list_presets(conn: &Connection) -> DbResult<Vec<PresetSummary>> {
        let mut stmt = conn.prepare("SELECT id, name FROM presets")?;
        let rows = stmt.query_map([], |row| {
            Ok(PresetSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut presets = Vec::new();
        for row in rows {
            presets.push(row?);
        }
        Ok(presets)
    }

    pub fn get_preset(conn: &Connection, id: i64) -> DbResult<Option<Preset>> {
        let sql = format!("SELECT {PRESET_COLUMNS} FROM presets WHERE id = ?");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], Self::row_to_preset)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Rewrites every field of the preset. Returns the number of rows changed.
    pub fn update_preset(conn: &Connection, id: i64, fields: &PresetFields) -> DbResult<usize> {
        conn.execute(
            "UPDATE presets SET name = ?, model = ?, temperature = ?, max_tokens = ?, top_p = ?,
                 presence_penalty = ?, frequency_penalty = ?, n = ?, system_message = ?
             WHERE id = ?",
            params![
                fields.name,
                fields.model,
                fields.temperature,
                fields.max_tokens,
                fields.top_p,
                fields.presence_penalty,
                fields.frequency_penalty,
                fields.n,
                fields.system_message,
                id,
            ],
        )
    }

    /// Returns the number of rows removed.
    pub fn delete_preset(conn: &Connection, id: i64) -> DbResult<usize> {
        conn.execute("DELETE FROM presets WHERE id = ?", params![id])
    }
}
