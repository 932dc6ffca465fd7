//! Saved simulations, saved projections and assistant chat history

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{ChatMessage, ChatRole, SavedProjection, Simulation};
use super::{get_decimal_value, parse_enum};

pub fn insert_simulation(conn: &Connection, sim: &Simulation) -> Result<i64> {
    conn.execute(
        "INSERT INTO simulations
            (name, initial_amount, monthly_contribution, monthly_rate, months, final_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            sim.name,
            sim.initial_amount.to_string(),
            sim.monthly_contribution.to_string(),
            sim.monthly_rate.to_string(),
            sim.months,
            sim.final_amount.to_string(),
        ],
    )
    .with_context(|| format!("Failed to save simulation '{}'", sim.name))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_simulations(conn: &Connection) -> Result<Vec<Simulation>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, initial_amount, monthly_contribution, monthly_rate, months,
                final_amount, created_at
         FROM simulations ORDER BY created_at DESC, id DESC",
    )?;
    let sims = stmt
        .query_map([], |row| {
            Ok(Simulation {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                initial_amount: get_decimal_value(row, 2)?,
                monthly_contribution: get_decimal_value(row, 3)?,
                monthly_rate: get_decimal_value(row, 4)?,
                months: row.get(5)?,
                final_amount: get_decimal_value(row, 6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sims)
}

pub fn delete_simulation(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn.execute("DELETE FROM simulations WHERE id = ?1", params![id])? > 0)
}

pub fn insert_projection(
    conn: &Connection,
    name: &str,
    projection_type: &str,
    parameters: &serde_json::Value,
    result: &serde_json::Value,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO projections (name, projection_type, parameters, result)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            name,
            projection_type,
            serde_json::to_string(parameters)?,
            serde_json::to_string(result)?
        ],
    )
    .with_context(|| format!("Failed to save projection '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_projections(conn: &Connection) -> Result<Vec<SavedProjection>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, projection_type, parameters, result, created_at
         FROM projections ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query([])?;
    let mut projections = Vec::new();
    while let Some(row) = rows.next()? {
        let parameters: String = row.get(3)?;
        let result: String = row.get(4)?;
        projections.push(SavedProjection {
            id: row.get(0)?,
            name: row.get(1)?,
            projection_type: row.get(2)?,
            parameters: serde_json::from_str(&parameters)
                .context("Failed to parse stored projection parameters")?,
            result: serde_json::from_str(&result)
                .context("Failed to parse stored projection result")?,
            created_at: row.get(5)?,
        });
    }
    Ok(projections)
}

pub fn delete_projection(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn.execute("DELETE FROM projections WHERE id = ?1", params![id])? > 0)
}

pub fn insert_chat_message(conn: &Connection, role: ChatRole, content: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO chat_history (role, content) VALUES (?1, ?2)",
        params![role.as_str(), content],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Latest `limit` messages in chronological order
pub fn recent_chat_messages(conn: &Connection, limit: usize) -> Result<Vec<ChatMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, role, content, created_at FROM (
            SELECT id, role, content, created_at FROM chat_history ORDER BY id DESC LIMIT ?1
         ) ORDER BY id ASC",
    )?;
    let messages = stmt
        .query_map(params![limit as i64], |row| {
            let role: String = row.get(1)?;
            Ok(ChatMessage {
                id: row.get(0)?,
                role: parse_enum(&role, 1)?,
                content: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(messages)
}

pub fn clear_chat_history(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM chat_history", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::apply_schema;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_simulation_persisted_with_exact_decimals() {
        let conn = memory_db();
        let id = insert_simulation(
            &conn,
            &Simulation {
                id: None,
                name: "Aposentadoria".to_string(),
                initial_amount: dec!(1000),
                monthly_contribution: dec!(250.50),
                monthly_rate: dec!(0.85),
                months: 120,
                final_amount: dec!(55123.45),
                created_at: None,
            },
        )
        .unwrap();
        let sims = list_simulations(&conn).unwrap();
        assert_eq!(sims.len(), 1);
        assert_eq!(sims[0].monthly_rate, dec!(0.85));
        assert!(delete_simulation(&conn, id).unwrap());
        assert!(!delete_simulation(&conn, id).unwrap());
    }

    #[test]
    fn test_projection_json_round_trip() {
        let conn = memory_db();
        insert_projection(
            &conn,
            "Apê",
            "property",
            &json!({"value": "300000"}),
            &json!({"payment": "2500.12"}),
        )
        .unwrap();
        let saved = list_projections(&conn).unwrap();
        assert_eq!(saved[0].projection_type, "property");
        assert_eq!(saved[0].result["payment"], "2500.12");
    }

    #[test]
    fn test_recent_chat_messages_chronological() {
        let conn = memory_db();
        for i in 0..5 {
            insert_chat_message(&conn, ChatRole::User, &format!("msg {}", i)).unwrap();
        }
        insert_chat_message(&conn, ChatRole::Assistant, "ok").unwrap();
        let recent = recent_chat_messages(&conn, 3).unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg 3", "msg 4", "ok"]);
        assert_eq!(recent[2].role, ChatRole::Assistant);
        assert_eq!(clear_chat_history(&conn).unwrap(), 6);
    }
}
