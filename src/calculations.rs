// 📒 Ownership-Filtered Repository
// Every query carries the owner's id; a record owned by someone else is
// reported exactly like a record that does not exist.

use crate::calculator::Operation;
use crate::db::parse_timestamp;
use crate::error::{AppError, AppResult, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub id: i64,
    pub operation: Operation,
    pub operand1: f64,
    pub operand2: f64,
    pub result: f64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `Add`. `operation` is parsed case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCalculation {
    pub operation: String,
    pub operand1: f64,
    pub operand2: f64,
}

/// Input for `Edit`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculationUpdate {
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub operand1: Option<f64>,
    #[serde(default)]
    pub operand2: Option<f64>,
}

impl CalculationUpdate {
    pub fn is_empty(&self) -> bool {
        self.operation.is_none() && self.operand1.is_none() && self.operand2.is_none()
    }
}

fn calculation_from_row(row: &Row<'_>) -> rusqlite::Result<Calculation> {
    let operation: String = row.get(1)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Calculation {
        id: row.get(0)?,
        operation: operation
            .parse::<Operation>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        operand1: row.get(2)?,
        operand2: row.get(3)?,
        result: row.get(4)?,
        user_id: row.get(5)?,
        created_at: parse_timestamp(6, &created_at)?,
        updated_at: parse_timestamp(7, &updated_at)?,
    })
}

const CALCULATION_COLUMNS: &str =
    "id, operation, operand1, operand2, result, user_id, created_at, updated_at";

/// Calculation records as seen by a single owner
pub struct CalculationRepository<'c> {
    conn: &'c Connection,
    user_id: i64,
}

impl<'c> CalculationRepository<'c> {
    pub fn for_owner(conn: &'c Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    /// Browse: the owner's calculations in insertion order
    pub fn list(&self, skip: u32, limit: u32) -> AppResult<Vec<Calculation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CALCULATION_COLUMNS} FROM calculations
             WHERE user_id = ?1
             ORDER BY id
             LIMIT ?2 OFFSET ?3"
        ))?;

        let calculations = stmt
            .query_map(params![self.user_id, limit, skip], calculation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(calculations)
    }

    /// Read
    pub fn get(&self, calculation_id: i64) -> AppResult<Calculation> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {CALCULATION_COLUMNS} FROM calculations WHERE id = ?1 AND user_id = ?2"
                ),
                params![calculation_id, self.user_id],
                calculation_from_row,
            )
            .optional()?
            .ok_or(AppError::NotFound)
    }

    /// Add: computes first, persists only on success
    pub fn create(&self, input: &NewCalculation) -> AppResult<Calculation> {
        let operation: Operation = input.operation.parse()?;
        let result = operation.apply(input.operand1, input.operand2)?;
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO calculations (operation, operand1, operand2, result, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                operation.as_str(),
                input.operand1,
                input.operand2,
                result,
                self.user_id,
                now.to_rfc3339(),
            ],
        )?;

        let calculation = Calculation {
            id: self.conn.last_insert_rowid(),
            operation,
            operand1: input.operand1,
            operand2: input.operand2,
            result,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        };
        info!(
            user_id = self.user_id,
            calculation_id = calculation.id,
            operation = %operation,
            "calculation created"
        );

        Ok(calculation)
    }

    /// Edit: merge the provided fields, recompute, then write.
    ///
    /// Nothing is written unless the merged inputs compute cleanly.
    pub fn update(&self, calculation_id: i64, changes: &CalculationUpdate) -> AppResult<Calculation> {
        let mut calculation = self.get(calculation_id)?;

        if changes.is_empty() {
            return Err(ValidationError::NoFieldsProvided.into());
        }

        if let Some(operation) = &changes.operation {
            calculation.operation = operation.parse()?;
        }
        if let Some(operand1) = changes.operand1 {
            calculation.operand1 = operand1;
        }
        if let Some(operand2) = changes.operand2 {
            calculation.operand2 = operand2;
        }
        calculation.result = calculation
            .operation
            .apply(calculation.operand1, calculation.operand2)?;
        calculation.updated_at = Utc::now();

        self.conn.execute(
            "UPDATE calculations
             SET operation = ?1, operand1 = ?2, operand2 = ?3, result = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                calculation.operation.as_str(),
                calculation.operand1,
                calculation.operand2,
                calculation.result,
                calculation.updated_at.to_rfc3339(),
                calculation.id,
                self.user_id,
            ],
        )?;
        info!(user_id = self.user_id, calculation_id, "calculation updated");

        Ok(calculation)
    }

    /// Delete
    pub fn delete(&self, calculation_id: i64) -> AppResult<()> {
        let deleted = self.conn.execute(
            "DELETE FROM calculations WHERE id = ?1 AND user_id = ?2",
            params![calculation_id, self.user_id],
        )?;

        if deleted == 0 {
            return Err(AppError::NotFound);
        }

        info!(user_id = self.user_id, calculation_id, "calculation deleted");
        Ok(())
    }

    pub fn count(&self) -> AppResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM calculations WHERE user_id = ?1",
            [self.user_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
