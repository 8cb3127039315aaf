use rusqlite::Connection;

/// Initialize the license-code store schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Access codes. Timestamps are stored as text in the same
        -- 'yyyy-MM-dd HH:mm:ss' form the export format uses, so imported
        -- legacy records land unchanged.
        CREATE TABLE IF NOT EXISTS license_codes (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            expiry_date TEXT,
            expiry_days INTEGER NOT NULL DEFAULT 30,
            assigned_at TEXT,
            assigned_to TEXT NOT NULL DEFAULT '',
            is_hours_mode INTEGER NOT NULL DEFAULT 0,
            expiry_value REAL NOT NULL DEFAULT 0,
            is_used INTEGER NOT NULL DEFAULT 0,
            used_at TEXT,
            used_by TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_license_codes_assignee ON license_codes(assigned_to) WHERE assigned_to != '';
        CREATE INDEX IF NOT EXISTS idx_license_codes_unused ON license_codes(code) WHERE is_used = 0;
        "#,
    )?;
    Ok(())
}
