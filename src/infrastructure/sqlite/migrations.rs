use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS opportunities (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            proposed_solution TEXT NOT NULL DEFAULT '',
            ai_solution_types TEXT NOT NULL DEFAULT '[]',
            target_industries TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            market_signals TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'discovered',
            validation_score REAL NOT NULL DEFAULT 0,
            ai_feasibility_score REAL NOT NULL DEFAULT 0,
            confidence_rating REAL NOT NULL DEFAULT 0,
            overall_score REAL,
            competition_level TEXT,
            implementation_complexity TEXT,
            market_positioning TEXT,
            geographic_scope TEXT,
            market_data TEXT,
            signal_engagement REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS validations (
            id TEXT PRIMARY KEY,
            opportunity_id TEXT NOT NULL REFERENCES opportunities(id),
            user_id TEXT NOT NULL,
            score REAL NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            user_id TEXT NOT NULL,
            opportunity_id TEXT NOT NULL REFERENCES opportunities(id),
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, opportunity_id)
        );

        CREATE TABLE IF NOT EXISTS user_preferences (
            user_id TEXT PRIMARY KEY,
            preferences TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_opportunities_created ON opportunities(created_at);
        CREATE INDEX IF NOT EXISTS idx_opportunities_status ON opportunities(status);
        CREATE INDEX IF NOT EXISTS idx_validations_created ON validations(created_at);
        CREATE INDEX IF NOT EXISTS idx_validations_user ON validations(user_id);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
