use crate::domain::entities::opportunity::Opportunity;
use crate::domain::entities::validation::ValidationResult;
use crate::domain::error::DomainError;
use crate::domain::ports::opportunity_repository::*;
use crate::domain::values::opportunity_status::OpportunityStatus;
use crate::domain::values::ranking::{FilterCriteria, UserPreferences};
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;
use tracing::warn;

const SELECT_COLS: &str = "id, title, description, summary, ai_solution_types, target_industries, tags, \
     market_signals, status, validation_score, ai_feasibility_score, confidence_rating, overall_score, \
     competition_level, implementation_complexity, market_positioning, geographic_scope, market_data, \
     signal_engagement, created_at, updated_at, proposed_solution";

/// Fixed-width UTC timestamps so text comparison matches time order.
fn ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(value = s, "Invalid timestamp in row, using now");
            Utc::now()
        })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DomainError> {
    Ok(serde_json::to_string(value)?)
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Accumulates a WHERE clause with positional parameters.
struct WhereBuilder {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

impl WhereBuilder {
    fn new() -> Self {
        Self {
            sql: String::from(" WHERE 1=1"),
            params: Vec::new(),
        }
    }

    fn next(&self) -> usize {
        self.params.len() + 1
    }

    /// Every `{}` in `clause` binds the same parameter.
    fn push(&mut self, clause: &str, value: Box<dyn ToSql>) {
        let clause = clause.replace("{}", &format!("?{}", self.next()));
        self.sql.push_str(" AND ");
        self.sql.push_str(&clause);
        self.params.push(value);
    }

    /// `column IN (...)` over the given values. Nothing is added for an empty list.
    fn push_in(&mut self, column: &str, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        let mut placeholders = Vec::with_capacity(values.len());
        for v in values {
            placeholders.push(format!("?{}", self.next()));
            self.params.push(Box::new(v));
        }
        self.sql
            .push_str(&format!(" AND {column} IN ({})", placeholders.join(", ")));
    }

    /// Matches rows whose JSON array column contains any of `values`.
    fn push_json_any(&mut self, column: &str, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        let mut ors = Vec::with_capacity(values.len());
        for v in values {
            ors.push(format!("{column} LIKE ?{} ESCAPE '\\'", self.next()));
            self.params.push(Box::new(format!("%\"{}\"%", escape_like(&v))));
        }
        self.sql.push_str(&format!(" AND ({})", ors.join(" OR ")));
    }

    fn refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn build_where(filter: &FilterCriteria) -> WhereBuilder {
    let mut w = WhereBuilder::new();
    w.push_in(
        "status",
        filter.effective_statuses().iter().map(|s| s.to_string()).collect(),
    );
    w.push_json_any(
        "ai_solution_types",
        filter.ai_solution_types.iter().map(|t| t.to_string()).collect(),
    );
    w.push_json_any(
        "target_industries",
        filter.target_industries.iter().map(|i| i.to_string()).collect(),
    );
    w.push_json_any("tags", filter.tags.clone());
    w.push_in("geographic_scope", filter.geographic_scopes.clone());
    w.push_in(
        "implementation_complexity",
        filter.complexity.iter().map(|l| l.to_string()).collect(),
    );

    if let Some(v) = filter.min_validation_score {
        w.push("validation_score >= {}", Box::new(v));
    }
    if let Some(v) = filter.max_validation_score {
        w.push("validation_score <= {}", Box::new(v));
    }
    if let Some(v) = filter.min_ai_feasibility {
        w.push("ai_feasibility_score >= {}", Box::new(v));
    }
    if let Some(v) = filter.max_ai_feasibility {
        w.push("ai_feasibility_score <= {}", Box::new(v));
    }
    if let Some(v) = filter.min_confidence {
        w.push("confidence_rating >= {}", Box::new(v));
    }
    if let Some(t) = &filter.created_after {
        w.push("created_at >= {}", Box::new(ts(t)));
    }
    if let Some(t) = &filter.created_before {
        w.push("created_at <= {}", Box::new(ts(t)));
    }
    if let Some(t) = &filter.updated_after {
        w.push("updated_at >= {}", Box::new(ts(t)));
    }
    if let Some(text) = filter.search_text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        w.push(
            "(title LIKE {} ESCAPE '\\' OR description LIKE {} ESCAPE '\\' OR summary LIKE {} ESCAPE '\\')",
            Box::new(format!("%{}%", escape_like(text))),
        );
    }
    w
}

pub struct SqliteOpportunityRepo {
    conn: Mutex<Connection>,
}

impl SqliteOpportunityRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (or create) the database at `path`, enable WAL and migrate.
    pub fn open(path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;
        Ok(Self::new(conn))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn row_to_opportunity(row: &rusqlite::Row) -> Result<Opportunity, rusqlite::Error> {
        let types_str: String = row.get(4)?;
        let industries_str: String = row.get(5)?;
        let tags_str: String = row.get(6)?;
        let signals_str: String = row.get(7)?;
        let status_str: String = row.get(8)?;
        let competition: Option<String> = row.get(13)?;
        let complexity: Option<String> = row.get(14)?;
        let positioning: Option<String> = row.get(15)?;
        let market_data: Option<String> = row.get(17)?;
        let created_str: String = row.get(19)?;
        let updated_str: String = row.get(20)?;

        Ok(Opportunity {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            summary: row.get(3)?,
            proposed_solution: row.get(21)?,
            ai_solution_types: serde_json::from_str(&types_str).unwrap_or_default(),
            target_industries: serde_json::from_str(&industries_str).unwrap_or_default(),
            tags: serde_json::from_str(&tags_str).unwrap_or_default(),
            market_signals: serde_json::from_str(&signals_str).unwrap_or_default(),
            status: status_str.parse().unwrap_or_else(|_| {
                warn!(status = %status_str, "Invalid status in row, defaulting to discovered");
                OpportunityStatus::default()
            }),
            validation_score: row.get(9)?,
            ai_feasibility_score: row.get(10)?,
            confidence_rating: row.get(11)?,
            overall_score: row.get(12)?,
            competition_level: competition.and_then(|s| s.parse().ok()),
            implementation_complexity: complexity.and_then(|s| s.parse().ok()),
            market_positioning: positioning.and_then(|s| s.parse().ok()),
            geographic_scope: row.get(16)?,
            market_data: market_data.and_then(|s| serde_json::from_str(&s).ok()),
            signal_engagement: row.get(18)?,
            created_at: parse_ts(&created_str),
            updated_at: parse_ts(&updated_str),
        })
    }

    fn row_to_validation(row: &rusqlite::Row) -> Result<ValidationResult, rusqlite::Error> {
        let created_str: String = row.get(5)?;
        Ok(ValidationResult {
            id: row.get(0)?,
            opportunity_id: row.get(1)?,
            user_id: row.get(2)?,
            score: row.get(3)?,
            notes: row.get(4)?,
            created_at: parse_ts(&created_str),
        })
    }

    fn select_validations(
        &self,
        where_sql: &str,
        param: &dyn ToSql,
    ) -> Result<Vec<ValidationResult>, DomainError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, opportunity_id, user_id, score, notes, created_at FROM validations {where_sql} ORDER BY created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([param], Self::row_to_validation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl OpportunityRepository for SqliteOpportunityRepo {
    fn insert(&self, o: &Opportunity) -> Result<(), DomainError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO opportunities ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)"
            ),
            params![
                o.id,
                o.title,
                o.description,
                o.summary,
                to_json(&o.ai_solution_types)?,
                to_json(&o.target_industries)?,
                to_json(&o.tags)?,
                to_json(&o.market_signals)?,
                o.status.to_string(),
                o.validation_score,
                o.ai_feasibility_score,
                o.confidence_rating,
                o.overall_score,
                o.competition_level.map(|l| l.to_string()),
                o.implementation_complexity.map(|l| l.to_string()),
                o.market_positioning.map(|p| p.to_string()),
                o.geographic_scope,
                o.market_data.as_ref().map(to_json).transpose()?,
                o.signal_engagement,
                ts(&o.created_at),
                ts(&o.updated_at),
                o.proposed_solution,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert opportunity: {e}")))?;
        tx.commit()?;
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Opportunity>, DomainError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {SELECT_COLS} FROM opportunities WHERE id = ?1");
        let found = conn
            .query_row(&sql, [id], Self::row_to_opportunity)
            .optional()?;
        Ok(found)
    }

    fn query(
        &self,
        filter: &FilterCriteria,
        pagination: Option<Pagination>,
    ) -> Result<(Vec<Opportunity>, usize), DomainError> {
        let conn = self.lock()?;
        let mut w = build_where(filter);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM opportunities{}", w.sql),
            w.refs().as_slice(),
            |row| row.get(0),
        )?;

        let mut sql = format!(
            "SELECT {SELECT_COLS} FROM opportunities{} ORDER BY created_at DESC, id",
            w.sql
        );
        if let Some(p) = pagination {
            sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", w.next(), w.next() + 1));
            w.params.push(Box::new(p.limit as i64));
            w.params.push(Box::new(p.offset as i64));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(w.refs().as_slice(), Self::row_to_opportunity)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok((rows, total.max(0) as usize))
    }

    fn recent_since(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<Opportunity>, DomainError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM opportunities WHERE created_at >= ?1 ORDER BY created_at DESC, id LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![ts(&since), limit as i64], Self::row_to_opportunity)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn update_status(&self, id: &str, status: OpportunityStatus) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE opportunities SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.to_string(), ts(&Utc::now()), id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Opportunity {id}")));
        }
        Ok(())
    }

    fn add_validation(
        &self,
        v: &ValidationResult,
        new_status: Option<OpportunityStatus>,
    ) -> Result<(), DomainError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let touched = tx.execute(
            "UPDATE opportunities SET updated_at = ?1, status = COALESCE(?2, status) WHERE id = ?3",
            params![ts(&v.created_at), new_status.map(|s| s.to_string()), v.opportunity_id],
        )?;
        if touched == 0 {
            return Err(DomainError::NotFound(format!("Opportunity {}", v.opportunity_id)));
        }
        tx.execute(
            "INSERT INTO validations (id, opportunity_id, user_id, score, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![v.id, v.opportunity_id, v.user_id, v.score, v.notes, ts(&v.created_at)],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn validations_since(&self, since: DateTime<Utc>) -> Result<Vec<ValidationResult>, DomainError> {
        self.select_validations("WHERE created_at >= ?1", &ts(&since))
    }

    fn validations_by_user(&self, user_id: &str) -> Result<Vec<ValidationResult>, DomainError> {
        self.select_validations("WHERE user_id = ?1", &user_id)
    }

    fn add_bookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM opportunities WHERE id = ?1",
                [opportunity_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(DomainError::NotFound(format!("Opportunity {opportunity_id}")));
        }
        conn.execute(
            "INSERT OR IGNORE INTO bookmarks (user_id, opportunity_id, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, opportunity_id, ts(&Utc::now())],
        )?;
        Ok(())
    }

    fn remove_bookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM bookmarks WHERE user_id = ?1 AND opportunity_id = ?2",
            params![user_id, opportunity_id],
        )?;
        Ok(())
    }

    fn bookmarks_for_user(&self, user_id: &str) -> Result<Vec<String>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT opportunity_id FROM bookmarks WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let ids = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DomainError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO user_preferences (user_id, preferences, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET preferences = excluded.preferences, updated_at = excluded.updated_at",
            params![preferences.user_id, to_json(preferences)?, ts(&Utc::now())],
        )?;
        Ok(())
    }

    fn get_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, DomainError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT preferences FROM user_preferences WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn stats(&self) -> Result<OpportunityStats, DomainError> {
        let conn = self.lock()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM opportunities", [], |r| r.get(0))?;
        let total_validations: i64 =
            conn.query_row("SELECT COUNT(*) FROM validations", [], |r| r.get(0))?;

        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM opportunities GROUP BY status ORDER BY COUNT(*) DESC, status",
        )?;
        let by_status = stmt
            .query_map([], |row| {
                let status: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((status, count.max(0) as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OpportunityStats {
            total_opportunities: total.max(0) as usize,
            by_status,
            total_validations: total_validations.max(0) as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::ai_solution_type::AiSolutionType;
    use crate::domain::values::level::Level;
    use chrono::Duration;

    fn repo() -> SqliteOpportunityRepo {
        SqliteOpportunityRepo::open(":memory:").unwrap()
    }

    fn opp(title: &str) -> Opportunity {
        Opportunity::new(title.into(), format!("{title} description"), "summary".into())
    }

    #[test]
    fn test_insert_and_get_roundtrip_fields() {
        let repo = repo();
        let mut o = opp("Invoice automation");
        o.ai_solution_types = vec![AiSolutionType::Automation];
        o.competition_level = Some(Level::Low);
        o.market_data = Some(serde_json::json!({"market_size": 5.0e8}));
        o.proposed_solution = "Match invoices to payments automatically".into();
        repo.insert(&o).unwrap();

        let got = repo.get_by_id(&o.id).unwrap().unwrap();
        assert_eq!(got.ai_solution_types, vec![AiSolutionType::Automation]);
        assert_eq!(got.competition_level, Some(Level::Low));
        assert_eq!(got.market_size_usd(), Some(5.0e8));
        assert_eq!(got.proposed_solution, o.proposed_solution);
        assert_eq!(got.description, o.description);
        assert!(repo.get_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_fails_without_side_effects() {
        let repo = repo();
        let o = opp("One");
        repo.insert(&o).unwrap();
        assert!(repo.insert(&o).is_err());
        assert_eq!(repo.stats().unwrap().total_opportunities, 1);
    }

    #[test]
    fn test_query_hides_rejected_by_default() {
        let repo = repo();
        let keep = opp("Keep");
        let drop = opp("Drop");
        repo.insert(&keep).unwrap();
        repo.insert(&drop).unwrap();
        repo.update_status(&drop.id, OpportunityStatus::Rejected).unwrap();

        let (rows, total) = repo.query(&FilterCriteria::default(), None).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, keep.id);

        let only_rejected = FilterCriteria {
            statuses: vec![OpportunityStatus::Rejected],
            ..Default::default()
        };
        let (rows, _) = repo.query(&only_rejected, None).unwrap();
        assert_eq!(rows[0].id, drop.id);
    }

    #[test]
    fn test_query_filters_and_paginates() {
        let repo = repo();
        for i in 0..5 {
            let mut o = opp(&format!("Vision {i}"));
            o.ai_solution_types = vec![AiSolutionType::ComputerVision];
            o.validation_score = i as f64 * 2.0;
            o.created_at = Utc::now() - Duration::minutes(i);
            repo.insert(&o).unwrap();
        }
        repo.insert(&opp("Unrelated")).unwrap();

        let filter = FilterCriteria {
            ai_solution_types: vec![AiSolutionType::ComputerVision],
            min_validation_score: Some(2.0),
            ..Default::default()
        };
        let (rows, total) = repo.query(&filter, Some(Pagination::page(2, 2))).unwrap();
        assert_eq!(total, 4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Vision 3");

        let search = FilterCriteria {
            search_text: Some("unrelated".into()),
            ..Default::default()
        };
        assert_eq!(repo.query(&search, None).unwrap().1, 1);
    }

    #[test]
    fn test_recent_since_respects_window_and_limit() {
        let repo = repo();
        let mut old = opp("Old");
        old.created_at = Utc::now() - Duration::days(120);
        repo.insert(&old).unwrap();
        for i in 0..3 {
            repo.insert(&opp(&format!("New {i}"))).unwrap();
        }
        let since = Utc::now() - Duration::days(90);
        assert_eq!(repo.recent_since(since, 100).unwrap().len(), 3);
        assert_eq!(repo.recent_since(since, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_validation_requires_opportunity() {
        let repo = repo();
        let v = ValidationResult::new("nope".into(), "u1".into(), 7.0, None);
        assert!(matches!(repo.add_validation(&v, None), Err(DomainError::NotFound(_))));

        let o = opp("Real");
        repo.insert(&o).unwrap();
        let v = ValidationResult::new(o.id.clone(), "u1".into(), 7.0, Some("solid".into()));
        repo.add_validation(&v, None).unwrap();
        assert_eq!(repo.validations_by_user("u1").unwrap().len(), 1);
        assert_eq!(
            repo.validations_since(Utc::now() - Duration::days(1)).unwrap().len(),
            1
        );
        assert_eq!(repo.get_by_id(&o.id).unwrap().unwrap().status, OpportunityStatus::Discovered);
    }

    #[test]
    fn test_validation_and_status_change_commit_together() {
        let repo = repo();
        let o = opp("Atomic");
        repo.insert(&o).unwrap();
        let v = ValidationResult::new(o.id.clone(), "u1".into(), 6.0, None);
        repo.add_validation(&v, None).unwrap();

        // same validation id again: the insert fails, so the status must not move
        let err = repo.add_validation(&v, Some(OpportunityStatus::Validating));
        assert!(err.is_err());
        assert_eq!(repo.get_by_id(&o.id).unwrap().unwrap().status, OpportunityStatus::Discovered);
        assert_eq!(repo.validations_by_user("u1").unwrap().len(), 1);

        let second = ValidationResult::new(o.id.clone(), "u2".into(), 8.0, None);
        repo.add_validation(&second, Some(OpportunityStatus::Validating)).unwrap();
        assert_eq!(repo.get_by_id(&o.id).unwrap().unwrap().status, OpportunityStatus::Validating);
    }

    #[test]
    fn test_bookmarks_and_preferences() {
        let repo = repo();
        let o = opp("Bookmarked");
        repo.insert(&o).unwrap();
        repo.add_bookmark("u1", &o.id).unwrap();
        repo.add_bookmark("u1", &o.id).unwrap();
        assert_eq!(repo.bookmarks_for_user("u1").unwrap(), vec![o.id.clone()]);
        repo.remove_bookmark("u1", &o.id).unwrap();
        assert!(repo.bookmarks_for_user("u1").unwrap().is_empty());

        let mut prefs = UserPreferences::for_user("u1");
        prefs.preferred_ai_types = vec![AiSolutionType::Automation];
        repo.save_preferences(&prefs).unwrap();
        prefs.preferred_complexity = vec![Level::Low];
        repo.save_preferences(&prefs).unwrap();
        assert_eq!(repo.get_preferences("u1").unwrap(), Some(prefs));
        assert_eq!(repo.get_preferences("u2").unwrap(), None);
    }
}
