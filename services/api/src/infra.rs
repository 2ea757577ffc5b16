use async_trait::async_trait;
use chrono::NaiveDate;
use job_tracker::candidates::{
    Candidate, CandidateDraft, CandidateId, CandidateRepository, RepositoryError, Stage,
    StageCount, ValidationError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const CREATE_CANDIDATES: &str = r#"
CREATE TABLE IF NOT EXISTS candidates (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    company TEXT NOT NULL CHECK (length(trim(company)) > 0),
    role TEXT NOT NULL CHECK (length(trim(role)) > 0),
    current_stage TEXT NOT NULL DEFAULT 'Applied'
        CHECK (current_stage IN ('Applied', 'Screening', 'Interview', 'Offer', 'Rejected')),
    applied_date TEXT NOT NULL,
    years_of_experience REAL NOT NULL DEFAULT 0 CHECK (years_of_experience >= 0),
    resume_link TEXT
)
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, name, company, role, current_stage, applied_date, years_of_experience, resume_link FROM candidates";

/// Candidate store backed by SQLite.
#[derive(Clone)]
pub(crate) struct SqliteCandidateRepository {
    pool: SqlitePool,
}

impl SqliteCandidateRepository {
    /// Open the pool and create the table if needed. A missing database file
    /// is created. Any failure here is fatal for the caller.
    pub(crate) async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database lives only as long as its connection, so the
        // single connection is never reaped or recycled.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::query(CREATE_CANDIDATES).execute(&pool).await?;
        info!("candidate store ready");

        Ok(Self { pool })
    }
}

fn unavailable(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

fn candidate_from_row(row: &SqliteRow) -> Result<Candidate, RepositoryError> {
    let stage: String = row.try_get("current_stage").map_err(unavailable)?;
    let current_stage = stage
        .parse::<Stage>()
        .map_err(|err| RepositoryError::Unavailable(format!("corrupt stage column: {err}")))?;
    let applied_date: NaiveDate = row.try_get("applied_date").map_err(unavailable)?;

    Ok(Candidate {
        id: CandidateId(row.try_get("id").map_err(unavailable)?),
        name: row.try_get("name").map_err(unavailable)?,
        company: row.try_get("company").map_err(unavailable)?,
        role: row.try_get("role").map_err(unavailable)?,
        current_stage,
        applied_date,
        years_of_experience: row.try_get("years_of_experience").map_err(unavailable)?,
        resume_link: row.try_get("resume_link").map_err(unavailable)?,
    })
}

#[async_trait]
impl CandidateRepository for SqliteCandidateRepository {
    async fn list(&self) -> Result<Vec<Candidate>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY seq"))
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        rows.iter().map(candidate_from_row).collect()
    }

    async fn insert(&self, draft: CandidateDraft) -> Result<Candidate, RepositoryError> {
        let candidate = draft.validate()?.into_candidate(CandidateId::generate());

        sqlx::query(
            "INSERT INTO candidates (id, name, company, role, current_stage, applied_date, years_of_experience, resume_link) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(candidate.id.as_str())
        .bind(&candidate.name)
        .bind(&candidate.company)
        .bind(&candidate.role)
        .bind(candidate.current_stage.label())
        .bind(candidate.applied_date)
        .bind(candidate.years_of_experience)
        .bind(candidate.resume_link.as_deref())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(candidate)
    }

    async fn fetch(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.as_ref().map(candidate_from_row).transpose()
    }

    async fn update_stage(
        &self,
        id: &CandidateId,
        stage: Stage,
    ) -> Result<Candidate, RepositoryError> {
        let result = sqlx::query("UPDATE candidates SET current_stage = ? WHERE id = ?")
            .bind(stage.label())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.fetch(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn stage_counts(&self) -> Result<Vec<StageCount>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT current_stage, COUNT(*) AS count FROM candidates GROUP BY current_stage",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let mut counts = rows
            .iter()
            .map(|row| {
                let stage: String = row.try_get("current_stage").map_err(unavailable)?;
                let count: i64 = row.try_get("count").map_err(unavailable)?;
                let stage = stage.parse::<Stage>().map_err(|err| {
                    RepositoryError::Unavailable(format!("corrupt stage column: {err}"))
                })?;
                Ok(StageCount {
                    stage,
                    count: count as u64,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        counts.sort_by_key(|row| row.stage);
        Ok(counts)
    }
}

// CHECK constraint failures are schema violations, not outages.
fn write_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_check_violation() => {
            ValidationError::Constraint(db.message().to_string()).into()
        }
        _ => unavailable(err),
    }
}
