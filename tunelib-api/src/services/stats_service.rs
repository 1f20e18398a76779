//! Dashboard statistics
//!
//! Best-effort: a failing query is logged and the all-zero result returned.

use tracing::error;
use tunelib_common::db::DashboardStats;
use tunelib_common::Database;

#[derive(Debug, Clone)]
pub struct StatsService {
    db: Database,
}

impl StatsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self) -> DashboardStats {
        match self.db.dashboard_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Failed to compute dashboard stats: {}", e);
                DashboardStats::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_yields_zeroed_stats() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query("DROP TABLE playlist_songs")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("DROP TABLE songs").execute(db.pool()).await.unwrap();

        let stats = StatsService::new(db).dashboard().await;
        assert_eq!(stats, DashboardStats::default());
    }

    #[tokio::test]
    async fn test_closed_pool_yields_zeroed_stats() {
        let db = Database::in_memory().await.unwrap();
        db.pool().close().await;
        assert_eq!(
            StatsService::new(db).dashboard().await,
            DashboardStats::default()
        );
    }
}
