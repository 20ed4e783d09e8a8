use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::alert::AlertStatus;
use crate::entities::{news_post, sos_alert};

/// Seeds the gauges from store counts at boot so dashboards don't start
/// from zero after a restart.
pub async fn init_metrics(db: &DatabaseConnection) {
    let active_alerts = sos_alert::Entity::find()
        .filter(sos_alert::Column::Status.eq(AlertStatus::Active.as_str()))
        .count(db)
        .await
        .unwrap_or(0);
    metrics::gauge!("immediaid_sos_alerts_active").set(active_alerts as f64);

    let news_posts = news_post::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("immediaid_news_posts_total").set(news_posts as f64);

    tracing::info!(
        "Initialized metrics: ActiveAlerts={}, NewsPosts={}",
        active_alerts,
        news_posts
    );
}

pub fn increment_sos_alerts(emergency_type: &str) {
    metrics::counter!("immediaid_sos_alerts_total", "emergency_type" => emergency_type.to_string())
        .increment(1);
    metrics::gauge!("immediaid_sos_alerts_active").increment(1.0);
}

pub fn increment_sos_resolved() {
    metrics::counter!("immediaid_sos_resolved_total").increment(1);
}

/// Recomputed after resolves; a repeat resolve is a no-op in the store, so
/// blind decrements would drift.
pub fn set_active_alerts(count: usize) {
    metrics::gauge!("immediaid_sos_alerts_active").set(count as f64);
}
