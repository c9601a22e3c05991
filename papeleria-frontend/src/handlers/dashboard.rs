use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;

use crate::models::user::AuthUser;
use crate::models::{Resource, Transaction};
use crate::screen::ScreenState;
use crate::stats::{self, DashboardStats, TimeRange};
use crate::AppState;

pub const LOAD_FAILED: &str = "Error al cargar los datos. Por favor, intente nuevamente.";

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub range: TimeRange,
}

pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DashboardParams>,
) -> ScreenState<DashboardStats> {
    let ctx = user.ctx();
    let sales = match state.api.list::<Transaction>(Resource::Sales, &ctx).await {
        Ok(sales) => sales,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load sales for dashboard");
            return ScreenState::error(LOAD_FAILED)
                .with_retry(format!("/api/dashboard?range={}", params.range.as_str()));
        }
    };

    let mut figures = stats::aggregate(
        &sales,
        params.range,
        Utc::now(),
        state.settings.dashboard.top_products,
    );

    match state.catalog.snapshot_or_fetch(&state.api, &ctx).await {
        Ok(catalog) => figures.annotate(&catalog),
        Err(err) => tracing::debug!(error = %err, "Top products left without names"),
    }

    ScreenState::ready(figures)
}
