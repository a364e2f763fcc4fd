//! Report Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::dto::request::ReportQueryParams;
use crate::application::services::{PeriodReport, ReportPeriod, ReportService, ReportServiceImpl};
use crate::domain::{PostReport, UserReport};
use crate::infrastructure::repositories::PgReportRepository;
use crate::presentation::http::extractors::ApiQuery;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn report_service(state: &AppState) -> ReportServiceImpl<PgReportRepository> {
    ReportServiceImpl::new(Arc::new(PgReportRepository::new(state.db.clone())))
}

fn period(params: &ReportQueryParams) -> ReportPeriod {
    ReportPeriod::parse(
        params.period.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )
}

/// `GET /api/admin/reports/users`
pub async fn users_report(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReportQueryParams>,
) -> Result<Json<PeriodReport<UserReport>>, AppError> {
    Ok(Json(report_service(&state).users(period(&params)).await?))
}

/// `GET /api/admin/reports/posts`
pub async fn posts_report(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReportQueryParams>,
) -> Result<Json<PeriodReport<PostReport>>, AppError> {
    Ok(Json(report_service(&state).posts(period(&params)).await?))
}

/// `GET /api/admin/reports/export/{type}/{format}`
pub async fn export_report(
    State(state): State<AppState>,
    Path((report_type, format)): Path<(String, String)>,
    ApiQuery(params): ApiQuery<ReportQueryParams>,
) -> Result<Response, AppError> {
    let file = report_service(&state)
        .export(&report_type, &format, period(&params))
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
