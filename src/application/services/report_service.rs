//! Report Service
//!
//! Admin activity reports over published posts, as JSON or as downloadable
//! PDF and Word documents.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{PostReport, ReportRange, ReportRepository, UserReport};
use crate::infrastructure::reports::{render_docx, render_pdf, ReportDocument};
use crate::shared::error::AppError;
use crate::shared::validation::parse_timestamp;

/// Time window selected by the `period` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    AllTime,
    Today,
    ThisWeek,
    ThisMonth,
    ThisYear,
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ReportPeriod {
    /// Unknown periods and `custom` without two valid dates mean all time.
    pub fn parse(period: Option<&str>, start: Option<&str>, end: Option<&str>) -> Self {
        match period.map(str::trim) {
            Some("today") => Self::Today,
            Some("this_week") => Self::ThisWeek,
            Some("this_month") => Self::ThisMonth,
            Some("this_year") => Self::ThisYear,
            Some("custom") => {
                let start = start.and_then(parse_timestamp);
                let end = end.and_then(|raw| {
                    let at = parse_timestamp(raw)?;
                    // A bare date covers the whole day.
                    Some(if raw.trim().len() == 10 {
                        at + Duration::days(1) - Duration::seconds(1)
                    } else {
                        at
                    })
                });
                match (start, end) {
                    (Some(start), Some(end)) => Self::Custom { start, end },
                    _ => Self::AllTime,
                }
            }
            _ => Self::AllTime,
        }
    }

    /// Concrete range at `now`; `None` for all time.
    pub fn range(&self, now: DateTime<Utc>) -> Option<ReportRange> {
        let today = now.date_naive();
        let from_date = |date: NaiveDate| {
            date.and_hms_opt(0, 0, 0).map(|start| ReportRange {
                start: start.and_utc(),
                end: now,
            })
        };

        match *self {
            Self::AllTime => None,
            Self::Today => from_date(today),
            Self::ThisWeek => {
                from_date(today - Duration::days(i64::from(today.weekday().num_days_from_monday())))
            }
            Self::ThisMonth => from_date(NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?),
            Self::ThisYear => from_date(NaiveDate::from_ymd_opt(today.year(), 1, 1)?),
            Self::Custom { start, end } => Some(ReportRange { start, end }),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::AllTime => "All time".to_string(),
            Self::Today => "Today".to_string(),
            Self::ThisWeek => "This week".to_string(),
            Self::ThisMonth => "This month".to_string(),
            Self::ThisYear => "This year".to_string(),
            Self::Custom { start, end } => format!(
                "From {} to {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Users,
    Posts,
}

impl ReportType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "users" => Some(Self::Users),
            "posts" => Some(Self::Posts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Word,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pdf" => Some(Self::Pdf),
            "word" => Some(Self::Word),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Word => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "docx",
        }
    }
}

/// A report together with the period it covers.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport<T> {
    pub period: String,
    #[serde(flatten)]
    pub report: T,
}

/// A rendered report ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ReportService: Send + Sync {
    async fn users(&self, period: ReportPeriod) -> Result<PeriodReport<UserReport>, ReportError>;

    async fn posts(&self, period: ReportPeriod) -> Result<PeriodReport<PostReport>, ReportError>;

    async fn export(
        &self,
        report_type: &str,
        format: &str,
        period: ReportPeriod,
    ) -> Result<ExportFile, ReportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Unknown report type: {0}")]
    UnknownType(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::UnknownType(_) | ReportError::UnknownFormat(_) => {
                AppError::BadRequest(e.to_string())
            }
            ReportError::Store(inner) => inner,
        }
    }
}

fn users_document(report: &PeriodReport<UserReport>, generated_at: DateTime<Utc>) -> ReportDocument {
    ReportDocument {
        title: "User activity report".into(),
        period: report.period.clone(),
        generated_at,
        summary: vec![
            (
                "Active authors".into(),
                report.report.active_users_count.to_string(),
            ),
            (
                "Average rating".into(),
                format!("{:.2}", report.report.average_user_rating),
            ),
        ],
        columns: ["#", "Author", "Posts", "Avg rating", "Views"]
            .map(String::from)
            .to_vec(),
        rows: report
            .report
            .most_active_users
            .iter()
            .enumerate()
            .map(|(i, a)| {
                vec![
                    (i + 1).to_string(),
                    a.username.clone(),
                    a.posts_count.to_string(),
                    format!("{:.2}", a.average_rating),
                    a.total_views.to_string(),
                ]
            })
            .collect(),
    }
}

fn posts_document(report: &PeriodReport<PostReport>, generated_at: DateTime<Utc>) -> ReportDocument {
    ReportDocument {
        title: "Post popularity report".into(),
        period: report.period.clone(),
        generated_at,
        summary: vec![
            ("Total views".into(), report.report.total_views.to_string()),
            (
                "Average rating".into(),
                format!("{:.2}", report.report.average_post_rating),
            ),
        ],
        columns: ["#", "Title", "Author", "Views", "Rating", "Published"]
            .map(String::from)
            .to_vec(),
        rows: report
            .report
            .popular_posts
            .iter()
            .enumerate()
            .map(|(i, p)| {
                vec![
                    (i + 1).to_string(),
                    p.title.clone(),
                    p.author.clone(),
                    p.views.to_string(),
                    format!("{:.1}", p.rating),
                    p.created_at.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect(),
    }
}

pub struct ReportServiceImpl<R>
where
    R: ReportRepository,
{
    reports: Arc<R>,
}

impl<R> ReportServiceImpl<R>
where
    R: ReportRepository,
{
    pub fn new(reports: Arc<R>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl<R> ReportService for ReportServiceImpl<R>
where
    R: ReportRepository + 'static,
{
    async fn users(&self, period: ReportPeriod) -> Result<PeriodReport<UserReport>, ReportError> {
        let report = self.reports.user_report(period.range(Utc::now())).await?;
        Ok(PeriodReport {
            period: period.describe(),
            report,
        })
    }

    async fn posts(&self, period: ReportPeriod) -> Result<PeriodReport<PostReport>, ReportError> {
        let report = self.reports.post_report(period.range(Utc::now())).await?;
        Ok(PeriodReport {
            period: period.describe(),
            report,
        })
    }

    async fn export(
        &self,
        report_type: &str,
        format: &str,
        period: ReportPeriod,
    ) -> Result<ExportFile, ReportError> {
        let kind = ReportType::parse(report_type)
            .ok_or_else(|| ReportError::UnknownType(report_type.to_string()))?;
        let format =
            ExportFormat::parse(format).ok_or_else(|| ReportError::UnknownFormat(format.to_string()))?;

        let now = Utc::now();
        let (document, stem) = match kind {
            ReportType::Users => (users_document(&self.users(period).await?, now), "users-report"),
            ReportType::Posts => (posts_document(&self.posts(period).await?, now), "posts-report"),
        };

        let bytes = match format {
            ExportFormat::Pdf => render_pdf(&document)?,
            ExportFormat::Word => render_docx(&document)?,
        };

        tracing::info!(report = stem, format = format.extension(), size = bytes.len(), "Report exported");
        Ok(ExportFile {
            file_name: format!("{}-{}.{}", stem, now.format("%Y%m%d"), format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorStanding, MockReportRepository};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test_case(None, ReportPeriod::AllTime)]
    #[test_case(Some("today"), ReportPeriod::Today)]
    #[test_case(Some("this_week"), ReportPeriod::ThisWeek)]
    #[test_case(Some("decade"), ReportPeriod::AllTime)]
    #[test_case(Some("custom"), ReportPeriod::AllTime)]
    fn parses_period(raw: Option<&str>, expected: ReportPeriod) {
        assert_eq!(ReportPeriod::parse(raw, None, None), expected);
    }

    #[test]
    fn custom_period_covers_whole_end_day() {
        let period = ReportPeriod::parse(Some("custom"), Some("2024-03-01"), Some("2024-03-31"));
        assert_eq!(
            period,
            ReportPeriod::Custom {
                start: at(2024, 3, 1, 0),
                end: at(2024, 3, 31, 23) + Duration::seconds(3599),
            }
        );
        assert_eq!(period.describe(), "From 2024-03-01 to 2024-03-31");
    }

    #[test]
    fn ranges_start_at_calendar_boundaries() {
        // Thursday
        let now = at(2024, 5, 16, 15);

        assert_eq!(ReportPeriod::AllTime.range(now), None);
        assert_eq!(ReportPeriod::Today.range(now).unwrap().start, at(2024, 5, 16, 0));
        assert_eq!(ReportPeriod::ThisWeek.range(now).unwrap().start, at(2024, 5, 13, 0));
        assert_eq!(ReportPeriod::ThisMonth.range(now).unwrap().start, at(2024, 5, 1, 0));
        assert_eq!(ReportPeriod::ThisYear.range(now).unwrap().start, at(2024, 1, 1, 0));
        assert_eq!(ReportPeriod::ThisYear.range(now).unwrap().end, now);
    }

    fn user_report() -> UserReport {
        UserReport {
            active_users_count: 1,
            average_user_rating: 4.5,
            most_active_users: vec![AuthorStanding {
                id: 1,
                username: "erin".into(),
                posts_count: 3,
                average_rating: 4.5,
                total_views: 90,
            }],
        }
    }

    #[tokio::test]
    async fn exports_word_attachment() {
        let mut repo = MockReportRepository::new();
        repo.expect_user_report().returning(|_| Ok(user_report()));

        let file = ReportServiceImpl::new(Arc::new(repo))
            .export("users", "word", ReportPeriod::AllTime)
            .await
            .unwrap();

        assert!(file.file_name.starts_with("users-report-"));
        assert!(file.file_name.ends_with(".docx"));
        assert!(file.content_type.contains("wordprocessingml"));
        assert!(file.bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn rejects_unknown_type_and_format() {
        let service = ReportServiceImpl::new(Arc::new(MockReportRepository::new()));

        assert!(matches!(
            service.export("comments", "pdf", ReportPeriod::AllTime).await,
            Err(ReportError::UnknownType(_))
        ));
        assert!(matches!(
            service.export("users", "csv", ReportPeriod::AllTime).await,
            Err(ReportError::UnknownFormat(_))
        ));
    }
}
