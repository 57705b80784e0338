// Dashboard aggregation - pure reshaping over the in-memory history list.
// `now` is always injected so the math is testable.
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EmailStatus, SearchRecord};

/// Headline numbers for the dashboard screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_searches: usize,
    pub verified_emails: u32,
    /// Share of verified findings among all findings seen, 0-100.
    pub success_rate: f64,
    /// Searches this month vs the month before, in percent.
    pub monthly_growth: f64,
    /// Searches this week vs the week before, in percent.
    pub weekly_growth: f64,
}

/// One bucket of the discovery trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryTrend {
    pub points: Vec<TrendPoint>,
    /// True when the chart shows weeks of the current month, false when it
    /// shows the trailing six calendar months.
    pub weekly: bool,
}

/// One row of the "recent activity" feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub email: String,
    pub status: String,
    pub time: String,
    /// Confidence, 0-100.
    pub confidence: f64,
}

fn ratio_percent(part: i64, whole: i64) -> f64 {
    // Empty denominators read as "no change", never NaN.
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

fn growth_percent(current: usize, prior: usize) -> f64 {
    if prior == 0 {
        return 0.0;
    }
    ((current as f64 - prior as f64) / prior as f64) * 100.0
}

/// Totals, verified count, success rate and the two growth figures.
///
/// Growth compares rolling windows anchored at `now`: the last month against
/// the month before it, and the last 7 days against the 7 days before those.
pub fn calculate_metrics(history: &[SearchRecord], now: DateTime<Utc>) -> DashboardMetrics {
    let total_searches = history.len();
    let mut verified_emails = 0u32;
    let mut total_emails = 0i64;

    for record in history {
        for finding in record.email_findings() {
            total_emails += 1;
            if finding.status == EmailStatus::Safe {
                verified_emails += 1;
            }
        }
    }

    let one_month_ago = now - Months::new(1);
    let two_months_ago = now - Months::new(2);
    let one_week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let this_month = history.iter().filter(|r| r.created_at > one_month_ago).count();
    let prior_month = history
        .iter()
        .filter(|r| r.created_at <= one_month_ago && r.created_at > two_months_ago)
        .count();
    let this_week = history.iter().filter(|r| r.created_at > one_week_ago).count();
    let prior_week = history
        .iter()
        .filter(|r| r.created_at <= one_week_ago && r.created_at > two_weeks_ago)
        .count();

    DashboardMetrics {
        total_searches,
        verified_emails,
        success_rate: ratio_percent(verified_emails as i64, total_emails),
        monthly_growth: growth_percent(this_month, prior_month),
        weekly_growth: growth_percent(this_week, prior_week),
    }
}

fn in_month(record: &SearchRecord, now: DateTime<Utc>) -> bool {
    record.created_at.month() == now.month() && record.created_at.year() == now.year()
}

/// Weekly buckets while every record sits in the current calendar month,
/// otherwise the trailing six calendar months, zero-seeded and chronological.
pub fn discovery_trend(history: &[SearchRecord], now: DateTime<Utc>) -> DiscoveryTrend {
    let all_current_month = history.iter().all(|r| in_month(r, now));

    if all_current_month {
        // Week labels sized to how far into the month we are, counting weeks
        // the way a wall calendar does (first partial week included).
        let first_weekday = now
            .date_naive()
            .with_day(1)
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0);
        let weeks_in_month = ((now.day() + first_weekday + 6) / 7).max(1);

        let mut counts = vec![0u32; weeks_in_month as usize];
        for record in history {
            let week = (record.created_at.day() - 1) / 7;
            if let Some(slot) = counts.get_mut(week as usize) {
                *slot += 1;
            }
        }

        let points = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| TrendPoint {
                label: format!("Week {}", i + 1),
                count,
            })
            .collect();

        return DiscoveryTrend {
            points,
            weekly: true,
        };
    }

    // Six months back, anchored on the first of the month so partial months
    // never fall out of the window.
    let anchor = {
        let first = now.date_naive().with_day(1).unwrap_or(now.date_naive());
        first - Months::new(5)
    };

    let mut counts = vec![0u32; 6];
    for record in history {
        let date = record.created_at.date_naive();
        if date < anchor {
            continue;
        }
        let offset =
            (date.year() - anchor.year()) * 12 + date.month() as i32 - anchor.month() as i32;
        if let Some(slot) = counts.get_mut(offset as usize) {
            *slot += 1;
        }
    }

    let points = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| TrendPoint {
            label: (anchor + Months::new(i as u32)).format("%b").to_string(),
            count,
        })
        .collect();

    DiscoveryTrend {
        points,
        weekly: false,
    }
}

/// The four most recent records projected into feed rows. The caller keeps
/// history sorted descending by creation time.
pub fn recent_activity(history: &[SearchRecord]) -> Vec<ActivityEntry> {
    history
        .iter()
        .take(4)
        .map(|record| {
            let time = record.created_at.format("%b %e, %Y %H:%M").to_string();
            match record.first_finding() {
                Some(finding) => ActivityEntry {
                    email: finding.email.clone(),
                    status: match finding.status {
                        EmailStatus::Safe => "Verified".to_string(),
                        EmailStatus::Partial => "Partial".to_string(),
                        _ => "Failed".to_string(),
                    },
                    time,
                    confidence: finding.success_rate,
                },
                None => ActivityEntry {
                    email: "No results".to_string(),
                    status: "Failed".to_string(),
                    time,
                    confidence: 0.0,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CompanyLookup, EmailFinding, PersonLookup, SearchOutcome,
    };
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn finding(id: i64, status: EmailStatus, created_at: DateTime<Utc>) -> EmailFinding {
        EmailFinding {
            id,
            email: format!("lead{}@example.com", id),
            status,
            success_rate: 91.0,
            created_at,
        }
    }

    fn person_record(id: i64, created_at: DateTime<Utc>, status: EmailStatus) -> SearchRecord {
        SearchRecord {
            id,
            created_at,
            user_id: 1,
            outcome: SearchOutcome::Person(vec![PersonLookup {
                name: "Ada".into(),
                company: "Engines".into(),
                email: Some(finding(id * 10, status, created_at)),
            }]),
        }
    }

    fn company_record(id: i64, created_at: DateTime<Utc>, statuses: &[EmailStatus]) -> SearchRecord {
        SearchRecord {
            id,
            created_at,
            user_id: 1,
            outcome: SearchOutcome::Company(vec![CompanyLookup {
                company: "Acme".into(),
                emails: statuses
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| finding(id * 10 + i as i64, s, created_at))
                    .collect(),
            }]),
        }
    }

    fn empty_person_record(id: i64, created_at: DateTime<Utc>) -> SearchRecord {
        SearchRecord {
            id,
            created_at,
            user_id: 1,
            outcome: SearchOutcome::Person(vec![PersonLookup {
                name: "Nobody".into(),
                company: "Nowhere".into(),
                email: None,
            }]),
        }
    }

    #[test]
    fn test_metrics_count_only_findings_present() {
        // One person search this month (safe), one company search three
        // months back with two findings (safe + partial).
        let now = at(2025, 6, 15);
        let history = vec![
            person_record(1, at(2025, 6, 10), EmailStatus::Safe),
            company_record(2, at(2025, 3, 20), &[EmailStatus::Safe, EmailStatus::Partial]),
        ];

        let metrics = calculate_metrics(&history, now);
        assert_eq!(metrics.total_searches, 2);
        assert_eq!(metrics.verified_emails, 2);
        assert!((metrics.success_rate - 66.6667).abs() < 0.01);
    }

    #[test]
    fn test_zero_denominators_yield_zero_not_nan() {
        let now = at(2025, 6, 15);

        let metrics = calculate_metrics(&[], now);
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.monthly_growth, 0.0);
        assert_eq!(metrics.weekly_growth, 0.0);

        // Findings exist only in the current windows; the prior buckets are
        // empty so growth still reads 0.
        let history = vec![person_record(1, at(2025, 6, 14), EmailStatus::NotFound)];
        let metrics = calculate_metrics(&history, now);
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.monthly_growth, 0.0);
        assert_eq!(metrics.weekly_growth, 0.0);
    }

    #[test]
    fn test_growth_compares_rolling_windows() {
        let now = at(2025, 6, 15);
        let history = vec![
            // This week: 2 searches.
            person_record(1, at(2025, 6, 14), EmailStatus::Safe),
            person_record(2, at(2025, 6, 13), EmailStatus::Safe),
            // The week before: 1 search (also inside the current month window).
            person_record(3, at(2025, 6, 4), EmailStatus::Safe),
            // Prior month window: 1 search.
            person_record(4, at(2025, 4, 20), EmailStatus::Safe),
        ];

        let metrics = calculate_metrics(&history, now);
        assert!((metrics.weekly_growth - 100.0).abs() < f64::EPSILON);
        // 3 searches in the last month vs 1 in the month before.
        assert!((metrics.monthly_growth - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trend_is_weekly_when_history_fits_current_month() {
        // June 1st 2025 is a Sunday, so June 15th sits in week 3.
        let now = at(2025, 6, 15);
        let history = vec![
            person_record(1, at(2025, 6, 2), EmailStatus::Safe),
            person_record(2, at(2025, 6, 10), EmailStatus::Safe),
        ];

        let trend = discovery_trend(&history, now);
        assert!(trend.weekly);
        assert_eq!(trend.points.len(), 3);
        assert_eq!(trend.points[0], TrendPoint { label: "Week 1".into(), count: 1 });
        assert_eq!(trend.points[1], TrendPoint { label: "Week 2".into(), count: 1 });
        assert_eq!(trend.points[2], TrendPoint { label: "Week 3".into(), count: 0 });
    }

    #[test]
    fn test_trend_is_monthly_with_zero_filled_buckets() {
        let now = at(2025, 6, 15);
        let history = vec![
            person_record(1, at(2025, 6, 10), EmailStatus::Safe),
            person_record(2, at(2025, 3, 20), EmailStatus::Safe),
            // Outside the six-month window entirely.
            person_record(3, at(2024, 11, 1), EmailStatus::Safe),
        ];

        let trend = discovery_trend(&history, now);
        assert!(!trend.weekly);
        let labels: Vec<&str> = trend.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        let counts: Vec<u32> = trend.points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_recent_activity_caps_at_four_and_maps_statuses() {
        let history = vec![
            person_record(1, at(2025, 6, 14), EmailStatus::Safe),
            person_record(2, at(2025, 6, 13), EmailStatus::Partial),
            person_record(3, at(2025, 6, 12), EmailStatus::NotFound),
            empty_person_record(4, at(2025, 6, 11)),
            person_record(5, at(2025, 6, 10), EmailStatus::Safe),
        ];

        let activity = recent_activity(&history);
        assert_eq!(activity.len(), 4);
        assert_eq!(activity[0].status, "Verified");
        assert_eq!(activity[1].status, "Partial");
        assert_eq!(activity[2].status, "Failed");
        assert_eq!(activity[3].email, "No results");
        assert_eq!(activity[3].confidence, 0.0);
    }
}
