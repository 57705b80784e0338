// TUI application state and event handling
use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use exactmails_core::{
    calculate_metrics, discovery_trend, recent_activity, ActivityEntry, DashboardMetrics,
    DiscoveryTrend, HistoryList, SearchRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,           // Navigating
    ConfirmingDelete, // Waiting for y/n on a delete
}

pub struct App {
    pub should_quit: bool,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub history: HistoryList,
    pub metrics: DashboardMetrics,
    pub trend: DiscoveryTrend,
    pub activity: Vec<ActivityEntry>,
    pub selected_index: usize,
    pub list_state: ListState,
    pub loading: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    /// Record id awaiting delete confirmation.
    pub pending_delete: Option<i64>,
    /// Header line: username and credit counters.
    pub account_line: String,
}

impl App {
    pub fn new(account_line: String) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            tab: Tab::Dashboard,
            input_mode: InputMode::Normal,
            history: HistoryList::new(),
            metrics: DashboardMetrics {
                total_searches: 0,
                verified_emails: 0,
                success_rate: 0.0,
                monthly_growth: 0.0,
                weekly_growth: 0.0,
            },
            trend: DiscoveryTrend {
                points: Vec::new(),
                weekly: true,
            },
            activity: Vec::new(),
            selected_index: 0,
            list_state,
            loading: false,
            error_message: None,
            status_message: None,
            pending_delete: None,
            account_line,
        }
    }

    /// Merge freshly fetched records and recompute every dashboard figure.
    pub fn absorb_history(&mut self, records: Vec<SearchRecord>, now: DateTime<Utc>) {
        self.history.merge(records);
        self.recompute(now);
    }

    /// Insert a just-finished search; it comes back auto-expanded.
    pub fn absorb_new_result(&mut self, record: SearchRecord, now: DateTime<Utc>) {
        self.history.push_new(record);
        self.selected_index = 0;
        self.list_state.select(Some(0));
        self.recompute(now);
    }

    pub fn recompute(&mut self, now: DateTime<Utc>) {
        self.metrics = calculate_metrics(self.history.records(), now);
        self.trend = discovery_trend(self.history.records(), now);
        self.activity = recent_activity(self.history.records());
        if self.selected_index >= self.history.len() && !self.history.is_empty() {
            self.selected_index = self.history.len() - 1;
        }
        self.list_state.select(Some(self.selected_index));
    }

    pub fn next_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Dashboard => Tab::History,
            Tab::History => Tab::Dashboard,
        };
    }

    pub fn next_row(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1).min(self.history.len() - 1);
        self.list_state.select(Some(self.selected_index));
    }

    pub fn previous_row(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.list_state.select(Some(self.selected_index));
    }

    pub fn selected_record(&self) -> Option<&SearchRecord> {
        self.history.get(self.selected_index)
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_record().map(|r| r.id) {
            self.history.toggle(id);
        }
    }

    /// Arm the delete confirmation for the selected record.
    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_record().map(|r| r.id) {
            self.pending_delete = Some(id);
            self.input_mode = InputMode::ConfirmingDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
    }

    /// The backend confirmed the delete; only now does the row disappear.
    pub fn finish_delete(&mut self, id: i64, now: DateTime<Utc>) {
        self.history.remove(id);
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
        self.status_message = Some("Record deleted".to_string());
        self.recompute(now);
    }

    /// The delete call failed; the list stays untouched.
    pub fn fail_delete(&mut self) {
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
        self.error_message = Some("Failed to delete the record. Please try again.".to_string());
    }

    /// First email of the selected record, for the clipboard.
    pub fn copy_target(&self) -> Option<String> {
        self.selected_record()
            .and_then(|r| r.first_finding())
            .map(|f| f.email.clone())
    }

    /// Every verified email of the selected record, newline separated.
    pub fn copy_verified_target(&self) -> Option<String> {
        let record = self.selected_record()?;
        let verified: Vec<&str> = record
            .email_findings()
            .into_iter()
            .filter(|f| f.is_verified())
            .map(|f| f.email.as_str())
            .collect();
        if verified.is_empty() {
            return None;
        }
        Some(verified.join("\n"))
    }

    pub fn open_target(&self) -> Option<String> {
        self.selected_record()
            .and_then(|r| r.linkedin_url())
            .map(|url| url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use exactmails_core::{EmailFinding, EmailStatus, SearchOutcome, SearchRecord};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn record(id: i64, day: u32, status: EmailStatus) -> SearchRecord {
        SearchRecord {
            id,
            created_at: Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0).unwrap(),
            user_id: 1,
            outcome: SearchOutcome::Company(vec![exactmails_core::models::CompanyLookup {
                company: "Acme".into(),
                emails: vec![EmailFinding {
                    id: id * 10,
                    email: format!("lead{}@acme.com", id),
                    status,
                    success_rate: 88.0,
                    created_at: Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0).unwrap(),
                }],
            }]),
        }
    }

    #[test]
    fn test_absorb_history_recomputes_metrics() {
        let mut app = App::new("ada".into());
        app.absorb_history(
            vec![record(1, 10, EmailStatus::Safe), record(2, 11, EmailStatus::Partial)],
            now(),
        );

        assert_eq!(app.metrics.total_searches, 2);
        assert_eq!(app.metrics.verified_emails, 1);
        assert!(app.trend.weekly);
    }

    #[test]
    fn test_new_result_is_selected_and_expanded() {
        let mut app = App::new("ada".into());
        app.absorb_history(vec![record(1, 10, EmailStatus::Safe)], now());

        app.absorb_new_result(record(9, 14, EmailStatus::Safe), now());
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_record().unwrap().id, 9);
        assert!(app.history.is_expanded(9));
    }

    #[test]
    fn test_delete_flow_removes_only_after_confirmation() {
        let mut app = App::new("ada".into());
        app.absorb_history(vec![record(1, 10, EmailStatus::Safe)], now());

        app.request_delete();
        assert_eq!(app.pending_delete, Some(1));
        assert_eq!(app.input_mode, InputMode::ConfirmingDelete);
        assert_eq!(app.history.len(), 1);

        app.fail_delete();
        assert_eq!(app.history.len(), 1);
        assert!(app.error_message.is_some());

        app.request_delete();
        app.finish_delete(1, now());
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_copy_targets() {
        let mut app = App::new("ada".into());
        app.absorb_history(
            vec![record(1, 10, EmailStatus::Safe), record(2, 11, EmailStatus::NotFound)],
            now(),
        );

        // Sorted descending: index 0 is record 2 (day 11).
        assert_eq!(app.copy_target(), Some("lead2@acme.com".into()));
        assert!(app.copy_verified_target().is_none());

        app.next_row();
        assert_eq!(app.copy_verified_target(), Some("lead1@acme.com".into()));
    }
}
