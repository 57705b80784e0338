use chrono::{DateTime, Utc};
use exactmails_api::history as wire;
use serde::{Deserialize, Serialize};

pub use exactmails_api::history::EmailStatus;

/// A single candidate email with its verification outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailFinding {
    pub id: i64,
    pub email: String,
    pub status: EmailStatus,
    /// Confidence, 0-100.
    pub success_rate: f64,
    pub created_at: DateTime<Utc>,
}

impl EmailFinding {
    pub fn is_verified(&self) -> bool {
        self.status == EmailStatus::Safe
    }
}

/// Display labels for the history list. The dashboard activity feed uses its
/// own mapping where anything that isn't safe/partial reads "Failed".
pub fn status_label(status: EmailStatus) -> &'static str {
    match status {
        EmailStatus::Safe => "Verified",
        EmailStatus::Partial => "Partial",
        EmailStatus::NotFound => "Not Found",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyLookup {
    pub company: String,
    pub emails: Vec<EmailFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonLookup {
    pub name: String,
    pub company: String,
    pub email: Option<EmailFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInLookup {
    pub name: String,
    pub company: String,
    pub linkedin_url: String,
    pub email: Option<EmailFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMakerLookup {
    pub name: String,
    pub position: String,
    pub company: String,
    pub linkedin_url: Option<String>,
    pub email: Option<EmailFinding>,
}

/// Payload of one history record, tagged by the lookup kind that produced it.
///
/// The wire format carries four parallel arrays with only the one matching
/// `search_type` populated; modeling it as a proper sum type keeps the
/// "exactly one shape" invariant in the type system instead of in comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchOutcome {
    Company(Vec<CompanyLookup>),
    Person(Vec<PersonLookup>),
    LinkedIn(Vec<LinkedInLookup>),
    DecisionMaker(Vec<DecisionMakerLookup>),
}

/// Which lookup kind produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchKind {
    Company,
    Person,
    LinkedIn,
    DecisionMaker,
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchKind::Company => write!(f, "Company Search"),
            SearchKind::Person => write!(f, "Person Search"),
            SearchKind::LinkedIn => write!(f, "LinkedIn Search"),
            SearchKind::DecisionMaker => write!(f, "Decision Maker Search"),
        }
    }
}

/// One persisted lookup outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub outcome: SearchOutcome,
}

impl SearchRecord {
    pub fn kind(&self) -> SearchKind {
        match self.outcome {
            SearchOutcome::Company(_) => SearchKind::Company,
            SearchOutcome::Person(_) => SearchKind::Person,
            SearchOutcome::LinkedIn(_) => SearchKind::LinkedIn,
            SearchOutcome::DecisionMaker(_) => SearchKind::DecisionMaker,
        }
    }

    /// Every email finding in this record. Company lookups can carry many;
    /// the other kinds at most one per lookup entry.
    pub fn email_findings(&self) -> Vec<&EmailFinding> {
        match &self.outcome {
            SearchOutcome::Company(lookups) => lookups
                .iter()
                .flat_map(|lookup| lookup.emails.iter())
                .collect(),
            SearchOutcome::Person(lookups) => {
                lookups.iter().filter_map(|l| l.email.as_ref()).collect()
            }
            SearchOutcome::LinkedIn(lookups) => {
                lookups.iter().filter_map(|l| l.email.as_ref()).collect()
            }
            SearchOutcome::DecisionMaker(lookups) => {
                lookups.iter().filter_map(|l| l.email.as_ref()).collect()
            }
        }
    }

    /// First available finding, used for list headers and the activity feed.
    pub fn first_finding(&self) -> Option<&EmailFinding> {
        self.email_findings().into_iter().next()
    }

    /// Display name of whoever/whatever was looked up.
    pub fn subject(&self) -> Option<&str> {
        match &self.outcome {
            SearchOutcome::Company(lookups) => lookups.first().map(|l| l.company.as_str()),
            SearchOutcome::Person(lookups) => lookups.first().map(|l| l.name.as_str()),
            SearchOutcome::LinkedIn(lookups) => lookups.first().map(|l| l.name.as_str()),
            SearchOutcome::DecisionMaker(lookups) => lookups.first().map(|l| l.name.as_str()),
        }
    }

    /// LinkedIn profile URL when the lookup kind carries one.
    pub fn linkedin_url(&self) -> Option<&str> {
        match &self.outcome {
            SearchOutcome::LinkedIn(lookups) => lookups.first().map(|l| l.linkedin_url.as_str()),
            SearchOutcome::DecisionMaker(lookups) => {
                lookups.first().and_then(|l| l.linkedin_url.as_deref())
            }
            _ => None,
        }
    }
}

fn finding_from_wire(result: wire::EmailFinderResult) -> EmailFinding {
    EmailFinding {
        id: result.id,
        email: result.email,
        status: result.status,
        success_rate: result.success_rate,
        created_at: result.created_at,
    }
}

/// Convert a wire record into the tagged domain model.
///
/// Only the array matching the discriminant is kept; the other three are
/// ignored whatever they contain. A missing or empty matching array yields an
/// empty payload rather than an error (the UI renders it as "No results").
pub fn record_from_wire(record: wire::SearchHistoryRecord) -> SearchRecord {
    let outcome = match record.search_type {
        wire::SearchType::CompanySearch => SearchOutcome::Company(
            record
                .company_search_results
                .into_iter()
                .map(|r| CompanyLookup {
                    company: r.company,
                    emails: r
                        .initial_search
                        .email_finder_results
                        .into_iter()
                        .map(finding_from_wire)
                        .collect(),
                })
                .collect(),
        ),
        wire::SearchType::PersonSearch => SearchOutcome::Person(
            record
                .person_search_results
                .into_iter()
                .map(|r| PersonLookup {
                    name: r.name,
                    company: r.company,
                    email: r.email_finder_result.map(finding_from_wire),
                })
                .collect(),
        ),
        wire::SearchType::LinkedinSearch => SearchOutcome::LinkedIn(
            record
                .linkedin_search_results
                .into_iter()
                .map(|r| LinkedInLookup {
                    name: r.name,
                    company: r.company,
                    linkedin_url: r.linkedin_url,
                    email: r.email_finder_result.map(finding_from_wire),
                })
                .collect(),
        ),
        wire::SearchType::DecisionMakerSearch => SearchOutcome::DecisionMaker(
            record
                .decision_maker_search_results
                .into_iter()
                .map(|r| DecisionMakerLookup {
                    name: r.name,
                    position: r.position,
                    company: r.company,
                    linkedin_url: r.linkedin_url,
                    email: r.email_finder_result.map(finding_from_wire),
                })
                .collect(),
        ),
    };

    SearchRecord {
        id: record.id,
        created_at: record.created_at,
        user_id: record.user_id,
        outcome,
    }
}

pub fn records_from_wire(records: Vec<wire::SearchHistoryRecord>) -> Vec<SearchRecord> {
    records.into_iter().map(record_from_wire).collect()
}
