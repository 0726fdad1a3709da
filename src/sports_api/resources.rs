use crate::sports_api::client::SportsCloudClient;
use crate::sports_api::pagination::Paging;
use crate::sports_api::types::{ApiError, SportsCloudError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result variables requested when the caller does not name any
pub const DEFAULT_RESULT_VARIABLES: [&str; 3] = ["trimp", "trimpPerMinute", "heartRateAverage"];

/// Customer account the consumer has been granted access to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub authorized_by: Option<AuthorizedBy>,
}

/// Coach who approved API access to an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedBy {
    pub coach_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub coach_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    pub athlete_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Athlete {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Team with its sub-groups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: i64,
    pub name: String,
    #[serde(default)]
    pub athlete_ids: Vec<i64>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: i64,
    pub name: String,
    #[serde(default)]
    pub athlete_ids: Vec<i64>,
}

/// Recorded measurement (not its analysis results). Times are UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub measurement_id: i64,
    #[serde(default)]
    pub athlete_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
}

/// Analysis results (TRIMP, heart rate, ...) for one measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResults {
    pub measurement_id: i64,
    #[serde(default)]
    pub athlete_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub variables: Vec<ResultVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
}

impl MeasurementResults {
    pub fn variable(&self, name: &str) -> Option<&ResultVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// One analysis variable; scalar or (possibly encoded) time series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultVariable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub value: Value,
}

fn decode_record<T: DeserializeOwned>(record: Value) -> Result<T, SportsCloudError> {
    serde_json::from_value(record).map_err(|e| {
        tracing::error!("Failed to parse record: {}", e);
        SportsCloudError::Fatal(ApiError::Parse(format!("Failed to parse record: {}", e)))
    })
}

/// Pull a list out of a body that is either a bare array or `{field: [...]}`
fn decode_list<T: DeserializeOwned>(mut body: Value, field: &str) -> Result<Vec<T>, SportsCloudError> {
    let list = match body {
        Value::Array(_) => body,
        _ => body.get_mut(field).map(Value::take).unwrap_or(Value::Null),
    };
    match list {
        Value::Array(items) => items.into_iter().map(decode_record).collect(),
        _ => Err(SportsCloudError::Fatal(ApiError::Parse(format!(
            "Expected '{}' list in response",
            field
        )))),
    }
}

impl SportsCloudClient {
    /// Accounts the consumer has access to
    ///
    /// An empty list means no account owner has granted access yet.
    pub fn accounts(&mut self) -> Result<Vec<Account>, SportsCloudError> {
        let response = self.get("/v1/sports/accounts/", &[])?;
        let accounts: Vec<Account> = decode_list(response.body, "accounts")?;
        tracing::info!("Found {} accessible accounts", accounts.len());
        Ok(accounts)
    }

    pub fn account_coaches(&mut self, account_id: &str) -> Result<Vec<Coach>, SportsCloudError> {
        let response = self.get(&format!("/v1/sports/accounts/{}/coaches", account_id), &[])?;
        decode_list(response.body, "coaches")
    }

    /// Teams and their groups, fetched page by page
    pub fn account_teams(
        &mut self,
        account_id: &str,
    ) -> impl Iterator<Item = Result<Team, SportsCloudError>> + '_ {
        self.paginate_with(
            format!("/v1/sports/accounts/{}/teams", account_id),
            Vec::new(),
            Paging::offset("teams"),
        )
        .map(|record| record.and_then(decode_record::<Team>))
    }

    /// All athletes on the account, including those not assigned to a team
    pub fn account_athletes(
        &mut self,
        account_id: &str,
    ) -> impl Iterator<Item = Result<Athlete, SportsCloudError>> + '_ {
        self.paginate_with(
            format!("/v1/sports/accounts/{}/athletes", account_id),
            Vec::new(),
            Paging::offset("athletes"),
        )
        .map(|record| record.and_then(decode_record::<Athlete>))
    }

    pub fn athlete_measurements(
        &mut self,
        account_id: &str,
        athlete_id: i64,
    ) -> impl Iterator<Item = Result<Measurement, SportsCloudError>> + '_ {
        self.paginate_with(
            format!(
                "/v1/sports/accounts/{}/athletes/{}/measurements",
                account_id, athlete_id
            ),
            Vec::new(),
            Paging::offset("measurements"),
        )
        .map(|record| record.and_then(decode_record::<Measurement>))
    }

    /// Analysis results for one measurement
    ///
    /// Requests only the named variables (`var=a,b,c`), or
    /// [`DEFAULT_RESULT_VARIABLES`] when `variables` is empty. Waits out
    /// `202 Accepted` while the server analyses older data.
    pub fn measurement_results(
        &mut self,
        account_id: &str,
        athlete_id: i64,
        measurement_id: i64,
        variables: &[String],
    ) -> Result<MeasurementResults, SportsCloudError> {
        let var = if variables.is_empty() {
            DEFAULT_RESULT_VARIABLES.join(",")
        } else {
            variables.join(",")
        };
        let path = format!(
            "/v1/sports/accounts/{}/athletes/{}/measurements/{}/results",
            account_id, athlete_id, measurement_id
        );

        let response = self.get_with_polling(&path, &[("var".to_string(), var)])?;
        response.json()
    }
}
