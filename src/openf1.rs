//! Driver lookup against the OpenF1 REST API.
//!
//! `GET {base_url}?driver_number={n}` returns a JSON array with one record
//! per session the driver took part in. Only the first record is used.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Public OpenF1 drivers endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1/drivers";

/// Driver record as returned by OpenF1.
///
/// OpenF1 sends `null` for fields it has no data for, so everything except
/// the number is optional. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverRecord {
    pub driver_number: u32,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub headshot_url: Option<String>,
}

/// Display data for one driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverProfile {
    pub full_name: String,
    pub number: u32,
    pub team_name: String,
    pub headshot_url: Option<String>,
}

impl From<DriverRecord> for DriverProfile {
    fn from(record: DriverRecord) -> Self {
        Self {
            full_name: record.full_name.unwrap_or_default(),
            number: record.driver_number,
            team_name: record.team_name.unwrap_or_default(),
            headshot_url: record.headshot_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Why a driver profile could not be resolved
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("driver API answered {status} for driver {number}")]
    Status { number: String, status: u16 },

    #[error("invalid driver payload for driver {number}: {source}")]
    Decode {
        number: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no driver found with number {number}")]
    NotFound { number: String },
}

/// Source of driver profiles.
///
/// The gallery only talks to this trait so cards can be driven by a canned
/// source in tests.
pub trait DriverLookup: Send + Sync + 'static {
    fn lookup(&self, number: &str) -> impl Future<Output = Result<DriverProfile, LookupError>> + Send;
}

/// HTTP client for the OpenF1 drivers endpoint
#[derive(Debug, Clone)]
pub struct OpenF1Client {
    http: reqwest::Client,
    base_url: String,
}

impl OpenF1Client {
    /// Create a client. No timeout is applied unless one is given.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every record OpenF1 has for a driver number
    pub async fn fetch_records(&self, number: &str) -> Result<Vec<DriverRecord>, LookupError> {
        tracing::debug!(driver = number, "Requesting driver from {}", self.base_url);

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("driver_number", number)])
            .send()
            .await
            .map_err(|e| LookupError::Http {
                url: self.base_url.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(LookupError::Status {
                number: number.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| LookupError::Http {
            url: self.base_url.clone(),
            source: e,
        })?;

        serde_json::from_slice(&body).map_err(|e| LookupError::Decode {
            number: number.to_string(),
            source: e,
        })
    }

    /// Resolve a driver number to the profile built from its first record
    pub async fn fetch_profile(&self, number: &str) -> Result<DriverProfile, LookupError> {
        self.fetch_records(number)
            .await?
            .into_iter()
            .next()
            .map(DriverProfile::from)
            .ok_or_else(|| LookupError::NotFound {
                number: number.to_string(),
            })
    }
}

impl DriverLookup for OpenF1Client {
    fn lookup(&self, number: &str) -> impl Future<Output = Result<DriverProfile, LookupError>> + Send {
        let number = number.to_string();
        async move { self.fetch_profile(&number).await }
    }
}

/// Canned lookups for unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers from a fixed table; unknown numbers are not found
    #[derive(Default)]
    pub(crate) struct TableLookup {
        pub(crate) profiles: HashMap<String, DriverProfile>,
        pub(crate) calls: AtomicUsize,
    }

    impl TableLookup {
        pub(crate) fn with(mut self, full_name: &str, number: u32, team: &str) -> Self {
            self.profiles.insert(
                number.to_string(),
                DriverProfile {
                    full_name: full_name.into(),
                    number,
                    team_name: team.into(),
                    headshot_url: Some(format!("https://x/{number}.png")),
                },
            );
            self
        }
    }

    impl DriverLookup for TableLookup {
        fn lookup(&self, number: &str) -> impl Future<Output = Result<DriverProfile, LookupError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.profiles.get(number).cloned().ok_or_else(|| LookupError::NotFound {
                number: number.to_string(),
            });
            async move { result }
        }
    }

    pub(crate) fn grid_lookup() -> TableLookup {
        TableLookup::default()
            .with("Max Verstappen", 1, "Red Bull Racing")
            .with("Oscar Piastri", 81, "McLaren")
            .with("Lando Norris", 4, "McLaren")
            .with("Lewis Hamilton", 44, "Ferrari")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenF1Client {
        OpenF1Client::new(format!("{}/v1/drivers", server.uri()), None).unwrap()
    }

    async fn mount(server: &MockServer, number: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/v1/drivers"))
            .and(query_param("driver_number", number))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_first_record_becomes_profile() {
        let server = MockServer::start().await;
        mount(
            &server,
            "1",
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "full_name": "Max Verstappen",
                    "driver_number": 1,
                    "team_name": "Red Bull Racing",
                    "headshot_url": "https://x/1.png",
                    "country_code": "NED",
                    "session_key": 9158
                },
                {
                    "full_name": "Max VERSTAPPEN",
                    "driver_number": 1,
                    "team_name": "Red Bull Racing",
                    "headshot_url": "https://x/other.png"
                }
            ])),
        )
        .await;

        let profile = client_for(&server).fetch_profile("1").await.unwrap();
        assert_eq!(
            profile,
            DriverProfile {
                full_name: "Max Verstappen".into(),
                number: 1,
                team_name: "Red Bull Racing".into(),
                headshot_url: Some("https://x/1.png".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_not_found() {
        let server = MockServer::start().await;
        mount(&server, "999", ResponseTemplate::new(200).set_body_json(serde_json::json!([]))).await;

        let err = client_for(&server).fetch_profile("999").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound { ref number } if number == "999"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        mount(&server, "44", ResponseTemplate::new(503)).await;

        let err = client_for(&server).fetch_profile("44").await.unwrap_err();
        assert!(matches!(err, LookupError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        mount(&server, "4", ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

        let err = client_for(&server).fetch_profile("4").await.unwrap_err();
        assert!(matches!(err, LookupError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_null_fields_tolerated() {
        let server = MockServer::start().await;
        mount(
            &server,
            "81",
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "full_name": "Oscar Piastri",
                    "driver_number": 81,
                    "team_name": null,
                    "headshot_url": null
                }
            ])),
        )
        .await;

        let profile = client_for(&server).lookup("81").await.unwrap();
        assert_eq!(profile.full_name, "Oscar Piastri");
        assert_eq!(profile.team_name, "");
        assert_eq!(profile.headshot_url, None);
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let client = OpenF1Client::new("http://127.0.0.1:1/v1/drivers", Some(Duration::from_secs(2))).unwrap();
        let err = client.fetch_profile("1").await.unwrap_err();
        assert!(matches!(err, LookupError::Http { .. }));
    }
}
