use std::collections::HashSet;

use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, UpError};
use crate::filters::{AccountQuery, QueryParams, TransactionQuery};
use crate::models::{Account, Page, Transaction};
use crate::settings::Settings;

pub const API_KEY_VAR: &str = "UPBANK_API_KEY";

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// A single blocking GET with bearer auth. No retries.
pub trait Transport {
    fn get(&self, url: &str, bearer: &str) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, bearer: &str) -> Result<HttpResponse> {
        (**self).get(url, bearer)
    }
}

pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("upbank/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpError::Network(e.to_string()))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, bearer: &str) -> Result<HttpResponse> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| UpError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| UpError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Authenticated API client. Built once per command and passed by reference.
pub struct Client<T = HttpTransport> {
    transport: T,
    api_key: String,
    base_url: String,
    max_pages: usize,
}

impl Client<HttpTransport> {
    /// Read the API key from `UPBANK_API_KEY`. Fails before any request is
    /// made when the variable is unset or blank.
    pub fn from_env(settings: &Settings) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(UpError::MissingCredential(API_KEY_VAR))?;
        Ok(Self::new(HttpTransport::new()?, api_key, settings))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, api_key: String, settings: &Settings) -> Self {
        Self {
            transport,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_pages: settings.max_pages,
        }
    }

    pub fn accounts(&self, query: &AccountQuery) -> Result<Vec<Account>> {
        self.fetch_all("accounts", &query.params())
    }

    pub fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.fetch_all("transactions", &query.params())
    }

    /// Fetch every page of `resource`, following `links.next` until it is
    /// absent. The next link is requested verbatim; `params` only shape the
    /// first request. Any failure discards the records gathered so far.
    pub fn fetch_all<R: DeserializeOwned>(&self, resource: &str, params: &QueryParams) -> Result<Vec<R>> {
        let mut url = self.resource_url(resource, params)?;
        let mut visited = HashSet::new();
        let mut records = Vec::new();
        let mut pages = 0usize;

        loop {
            if !visited.insert(url.clone()) {
                return Err(UpError::Pagination(format!("next link points back to {url}")));
            }
            pages += 1;
            if pages > self.max_pages {
                return Err(UpError::Pagination(format!(
                    "{resource} did not finish within {} pages",
                    self.max_pages
                )));
            }

            debug!(resource, page = pages, %url, "requesting page");
            let response = self.transport.get(&url, &self.api_key)?;
            if response.status != 200 {
                return Err(UpError::HttpStatus {
                    status: response.status,
                });
            }

            let page: Page<R> = serde_json::from_str(&response.body)?;
            debug!(resource, page = pages, records = page.data.len(), "decoded page");
            records.extend(page.data);

            match page.links.next {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }

        debug!(resource, pages, records = records.len(), "fetch complete");
        Ok(records)
    }

    fn resource_url(&self, resource: &str, params: &QueryParams) -> Result<String> {
        let mut url = Url::parse(&format!("{}/{resource}", self.base_url))
            .map_err(|e| UpError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.into())
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testing::{ok, status, FakeTransport};
    use super::*;

    fn tx(id: &str, created_at: &str, cents: i64) -> serde_json::Value {
        json!({
            "type": "transactions",
            "id": id,
            "attributes": {
                "status": "SETTLED",
                "description": format!("Transaction {id}"),
                "message": null,
                "amount": {"currencyCode": "AUD", "value": format!("{:.2}", cents as f64 / 100.0), "valueInBaseUnits": cents},
                "foreignAmount": null,
                "settledAt": created_at,
                "createdAt": created_at
            },
            "relationships": {
                "category": {"data": null},
                "tags": {"data": []}
            }
        })
    }

    fn page(ids: &[&str], next: Option<&str>) -> serde_json::Value {
        let data: Vec<_> = ids.iter().map(|id| tx(id, "2024-01-01T10:00:00+11:00", -100)).collect();
        json!({"data": data, "links": {"prev": null, "next": next}})
    }

    fn settings() -> Settings {
        Settings {
            base_url: "https://api.test/api/v1/".to_string(),
            ..Settings::default()
        }
    }

    fn ids(txs: &[Transaction]) -> Vec<&str> {
        txs.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_follows_next_links_in_order() {
        let fake = FakeTransport::with(vec![
            ok(page(&["a", "b"], Some("https://api.test/api/v1/transactions?page[after]=p2"))),
            ok(page(&["c"], Some("https://api.test/api/v1/transactions?page[after]=p3"))),
            ok(page(&["d", "e"], None)),
        ]);
        let client = Client::new(&fake, "secret".to_string(), &settings());
        let query = TransactionQuery {
            status: Some("SETTLED".to_string()),
            ..TransactionQuery::default()
        };

        let txs = client.transactions(&query).unwrap();

        assert_eq!(ids(&txs), vec!["a", "b", "c", "d", "e"]);
        let urls = fake.urls();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[1], "https://api.test/api/v1/transactions?page[after]=p2");
        assert_eq!(urls[2], "https://api.test/api/v1/transactions?page[after]=p3");
        assert!(fake.requests.borrow().iter().all(|(_, bearer)| bearer == "secret"));
    }

    #[test]
    fn test_first_request_carries_encoded_filters() {
        let fake = FakeTransport::with(vec![ok(page(&[], None))]);
        let client = Client::new(&fake, "k".to_string(), &settings());
        let query = TransactionQuery {
            status: Some("HELD".to_string()),
            since: Some(chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00+10:00").unwrap()),
            tag: Some("Pizza Night".to_string()),
            ..TransactionQuery::default()
        };

        client.transactions(&query).unwrap();

        let urls = fake.urls();
        let url = Url::parse(&urls[0]).unwrap();
        assert_eq!(url.path(), "/api/v1/transactions");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("filter[status]".to_string(), "HELD".to_string()),
                ("filter[since]".to_string(), "2024-01-01T00:00:00+10:00".to_string()),
                ("filter[tag]".to_string(), "Pizza Night".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_params_means_no_query_string() {
        let fake = FakeTransport::with(vec![ok(json!({"data": []}))]);
        let client = Client::new(&fake, "k".to_string(), &settings());
        let accounts = client.accounts(&AccountQuery::default()).unwrap();
        assert!(accounts.is_empty());
        assert_eq!(fake.urls(), vec!["https://api.test/api/v1/accounts".to_string()]);
    }

    #[test]
    fn test_status_failure_mid_fetch_returns_no_records() {
        let fake = FakeTransport::with(vec![
            ok(page(&["a"], Some("https://api.test/p2"))),
            status(500),
            ok(page(&["c"], None)),
        ]);
        let client = Client::new(&fake, "k".to_string(), &settings());

        let err = client.transactions(&TransactionQuery::default()).unwrap_err();

        assert!(matches!(err, UpError::HttpStatus { status: 500 }));
        assert_eq!(fake.urls().len(), 2);
    }

    #[test]
    fn test_unauthorized_is_status_error() {
        let fake = FakeTransport::with(vec![status(401)]);
        let client = Client::new(&fake, "bad".to_string(), &settings());
        let err = client.accounts(&AccountQuery::default()).unwrap_err();
        assert!(matches!(err, UpError::HttpStatus { status: 401 }));
        assert_eq!(err.to_string(), "API request failed with status: 401");
    }

    #[test]
    fn test_transport_error_propagates() {
        let fake = FakeTransport::with(vec![Err(UpError::Network("connection refused".to_string()))]);
        let client = Client::new(&fake, "k".to_string(), &settings());
        let err = client.accounts(&AccountQuery::default()).unwrap_err();
        assert!(matches!(err, UpError::Network(_)));
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let fake = FakeTransport::with(vec![Ok(HttpResponse {
            status: 200,
            body: "<html>maintenance</html>".to_string(),
        })]);
        let client = Client::new(&fake, "k".to_string(), &settings());
        let err = client.transactions(&TransactionQuery::default()).unwrap_err();
        assert!(matches!(err, UpError::Decode(_)));
    }

    #[test]
    fn test_self_referential_next_link_is_rejected() {
        let loop_url = "https://api.test/api/v1/transactions?page[after]=same";
        let fake = FakeTransport::with(vec![
            ok(page(&["a"], Some(loop_url))),
            ok(page(&["b"], Some(loop_url))),
        ]);
        let client = Client::new(&fake, "k".to_string(), &settings());

        let err = client.transactions(&TransactionQuery::default()).unwrap_err();

        assert!(matches!(err, UpError::Pagination(_)));
        assert_eq!(fake.urls().len(), 2);
    }

    #[test]
    fn test_page_bound_stops_runaway_pagination() {
        let fake = FakeTransport::with(vec![
            ok(page(&["a"], Some("https://api.test/p2"))),
            ok(page(&["b"], Some("https://api.test/p3"))),
            ok(page(&["c"], Some("https://api.test/p4"))),
        ]);
        let settings = Settings {
            max_pages: 2,
            ..settings()
        };
        let client = Client::new(&fake, "k".to_string(), &settings);

        let err = client.transactions(&TransactionQuery::default()).unwrap_err();

        assert!(matches!(err, UpError::Pagination(_)));
        assert_eq!(fake.urls().len(), 2);
    }

    #[test]
    fn test_invalid_base_url() {
        let fake = FakeTransport::default();
        let settings = Settings {
            base_url: "not a url".to_string(),
            ..Settings::default()
        };
        let client = Client::new(&fake, "k".to_string(), &settings);
        let err = client.accounts(&AccountQuery::default()).unwrap_err();
        assert!(matches!(err, UpError::InvalidUrl(_)));
        assert!(fake.urls().is_empty());
    }
}
