use std::time::Duration;

use tracing::debug;

use crate::error::KamerstukError;
use crate::record::{parse_response, Record, SruResponse};

pub const DEFAULT_ENDPOINT: &str = "https://repository.overheid.nl/sru";

/// SRU 2.0 page size. The endpoint caps responses at a bounded page, so any
/// query with more matches than this needs follow-up requests.
pub const PAGE_SIZE: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// One bounded page request against the search endpoint. The HTTP client
/// implements this; tests swap in fakes to count or script page responses.
pub trait PageFetch {
    fn fetch_page(
        &self,
        query: &str,
        start_record: usize,
        maximum_records: usize,
    ) -> Result<SruResponse, KamerstukError>;
}

/// Blocking client for the KOOP SRU API.
pub struct SruClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl SruClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, KamerstukError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl PageFetch for SruClient {
    fn fetch_page(
        &self,
        query: &str,
        start_record: usize,
        maximum_records: usize,
    ) -> Result<SruResponse, KamerstukError> {
        debug!(query, start_record, "requesting SRU page");
        let start = start_record.to_string();
        let max = maximum_records.to_string();
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("httpAccept", "application/xml"),
                ("startRecord", start.as_str()),
                ("maximumRecords", max.as_str()),
                ("query", query),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KamerstukError::Transport {
                status: status.as_u16(),
                query: query.to_string(),
            });
        }

        parse_response(&resp.text()?)
    }
}

/// Fetch every record matching `query`, issuing as many page requests as the
/// declared total demands. Records accumulate in page-arrival order. Any
/// failing page fails the whole fetch; there is no retry.
pub fn fetch_all(source: &impl PageFetch, query: &str) -> Result<Vec<Record>, KamerstukError> {
    let mut start_record = 0;
    let mut page = source.fetch_page(query, start_record, PAGE_SIZE)?;
    let total = page.number_of_records;
    let mut records = page.records;

    while records.len() < total {
        start_record += PAGE_SIZE;
        page = source.fetch_page(query, start_record, PAGE_SIZE)?;
        if page.records.is_empty() {
            // The server declared more records than it is willing to serve;
            // bail out instead of requesting the same empty page forever.
            return Err(KamerstukError::Protocol(format!(
                "server declared {} records but stopped after {}",
                total,
                records.len()
            )));
        }
        records.append(&mut page.records);
    }

    Ok(records)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::record::{RecordField, OVERHEIDWETGEVING_NS};

    fn numbered_record(n: usize) -> Record {
        Record {
            fields: vec![RecordField {
                ns: OVERHEIDWETGEVING_NS.to_string(),
                local: "ondernummer".to_string(),
                scheme: None,
                value: n.to_string(),
            }],
        }
    }

    /// Serves `total` records in pages of `page_size`, counting requests.
    struct FakePages {
        total: usize,
        page_size: usize,
        calls: Cell<usize>,
    }

    impl FakePages {
        fn new(total: usize, page_size: usize) -> Self {
            Self {
                total,
                page_size,
                calls: Cell::new(0),
            }
        }
    }

    impl PageFetch for FakePages {
        fn fetch_page(
            &self,
            _query: &str,
            start_record: usize,
            _maximum_records: usize,
        ) -> Result<SruResponse, KamerstukError> {
            self.calls.set(self.calls.get() + 1);
            let end = (start_record + self.page_size).min(self.total);
            let records = (start_record..end).map(numbered_record).collect();
            Ok(SruResponse {
                number_of_records: self.total,
                records,
            })
        }
    }

    #[test]
    fn single_page_needs_one_request() {
        let source = FakePages::new(3, PAGE_SIZE);
        let records = fetch_all(&source, "(dt.type=Kamerstuk)").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn multi_page_issues_ceil_n_over_p_requests_in_order() {
        let source = FakePages::new(250, PAGE_SIZE);
        let records = fetch_all(&source, "(dt.type=Kamerstuk)").unwrap();
        assert_eq!(records.len(), 250);
        assert_eq!(source.calls.get(), 3);
        // Page-arrival order, no resorting
        let order: Vec<&str> = records
            .iter()
            .map(|r| r.first(OVERHEIDWETGEVING_NS, "ondernummer").unwrap())
            .collect();
        assert_eq!(order[0], "0");
        assert_eq!(order[99], "99");
        assert_eq!(order[100], "100");
        assert_eq!(order[249], "249");
    }

    #[test]
    fn exact_page_boundary() {
        let source = FakePages::new(200, PAGE_SIZE);
        let records = fetch_all(&source, "q").unwrap();
        assert_eq!(records.len(), 200);
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn failed_page_aborts_whole_fetch() {
        struct FailSecond {
            calls: Cell<usize>,
        }
        impl PageFetch for FailSecond {
            fn fetch_page(
                &self,
                query: &str,
                start_record: usize,
                _max: usize,
            ) -> Result<SruResponse, KamerstukError> {
                self.calls.set(self.calls.get() + 1);
                if start_record > 0 {
                    return Err(KamerstukError::Transport {
                        status: 503,
                        query: query.to_string(),
                    });
                }
                Ok(SruResponse {
                    number_of_records: 150,
                    records: (0..100).map(numbered_record).collect(),
                })
            }
        }

        let source = FailSecond {
            calls: Cell::new(0),
        };
        let err = fetch_all(&source, "q").unwrap_err();
        assert!(matches!(err, KamerstukError::Transport { status: 503, .. }));
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn lying_total_fails_instead_of_looping() {
        struct Liar;
        impl PageFetch for Liar {
            fn fetch_page(
                &self,
                _query: &str,
                start_record: usize,
                _max: usize,
            ) -> Result<SruResponse, KamerstukError> {
                let records = if start_record == 0 {
                    (0..100).map(numbered_record).collect()
                } else {
                    Vec::new()
                };
                Ok(SruResponse {
                    number_of_records: 500,
                    records,
                })
            }
        }

        let err = fetch_all(&Liar, "q").unwrap_err();
        assert!(matches!(err, KamerstukError::Protocol(_)));
    }
}
