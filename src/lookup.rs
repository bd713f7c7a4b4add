use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::cache::{KamerstukCache, KamerstukInfo};
use crate::classify;
use crate::error::KamerstukError;
use crate::extract;
use crate::sru::{self, PageFetch};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip all whitespace from a dossier- or ondernummer. Cache keys and
/// query strings always use the normalized form.
pub fn normalize_number(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw, "").into_owned()
}

/// Lookup context: a record source plus the memoization cache. One lookup
/// runs to completion, including all paginated sub-requests, before the
/// next begins.
pub struct KamerstukLookup<F: PageFetch> {
    source: F,
    cache: KamerstukCache,
}

impl<F: PageFetch> KamerstukLookup<F> {
    pub fn new(source: F, cache: KamerstukCache) -> Self {
        Self { source, cache }
    }

    /// Get the metadata for one kamerstuk, from the cache when possible.
    /// A successful fetch is inserted and flushed before returning; a
    /// failed one is never memoized.
    pub fn lookup(
        &mut self,
        dossiernummer: &str,
        ondernummer: &str,
    ) -> Result<KamerstukInfo, KamerstukError> {
        let dossiernummer = normalize_number(dossiernummer);
        let ondernummer = normalize_number(ondernummer);

        if let Some(hit) = self.cache.get(&dossiernummer, &ondernummer) {
            debug!(%dossiernummer, %ondernummer, "cache hit");
            return Ok(hit.clone());
        }

        let query = format!(
            "(w.dossiernummer={dossiernummer} AND w.ondernummer={ondernummer} AND dt.type=Kamerstuk)"
        );
        let records = sru::fetch_all(&self.source, &query)?;

        // Assume the first record is the one we want; the query can match
        // several (reprints among them) and we do not deduplicate.
        let record = records.first().ok_or_else(|| KamerstukError::NotFound {
            dossiernummer: dossiernummer.clone(),
            ondernummer: ondernummer.clone(),
        })?;

        let fields = extract::extract(record)?;
        let kamerstuktype = classify::classify(&fields.documenttitel, record, false);
        info!(
            %dossiernummer,
            %ondernummer,
            kamerstuktype = %kamerstuktype,
            "retrieved kamerstuk metadata"
        );

        // Keyed on the numbers as queried, not the record's own: a reprint
        // may carry different numbers and must stay findable under the
        // requested pair.
        let entry = KamerstukInfo {
            dossiernummer,
            ondernummer,
            vergaderjaar: fields.vergaderjaar,
            kamer: fields.kamer,
            kamerstuktype: kamerstuktype.as_str().to_string(),
            documenttitel: fields.documenttitel,
            dossiertitel: fields.dossiertitel,
        };
        self.cache.insert(entry.clone())?;

        Ok(entry)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::record::{
        Record, RecordField, SruResponse, COLLECTIE_NS, DCTERMS_NS, OVERHEIDWETGEVING_NS,
    };

    fn field(ns: &str, local: &str, value: &str) -> RecordField {
        RecordField {
            ns: ns.to_string(),
            local: local.to_string(),
            scheme: None,
            value: value.to_string(),
        }
    }

    fn motie_record() -> Record {
        Record {
            fields: vec![
                field(COLLECTIE_NS, "product-area", "officielepublicaties"),
                field(OVERHEIDWETGEVING_NS, "dossiernummer", "34550"),
                field(OVERHEIDWETGEVING_NS, "ondernummer", "4"),
                field(OVERHEIDWETGEVING_NS, "dossiertitel", "Miljoenennota 2017"),
                field(OVERHEIDWETGEVING_NS, "documenttitel", "Motie van het lid Voortman"),
                field(OVERHEIDWETGEVING_NS, "vergaderjaar", "2016-2017"),
                field(DCTERMS_NS, "creator", "Tweede Kamer der Staten-Generaal"),
            ],
        }
    }

    /// Answers every query with the same single record, counting requests.
    struct CountingSource {
        calls: Cell<usize>,
        last_query: Cell<Option<String>>,
        empty: bool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                last_query: Cell::new(None),
                empty: false,
            }
        }

        fn empty() -> Self {
            Self {
                calls: Cell::new(0),
                last_query: Cell::new(None),
                empty: true,
            }
        }
    }

    impl PageFetch for CountingSource {
        fn fetch_page(
            &self,
            query: &str,
            _start_record: usize,
            _maximum_records: usize,
        ) -> Result<SruResponse, KamerstukError> {
            self.calls.set(self.calls.get() + 1);
            self.last_query.set(Some(query.to_string()));
            if self.empty {
                Ok(SruResponse::default())
            } else {
                Ok(SruResponse {
                    number_of_records: 1,
                    records: vec![motie_record()],
                })
            }
        }
    }

    #[test]
    fn composes_info_from_first_record() {
        let mut lookup = KamerstukLookup::new(CountingSource::new(), KamerstukCache::in_memory());
        let info = lookup.lookup("34550", "4").unwrap();
        assert_eq!(info.dossiernummer, "34550");
        assert_eq!(info.ondernummer, "4");
        assert_eq!(info.vergaderjaar, "2016-2017");
        assert_eq!(info.kamer, "II");
        assert_eq!(info.kamerstuktype, "Motie");
        assert_eq!(info.documenttitel, "Motie van het lid Voortman");
        assert_eq!(info.dossiertitel, "Miljoenennota 2017");
    }

    #[test]
    fn query_uses_normalized_numbers_and_kamerstuk_kind() {
        let mut lookup = KamerstukLookup::new(CountingSource::new(), KamerstukCache::in_memory());
        lookup.lookup(" 34 550 ", "4\t").unwrap();
        let query = lookup.source.last_query.take().unwrap();
        assert_eq!(
            query,
            "(w.dossiernummer=34550 AND w.ondernummer=4 AND dt.type=Kamerstuk)"
        );
    }

    #[test]
    fn second_lookup_hits_cache_without_network() {
        let mut lookup = KamerstukLookup::new(CountingSource::new(), KamerstukCache::in_memory());
        let first = lookup.lookup("34550", "4").unwrap();
        assert_eq!(lookup.source.calls.get(), 1);

        // Whitespace variations hit the same cache entry
        let second = lookup.lookup("34 550", " 4 ").unwrap();
        assert_eq!(lookup.source.calls.get(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_records_is_not_found_and_not_memoized() {
        let mut lookup = KamerstukLookup::new(CountingSource::empty(), KamerstukCache::in_memory());

        let err = lookup.lookup("11111", "1").unwrap_err();
        assert!(matches!(err, KamerstukError::NotFound { .. }));
        assert_eq!(lookup.source.calls.get(), 1);

        // A miss is never cached as a negative result: the next attempt
        // queries the network again.
        let _ = lookup.lookup("11111", "1").unwrap_err();
        assert_eq!(lookup.source.calls.get(), 2);
    }

    #[test]
    fn successful_lookup_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut lookup =
            KamerstukLookup::new(CountingSource::new(), KamerstukCache::load(&path));
        lookup.lookup("34550", "4").unwrap();

        // A fresh context backed by the same file needs no network at all
        let mut fresh =
            KamerstukLookup::new(CountingSource::new(), KamerstukCache::load(&path));
        let info = fresh.lookup("34550", "4").unwrap();
        assert_eq!(fresh.source.calls.get(), 0);
        assert_eq!(info.kamerstuktype, "Motie");
    }

    #[test]
    fn normalize_strips_all_whitespace() {
        assert_eq!(normalize_number(" 34 550 "), "34550");
        assert_eq!(normalize_number("34\t5\n50"), "34550");
        assert_eq!(normalize_number("4"), "4");
    }
}
