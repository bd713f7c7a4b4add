use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::KamerstukError;

pub const SRU_NS: &str = "http://docs.oasis-open.org/ns/search-ws/sruResponse";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const OVERHEIDWETGEVING_NS: &str = "http://standaarden.overheid.nl/wetgeving/";
pub const COLLECTIE_NS: &str = "http://standaarden.overheid.nl/collectie/";

/// Scheme attribute that marks the publisher-supplied kamerstuk type hint.
pub const KAMERSTUK_TYPEN_SCHEME: &str = "OVERHEIDop.KamerstukTypen";

/// One leaf element from a record subtree: namespace URI, local name,
/// optional `scheme` attribute, and text content.
#[derive(Debug, Clone)]
pub struct RecordField {
    pub ns: String,
    pub local: String,
    pub scheme: Option<String>,
    pub value: String,
}

/// Flattened view of one `sru:record`. Fields keep document order; lookups
/// return the first match, which is all the extraction paths need.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub fields: Vec<RecordField>,
}

impl Record {
    pub fn first(&self, ns: &str, local: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.ns == ns && f.local == local)
            .map(|f| f.value.as_str())
    }

    pub fn first_with_scheme(&self, ns: &str, local: &str, scheme: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.ns == ns && f.local == local && f.scheme.as_deref() == Some(scheme))
            .map(|f| f.value.as_str())
    }
}

/// Parsed SRU response page: the declared total plus this page's records.
#[derive(Debug, Default)]
pub struct SruResponse {
    pub number_of_records: usize,
    pub records: Vec<Record>,
}

/// Parse an SRU response document into the declared record count and the
/// records it carries. Record children are flattened into leaf fields.
pub fn parse_response(xml: &str) -> Result<SruResponse, KamerstukError> {
    let mut reader = NsReader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut response = SruResponse::default();
    let mut current: Option<Record> = None;
    // (ns, local, scheme) of the innermost open element inside a record
    let mut pending: Option<(String, String, Option<String>)> = None;
    let mut in_count = false;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (res, Event::Start(e)) => {
                let ns = resolved_ns(&res);
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if ns == SRU_NS && local == "record" {
                    current = Some(Record::default());
                } else if current.is_some() {
                    let scheme = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.local_name().as_ref() == b"scheme")
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                    pending = Some((ns, local, scheme));
                } else if ns == SRU_NS && local == "numberOfRecords" {
                    in_count = true;
                }
            }
            (_, Event::Text(e)) => {
                let text = e.unescape().map_err(quick_xml::Error::from)?;
                let text = text.trim();
                if !text.is_empty() {
                    if in_count {
                        response.number_of_records = text.parse().map_err(|_| {
                            KamerstukError::Protocol(format!(
                                "numberOfRecords is not a number: {text}"
                            ))
                        })?;
                    } else if let (Some(record), Some((ns, local, scheme))) =
                        (current.as_mut(), pending.as_ref())
                    {
                        record.fields.push(RecordField {
                            ns: ns.clone(),
                            local: local.clone(),
                            scheme: scheme.clone(),
                            value: text.to_string(),
                        });
                    }
                }
            }
            (res, Event::End(e)) => {
                let ns = resolved_ns(&res);
                if ns == SRU_NS && e.local_name().as_ref() == b"record" {
                    if let Some(record) = current.take() {
                        response.records.push(record);
                    }
                }
                pending = None;
                in_count = false;
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(response)
}

fn resolved_ns(res: &ResolveResult) -> String {
    match res {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.0).into_owned(),
        _ => String::new(),
    }
}

// ── Tests ──
