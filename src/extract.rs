use crate::error::KamerstukError;
use crate::record::{Record, COLLECTIE_NS, DCTERMS_NS, OVERHEIDWETGEVING_NS};

const PRODUCT_AREA_SGD: &str = "sgd";
const PRODUCT_AREA_OP: &str = "officielepublicaties";

/// Raw fields pulled out of one record. The record's own dossiernummer and
/// ondernummer may differ from the queried ones (reprints surface under a
/// different ondernummer); they are extracted but callers should not trust
/// them to match the request.
#[derive(Debug, Clone)]
pub struct ExtractedFields {
    pub dossiernummer: String,
    pub ondernummer: String,
    pub dossiertitel: String,
    pub documenttitel: String,
    pub vergaderjaar: String,
    pub kamer: String,
}

/// Extract the semantic fields from a record, following the field paths of
/// its product area. "sgd" is the legacy digitized-archive schema, where
/// the document title lives in `dcterms:description`;
/// "officielepublicaties" is the current schema with dedicated title fields
/// and a fallback chain for the document title.
pub fn extract(record: &Record) -> Result<ExtractedFields, KamerstukError> {
    let product_area = required(record, COLLECTIE_NS, "product-area")?;

    let (dossiertitel, documenttitel) = match product_area {
        PRODUCT_AREA_SGD => (
            required(record, DCTERMS_NS, "title")?.to_string(),
            required(record, DCTERMS_NS, "description")?.to_string(),
        ),
        PRODUCT_AREA_OP => {
            let documenttitel = record
                .first(OVERHEIDWETGEVING_NS, "documenttitel")
                .or_else(|| record.first(DCTERMS_NS, "title"))
                .or_else(|| record.first(DCTERMS_NS, "description"))
                .ok_or(KamerstukError::MissingField("documenttitel"))?;
            (
                required(record, OVERHEIDWETGEVING_NS, "dossiertitel")?.to_string(),
                documenttitel.to_string(),
            )
        }
        other => return Err(KamerstukError::UnknownProductArea(other.to_string())),
    };

    let creator = required(record, DCTERMS_NS, "creator")?;

    Ok(ExtractedFields {
        dossiernummer: required(record, OVERHEIDWETGEVING_NS, "dossiernummer")?.to_string(),
        ondernummer: required(record, OVERHEIDWETGEVING_NS, "ondernummer")?.to_string(),
        dossiertitel,
        documenttitel,
        vergaderjaar: required(record, OVERHEIDWETGEVING_NS, "vergaderjaar")?.to_string(),
        kamer: kamer_for(creator).to_string(),
    })
}

fn required<'a>(
    record: &'a Record,
    ns: &str,
    local: &'static str,
) -> Result<&'a str, KamerstukError> {
    record
        .first(ns, local)
        .ok_or(KamerstukError::MissingField(local))
}

/// Map the creator string to a chamber code. Anything but the two chambers
/// of the Staten-Generaal maps to "??", never an error.
fn kamer_for(creator: &str) -> &'static str {
    match creator {
        "Tweede Kamer der Staten-Generaal" => "II",
        "Eerste Kamer der Staten-Generaal" => "I",
        _ => "??",
    }
}

// ── Tests ──
