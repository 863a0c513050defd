use crate::entities::medicine::MedicineInfo;
use crate::sources::openfda::LabelResult;
use crate::utils::serde::StringOrVec;

pub(crate) const NOT_AVAILABLE: &str = "N/A";
pub(crate) const SECTION_NOT_AVAILABLE: &str = "Information not available";

fn section(value: &StringOrVec) -> String {
    value
        .first_text()
        .unwrap_or(SECTION_NOT_AVAILABLE)
        .to_string()
}

/// Normalizes the first label hit into the response record.
///
/// `query` is the sanitized medicine name; it doubles as the brand name
/// when the label carries none.
pub fn from_label(label: &LabelResult, query: &str) -> MedicineInfo {
    let openfda = label.openfda.clone().unwrap_or_default();

    let precautions = label
        .warnings
        .first_text()
        .or_else(|| label.precautions.first_text())
        .unwrap_or(SECTION_NOT_AVAILABLE)
        .to_string();

    MedicineInfo {
        name: query.to_string(),
        brand_name: openfda.brand_name.first_text().unwrap_or(query).to_string(),
        generic_name: openfda
            .generic_name
            .first_text()
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        manufacturer: openfda
            .manufacturer_name
            .first_text()
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        indications: section(&label.indications_and_usage),
        mechanism: section(&label.mechanism_of_action),
        side_effects: section(&label.adverse_reactions),
        dosage: section(&label.dosage_and_administration),
        precautions,
        contraindications: section(&label.contraindications),
        drug_interactions: section(&label.drug_interactions),
    }
}
