//! YAML text -> plan model.

use crate::plan_model::PlanDocument;

#[derive(Debug, thiserror::Error)]
pub enum PlanParseError {
    #[error("YAML deserialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Parse a YAML string into a plan document.
pub fn parse_plan(yaml: &str) -> Result<PlanDocument, PlanParseError> {
    let doc: PlanDocument = serde_yaml::from_str(yaml)?;

    if doc.name.trim().is_empty() {
        return Err(PlanParseError::MissingField("name".into()));
    }
    for (idx, case) in doc.cases.iter().enumerate() {
        if case.name.trim().is_empty() {
            return Err(PlanParseError::MissingField(format!("cases/{idx}/name")));
        }
    }

    log::debug!("parsed plan '{}' with {} case(s)", doc.name, doc.cases.len());
    Ok(doc)
}
