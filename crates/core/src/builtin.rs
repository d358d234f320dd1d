//! Study content bundled with the binary: the HAREC exam catalog and the
//! ComReg eLicensing walkthrough.

use crate::model::{Catalog, CatalogError, LicensingGuide};

const CATALOG_JSON: &str = include_str!("../data/harec_catalog.json");
const LICENSING_GUIDE_JSON: &str = include_str!("../data/licensing_guide.json");

/// Parse the bundled catalog.
///
/// # Errors
///
/// Returns `CatalogError` if the bundled JSON is invalid.
pub fn catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_json(CATALOG_JSON)
}

/// Parse the bundled licensing guide.
///
/// # Errors
///
/// Returns `CatalogError::Malformed` if the bundled JSON is invalid.
pub fn licensing_guide() -> Result<LicensingGuide, CatalogError> {
    serde_json::from_str(LICENSING_GUIDE_JSON).map_err(|err| CatalogError::Malformed(err.to_string()))
}
