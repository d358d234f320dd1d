use serde::{Deserialize, Serialize};

//
// ─── LICENSING GUIDE ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenceStep {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenceFee {
    pub standard: u32,
    pub reduced: u32,
    #[serde(default)]
    pub reduced_conditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenceType {
    pub name: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub fee: LicenceFee,
    pub steps: Vec<LicenceStep>,
    #[serde(default)]
    pub additional_info: Vec<String>,
}

impl LicenceType {
    #[must_use]
    pub fn has_reduced_fee(&self) -> bool {
        self.fee.reduced < self.fee.standard
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub name: String,
    pub authority: String,
    pub contact_email: String,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralProcess {
    pub overview: Vec<String>,
    pub account_requirement: String,
    pub payment_methods: Vec<String>,
    pub processing_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreation {
    pub description: String,
    pub steps: Vec<String>,
    pub account_types: Vec<String>,
}

/// Structured walkthrough of the online licensing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensingGuide {
    pub system_info: SystemInfo,
    pub general_process: GeneralProcess,
    pub licence_types: Vec<LicenceType>,
    pub account_creation: AccountCreation,
}

impl LicensingGuide {
    #[must_use]
    pub fn licence_by_name(&self, name: &str) -> Option<&LicenceType> {
        self.licence_types.iter().find(|licence| licence.name == name)
    }

    #[must_use]
    pub fn licence_names(&self) -> Vec<&str> {
        self.licence_types
            .iter()
            .map(|licence| licence.name.as_str())
            .collect()
    }

    /// Licences whose standard fee does not exceed `max_fee`.
    #[must_use]
    pub fn licences_by_max_fee(&self, max_fee: u32) -> Vec<&LicenceType> {
        self.licence_types
            .iter()
            .filter(|licence| licence.fee.standard <= max_fee)
            .collect()
    }

    #[must_use]
    pub fn reduced_fee_licences(&self) -> Vec<&LicenceType> {
        self.licence_types
            .iter()
            .filter(|licence| licence.has_reduced_fee())
            .collect()
    }
}

//
// ─── PAGINATED DOCUMENTS ───────────────────────────────────────────────────────
//

/// One-based page position inside a paginated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    total_pages: usize,
}

impl PageCursor {
    /// Cursor on the first page; pinned at page 0 for empty documents.
    #[must_use]
    pub fn new(total_pages: usize) -> Self {
        Self {
            page: usize::from(total_pages > 0),
            total_pages,
        }
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Zero-based index into the page list, if any page is shown.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.page.checked_sub(1)
    }

    pub fn next(&mut self) {
        self.go_to(self.page.saturating_add(1));
    }

    pub fn previous(&mut self) {
        self.go_to(self.page.saturating_sub(1));
    }

    /// Jump to `page`, clamped to `[1, total_pages]`.
    pub fn go_to(&mut self, page: usize) {
        if self.total_pages == 0 {
            return;
        }
        self.page = page.clamp(1, self.total_pages);
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.page <= 1
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page == self.total_pages
    }
}
