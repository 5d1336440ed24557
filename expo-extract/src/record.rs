use serde::{Deserialize, Serialize};

/// Columns of a successfully extracted record, in output order.
pub const FIELD_COLUMNS: [&str; 13] = [
    "url",
    "name",
    "why_visit",
    "description",
    "branch",
    "product_categories",
    "gallery",
    "documents",
    "website",
    "email",
    "phone",
    "address",
    "stand",
];

/// Column carried only by records whose page failed to load.
pub const ERROR_COLUMN: &str = "error";

/// Literal error recorded when navigation or the readiness wait times out.
pub const TIMEOUT_ERROR: &str = "Timeout";

/// One entry of a link list (gallery, documents).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

/// A single anchor read as visible text plus target (website, email).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledLink {
    pub text: String,
    pub url: String,
}

/// Everything read from one exhibitor page that loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitorFields {
    pub url: String,
    pub name: String,
    pub why_visit: String,
    pub description: String,
    pub branch: String,
    pub product_categories: String,
    pub gallery: Vec<Link>,
    pub documents: Vec<Link>,
    pub website: LabeledLink,
    pub email: LabeledLink,
    pub phone: String,
    pub address: String,
    pub stand: String,
}

impl ExhibitorFields {
    /// A record for `url` with every field at its empty value.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Outcome of visiting one URL.
///
/// Serialises untagged: a success is the flat thirteen-key object, a failure
/// is `{"url": .., "error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExhibitorRecord {
    Success(ExhibitorFields),
    Failed { url: String, error: String },
}

impl ExhibitorRecord {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        ExhibitorRecord::Failed {
            url: url.into(),
            error: error.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ExhibitorRecord::Success(fields) => &fields.url,
            ExhibitorRecord::Failed { url, .. } => url,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExhibitorRecord::Failed { .. })
    }
}
