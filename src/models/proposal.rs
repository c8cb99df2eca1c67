use serde::{Deserialize, Serialize};

/// An offer sent to a client. Stored under `band_proposals`; no flow in the
/// current clients constructs these yet, but the key and shape are reserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub booking_id: String,
    pub amount: f64,
    pub description: String,
    pub terms: String,
    pub valid_until: String,
    pub status: ProposalStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Sent,
    Accepted,
    Rejected,
}
