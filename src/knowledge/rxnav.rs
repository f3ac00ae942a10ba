//! RxNav terminology client
//!
//! Two-step lookup against the NLM RxNav REST API:
//! 1. `GET /rxcui.json?name=…` resolves the first RxNorm concept id
//! 2. `GET /rxclass/class/byRxcui.json?rxcui=…&relaSource=MEDRT` lists the
//!    MED-RT class relations for that concept
//!
//! Indications come from `may_treat` / `may_prevent` disease relations,
//! contraindications from `ci_with`, the mechanism from the first `MOA` class.

use crate::errors::KnowledgeError;
use crate::knowledge::lookup::{KnowledgeLookup, MAX_CONTRAINDICATIONS, MAX_INDICATIONS};
use crate::types::KnowledgeSnippet;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Public RxNav endpoint
pub const DEFAULT_RXNAV_URL: &str = "https://rxnav.nlm.nih.gov/REST";

/// Request timeout (10 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// RxNav HTTP client
#[derive(Debug, Clone)]
pub struct RxNavClient {
    client: Client,
    base_url: String,
}

impl RxNavClient {
    /// Create client against the public endpoint
    pub fn new() -> Result<Self, KnowledgeError> {
        Self::with_config(DEFAULT_RXNAV_URL, REQUEST_TIMEOUT)
    }

    /// Create client with custom endpoint and timeout
    pub fn with_config(base_url: &str, timeout: Duration) -> Result<Self, KnowledgeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the first RxNorm concept id for a name
    async fn resolve_rxcui(&self, name: &str) -> Result<Option<String>, KnowledgeError> {
        let url = format!("{}/rxcui.json", self.base_url);
        let response = self.client.get(&url).query(&[("name", name)]).send().await?;

        if !response.status().is_success() {
            return Err(KnowledgeError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: RxcuiResponse = response.json().await?;
        Ok(body.first_rxcui())
    }

    /// Fetch MED-RT class relations for a concept id
    async fn fetch_classes(&self, rxcui: &str) -> Result<Vec<RxClassDrugInfo>, KnowledgeError> {
        let url = format!("{}/rxclass/class/byRxcui.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("rxcui", rxcui), ("relaSource", "MEDRT")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KnowledgeError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: RxClassResponse = response.json().await?;
        Ok(body.into_entries())
    }
}

#[async_trait]
impl KnowledgeLookup for RxNavClient {
    async fn lookup(&self, medicine_name: &str) -> Result<Option<KnowledgeSnippet>, KnowledgeError> {
        let name = medicine_name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let Some(rxcui) = self.resolve_rxcui(name).await? else {
            tracing::debug!(medicine = name, "no RxNorm concept found");
            return Ok(None);
        };

        let entries = self.fetch_classes(&rxcui).await?;
        Ok(snippet_from_classes(&entries))
    }
}

/// Response of `/rxcui.json`
#[derive(Debug, Default, Deserialize)]
pub struct RxcuiResponse {
    #[serde(rename = "idGroup")]
    id_group: Option<IdGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct IdGroup {
    #[serde(rename = "rxnormId", default)]
    rxnorm_id: Vec<String>,
}

impl RxcuiResponse {
    pub fn first_rxcui(&self) -> Option<String> {
        self.id_group
            .as_ref()
            .and_then(|group| group.rxnorm_id.first())
            .filter(|id| !id.trim().is_empty())
            .cloned()
    }
}

/// Response of `/rxclass/class/byRxcui.json`
#[derive(Debug, Default, Deserialize)]
pub struct RxClassResponse {
    #[serde(rename = "rxclassDrugInfoList")]
    drug_info_list: Option<RxClassDrugInfoList>,
}

#[derive(Debug, Default, Deserialize)]
struct RxClassDrugInfoList {
    #[serde(rename = "rxclassDrugInfo", default)]
    drug_info: Vec<RxClassDrugInfo>,
}

impl RxClassResponse {
    pub fn into_entries(self) -> Vec<RxClassDrugInfo> {
        self.drug_info_list
            .map(|list| list.drug_info)
            .unwrap_or_default()
    }
}

/// One class relation of a drug concept
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RxClassDrugInfo {
    #[serde(default)]
    rela: Option<String>,

    #[serde(rename = "rxclassMinConceptItem", default)]
    concept: Option<RxClassConcept>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RxClassConcept {
    #[serde(rename = "className", default)]
    class_name: Option<String>,

    #[serde(rename = "classType", default)]
    class_type: Option<String>,
}

impl RxClassDrugInfo {
    fn class_type(&self) -> Option<&str> {
        self.concept.as_ref().and_then(|c| c.class_type.as_deref())
    }

    fn class_name(&self) -> Option<&str> {
        self.concept
            .as_ref()
            .and_then(|c| c.class_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Build a snippet from class relations; `None` when nothing useful is present
pub fn snippet_from_classes(entries: &[RxClassDrugInfo]) -> Option<KnowledgeSnippet> {
    if entries.is_empty() {
        return None;
    }

    let mut indications = names_by_relation(entries, &["may_treat", "may_prevent"], "DISEASE");
    let mut contraindications = names_by_relation(entries, &["ci_with"], "DISEASE");
    let mechanism = entries
        .iter()
        .find(|entry| entry.class_type() == Some("MOA"))
        .and_then(|entry| entry.class_name())
        .map(str::to_string);

    if indications.is_empty() && contraindications.is_empty() && mechanism.is_none() {
        return None;
    }

    indications.truncate(MAX_INDICATIONS);
    contraindications.truncate(MAX_CONTRAINDICATIONS);

    Some(KnowledgeSnippet {
        mechanism,
        indications,
        contraindications,
    })
}

/// Unique class names for the given relations, in first-seen order
fn names_by_relation(entries: &[RxClassDrugInfo], relations: &[&str], class_type: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for entry in entries {
        let relation_matches = entry
            .rela
            .as_deref()
            .map(|rela| relations.contains(&rela))
            .unwrap_or(false);

        if !relation_matches || entry.class_type() != Some(class_type) {
            continue;
        }

        if let Some(name) = entry.class_name() {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
    }

    names
}
