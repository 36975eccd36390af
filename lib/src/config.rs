use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use rusoto_core::Region;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::Error;
use crate::Result;

pub const DEFAULT_CLUSTER_TAG: &str = "ec2_pod";
pub const DEFAULT_ROLE_TAG: &str = "ec2_pod_instance_name";
pub const DEFAULT_HEAD_ROLE: &str = "head";

/// Tag keys used to find a cluster's instances and split them into roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagVocabulary {
    pub cluster_tag: String,
    pub role_tag: String,
    pub head_role: String,
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self {
            cluster_tag: DEFAULT_CLUSTER_TAG.to_string(),
            role_tag: DEFAULT_ROLE_TAG.to_string(),
            head_role: DEFAULT_HEAD_ROLE.to_string(),
        }
    }
}

/// The YAML vars file describing which cluster to inventory.
///
/// ```yaml
/// cluster_region: us-west-2
/// cluster_id: 5f3e9a
/// role_tag: ec2_pod_instance_name
/// ```
#[derive(Debug, Deserialize)]
pub struct VarsFile {
    pub cluster_region: String,
    #[serde(default)]
    pub cluster_id: Option<Value>,
    #[serde(rename = "_id", default)]
    pub provider_id: Option<Value>,
    #[serde(default)]
    pub cluster_tag: Option<String>,
    #[serde(default)]
    pub role_tag: Option<String>,
    #[serde(default)]
    pub head_role: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VarsFile {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("reading vars from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Credentials, region and tag vocabulary for one provider handle.
#[derive(Clone)]
pub struct Profile {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Region,
    pub provider_id: Option<String>,
    pub cluster_id: Option<String>,
    pub tags: TagVocabulary,
    pub extra: BTreeMap<String, Value>,
}

impl Profile {
    pub fn new(region: Region) -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region,
            provider_id: None,
            cluster_id: None,
            tags: TagVocabulary::default(),
            extra: BTreeMap::new(),
        }
    }

    pub fn from_vars(vars: VarsFile) -> Result<Self> {
        let region = parse_region(&vars.cluster_region)?;
        let cluster_id = vars
            .cluster_id
            .as_ref()
            .map(|value| scalar_to_string("cluster_id", value))
            .transpose()?;
        let provider_id = vars
            .provider_id
            .as_ref()
            .map(|value| scalar_to_string("_id", value))
            .transpose()?;

        let defaults = TagVocabulary::default();
        let tags = TagVocabulary {
            cluster_tag: vars.cluster_tag.unwrap_or(defaults.cluster_tag),
            role_tag: vars.role_tag.unwrap_or(defaults.role_tag),
            head_role: vars.head_role.unwrap_or(defaults.head_role),
        };

        Ok(Self {
            provider_id,
            cluster_id,
            tags,
            extra: vars.extra,
            ..Self::new(region)
        })
    }

    /// Empty strings count as unset, the same as a missing env var.
    pub fn with_credentials(
        mut self,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Self {
        self.access_key_id = access_key_id.filter(|key| !key.is_empty());
        self.secret_access_key = secret_access_key.filter(|key| !key.is_empty());
        self
    }

    pub fn with_cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Profile")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("provider_id", &self.provider_id)
            .field("cluster_id", &self.cluster_id)
            .field("tags", &self.tags)
            .field("extra", &self.extra)
            .finish()
    }
}

pub fn parse_region(name: &str) -> Result<Region> {
    Region::from_str(name).map_err(|_| Error::Region {
        region: name.to_string(),
    })
}

fn scalar_to_string(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::Config(format!(
            "{} must be a string or number, got {:?}",
            field, other
        ))),
    }
}
