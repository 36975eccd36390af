use std::collections::BTreeMap;

use log::warn;
use rusoto_ec2::Instance;
use serde::{Deserialize, Serialize};

/// Key reserved for per-host variables in the inventory document.
pub const META_KEY: &str = "_meta";

/// Host specific variables exposed for every instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceVars {
    pub instance_id: String,
    pub private_ip: Option<String>,
    pub public_ip: Option<String>,
}

impl InstanceVars {
    pub fn from_instance(instance: &Instance) -> Self {
        Self {
            instance_id: instance.instance_id.clone().unwrap_or_default(),
            private_ip: instance.private_ip_address.clone(),
            public_ip: instance.public_ip_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, InstanceVars>,
}

/// A dynamic inventory document: one group per role plus `_meta`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(flatten)]
    pub groups: BTreeMap<String, Group>,
}

impl Inventory {
    /// Group instances by the value of `role_tag`.
    ///
    /// Grouping goes through a map keyed by role, so instances sharing a
    /// role are merged no matter where they appear in `instances`. Hosts
    /// keep the order they were listed in. Instances without a public IP
    /// can't be reached and are left out entirely.
    pub fn from_instances(instances: &[Instance], role_tag: &str) -> Self {
        let mut groups: BTreeMap<String, Group> = BTreeMap::new();
        let mut hostvars = BTreeMap::new();

        for instance in instances {
            let id = instance.instance_id.as_deref().unwrap_or("<unknown>");
            let public_ip = match &instance.public_ip_address {
                Some(ip) => ip.clone(),
                None => {
                    warn!("skipping {}: no public ip address", id);
                    continue;
                }
            };

            match tag_value(instance, role_tag) {
                Some(role) if role == META_KEY => {
                    warn!("skipping {}: role {:?} is reserved", id, role);
                }
                Some(role) => groups
                    .entry(role.to_string())
                    .or_default()
                    .hosts
                    .push(public_ip.clone()),
                None => warn!("{} has no {} tag, leaving it out of all groups", id, role_tag),
            }

            hostvars.insert(public_ip, InstanceVars::from_instance(instance));
        }

        let meta = if hostvars.is_empty() {
            None
        } else {
            Some(Meta { hostvars })
        };

        Self { meta, groups }
    }

    /// Number of top level keys excluding `_meta`.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any instance made it into `_meta.hostvars`, grouped or not.
    pub fn has_hosts(&self) -> bool {
        self.meta.is_some()
    }

    pub fn hosts(&self, role: &str) -> Option<&[String]> {
        self.groups.get(role).map(|group| group.hosts.as_slice())
    }

    pub fn hostvars(&self, host: &str) -> Option<&InstanceVars> {
        self.meta.as_ref().and_then(|meta| meta.hostvars.get(host))
    }
}

/// Look up a tag on an instance by key.
pub fn tag_value<'a>(instance: &'a Instance, key: &str) -> Option<&'a str> {
    instance
        .tags
        .as_ref()?
        .iter()
        .find(|tag| tag.key.as_deref() == Some(key))
        .and_then(|tag| tag.value.as_deref())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineImage {
    pub image_id: String,
}

/// Acceptable values for an image tag filter; any one of them matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValues {
    One(String),
    Any(Vec<String>),
}

impl TagValues {
    pub fn into_values(self) -> Vec<String> {
        match self {
            TagValues::One(value) => vec![value],
            TagValues::Any(values) => values,
        }
    }
}

impl From<&str> for TagValues {
    fn from(value: &str) -> Self {
        TagValues::One(value.to_string())
    }
}

impl From<Vec<String>> for TagValues {
    fn from(values: Vec<String>) -> Self {
        TagValues::Any(values)
    }
}
