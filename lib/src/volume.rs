use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use log::debug;
use rusoto_ec2::{DescribeVolumesRequest, Volume};
use serde_json::Value;

use crate::compute::ComputeApi;
use crate::error::Error;
use crate::inventory::Ec2Provider;
use crate::Result;

/// Volumes fetched so far, keyed by volume id. Entries live as long as the
/// provider and are only replaced on refresh.
#[derive(Default)]
pub struct VolumeCache {
    volumes: Mutex<HashMap<String, Volume>>,
}

impl VolumeCache {
    pub fn get(&self, volume_id: &str) -> Option<Volume> {
        self.volumes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(volume_id)
            .cloned()
    }

    pub fn insert(&self, volume_id: String, volume: Volume) {
        self.volumes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(volume_id, volume);
    }

    pub fn len(&self) -> usize {
        self.volumes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The EC2 volume id embedded in a volume reference, at `ec2.id`.
pub fn volume_id(reference: &Value) -> Option<&str> {
    reference
        .pointer("/ec2/id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

impl<C: ComputeApi> Ec2Provider<C> {
    /// Resolve a volume reference to the EC2 volume it points at.
    ///
    /// Returns `None` when the reference carries no volume id. Volumes are
    /// fetched once and served from the cache afterwards unless `refresh`
    /// is set.
    pub async fn volume(&self, reference: &Value, refresh: bool) -> Result<Option<Volume>> {
        let volume_id = match volume_id(reference) {
            Some(id) => id,
            None => return Ok(None),
        };

        if !refresh {
            if let Some(volume) = self.volumes.get(volume_id) {
                return Ok(Some(volume));
            }
        }

        debug!("fetching volume {}", volume_id);
        let request = DescribeVolumesRequest {
            volume_ids: Some(vec![volume_id.to_string()]),
            ..Default::default()
        };
        let volume = self
            .client()
            .describe_volumes(request)
            .await
            .map_err(|error| match error {
                Error::NotFound(_) => Error::NotFound(format!("volume {}", volume_id)),
                other => other,
            })?
            .volumes
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("volume {}", volume_id)))?;

        self.volumes.insert(volume_id.to_string(), volume.clone());
        Ok(Some(volume))
    }
}
