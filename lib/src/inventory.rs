use std::collections::BTreeMap;

use log::{debug, info};
use rusoto_ec2::{
    CreateKeyPairRequest, DeleteKeyPairRequest, DescribeAccountAttributesRequest,
    DescribeAccountAttributesResult, DescribeAvailabilityZonesRequest,
    DescribeAvailabilityZonesResult, DescribeImagesRequest, DescribeInstancesRequest,
    DescribeRegionsRequest, DescribeRegionsResult, Ec2Client, Filter, Instance, KeyPair,
};

use crate::compute::{ec2_client, filter, running_filter, tag_filter, ComputeApi};
use crate::config::Profile;
use crate::error::Error;
use crate::types::{InstanceVars, Inventory, MachineImage, TagValues};
use crate::volume::VolumeCache;
use crate::Result;

/// Builds dynamic inventories for the clusters of one account and region.
pub struct Ec2Provider<C = Ec2Client> {
    profile: Profile,
    client: C,
    pub(crate) volumes: VolumeCache,
}

impl Ec2Provider<Ec2Client> {
    pub fn from_profile(profile: Profile) -> Result<Self> {
        let client = ec2_client(&profile)?;
        Ok(Self::new(profile, client))
    }
}

impl<C: ComputeApi> Ec2Provider<C> {
    pub fn new(profile: Profile, client: C) -> Self {
        Self {
            profile,
            client,
            volumes: VolumeCache::default(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// All instances matching `filters`, following pagination to the end.
    async fn instances(&self, filters: Vec<Filter>) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut next_token = None;

        loop {
            let request = DescribeInstancesRequest {
                filters: Some(filters.clone()),
                next_token,
                ..Default::default()
            };
            let response = self.client.describe_instances(request).await?;

            instances.extend(
                response
                    .reservations
                    .into_iter()
                    .flatten()
                    .flat_map(|reservation| reservation.instances.unwrap_or_default()),
            );

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(instances)
    }

    fn cluster_filters(&self, cluster_id: &str) -> Vec<Filter> {
        vec![
            tag_filter(&self.profile.tags.cluster_tag, vec![cluster_id.to_string()]),
            running_filter(),
        ]
    }

    /// Inventory of the running instances tagged with `cluster_id`, grouped
    /// by their role tag.
    pub async fn get_inventory(&self, cluster_id: &str) -> Result<Inventory> {
        let instances = self.instances(self.cluster_filters(cluster_id)).await?;
        info!(
            "found {} running instances in cluster {}",
            instances.len(),
            cluster_id
        );
        Ok(Inventory::from_instances(
            &instances,
            &self.profile.tags.role_tag,
        ))
    }

    pub async fn running_instance_count(&self, cluster_id: &str) -> Result<usize> {
        Ok(self.get_inventory(cluster_id).await?.len())
    }

    /// The single running head instance of a cluster.
    pub async fn get_master_instance(&self, cluster_id: &str) -> Result<InstanceVars> {
        let tags = &self.profile.tags;
        let mut filters = vec![tag_filter(&tags.role_tag, vec![tags.head_role.clone()])];
        filters.extend(self.cluster_filters(cluster_id));

        let mut instances = self.instances(filters).await?;
        match instances.len() {
            0 => Err(Error::NotFound(format!(
                "{} instance of cluster {}",
                tags.head_role, cluster_id
            ))),
            1 => {
                let master = instances.remove(0);
                debug!("master instance is {:?}", master.instance_id);
                Ok(InstanceVars::from_instance(&master))
            }
            count => Err(Error::AmbiguousResult {
                what: format!("{} instance in cluster {}", tags.head_role, cluster_id),
                count,
            }),
        }
    }

    /// Images visible to the account, optionally narrowed by name, owner
    /// and tags. Without any filter this lists every visible image.
    pub async fn get_machine_images(
        &self,
        name: Option<&str>,
        owner: Option<&str>,
        tags: Option<&BTreeMap<String, TagValues>>,
    ) -> Result<Vec<MachineImage>> {
        let mut filters = Vec::new();

        if let Some(name) = name {
            filters.push(filter("name", vec![name.to_string()]));
        }
        if let Some(owner) = owner {
            filters.push(filter("owner-id", vec![owner.to_string()]));
        }
        for (key, values) in tags.into_iter().flatten() {
            filters.push(tag_filter(key, values.clone().into_values()));
        }

        let request = DescribeImagesRequest {
            filters: Some(filters),
            ..Default::default()
        };
        let response = self.client.describe_images(request).await?;

        Ok(response
            .images
            .unwrap_or_default()
            .into_iter()
            .filter_map(|image| image.image_id)
            .map(|image_id| MachineImage { image_id })
            .collect())
    }

    pub async fn create_key_pair(&self, request: CreateKeyPairRequest) -> Result<KeyPair> {
        self.client.create_key_pair(request).await
    }

    pub async fn delete_key_pair(&self, request: DeleteKeyPairRequest) -> Result<()> {
        self.client.delete_key_pair(request).await
    }

    pub async fn describe_account_attributes(
        &self,
        request: DescribeAccountAttributesRequest,
    ) -> Result<DescribeAccountAttributesResult> {
        self.client.describe_account_attributes(request).await
    }

    pub async fn describe_availability_zones(
        &self,
        request: DescribeAvailabilityZonesRequest,
    ) -> Result<DescribeAvailabilityZonesResult> {
        self.client.describe_availability_zones(request).await
    }

    pub async fn describe_regions(
        &self,
        request: DescribeRegionsRequest,
    ) -> Result<DescribeRegionsResult> {
        self.client.describe_regions(request).await
    }
}
