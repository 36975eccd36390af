use async_trait::async_trait;
use rusoto_core::credential::{DefaultCredentialsProvider, StaticProvider};
use rusoto_core::request::HttpClient;
use rusoto_ec2::{
    CreateKeyPairRequest, DeleteKeyPairRequest, DescribeAccountAttributesRequest,
    DescribeAccountAttributesResult, DescribeAvailabilityZonesRequest,
    DescribeAvailabilityZonesResult, DescribeImagesRequest, DescribeImagesResult,
    DescribeInstancesRequest, DescribeInstancesResult, DescribeRegionsRequest,
    DescribeRegionsResult, DescribeVolumesRequest, DescribeVolumesResult, Ec2, Ec2Client, Filter,
    KeyPair,
};

use crate::config::Profile;
use crate::error::Error;
use crate::Result;

/// The subset of the EC2 API the inventory needs.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn describe_instances(
        &self,
        request: DescribeInstancesRequest,
    ) -> Result<DescribeInstancesResult>;

    async fn describe_images(&self, request: DescribeImagesRequest) -> Result<DescribeImagesResult>;

    async fn describe_volumes(
        &self,
        request: DescribeVolumesRequest,
    ) -> Result<DescribeVolumesResult>;

    async fn create_key_pair(&self, request: CreateKeyPairRequest) -> Result<KeyPair>;

    async fn delete_key_pair(&self, request: DeleteKeyPairRequest) -> Result<()>;

    async fn describe_account_attributes(
        &self,
        request: DescribeAccountAttributesRequest,
    ) -> Result<DescribeAccountAttributesResult>;

    async fn describe_availability_zones(
        &self,
        request: DescribeAvailabilityZonesRequest,
    ) -> Result<DescribeAvailabilityZonesResult>;

    async fn describe_regions(&self, request: DescribeRegionsRequest)
        -> Result<DescribeRegionsResult>;
}

/// Build an EC2 client for the profile's region.
///
/// Static credentials are used when both keys are set, otherwise the
/// default chain (env, profile file, instance metadata). Nothing is
/// checked here; bad credentials show up on the first request.
pub fn ec2_client(profile: &Profile) -> Result<Ec2Client> {
    let region = profile.region.clone();
    let dispatcher = HttpClient::new()?;

    let client = match (&profile.access_key_id, &profile.secret_access_key) {
        (Some(access_key_id), Some(secret_access_key)) => Ec2Client::new_with(
            dispatcher,
            StaticProvider::new_minimal(access_key_id.clone(), secret_access_key.clone()),
            region,
        ),
        _ => {
            let credentials = DefaultCredentialsProvider::new()
                .map_err(|e| Error::Authentication(e.to_string()))?;
            Ec2Client::new_with(dispatcher, credentials, region)
        }
    };
    Ok(client)
}

pub fn filter(name: impl Into<String>, values: Vec<String>) -> Filter {
    Filter {
        name: Some(name.into()),
        values: Some(values),
    }
}

pub fn tag_filter(key: &str, values: Vec<String>) -> Filter {
    filter(format!("tag:{}", key), values)
}

pub fn running_filter() -> Filter {
    filter("instance-state-name", vec!["running".to_string()])
}

#[async_trait]
impl ComputeApi for Ec2Client {
    async fn describe_instances(
        &self,
        request: DescribeInstancesRequest,
    ) -> Result<DescribeInstancesResult> {
        Ec2::describe_instances(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DescribeInstances", e))
    }

    async fn describe_images(&self, request: DescribeImagesRequest) -> Result<DescribeImagesResult> {
        Ec2::describe_images(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DescribeImages", e))
    }

    async fn describe_volumes(
        &self,
        request: DescribeVolumesRequest,
    ) -> Result<DescribeVolumesResult> {
        Ec2::describe_volumes(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DescribeVolumes", e))
    }

    async fn create_key_pair(&self, request: CreateKeyPairRequest) -> Result<KeyPair> {
        Ec2::create_key_pair(self, request)
            .await
            .map_err(|e| Error::from_rusoto("CreateKeyPair", e))
    }

    async fn delete_key_pair(&self, request: DeleteKeyPairRequest) -> Result<()> {
        Ec2::delete_key_pair(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DeleteKeyPair", e))
    }

    async fn describe_account_attributes(
        &self,
        request: DescribeAccountAttributesRequest,
    ) -> Result<DescribeAccountAttributesResult> {
        Ec2::describe_account_attributes(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DescribeAccountAttributes", e))
    }

    async fn describe_availability_zones(
        &self,
        request: DescribeAvailabilityZonesRequest,
    ) -> Result<DescribeAvailabilityZonesResult> {
        Ec2::describe_availability_zones(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DescribeAvailabilityZones", e))
    }

    async fn describe_regions(
        &self,
        request: DescribeRegionsRequest,
    ) -> Result<DescribeRegionsResult> {
        Ec2::describe_regions(self, request)
            .await
            .map_err(|e| Error::from_rusoto("DescribeRegions", e))
    }
}
