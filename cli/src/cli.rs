pub mod opts;
pub mod subs;

use anyhow::{Context, Result};
use ec2_inventory_lib::{Ec2Provider, Error, Profile, VarsFile};
use log::*;
use rusoto_ec2::{
    CreateKeyPairRequest, DeleteKeyPairRequest, DescribeAccountAttributesRequest,
    DescribeAvailabilityZonesRequest, DescribeRegionsRequest,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

use opts::Opts;
use subs::{AccountAttributes, Images, KeyName, SubCommands};

pub(crate) async fn run(opts: Opts) -> Result<()> {
    // hostvars already ship in `_meta`, so per-host queries have nothing to add
    if let Some(host) = &opts.host {
        debug!("--host {}: hostvars are provided through _meta", host);
        return print_json(&serde_json::json!({}), opts.pretty);
    }

    let profile = load_profile(&opts)?;

    match &opts.command {
        None => inventory(profile, opts.pretty).await,
        Some(SubCommands::Master) => master(profile, opts.pretty).await,
        Some(SubCommands::Count) => count(profile, opts.pretty).await,
        Some(SubCommands::Images(sub)) => images(profile, sub, opts.pretty).await,
        Some(SubCommands::Regions) => {
            let provider = Ec2Provider::from_profile(profile)?;
            let regions = provider
                .describe_regions(DescribeRegionsRequest::default())
                .await?;
            print_json(&regions, opts.pretty)
        }
        Some(SubCommands::Zones) => {
            let provider = Ec2Provider::from_profile(profile)?;
            let zones = provider
                .describe_availability_zones(DescribeAvailabilityZonesRequest::default())
                .await?;
            print_json(&zones, opts.pretty)
        }
        Some(SubCommands::AccountAttributes(sub)) => {
            account_attributes(profile, sub, opts.pretty).await
        }
        Some(SubCommands::CreateKeyPair(sub)) => create_key_pair(profile, sub, opts.pretty).await,
        Some(SubCommands::DeleteKeyPair(sub)) => delete_key_pair(profile, sub).await,
    }
}

fn load_profile(opts: &Opts) -> Result<Profile> {
    let vars = VarsFile::load(&opts.vars)
        .with_context(|| format!("couldn't load vars from {}", opts.vars.display()))?;
    let mut profile = Profile::from_vars(vars)?
        .with_credentials(opts.access_key_id.clone(), opts.secret_access_key.clone());
    if let Some(cluster_id) = &opts.cluster_id {
        profile = profile.with_cluster_id(cluster_id.as_str());
    }
    debug!("using {:?}", profile);
    Ok(profile)
}

fn cluster_id(profile: &Profile) -> Result<String> {
    let cluster_id = profile.cluster_id.clone().ok_or_else(|| {
        Error::Config("no cluster id: set cluster_id in the vars file or pass --cluster".into())
    })?;
    Ok(cluster_id)
}

async fn inventory(profile: Profile, pretty: bool) -> Result<()> {
    let cluster_id = cluster_id(&profile)?;
    let provider = Ec2Provider::from_profile(profile)?;
    let inventory = provider.get_inventory(&cluster_id).await?;
    print_json(&inventory, pretty)
}

async fn master(profile: Profile, pretty: bool) -> Result<()> {
    let cluster_id = cluster_id(&profile)?;
    let provider = Ec2Provider::from_profile(profile)?;
    let master = provider.get_master_instance(&cluster_id).await?;
    print_json(&master, pretty)
}

async fn count(profile: Profile, pretty: bool) -> Result<()> {
    let cluster_id = cluster_id(&profile)?;
    let provider = Ec2Provider::from_profile(profile)?;
    let count = provider.running_instance_count(&cluster_id).await?;
    print_json(&count, pretty)
}

async fn images(profile: Profile, sub: &Images, pretty: bool) -> Result<()> {
    let provider = Ec2Provider::from_profile(profile)?;
    let tags: BTreeMap<_, _> = sub.tags.iter().cloned().collect();
    let tags = if tags.is_empty() { None } else { Some(&tags) };

    if sub.name.is_none() && sub.owner.is_none() && tags.is_none() {
        warn!("no image filters given, listing every image visible to the account");
    }

    let images = provider
        .get_machine_images(sub.name.as_deref(), sub.owner.as_deref(), tags)
        .await?;
    print_json(&images, pretty)
}

async fn account_attributes(profile: Profile, sub: &AccountAttributes, pretty: bool) -> Result<()> {
    let provider = Ec2Provider::from_profile(profile)?;
    let request = DescribeAccountAttributesRequest {
        attribute_names: if sub.names.is_empty() {
            None
        } else {
            Some(sub.names.clone())
        },
        ..Default::default()
    };
    let attributes = provider.describe_account_attributes(request).await?;
    print_json(&attributes, pretty)
}

async fn create_key_pair(profile: Profile, sub: &KeyName, pretty: bool) -> Result<()> {
    let provider = Ec2Provider::from_profile(profile)?;
    let request = CreateKeyPairRequest {
        key_name: sub.name.clone(),
        ..Default::default()
    };
    let key_pair = provider.create_key_pair(request).await?;
    info!("created key pair {}", sub.name);
    print_json(&key_pair, pretty)
}

async fn delete_key_pair(profile: Profile, sub: &KeyName) -> Result<()> {
    let provider = Ec2Provider::from_profile(profile)?;
    let request = DeleteKeyPairRequest {
        key_name: Some(sub.name.clone()),
        ..Default::default()
    };
    provider.delete_key_pair(request).await?;
    info!("deleted key pair {}", sub.name);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut handle, value)?;
    } else {
        serde_json::to_writer(&mut handle, value)?;
    }
    writeln!(handle)?;
    Ok(())
}

/// The `{"error": {"kind", "message"}}` document written to stderr on failure.
pub(crate) fn error_envelope(error: &anyhow::Error) -> serde_json::Value {
    let kind = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or("internal", Error::kind);

    serde_json::json!({
        "error": {
            "kind": kind,
            "message": format!("{:#}", error),
        }
    })
}
