use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use ec2_inventory_lib::TagValues;

#[derive(Subcommand)]
pub enum SubCommands {
    /// Show the host variables of the cluster's head instance
    Master,
    /// Count the inventory groups of the cluster
    Count,
    Images(Images),
    /// Describe the regions available to the account
    Regions,
    /// Describe the availability zones of the configured region
    Zones,
    AccountAttributes(AccountAttributes),
    /// Create a key pair and print its private key material
    CreateKeyPair(KeyName),
    /// Delete a key pair
    DeleteKeyPair(KeyName),
}

/// List machine images visible to the account
#[derive(Args)]
pub struct Images {
    /// Image name
    #[clap(long)]
    pub name: Option<String>,
    /// Owner account id
    #[clap(long)]
    pub owner: Option<String>,
    /// Tag filter; a comma separated list matches any of its values
    #[clap(long = "tag", value_name = "KEY=VALUE[,VALUE...]", parse(try_from_str = parse_tag))]
    pub tags: Vec<(String, TagValues)>,
}

/// Describe account attributes
#[derive(Args)]
pub struct AccountAttributes {
    /// Only show these attributes
    #[clap(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct KeyName {
    #[clap(value_name = "NAME")]
    pub name: String,
}

pub(crate) fn parse_tag(arg: &str) -> Result<(String, TagValues)> {
    let (key, values) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", arg))?;
    if key.is_empty() {
        return Err(anyhow!("tag key is empty in '{}'", arg));
    }

    let mut values: Vec<String> = values.split(',').map(str::to_string).collect();
    let values = if values.len() == 1 {
        TagValues::One(values.remove(0))
    } else {
        TagValues::Any(values)
    };
    Ok((key.to_string(), values))
}
