use super::subs::SubCommands;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = "ec2-inventory",
    version,
    about = "Ansible dynamic inventory for EC2 clusters"
)]
pub struct Opts {
    /// Print the whole inventory (the default)
    #[clap(long, conflicts_with = "host")]
    pub list: bool,
    /// Print the variables of a single host
    #[clap(long, value_name = "HOST")]
    pub host: Option<String>,
    /// YAML file holding cluster_region and cluster_id
    #[clap(
        long,
        env = "EC2_INVENTORY_VARS",
        default_value = "vars/local.yml",
        value_name = "PATH"
    )]
    pub vars: PathBuf,
    /// Cluster to inventory, overriding cluster_id from the vars file
    #[clap(long = "cluster", env = "EC2_INVENTORY_CLUSTER", value_name = "ID")]
    pub cluster_id: Option<String>,
    #[clap(long, env = "AWS_ACCESS_KEY_ID", hide = true, hide_env_values = true)]
    pub access_key_id: Option<String>,
    #[clap(long, env = "AWS_SECRET_ACCESS_KEY", hide = true, hide_env_values = true)]
    pub secret_access_key: Option<String>,
    /// Indent the JSON output
    #[clap(long, short)]
    pub pretty: bool,
    #[clap(subcommand)]
    pub command: Option<SubCommands>,
}
