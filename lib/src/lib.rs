//! Ansible dynamic inventory for EC2 clusters.
//!
//! Running instances are found by their cluster tag and grouped into one
//! inventory group per role tag value. See [`Ec2Provider`] for the entry
//! points.

pub mod compute;
pub mod config;
pub mod error;
pub mod inventory;
pub mod types;
pub mod volume;

#[cfg(test)]
mod testing;

pub use compute::ComputeApi;
pub use config::{Profile, TagVocabulary, VarsFile};
pub use error::Error;
pub use inventory::Ec2Provider;
pub use types::{InstanceVars, Inventory, MachineImage, TagValues};

pub type Result<T, E = Error> = std::result::Result<T, E>;
