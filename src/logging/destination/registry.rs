use anyhow::Result;

use crate::cfg::{create_trait_from_type_options, register_trait, TypeOptions};
use crate::logging::destination::LogDestination;
use crate::logging::destination::{
    file_destination::{FileDestination, FileDestinationConfig},
    stderr_destination::{StderrDestination, StderrDestinationConfig},
};

/// 注册所有内置日志目标
pub fn register_destinations() -> Result<()> {
    register_trait::<FileDestination, dyn LogDestination, FileDestinationConfig>("FileDestination")?;
    register_trait::<StderrDestination, dyn LogDestination, StderrDestinationConfig>(
        "StderrDestination",
    )?;
    Ok(())
}

/// 从 TypeOptions 创建日志目标
pub fn create_destination_from_options(options: &TypeOptions) -> Result<Box<dyn LogDestination>> {
    create_trait_from_type_options(options)
}
