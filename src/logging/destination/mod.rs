mod file_destination;
mod registry;
mod stderr_destination;
mod trait_;

pub use file_destination::{FileDestination, FileDestinationConfig};
pub use registry::{create_destination_from_options, register_destinations};
pub use stderr_destination::{StderrDestination, StderrDestinationConfig};
pub use trait_::{DestinationKind, LogDestination};
