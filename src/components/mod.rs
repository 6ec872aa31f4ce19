//! Component definitions and the registry that holds them.
mod builtin;
pub mod codec;
pub mod descriptor;
pub mod registry;

pub use codec::{CodecTable, ConfigCodec, ConfigFormat};
pub use descriptor::{
    ComponentDescriptor, ConfigSpec, DescriptorBuilder, ENTRYPOINT_STEM, MergeOptions,
    MergeStrategy, PathEntry, Platform, PostAction, ShellFunction, SyncFile, SyncMode, Wrapper,
};
pub use registry::{CommandBuilder, Registration, Registry};
