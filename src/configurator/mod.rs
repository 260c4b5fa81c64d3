pub mod descriptor;
pub mod loader;

pub use descriptor::{Configurator, ConfiguratorDescriptor};
pub use loader::{
    ConfiguratorLoader, ConfiguratorResolver, LoaderOutcome, LoaderState, ResolveCompletion,
};
