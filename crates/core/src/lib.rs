pub mod config;
pub mod detail;
pub mod naming;
pub mod net;
pub mod pipeline;
pub mod records;
pub mod storage;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    HarvestConfig, NetConfig,
};
pub use detail::{select_preferred_image, ImageRef, SelectionError, VehicleDetail};
pub use naming::PathDirector;
pub use net::{
    ApiResponse, HttpTransport, NetError, NetGovernor, NetworkLevel, Prompter, StdinPrompter,
    Transport, ALL_LEVELS, MAX_IN_FLIGHT,
};
pub use pipeline::{Harvester, RunSummary, Stage, TaskFailure};
pub use records::{read_records, RecordError, VehicleRecord};
pub use storage::{ImageStore, StorageError};
