pub mod config;
pub mod structured_logging;

pub use config::{
    tracker_home, AuthSettings, ConfigLoader, DatabaseSettings, LoggingSettings, TrackerConfig,
};

pub use structured_logging::{
    init_structured_logging, ExecutionContext, JsonFormatter, LoggingConfig, OperationTimer,
    PerformanceMetrics, StructuredLogEntry,
};
