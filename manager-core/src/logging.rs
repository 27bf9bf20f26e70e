//! Logging initialization for the manager

use crate::error::ManagerError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for the manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to include thread names in logs
    pub include_thread_names: bool,

    /// Whether to enable colored output
    pub enable_colors: bool,

    /// Module-specific log levels
    pub module_levels: std::collections::HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_levels = std::collections::HashMap::new();
        module_levels.insert("rule_engine".to_string(), "info".to_string());
        module_levels.insert("manager_core".to_string(), "info".to_string());
        module_levels.insert("tokio".to_string(), "warn".to_string());

        Self {
            level: "info".to_string(),
            include_thread_names: true,
            enable_colors: true,
            module_levels,
        }
    }
}

/// Initialize logging based on the provided configuration
pub fn init_logging(config: &LoggingConfig) -> Result<(), ManagerError> {
    let mut filter = EnvFilter::new(&config.level);

    for (module, level) in &config.module_levels {
        let directive = format!("{}={}", module, level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| ManagerError::Logging(format!("Invalid log directive: {}", e)))?,
        );
    }

    // Try to initialize logging, ignore if already initialized
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(config.include_thread_names)
                .with_ansi(config.enable_colors),
        )
        .try_init();

    match result {
        Ok(_) => {
            tracing::info!("Logging initialized with config level: {}", config.level);
        }
        Err(_) => {
            tracing::debug!("Logging already initialized, skipping");
        }
    }

    Ok(())
}
