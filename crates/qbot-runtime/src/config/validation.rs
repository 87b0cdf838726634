//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, DispatchConfig, LogOutput, LoggingConfig, QbotConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &QbotConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_bot_config(&config.bot)?;
    validate_dispatch_config(&config.dispatch)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    for target in logging.filters.keys() {
        if target.is_empty() || target.contains(['=', ',']) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: '{target}'"
            )));
        }
    }

    Ok(())
}

fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.timeout_ms == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }

    // Credentials are optional, but only as a pair.
    if !bot.app_id.is_empty() && bot.token.is_empty() {
        return Err(ConfigError::missing_field("bot.token"));
    }
    if bot.app_id.is_empty() && !bot.token.is_empty() {
        return Err(ConfigError::missing_field("bot.app_id"));
    }

    Ok(())
}

fn validate_dispatch_config(dispatch: &DispatchConfig) -> ConfigResult<()> {
    if dispatch.concurrency == 0 {
        return Err(ConfigError::validation(
            "Dispatch concurrency must be at least 1",
        ));
    }
    Ok(())
}
