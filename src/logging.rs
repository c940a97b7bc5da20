use tracing::debug;

use crate::config::LoggingSettings;
use crate::error::AppError;

pub fn init(settings: &LoggingSettings) -> Result<(), AppError> {
    let level = settings.max_level()?;
    if tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_err()
    {
        debug!("Tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        let settings = LoggingSettings::default();
        assert!(init(&settings).is_ok());
        assert!(init(&settings).is_ok());
    }

    #[test]
    fn init_rejects_bad_level() {
        let settings = LoggingSettings {
            level: "loud".to_string(),
        };
        assert!(init(&settings).is_err());
    }
}
