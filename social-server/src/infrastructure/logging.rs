use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Уровень `level` для своих крейтов и HTTP-слоя, остальное только `warn`.
pub(crate) fn default_directives(level: &str) -> String {
    format!("warn,social_server={level},social_client={level},tower_http={level}")
}

pub(crate) fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_level_to_own_crates() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("social_server=debug"));
        assert!(directives.contains("social_client=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
