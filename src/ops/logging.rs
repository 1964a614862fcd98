use tracing_subscriber::EnvFilter;

use crate::config::InfraConfig;

/// Installs the stderr subscriber. `RUST_LOG`, when set, replaces `infra.log_level`.
pub fn init(cfg: &InfraConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&cfg.log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(cfg.log_ansi)
        .with_target(true)
        .try_init();
}

fn level_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn per_target_directives_raise_the_hint() {
        let filter = level_filter("warn,features=debug");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(level_filter("error").max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn repeated_init_is_harmless() {
        let cfg = InfraConfig::default();
        init(&cfg);
        init(&cfg);
        tracing::debug!(target: "logging", "subscriber installed");
    }
}
