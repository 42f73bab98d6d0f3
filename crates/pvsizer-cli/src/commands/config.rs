use anyhow::Result;
use pvsizer_core::config::SizerConfig;
use pvsizer_infrastructure::ConfigService;

const REDACTED: &str = "<redacted>";

/// Copy of the config that is safe to print.
fn redacted(mut config: SizerConfig) -> SizerConfig {
    if config.backend.token.is_some() {
        config.backend.token = Some(REDACTED.to_string());
    }
    config
}

pub fn run() -> Result<()> {
    let service = ConfigService::new()?;
    let config = redacted(service.load()?);
    println!("# {}", service.path().display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
