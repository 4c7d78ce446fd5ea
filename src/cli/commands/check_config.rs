//! Check config command handler

use crate::config::Config;

pub fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    println!("✓ Configuration is valid");
    println!("{:-<50}", "");
    println!("Database:      {}", config.general.database_url);
    println!(
        "Server:        {}:{}",
        config.server.bind_address, config.server.port
    );
    println!(
        "Mail:          {}",
        if config.mail.enabled {
            format!("SMTP via {}:{}", config.mail.smtp_host, config.mail.smtp_port)
        } else {
            "disabled (messages are logged)".to_string()
        }
    );
    println!(
        "Payments:      {} ({})",
        config.payments.stripe_api_base,
        if config.payments.stripe_secret_key.is_empty() {
            "no secret key"
        } else {
            "secret key set"
        }
    );
    println!(
        "Webhooks:      {}",
        if config.payments.webhook_secret.is_empty() {
            "signing secret missing, webhooks will be rejected"
        } else {
            "signing secret set"
        }
    );
    println!(
        "Metrics:       {}",
        if config.observability.metrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(())
}
