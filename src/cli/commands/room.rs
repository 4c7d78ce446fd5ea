//! Add room command handler

use anyhow::{Context, bail};

use crate::config::Config;
use crate::db::{NewHotelRoom, Store};

/// Parses a decimal amount such as `149`, `149.9` or `$149.99` into cents.
pub fn parse_price_cents(input: &str) -> anyhow::Result<i64> {
    let trimmed = input.trim().trim_start_matches('$');
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid price: {input}");
    }
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid price: {input}. Use at most two decimal places");
    }

    let whole: i64 = whole
        .parse()
        .with_context(|| format!("Invalid price: {input}"))?;
    let fraction: i64 = format!("{fraction:0<2}")
        .parse()
        .with_context(|| format!("Invalid price: {input}"))?;

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .with_context(|| format!("Price out of range: {input}"))?;

    if cents <= 0 {
        bail!("Price must be greater than zero");
    }

    Ok(cents)
}

pub async fn cmd_add_room(
    config: &Config,
    title: &str,
    hotel_name: &str,
    location: &str,
    price: &str,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let price_per_night_cents = parse_price_cents(price)?;

    for (name, value) in [("title", title), ("hotel name", hotel_name), ("location", location)] {
        if value.trim().is_empty() {
            bail!("Room {name} cannot be empty");
        }
    }

    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let room = store
        .add_hotel_room(NewHotelRoom {
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            hotel_name: hotel_name.trim().to_string(),
            location: location.trim().to_string(),
            price_per_night_cents,
        })
        .await?;

    println!(
        "✓ Added room '{}' at {} (ID: {}, {}.{:02}/night)",
        room.title,
        room.hotel_name,
        room.id,
        room.price_per_night_cents / 100,
        room.price_per_night_cents % 100
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_cents() {
        assert_eq!(parse_price_cents("149").unwrap(), 14_900);
        assert_eq!(parse_price_cents("149.9").unwrap(), 14_990);
        assert_eq!(parse_price_cents("$149.99").unwrap(), 14_999);
        assert_eq!(parse_price_cents(" 0.50 ").unwrap(), 50);
    }

    #[test]
    fn test_parse_price_cents_rejects_bad_input() {
        assert!(parse_price_cents("").is_err());
        assert!(parse_price_cents("abc").is_err());
        assert!(parse_price_cents("1.234").is_err());
        assert!(parse_price_cents("-5").is_err());
        assert!(parse_price_cents("0").is_err());
        assert!(parse_price_cents(".5").is_err());
    }
}
