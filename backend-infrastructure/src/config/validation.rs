use anyhow::{anyhow, Result};
use chrono_tz::Tz;

pub fn validate_scheme(field: &str, value: &str) -> Result<()> {
    match value {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("{} must be http or https, got '{}'", field, other)),
    }
}

pub fn validate_timezone(value: &str) -> Result<()> {
    value
        .parse::<Tz>()
        .map(|_| ())
        .map_err(|_| anyhow!("server_tz '{}' is not an IANA timezone", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_values() {
        assert!(validate_scheme("api_scheme", "https").is_ok());
        assert!(validate_scheme("api_scheme", "ftp").is_err());
        assert!(validate_timezone("Europe/Berlin").is_ok());
        assert!(validate_timezone("Europe/Atlantis").is_err());
    }
}
