// Resolution of the IANA zone used for "local" wall-clock time
use chrono_tz::Tz;

pub const FALLBACK_TIMEZONE: Tz = chrono_tz::Asia::Bangkok;

/// Configured zone name, else the host's zone, else Asia/Bangkok.
pub fn resolve_timezone(configured: Option<&str>) -> Tz {
    let host = || match iana_time_zone::get_timezone() {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::warn!("Could not determine host time zone: {}", e);
            None
        }
    };

    let name = configured
        .map(str::to_string)
        .filter(|name| !name.trim().is_empty())
        .or_else(host);

    match name {
        Some(name) => parse_zone(&name).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown time zone {:?}, falling back to {}",
                name,
                FALLBACK_TIMEZONE.name()
            );
            FALLBACK_TIMEZONE
        }),
        None => FALLBACK_TIMEZONE,
    }
}

fn parse_zone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_zone_wins() {
        assert_eq!(resolve_timezone(Some("Europe/Berlin")), chrono_tz::Europe::Berlin);
        assert_eq!(resolve_timezone(Some(" Asia/Tokyo ")), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_unknown_zone_falls_back() {
        assert_eq!(resolve_timezone(Some("Mars/Olympus_Mons")), FALLBACK_TIMEZONE);
        assert_eq!(FALLBACK_TIMEZONE.name(), "Asia/Bangkok");
    }
}
