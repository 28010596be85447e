/// Failure of a single weather fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherError {
    #[error("City not found")]
    NotFound,

    #[error("Upstream request failed with status {status}")]
    Upstream { status: u16 },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Parse(String),
}

pub const CITY_NOT_FOUND: &str = "City not found. Please check the spelling and try again.";
pub const CURRENT_FETCH_FAILED: &str = "Failed to fetch weather data. Please try again later.";
pub const FORECAST_FETCH_FAILED: &str = "Failed to fetch forecast data";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// User-facing message for a failed current-weather fetch.
pub fn current_error_message(err: &WeatherError) -> String {
    match err {
        WeatherError::NotFound => CITY_NOT_FOUND.to_string(),
        WeatherError::Upstream { .. } => CURRENT_FETCH_FAILED.to_string(),
        WeatherError::Transport(msg) | WeatherError::Parse(msg) => own_message(msg),
    }
}

/// User-facing message for a failed forecast fetch.
///
/// The forecast panel does not distinguish status codes.
pub fn forecast_error_message(err: &WeatherError) -> String {
    match err {
        WeatherError::NotFound | WeatherError::Upstream { .. } => FORECAST_FETCH_FAILED.to_string(),
        WeatherError::Transport(msg) | WeatherError::Parse(msg) => own_message(msg),
    }
}

fn own_message(msg: &str) -> String {
    if msg.trim().is_empty() { UNEXPECTED_ERROR.to_string() } else { msg.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_not_found_has_spelling_hint() {
        assert_eq!(
            current_error_message(&WeatherError::NotFound),
            "City not found. Please check the spelling and try again."
        );
    }

    #[test]
    fn current_other_status_is_generic() {
        let msg = current_error_message(&WeatherError::Upstream { status: 401 });
        assert_eq!(msg, "Failed to fetch weather data. Please try again later.");
    }

    #[test]
    fn transport_errors_keep_their_message() {
        let err = WeatherError::Transport("connection refused".into());
        assert_eq!(current_error_message(&err), "connection refused");
        assert_eq!(forecast_error_message(&err), "connection refused");
    }

    #[test]
    fn empty_message_falls_back() {
        let err = WeatherError::Parse(String::new());
        assert_eq!(current_error_message(&err), UNEXPECTED_ERROR);
    }

    #[test]
    fn forecast_ignores_status_code() {
        assert_eq!(forecast_error_message(&WeatherError::NotFound), FORECAST_FETCH_FAILED);
        assert_eq!(
            forecast_error_message(&WeatherError::Upstream { status: 500 }),
            FORECAST_FETCH_FAILED
        );
    }
}
