use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub privacy_cash_api_url: String,
    /// Upper bound on one payment call, enforced around the rail.
    pub payment_timeout: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let privacy_cash_api_url = env::var("PRIVACY_CASH_API_URL")?;
        if !privacy_cash_api_url.starts_with("http://") && !privacy_cash_api_url.starts_with("https://") {
            return Err("PRIVACY_CASH_API_URL must be an http(s) URL".into());
        }

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let payment_timeout = Self::parse_seconds("PAYMENT_TIMEOUT_SECS", 120)?;
        let http_timeout = Self::parse_seconds("HTTP_TIMEOUT_SECS", 30)?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            privacy_cash_api_url,
            payment_timeout,
            http_timeout,
        })
    }

    fn parse_seconds(key: &str, default: u64) -> Result<Duration, Box<dyn std::error::Error>> {
        let seconds: u64 = match env::var(key) {
            Ok(value) => value.trim().parse().map_err(|_| format!("{} must be a whole number", key))?,
            Err(_) => default,
        };

        if seconds == 0 {
            return Err(format!("{} must be greater than zero", key).into());
        }

        Ok(Duration::from_secs(seconds))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_default_and_override() {
        assert_eq!(
            Config::parse_seconds("SUBLY_TEST_UNSET_TIMEOUT_SECS", 120).unwrap(),
            Duration::from_secs(120)
        );

        env::set_var("SUBLY_TEST_PAYMENT_TIMEOUT_SECS", "45");
        assert_eq!(
            Config::parse_seconds("SUBLY_TEST_PAYMENT_TIMEOUT_SECS", 120).unwrap(),
            Duration::from_secs(45)
        );
    }

    #[test]
    fn test_parse_seconds_rejects_zero_and_garbage() {
        env::set_var("SUBLY_TEST_ZERO_TIMEOUT_SECS", "0");
        assert!(Config::parse_seconds("SUBLY_TEST_ZERO_TIMEOUT_SECS", 30).is_err());

        env::set_var("SUBLY_TEST_BAD_TIMEOUT_SECS", "soon");
        assert!(Config::parse_seconds("SUBLY_TEST_BAD_TIMEOUT_SECS", 30).is_err());
    }
}
