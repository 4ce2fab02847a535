use crate::utils::error::{BridgeError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number<T>(field_name: &str, value: T, min_value: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min_value {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_host(field_name: &str, host: &str) -> Result<()> {
    validate_non_empty_string(field_name, host)?;
    if host.chars().any(char::is_whitespace) {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: "Host cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("device_path", "COM8").is_ok());
        assert!(validate_path("device_path", "/dev/ttyUSB0").is_ok());
        assert!(validate_path("device_path", "").is_err());
        assert!(validate_path("device_path", "COM\08").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("baud_rate", 115_200u32, 1).is_ok());
        assert!(validate_positive_number("baud_rate", 0u32, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("http_port", 3000u16, 1, u16::MAX).is_ok());
        assert!(validate_range("http_port", 0u16, 1, u16::MAX).is_err());
    }

    #[test]
    fn test_validate_host() {
        assert!(validate_host("host", "0.0.0.0").is_ok());
        assert!(validate_host("host", "   ").is_err());
        assert!(validate_host("host", "local host").is_err());
    }
}
