use super::ServiceConfig;
use crate::errors::Result;
use std::fs;

/// Loads and parses the service configuration from a YAML file
///
/// # Arguments
///
/// * `file_path` - Path to the YAML configuration file
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The YAML content cannot be parsed into a ServiceConfig
pub fn load_service_config(file_path: &str) -> Result<ServiceConfig> {
    let yaml_str = fs::read_to_string(file_path)?;
    parse_service_config(&yaml_str)
}

fn parse_service_config(yaml_str: &str) -> Result<ServiceConfig> {
    let config: ServiceConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_service_config("server:\n  port: 8080\n  cors: false\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.cors);
        assert_eq!(config.server.prefix, "/sqlbreeze");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_logging_section() {
        let config =
            parse_service_config("logging:\n  level: debug\n  file: true\n  directory: /tmp/sb\n")
                .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file);
        assert_eq!(config.logging.directory, "/tmp/sb");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse_service_config("server: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_service_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
