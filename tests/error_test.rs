use std::io;

use envplate::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_regex_error_conversion() {
    let err: Error = regex::Regex::new("(").unwrap_err().into();
    assert!(matches!(err, Error::FilterError(_)));
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::DependencyCycle("a -> b -> a".to_string());
    assert_eq!(err.to_string(), "Dependency cycle between resources: a -> b -> a.");

    let err = Error::PlatformError("linux".to_string());
    assert_eq!(err.to_string(), "Unknown platform 'linux', expected <os>/<arch>.");

    let err = Error::CommandError {
        command: "go build".to_string(),
        status: "exit status: 1".to_string(),
    };
    assert_eq!(err.to_string(), "Command 'go build' failed with status: exit status: 1.");
}
