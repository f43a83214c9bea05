//! Global subscriber installation (kept alone in its own test binary)

use semantics_sandbox::logging::{self, LogConfig, LogFormat};
use semantics_sandbox::SandboxError;
use tracing::Level;

#[test]
fn test_json_then_pretty_init() {
    let json = LogConfig::new()
        .with_level(Level::WARN)
        .with_format(LogFormat::Json);
    assert!(logging::init(json).is_ok());

    let pretty = LogConfig::new()
        .with_format(LogFormat::Pretty)
        .with_filter("semantics_sandbox=debug");
    assert!(matches!(
        logging::init(pretty),
        Err(SandboxError::Logging(_))
    ));
}
