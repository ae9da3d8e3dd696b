use common::{init_structured_logging, LoggingConfig, OperationTimer};

#[test]
fn test_global_subscriber_installs_once() {
    let config = LoggingConfig::from_level_name("info", true);
    init_structured_logging(config).expect("first init succeeds");

    let mut timer = OperationTimer::new("project");
    timer.add_field("user", "ada");
    timer.finish_with_result(&Err::<(), _>("Project not found"));

    // The global default can only be set once per process
    assert!(init_structured_logging(LoggingConfig::default()).is_err());
}
