use jal_logger::{LevelFilter, Logger, LoggerError, parse_rotation};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

// The global subscriber can only be installed once per process, so the
// first successful init happens in exactly one test and the others assert
// on the failure path.

#[test]
#[serial]
fn file_logging_writes_json_lines_then_second_init_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("jal-integration")
        .console(false)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .rotation(parse_rotation("never")?)
        .json(true)
        .init()?;

    tracing::info!(sensor_id = "S-17", pressure = 1.2, "critical reading");
    assert!(logger.guard().is_some(), "file output keeps a worker guard");

    let err = Logger::builder()
        .name("jal-integration-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");
    assert!(matches!(err, LoggerError::Subscriber { .. }));

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    let line = contents.lines().find(|l| l.contains("critical reading")).expect("event logged");
    assert!(line.starts_with('{'), "json output expected, got {line}");
    assert!(line.contains("\"sensor_id\":\"S-17\""));
    Ok(())
}

#[test]
#[serial]
fn disabling_every_output_is_rejected() {
    let err = Logger::builder()
        .name("jal-silent")
        .console(false)
        .init()
        .expect_err("no layers should be rejected");
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
