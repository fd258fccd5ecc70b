use tracing_enrich::{Config, Logger};

fn main() {
    Logger::new(&Config::default())
        .with_fields([("output", "stderr"), ("level", "info"), ("show_caller", "false")])
        .info("default logger");

    let to_file = Logger::new(&Config {
        prefix: Some("file".into()),
        output: Some("example.log".into()),
        ..Config::default()
    });
    to_file.warn("written to example.log in the current directory");

    let verbose = Logger::new(&Config {
        prefix: Some("verbose".into()),
        output: Some("example.log".into()),
        verbose: true,
        level: "debug".into(),
        ..Config::default()
    });
    verbose.debug("written to example.log and stderr");

    let root = Logger::new(&Config {
        prefix: Some("service".into()),
        disable_colors: true,
        show_caller: true,
        ..Config::default()
    });
    let db = root.copy(Some("db"));
    let inherited = root.copy(None);
    root.info("root handle");
    db.with_field("table", "users").warn("scoped handle, same sink");
    inherited.error("copy without a new prefix keeps `service`");
}
