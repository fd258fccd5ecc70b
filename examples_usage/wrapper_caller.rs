use tracing_enrich::{Config, Logger};

/// A helper that logs on behalf of its caller.
struct Audit {
    logger: Logger,
}

impl Audit {
    fn new(root: &Logger) -> Self {
        Self {
            logger: root.copy(Some("audit")).with_depth_offset(1),
        }
    }

    #[inline(never)]
    fn record(&self, action: &str) {
        self.logger.with_field("action", action).info("audit event");
    }
}

fn main() {
    let root = Logger::new(&Config {
        prefix: Some("app".into()),
        show_caller: true,
        ..Config::default()
    });

    root.info("@at points at this line of main");

    let audit = Audit::new(&root);
    audit.record("login"); // @at points here, not into Audit::record

    let adjusted = Logger::new(&Config {
        prefix: Some("adjusted".into()),
        show_caller: true,
        caller_depth_adjust: 1,
        ..Config::default()
    });
    log_for_caller(&adjusted);
}

#[inline(never)]
fn log_for_caller(logger: &Logger) {
    logger.info("@at points at the call of log_for_caller in main");
}
