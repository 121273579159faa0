use log::{Record, Metadata, Level, LevelFilter, SetLoggerError};
use chrono::Utc;


pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Logger { level }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!("{} [{}] {} - {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            record.target(), record.level(), record.args());

        if record.level() <= Level::Warn {
            eprintln!("{}", line);
        }
        else {
            println!("{}", line);
        }
    }

    fn flush(&self) {}
}


/// Installs the process logger.
///
/// With a Sentry DSN the logger is wrapped so that error records are also
/// captured as Sentry events. The returned guard must live as long as the
/// process does.
pub fn init_logger(level: LevelFilter, sentry_dsn: Option<&str>)
    -> Result<Option<sentry::ClientInitGuard>, SetLoggerError> {

    let logger = Logger::new(level);

    let guard = match sentry_dsn {
        Some(dsn) => {
            let guard = sentry::init((dsn, sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            }));

            log::set_boxed_logger(Box::new(sentry_log::SentryLogger::with_dest(logger)))?;
            Some(guard)
        },
        None => {
            log::set_boxed_logger(Box::new(logger))?;
            None
        },
    };

    log::set_max_level(level);

    Ok(guard)
}
