use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::config::Config;

/// 追加写入日志文件的 `log` 后端
pub struct Logger {
    file: Mutex<Box<dyn Write + Send>>,
    level: LevelFilter,
}

impl Logger {
    pub fn new(log_path: &Path, level: LevelFilter) -> Result<Self, std::io::Error> {
        if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self::with_writer(file, level))
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, level: LevelFilter) -> Self {
        Logger {
            file: Mutex::new(Box::new(writer)),
            level,
        }
    }

    fn write_entry(&self, entry: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "日志文件锁已损坏"))?;
        file.write_all(entry.as_bytes())
    }

    pub fn init(log_path: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        let logger = Self::new(log_path, level)?;
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = Local::now();
            let timestamp = now.format("%Y-%m-%d %H:%M:%S%.3f");
            let log_entry = format!(
                "[{}] [{}] [{}:{}] {}\n",
                timestamp,
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            );

            // 写文件失败时退回 stderr，日志不能悄悄丢失
            if let Err(e) = self.write_entry(&log_entry) {
                eprintln!("写入日志文件失败: {}", e);
                eprint!("{}", log_entry);
            }
        }
    }

    fn flush(&self) {
        match self.file.lock() {
            Ok(mut file) => {
                if let Err(e) = file.flush() {
                    eprintln!("刷新日志文件失败: {}", e);
                }
            }
            Err(_) => eprintln!("刷新日志文件失败: 日志文件锁已损坏"),
        }
    }
}

/// 配置了 LOG_FILE 时写文件，否则交给 env_logger 输出到 stderr
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match &config.log_file {
        Some(path) => Logger::init(path, config.log_level),
        None => {
            env_logger::Builder::new()
                .filter_level(config.log_level)
                .try_init()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_log_path() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("login-api-logger-{}", nanos))
            .join("app.log")
    }

    #[test]
    fn test_writes_enabled_records_only() {
        let path = temp_log_path();
        let logger = Logger::new(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("IP 10.0.0.1 已限流"))
                .file(Some("limiter.rs"))
                .line(Some(7))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("不应写入"))
                .build(),
        );
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[WARN] [limiter.rs:7] IP 10.0.0.1 已限流"));
        assert!(!contents.contains("不应写入"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let logger = Logger::with_writer(BrokenWriter, LevelFilter::Info);

        let err = logger.write_entry("[INFO] 测试\n").unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        // 失败时退回 stderr，不会 panic
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .args(format_args!("写入失败"))
                .build(),
        );
        logger.flush();
    }
}
