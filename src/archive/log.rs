use std::env;
use std::sync::LazyLock;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
}

impl Level {
    fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "info" | "debug" | "all" => Self::Info,
            "warn" | "warning" => Self::Warn,
            _ => Self::Error,
        }
    }
}

static KUMALAK_LOG: LazyLock<Level> = LazyLock::new(|| {
    env::var("KUMALAK_LOG")
        .map(|s| Level::from_str(&s))
        .unwrap_or(Level::Error)
});

macro_rules! log {
    ($level:expr, $prefix:expr, $msg:expr) => {
        if *KUMALAK_LOG >= $level {
            eprintln!(concat!($prefix, ": {}"), $msg.as_ref());
        }
    };
}

pub fn error(msg: impl AsRef<str>) {
    log!(Level::Error, "ERROR", msg);
}

pub fn warn(msg: impl AsRef<str>) {
    log!(Level::Warn, "WARN", msg);
}

pub fn info(msg: impl AsRef<str>) {
    log!(Level::Info, "INFO", msg);
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn test_level_from_str() {
        assert_eq!(Level::from_str("INFO"), Level::Info);
        assert_eq!(Level::from_str(" warning "), Level::Warn);
        assert_eq!(Level::from_str("err"), Level::Error);
        assert_eq!(Level::from_str("nonsense"), Level::Error);
    }

    #[test]
    fn test_levels_are_ordered_by_verbosity() {
        assert!(Level::Info > Level::Warn);
        assert!(Level::Warn > Level::Error);
    }
}
