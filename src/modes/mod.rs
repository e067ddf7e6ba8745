mod dump;
mod replay;
mod serve;
mod shared;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Serve,
    Dump,
    Replay,
}

impl RunMode {
    fn from_env() -> Self {
        let raw = std::env::var("RUN_MODE").unwrap_or_else(|_| "serve".into());
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "dump" => Self::Dump,
            "replay" => Self::Replay,
            _ => Self::Serve,
        }
    }
}

pub async fn run_from_env() -> Result<()> {
    match RunMode::from_env() {
        RunMode::Serve => serve::run().await,
        RunMode::Dump => dump::run().await,
        RunMode::Replay => replay::run().await,
    }
}

#[cfg(test)]
mod tests {
    use super::RunMode;

    #[test]
    fn unknown_mode_falls_back_to_serve() {
        assert_eq!(RunMode::parse(" DUMP "), RunMode::Dump);
        assert_eq!(RunMode::parse("replay"), RunMode::Replay);
        assert_eq!(RunMode::parse("live"), RunMode::Serve);
        assert_eq!(RunMode::parse(""), RunMode::Serve);
    }
}
