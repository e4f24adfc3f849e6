use anyhow::Result;
use lifeline::impl_storage_clone;
use std::path::PathBuf;

/// Overrides the Unix socket path the gateway binds and clients dial.
pub const SOCKET_ENV_VAR: &str = "TABGATE_SOCK";

/// Config created for each gateway process.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub pid: u32,
    pub socket_path: PathBuf,
}

impl_storage_clone!(GatewayConfig);

/// The full path to tabgate's dotdir directory, used to store the socket and
/// the gateway log.
pub fn dotdir_path() -> Result<PathBuf> {
    let mut dir = dirs::home_dir().ok_or_else(|| anyhow::Error::msg("home_dir not found"))?;

    dir.push(".tabgate");

    Ok(dir)
}

/// Creates the dotdir, so the modules don't need to worry about it.
pub fn mkdir() -> Result<()> {
    let dir = dotdir_path()?;
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Returns the path to the gateway's logfile.  Stdout belongs to the browser
/// channel, so everything the gateway reports lands here (and on stderr).
pub fn gateway_log() -> Result<PathBuf> {
    let mut dir = dotdir_path()?;
    dir.push("gateway.log");
    Ok(dir)
}

/// The Unix socket over which clients reach the gateway.  Fixed per user,
/// unless overridden with the `TABGATE_SOCK` environment variable.
pub fn socket_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(SOCKET_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    let mut dir = dotdir_path()?;
    dir.push("gateway.sock");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::{dotdir_path, gateway_log};

    #[test]
    fn dotdir_path_matches() {
        let mut expected = dirs::home_dir().expect("home dir required");
        expected.push(".tabgate");

        let path = dotdir_path();
        assert!(path.is_ok());
        assert_eq!(expected, path.unwrap());
    }

    #[test]
    fn gateway_log_matches() {
        let mut expected = dirs::home_dir().expect("home dir required");
        expected.push(".tabgate");
        expected.push("gateway.log");

        let path = gateway_log();
        assert!(path.is_ok());
        assert_eq!(expected, path.unwrap());
    }
}
