use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_FILE: &str = "matrixData.json";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON document holding the matrix
    pub data_file: PathBuf,
    /// Directory served for every path outside `/api`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Build from command line arguments: `website [data_file] [static_dir]`.
    ///
    /// The first item is the program name, as with `std::env::args()`.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = ServerConfig::default();
        let mut args = args.into_iter().skip(1);

        if let Some(data_file) = args.next() {
            config.data_file = PathBuf::from(data_file);
        }
        if let Some(static_dir) = args.next() {
            config.static_dir = PathBuf::from(static_dir);
        }

        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let config = ServerConfig::from_args(args(&["website"]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn positional_paths_override_defaults() {
        let config = ServerConfig::from_args(args(&["website", "data/m.json", "public"]));
        assert_eq!(config.data_file, PathBuf::from("data/m.json"));
        assert_eq!(config.static_dir, PathBuf::from("public"));

        let config = ServerConfig::from_args(args(&["website", "only.json"]));
        assert_eq!(config.data_file, PathBuf::from("only.json"));
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
    }
}
