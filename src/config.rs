//! Configuration document : which hosts to visit, how to authenticate, what to collect and which
//! tasks to run.

use crate::collect::ExceptionSet;
use crate::error::Error;
use crate::host_handler::ssh2::Ssh2AuthMethod;
use crate::host_handler::credentials::Credentials;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Group name whose entries are single files instead of directories to walk.
pub const FILES_INDIVIDUAL: &str = "filesindividual";

const DEFAULT_SSH_PORT: &str = "22";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Host specification, see [`crate::host::expand_host_spec`].
    pub remote_ipaddr: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Private key path. When set, it is used instead of the password.
    #[serde(default)]
    pub ssh_key: Option<String>,
    #[serde(default)]
    pub ssh_port: Option<String>,
    /// Group name -> remote path specs. Groups are processed in name order.
    #[serde(default)]
    pub getfiles: BTreeMap<String, Vec<String>>,
    /// Remote paths excluded from directory walks. Only the keys matter.
    #[serde(default)]
    pub exceptfiles: BTreeMap<String, Option<serde_json::Value>>,
    /// Task name -> task. Tasks run in name order.
    #[serde(default)]
    pub executetasks: BTreeMap<String, TaskDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default)]
    pub taskexecute: String,
    #[serde(default)]
    pub taskget: String,
}

pub enum ConfigFormat {
    Yaml,
    Json,
    Unknown,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> ConfigFormat {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Unknown,
        }
    }
}

impl Config {
    pub fn from_str(raw_content: &str, format: ConfigFormat) -> Result<Config, Error> {
        match format {
            ConfigFormat::Yaml => yaml_serde::from_str::<Config>(raw_content)
                .map_err(|e| Error::FailedInitialization(format!("YAML : {}", e))),
            ConfigFormat::Json => serde_json::from_str::<Config>(raw_content)
                .map_err(|e| Error::FailedInitialization(format!("JSON : {}", e))),
            ConfigFormat::Unknown => {
                // Unknown format -> Try YAML -> Try JSON -> Failed
                match Config::from_str(raw_content, ConfigFormat::Yaml) {
                    Ok(config) => Ok(config),
                    Err(yaml_try_error) => {
                        match Config::from_str(raw_content, ConfigFormat::Json) {
                            Ok(config) => Ok(config),
                            Err(json_try_error) => Err(Error::FailedInitialization(format!(
                                "Unable to parse configuration. {} / {}",
                                yaml_try_error, json_try_error
                            ))),
                        }
                    }
                }
            }
        }
    }

    pub fn from_file(file_path: &Path) -> Result<Config, Error> {
        match std::fs::read_to_string(file_path) {
            Ok(file_content) => Config::from_str(&file_content, ConfigFormat::from_path(file_path)),
            Err(error) => Err(Error::FailedInitialization(format!(
                "{} : {}",
                file_path.display(),
                error
            ))),
        }
    }

    /// `address:port` to dial for a host taken from the expanded host spec. IPv6 addresses are
    /// bracketed.
    pub fn endpoint(&self, host: &str) -> String {
        let port = match self.ssh_port.as_deref().map(str::trim) {
            Some(port) if !port.is_empty() => port,
            _ => DEFAULT_SSH_PORT,
        };
        let host = host.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        }
    }

    pub fn auth_method(&self) -> Ssh2AuthMethod {
        match self.ssh_key.as_deref().map(str::trim) {
            Some(key_path) if !key_path.is_empty() => {
                Ssh2AuthMethod::KeyFile((self.username.clone(), PathBuf::from(key_path)))
            }
            _ => Ssh2AuthMethod::UsernamePassword(Credentials::from(
                &self.username,
                &self.password,
            )),
        }
    }

    pub fn exceptions(&self) -> ExceptionSet {
        self.exceptfiles.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_CONFIG: &str = "---
remote_ipaddr: 10.0.0.1-3,10.0.1.7
username: collector
password: secret
ssh_port: '2222'
getfiles:
  varlog:
    - /var/log/app
    - /var/log/*.gz
  filesindividual:
    - /etc/hostname
exceptfiles:
  /var/log/app/huge.log:
  /var/log/app/other.log: []
executetasks:
  task02:
    taskexecute: cat /tmp/count
    taskget: iterate
  task01:
    taskexecute: uptime
    taskget: console
";

    #[test]
    fn parsing_from_yaml_str() {
        let config = Config::from_str(RAW_CONFIG, ConfigFormat::Yaml).unwrap();

        assert_eq!(config.username, "collector");
        assert_eq!(config.getfiles["varlog"].len(), 2);
        assert_eq!(config.getfiles[FILES_INDIVIDUAL], vec!["/etc/hostname"]);
        assert_eq!(
            config.executetasks.keys().collect::<Vec<_>>(),
            vec!["task01", "task02"]
        );
        assert_eq!(config.executetasks["task02"].taskget, "iterate");

        let exceptions = config.exceptions();
        assert_eq!(exceptions.len(), 2);
        assert!(exceptions.contains("/var/log/app/huge.log"));
    }

    #[test]
    fn unknown_format_falls_back_to_json() {
        let raw = r#"{"remote_ipaddr": "localhost", "executetasks": {"t": {"taskexecute": "ls"}}}"#;

        let config = Config::from_str(raw, ConfigFormat::Unknown).unwrap();

        assert_eq!(config.remote_ipaddr, "localhost");
        assert_eq!(config.executetasks["t"].taskget, "");
    }

    #[test]
    fn malformed_document_is_an_initialization_error() {
        let result = Config::from_str("remote_ipaddr: [unclosed", ConfigFormat::Yaml);

        assert!(matches!(result, Err(Error::FailedInitialization(_))));
    }

    #[test]
    fn endpoint_defaults_to_port_22() {
        let mut config = Config::from_str(RAW_CONFIG, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.endpoint(" 10.0.0.1"), "10.0.0.1:2222");

        config.ssh_port = None;
        assert_eq!(config.endpoint("10.0.0.1"), "10.0.0.1:22");
        assert_eq!(config.endpoint("fe80::1"), "[fe80::1]:22");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let raw_config = "---
remote_ipaddr: 10.0.0.1
comment: written by hand
";
        let config = Config::from_str(raw_config, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.remote_ipaddr, "10.0.0.1");
    }

    #[test]
    fn key_file_wins_over_password() {
        let mut config = Config::from_str(RAW_CONFIG, ConfigFormat::Yaml).unwrap();
        assert!(matches!(
            config.auth_method(),
            Ssh2AuthMethod::UsernamePassword(_)
        ));

        config.ssh_key = Some("/home/collector/.ssh/id_ed25519".to_string());
        assert!(matches!(config.auth_method(), Ssh2AuthMethod::KeyFile(_)));
    }
}
