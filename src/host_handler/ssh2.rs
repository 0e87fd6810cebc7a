use crate::error::Error;
use crate::host_handler::credentials::Credentials;
use crate::host_handler::{CommandResult, HostHandler, RemoteEntry};
use ssh2::{Session, Sftp};
use std::io::Read;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

pub struct Ssh2HostHandler {
    auth: Ssh2AuthMethod,
    session: Option<Session>,
    sftp: Option<Sftp>,
}

impl std::fmt::Debug for Ssh2HostHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ssh2HostHandler")
            .field("auth", &self.auth)
            .field(
                "authenticated",
                &self.session.as_ref().map(|session| session.authenticated()),
            )
            .field("sftp_opened", &self.sftp.is_some())
            .finish()
    }
}

impl HostHandler for Ssh2HostHandler {
    fn connect(&mut self, endpoint: &str) -> Result<(), Error> {
        // Check whether a session is already enabled or not
        if self.is_connected() {
            return Ok(());
        }

        let (address, ssh_port) = parse_endpoint(endpoint)?;

        let tcp = TcpStream::connect((address, ssh_port))
            .map_err(|e| Error::FailedTcpBinding(format!("{}:{} : {:?}", address, ssh_port, e)))?;

        let mut session =
            Session::new().map_err(|e| Error::FailedInitialization(format!("{:?}", e)))?;
        session.set_tcp_stream(tcp);

        // The host key is accepted without verification
        if let Err(error_detail) = session.handshake() {
            return Err(Error::FailedInitialization(format!("{:?}", error_detail)));
        }

        let auth_result = match &self.auth {
            Ssh2AuthMethod::UsernamePassword(credentials) => {
                session.userauth_password(credentials.username(), credentials.password())
            }
            Ssh2AuthMethod::KeyFile((username, privatekeypath)) => {
                session.userauth_pubkey_file(username.as_str(), None, privatekeypath, None)
            }
        };

        if let Err(error_detail) = auth_result {
            return Err(Error::FailedInitialization(format!(
                "Authentication failed : {}",
                error_detail
            )));
        }

        if !session.authenticated() {
            return Err(Error::FailedInitialization(String::from(
                "Authentication failed",
            )));
        }

        self.session = Some(session);
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.session
            .as_ref()
            .map(|session| session.authenticated())
            .unwrap_or(false)
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        // The SFTP channel has to go before the session it lives in
        self.sftp = None;

        if let Some(session) = self.session.take() {
            if let Err(ssh2_error_detail) = session.disconnect(
                Some(ssh2::DisconnectCode::ByApplication),
                "disconnection called",
                None,
            ) {
                return Err(Error::AnyOtherError(format!(
                    "failed to close SSH2 session : {}",
                    ssh2_error_detail
                )));
            }
        }
        Ok(())
    }

    fn run_command(&mut self, command: &str) -> Result<CommandResult, Error> {
        let session = self.session.as_ref().ok_or(Error::NotConnectedToHost)?;

        let mut channel = session
            .channel_session()
            .map_err(|e| Error::FailureToEstablishConnection(format!("{e}")))?;

        if let Err(error_detail) = channel.exec(command) {
            return Err(Error::FailureToRunCommand(format!("{:?}", error_detail)));
        }

        let mut stdout = String::new();
        let mut stderr = String::new();

        channel
            .stream(0)
            .read_to_string(&mut stdout)
            .map_err(|e| Error::FailureToRunCommand(format!("reading stdout : {e}")))?;
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|e| Error::FailureToRunCommand(format!("reading stderr : {e}")))?;

        channel
            .wait_close()
            .map_err(|e| Error::FailureToRunCommand(format!("{e}")))?;

        Ok(CommandResult {
            return_code: channel
                .exit_status()
                .map_err(|e| Error::FailureToRunCommand(format!("{e}")))?,
            stdout,
            stderr,
        })
    }

    fn read_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>, Error> {
        let listing = self.sftp()?.readdir(Path::new(path));

        match listing {
            Ok(entries) => Ok(entries
                .into_iter()
                .filter_map(|(entry_path, stat)| {
                    entry_path.file_name().map(|name| RemoteEntry {
                        name: name.to_string_lossy().to_string(),
                        is_dir: stat.is_dir(),
                    })
                })
                .collect()),
            Err(error_detail) => Err(Error::FailedRemoteListing {
                path: path.to_string(),
                details: error_detail.to_string(),
            }),
        }
    }

    fn open_file(&mut self, path: &str) -> Result<Box<dyn Read + '_>, Error> {
        match self.sftp()?.open(Path::new(path)) {
            Ok(file) => Ok(Box::new(file)),
            Err(error_detail) => Err(Error::FailedRemoteOpen {
                path: path.to_string(),
                details: error_detail.to_string(),
            }),
        }
    }
}

impl Ssh2HostHandler {
    pub fn from(auth: Ssh2AuthMethod) -> Ssh2HostHandler {
        Ssh2HostHandler {
            auth,
            session: None,
            sftp: None,
        }
    }

    pub fn username_password(username: &str, password: &str) -> Ssh2HostHandler {
        Ssh2HostHandler::from(Ssh2AuthMethod::UsernamePassword(Credentials::from(
            username, password,
        )))
    }

    pub fn key_file(username: &str, key_file_path: &str) -> Ssh2HostHandler {
        Ssh2HostHandler::from(Ssh2AuthMethod::KeyFile((
            username.to_string(),
            PathBuf::from(key_file_path),
        )))
    }

    // One SFTP sub-session per connection, opened on first use
    fn sftp(&mut self) -> Result<&Sftp, Error> {
        if self.sftp.is_none() {
            let session = self.session.as_ref().ok_or(Error::NotConnectedToHost)?;
            let sftp = session.sftp().map_err(|e| {
                Error::FailureToEstablishConnection(format!("unable to open SFTP session : {e}"))
            })?;
            self.sftp = Some(sftp);
        }

        self.sftp.as_ref().ok_or(Error::NotConnectedToHost)
    }
}

#[derive(Debug, Clone)]
pub enum Ssh2AuthMethod {
    UsernamePassword(Credentials),
    KeyFile((String, PathBuf)), // (username, private key's path)
}

/// Splits `address`, `address:port`, `[v6address]` or `[v6address]:port`. A bare IPv6 address
/// keeps the default port.
fn parse_endpoint(endpoint: &str) -> Result<(&str, u16), Error> {
    let endpoint = endpoint.trim();

    let (address, port) = if let Some(bracketed) = endpoint.strip_prefix('[') {
        let (address, rest) = bracketed.split_once(']').ok_or_else(|| {
            Error::FailedInitialization(format!("unclosed bracket in {}", endpoint))
        })?;
        (address, rest.strip_prefix(':'))
    } else {
        match endpoint.split_once(':') {
            // More than one colon and no brackets : a bare IPv6 address
            Some((_, rest)) if rest.contains(':') => (endpoint, None),
            Some((address, port)) => (address, Some(port)),
            None => (endpoint, None),
        }
    };

    if address.is_empty() {
        return Err(Error::FailedInitialization("empty address".to_string()));
    }

    let ssh_port: u16 = match port {
        Some(port) if !port.is_empty() => port.parse::<u16>().map_err(|error_detail| {
            Error::FailedInitialization(format!("failure to parse given port : {}", error_detail))
        })?,
        // No port specified, using default ssh port then
        _ => 22,
    };

    Ok((address, ssh_port))
}
