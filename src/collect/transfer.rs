use crate::error::Error;
use crate::host_handler::{HostHandler, split_remote_path};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use xz2::read::XzDecoder;

/// Outcome of a single file copy. Only completed copies count as transferred files.
#[derive(Debug, Clone, PartialEq)]
pub enum Transfer {
    Completed { local_path: PathBuf, bytes: u64 },
    Skipped,
}

impl Transfer {
    pub fn is_completed(&self) -> bool {
        matches!(self, Transfer::Completed { .. })
    }
}

/// Copies `remote_path` under `local_dir`, mirroring the remote directory and prefixing the file
/// name with `host_tag` so the same file collected from several hosts never collides.
pub fn fetch_file<Handler: HostHandler + ?Sized>(
    handler: &mut Handler,
    remote_path: &str,
    local_dir: &Path,
    host_tag: &str,
) -> Result<Transfer, Error> {
    let (remote_dir, base_name) = split_remote_path(remote_path);
    let destination_dir = local_dir.join(remote_dir.trim_start_matches('/'));
    let file_name = tagged_file_name(host_tag, base_name);

    copy_and_post_process(handler, remote_path, &destination_dir, &file_name)
}

/// Copies `remote_path` flat into `local_dir`, keeping the remote file name as is.
pub fn fetch_returned_file<Handler: HostHandler + ?Sized>(
    handler: &mut Handler,
    remote_path: &str,
    local_dir: &Path,
) -> Result<Transfer, Error> {
    let (_, base_name) = split_remote_path(remote_path);

    copy_and_post_process(handler, remote_path, local_dir, base_name)
}

/// `host-name.log`, with colons replaced since several filesystems reject them.
pub fn tagged_file_name(host_tag: &str, base_name: &str) -> String {
    format!("{}-{}", host_tag, base_name).replace(':', "_")
}

fn copy_and_post_process<Handler: HostHandler + ?Sized>(
    handler: &mut Handler,
    remote_path: &str,
    destination_dir: &Path,
    file_name: &str,
) -> Result<Transfer, Error> {
    let mut source = match handler.open_file(remote_path) {
        Ok(source) => source,
        Err(error_detail) if error_detail.is_recoverable() => {
            warn!("{}", error_detail);
            return Ok(Transfer::Skipped);
        }
        Err(error_detail) => return Err(error_detail),
    };

    if file_name.is_empty() {
        warn!("no file name in remote path {:?}, skipping it", remote_path);
        return Ok(Transfer::Skipped);
    }

    std::fs::create_dir_all(destination_dir)
        .map_err(|error_detail| Error::local_io(destination_dir, error_detail))?;

    let local_path = destination_dir.join(file_name);
    let mut destination =
        File::create(&local_path).map_err(|error_detail| Error::local_io(&local_path, error_detail))?;

    let bytes = match std::io::copy(&mut source, &mut destination) {
        Ok(bytes) => bytes,
        Err(error_detail) => {
            warn!(
                "transfer of {} interrupted : {}",
                remote_path, error_detail
            );
            drop(destination);
            let _ = std::fs::remove_file(&local_path);
            return Ok(Transfer::Skipped);
        }
    };
    drop(destination);
    drop(source);

    info!("file transferred: {} ({} bytes)", file_name, bytes);

    post_process(&local_path)?;

    Ok(Transfer::Completed { local_path, bytes })
}

/// Unpacks a freshly collected file when its name calls for it.
///
/// `name.log.xz` is decompressed next to itself as `name.log`; the archive is kept. Returns the
/// path of the unpacked file, if any. Failing to unpack is fatal.
pub fn post_process(local_path: &Path) -> Result<Option<PathBuf>, Error> {
    let file_name = match local_path.file_name() {
        Some(file_name) => file_name.to_string_lossy().to_string(),
        None => return Ok(None),
    };

    let Some(stripped_name) = file_name.strip_suffix(".xz") else {
        return Ok(None);
    };

    let decompression_error = |details: String| Error::FailedDecompression {
        path: local_path.display().to_string(),
        details,
    };

    let archive = File::open(local_path).map_err(|e| decompression_error(e.to_string()))?;
    let mut decoder = XzDecoder::new_multi_decoder(BufReader::new(archive));

    let unpacked_path = local_path.with_file_name(stripped_name);
    let mut unpacked =
        File::create(&unpacked_path).map_err(|e| decompression_error(e.to_string()))?;

    let bytes = std::io::copy(&mut decoder, &mut unpacked)
        .map_err(|e| decompression_error(e.to_string()))?;

    info!(
        "xz {} decompress -> {} ({} bytes)",
        file_name, stripped_name, bytes
    );

    Ok(Some(unpacked_path))
}
