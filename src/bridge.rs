//! Line-delimited JSON bridge between a host process and the file layer.
//!
//! Each input line is one [`Request`]; each output line is one [`Response`].

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::access::FileAccess;
use crate::config::Config;
use crate::error::{FsError, FsResult};
use crate::handle::Descriptor;
use crate::host::HostConstants;
use crate::path_ops;

/// One host call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Request {
    Open {
        path: PathBuf,
    },
    Close {
        fd: Descriptor,
    },
    Tell {
        fd: Descriptor,
    },
    Seek {
        fd: Descriptor,
        offset: i64,
    },
    Truncate {
        fd: Descriptor,
        length: i64,
    },
    Read {
        fd: Descriptor,
        max_length: i64,
    },
    Write {
        fd: Descriptor,
        hex: String,
    },
    Stat {
        path: PathBuf,
    },
    Exists {
        path: PathBuf,
    },
    Readdir {
        path: PathBuf,
    },
    Remove {
        path: PathBuf,
    },
    Move {
        src: PathBuf,
        dst: PathBuf,
    },
    Copy {
        src: PathBuf,
        dst: PathBuf,
    },
    Touch {
        path: PathBuf,
        #[serde(default)]
        parents: bool,
    },
    Mkdir {
        path: PathBuf,
        #[serde(default)]
        parents: bool,
    },
    Constants,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok(Value),
    Error(ErrorBody),
}

impl Response {
    fn from_result(result: FsResult<Value>) -> Self {
        match result {
            Ok(value) => Response::Ok(value),
            Err(err) => Response::Error(ErrorBody {
                kind: err.kind().as_str().to_string(),
                message: err.to_string(),
            }),
        }
    }

    fn invalid_request(message: String) -> Self {
        Response::Error(ErrorBody {
            kind: "invalid_request".to_string(),
            message,
        })
    }
}

pub struct Bridge {
    access: FileAccess,
    constants: HostConstants,
    copy_buffer_size: usize,
}

impl Bridge {
    pub fn new(config: &Config, constants: HostConstants) -> Self {
        Self {
            access: FileAccess::new(config.hex_decode),
            constants,
            copy_buffer_size: config.copy_buffer_size,
        }
    }

    pub fn access(&self) -> &FileAccess {
        &self.access
    }

    pub fn dispatch(&self, request: Request) -> Response {
        debug!(?request, "dispatch");
        Response::from_result(self.call(request))
    }

    fn call(&self, request: Request) -> FsResult<Value> {
        let value = match request {
            Request::Open { path } => to_value(self.access.open(&path)?)?,
            Request::Close { fd } => {
                self.access.close(fd)?;
                Value::Null
            }
            Request::Tell { fd } => to_value(self.access.tell(fd)?)?,
            Request::Seek { fd, offset } => to_value(self.access.seek(fd, offset)?)?,
            Request::Truncate { fd, length } => to_value(self.access.truncate(fd, length)?)?,
            Request::Read { fd, max_length } => to_value(self.access.read(fd, max_length)?)?,
            Request::Write { fd, hex } => to_value(self.access.write(fd, &hex)?)?,
            Request::Stat { path } => to_value(path_ops::stat(&path))?,
            Request::Exists { path } => to_value(path_ops::exists(&path))?,
            Request::Readdir { path } => to_value(path_ops::readdir(&path)?)?,
            Request::Remove { path } => {
                path_ops::remove(&path)?;
                Value::Null
            }
            Request::Move { src, dst } => to_value(path_ops::rename(&src, &dst)?)?,
            Request::Copy { src, dst } => {
                to_value(path_ops::copy(&src, &dst, self.copy_buffer_size)?)?
            }
            Request::Touch { path, parents } => to_value(path_ops::touch(&path, parents)?)?,
            Request::Mkdir { path, parents } => to_value(path_ops::mkdir(&path, parents)?)?,
            Request::Constants => to_value(&self.constants)?,
        };
        Ok(value)
    }

    /// Answer requests line by line until `input` is exhausted, then close
    /// every descriptor still open. Returns the number of requests handled.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<usize> {
        let mut handled = 0;
        for line in input.lines() {
            let line = line.context("failed to read request line")?;
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => self.dispatch(request),
                Err(err) => {
                    warn!(%err, "malformed request");
                    Response::invalid_request(err.to_string())
                }
            };
            serde_json::to_writer(&mut output, &response).context("failed to encode response")?;
            output
                .write_all(b"\n")
                .and_then(|()| output.flush())
                .context("failed to write response")?;
            handled += 1;
        }
        let closed = self.access.shutdown();
        if closed > 0 {
            debug!(closed, "closed descriptors left open by the host");
        }
        Ok(handled)
    }
}

fn to_value<T: Serialize>(value: T) -> FsResult<Value> {
    serde_json::to_value(value).map_err(|err| FsError::invalid_input(err.to_string()))
}
