//! Ports: per-form descriptor bindings.
//!
//! A port pairs a byte stream (a file) with a value channel. Each port
//! records whether it owns those resources; only owning ports close them
//! on release, so a duplicated descriptor never closes a stream twice.

use std::fs::{File, OpenOptions};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use conch_foundation::{Error, ErrorKind, Result, Type, Value};
use tracing::debug;

use crate::ast::RedirMode;
use crate::op::ValuesOp;
use crate::span::Site;

/// A redirection compiled into an op that produces a port at runtime.
#[derive(Clone, Debug)]
pub enum PortOp {
    /// Produces an empty port: the descriptor is closed.
    Close,
    /// Copies another descriptor's port without taking ownership.
    Dup {
        /// Descriptor being copied.
        old_fd: usize,
    },
    /// Opens a file.
    File {
        /// Must produce exactly one string.
        filename: ValuesOp,
        /// How to open it.
        mode: RedirMode,
        /// Permission bits for a created file.
        file_mode: u32,
        /// Where the redirection appears.
        site: Site,
    },
}

/// What a port op needs from the evaluator to run.
pub trait PortEnv {
    /// The port currently bound to `fd`.
    fn port(&self, fd: usize) -> Option<&Port>;

    /// Evaluates a values op.
    fn eval_values(&mut self, op: &ValuesOp) -> Result<Vec<Value>>;
}

impl PortOp {
    /// Produces the port this redirection describes.
    ///
    /// # Errors
    ///
    /// Fails if a duplicated descriptor has no port, or if the filename
    /// is not exactly one string or cannot be opened.
    pub fn open<E: PortEnv + ?Sized>(&self, env: &mut E) -> Result<Port> {
        match self {
            Self::Close => Ok(Port::closed()),
            Self::Dup { old_fd } => env
                .port(*old_fd)
                .map(Port::duplicate)
                .ok_or_else(|| Error::new(ErrorKind::UndefinedPort(*old_fd))),
            Self::File {
                filename,
                mode,
                file_mode,
                site,
            } => {
                let values = env.eval_values(filename)?;
                let path = single_string(&values, "filename").map_err(|e| at(e, site))?;
                debug!(path, ?mode, "opening redirection target");
                let file = mode.open_options(*file_mode).open(path).map_err(|e| {
                    at(
                        Error::new(ErrorKind::Io {
                            path: path.to_string(),
                            message: e.to_string(),
                        }),
                        site,
                    )
                })?;
                Ok(Port::owning(file))
            }
        }
    }
}

fn single_string<'a>(values: &'a [Value], what: &str) -> Result<&'a str> {
    match values {
        [Value::String(s)] => Ok(s),
        [other] => Err(Error::type_mismatch(Type::String, other.value_type())),
        _ => Err(Error::new(ErrorKind::NotSingleString {
            what: what.to_string(),
            count: values.len(),
        })),
    }
}

fn at(err: Error, site: &Site) -> Error {
    err.with_context(site.context())
}

impl RedirMode {
    /// Open options for this mode, creating files with `file_mode`.
    #[must_use]
    pub fn open_options(self, file_mode: u32) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Read => options.read(true),
            Self::Write => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::ReadWrite => options.read(true).write(true).create(true),
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(file_mode);
        }
        #[cfg(not(unix))]
        let _ = file_mode;
        options
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A file shared between ports. Closing it is visible to every holder.
#[derive(Clone, Debug)]
pub struct SharedFile(Arc<Mutex<Option<File>>>);

impl SharedFile {
    /// Wraps an open file.
    #[must_use]
    pub fn new(file: File) -> Self {
        Self(Arc::new(Mutex::new(Some(file))))
    }

    /// Returns true until some owner closes the file.
    #[must_use]
    pub fn is_open(&self) -> bool {
        lock(&self.0).is_some()
    }

    /// Closes the file. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        lock(&self.0).take().is_some()
    }

    /// Runs `f` on the file if it is still open.
    pub fn with<R>(&self, f: impl FnOnce(&mut File) -> R) -> Option<R> {
        lock(&self.0).as_mut().map(f)
    }
}

/// A value channel shared between ports.
#[derive(Clone, Debug)]
pub struct ValueChannel {
    tx: Arc<Mutex<Option<flume::Sender<Value>>>>,
    rx: flume::Receiver<Value>,
}

impl ValueChannel {
    /// Creates an open, unbounded channel.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            rx,
        }
    }

    /// Returns true until some owner closes the channel.
    #[must_use]
    pub fn is_open(&self) -> bool {
        lock(&self.tx).is_some()
    }

    /// Sends a value. Returns false if the channel is closed.
    pub fn send(&self, value: Value) -> bool {
        lock(&self.tx)
            .as_ref()
            .is_some_and(|tx| tx.send(value).is_ok())
    }

    /// The receiving end.
    #[must_use]
    pub fn receiver(&self) -> &flume::Receiver<Value> {
        &self.rx
    }

    /// Closes the sending side. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        lock(&self.tx).take().is_some()
    }
}

impl Default for ValueChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// A descriptor binding for one form.
#[derive(Clone, Debug, Default)]
pub struct Port {
    /// Byte stream.
    pub file: Option<SharedFile>,
    /// Value stream.
    pub chan: Option<ValueChannel>,
    /// Whether releasing this port closes `file`.
    pub close_file: bool,
    /// Whether releasing this port closes `chan`.
    pub close_chan: bool,
}

impl Port {
    /// The empty placeholder for a closed descriptor.
    #[must_use]
    pub fn closed() -> Self {
        Self::default()
    }

    /// A port that owns a freshly opened file and a fresh channel.
    #[must_use]
    pub fn owning(file: File) -> Self {
        Self {
            file: Some(SharedFile::new(file)),
            chan: Some(ValueChannel::new()),
            close_file: true,
            close_chan: true,
        }
    }

    /// A port borrowing streams owned elsewhere.
    #[must_use]
    pub fn inherited(file: Option<SharedFile>, chan: Option<ValueChannel>) -> Self {
        Self {
            file,
            chan,
            close_file: false,
            close_chan: false,
        }
    }

    /// Copies this port with both close flags cleared.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            close_file: false,
            close_chan: false,
            ..self.clone()
        }
    }

    /// Returns true if this is the closed placeholder.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.is_none() && self.chan.is_none()
    }

    /// Closes whatever this port owns.
    pub fn release(&self) {
        if self.close_file {
            if let Some(file) = &self.file {
                file.close();
            }
        }
        if self.close_chan {
            if let Some(chan) = &self.chan {
                chan.close();
            }
        }
    }
}
