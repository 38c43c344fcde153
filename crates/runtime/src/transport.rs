//! Transport seam between the [`Connection`](crate::Connection) and a daemon.
//!
//! The production transport speaks newline-delimited JSON over any async byte
//! stream (a UNIX socket to the daemon's control endpoint, or a pipe pair).

use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

/// Outbound half of a transport.
pub trait Transport: Send + Sync {
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>>;
}

/// Inbound half; forwards every parsed frame to the connection until EOF.
pub trait TransportReceiver: Send {
	fn run(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

/// Everything a [`Connection`](crate::Connection) needs from a transport.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<Value>,
}

struct PipeSender<W> {
	writer: W,
}

impl<W> Transport for PipeSender<W>
where
	W: AsyncWrite + Unpin + Send + Sync,
{
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let mut line = serde_json::to_vec(&message)?;
			line.push(b'\n');
			self.writer.write_all(&line).await.map_err(|err| Error::Transport(err.to_string()))?;
			self.writer.flush().await.map_err(|err| Error::Transport(err.to_string()))?;
			Ok(())
		})
	}
}

struct PipeReceiver<R> {
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<R> TransportReceiver for PipeReceiver<R>
where
	R: AsyncRead + Unpin + Send + 'static,
{
	fn run(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		let PipeReceiver { reader, message_tx } = *self;
		Box::pin(async move {
			let mut lines = BufReader::new(reader).lines();
			while let Some(line) = lines.next_line().await? {
				let line = line.trim();
				if line.is_empty() {
					continue;
				}
				let value: Value = serde_json::from_str(line).map_err(|err| Error::Protocol(format!("malformed frame: {err}")))?;
				if message_tx.send(value).is_err() {
					break;
				}
			}
			debug!(target = "wlanhal.runtime", "daemon stream reached EOF");
			Ok(())
		})
	}
}

/// Builds newline-delimited JSON transport parts over a writer/reader pair.
pub fn pipe_transport<W, R>(writer: W, reader: R) -> TransportParts
where
	W: AsyncWrite + Unpin + Send + Sync + 'static,
	R: AsyncRead + Unpin + Send + 'static,
{
	let (message_tx, message_rx) = mpsc::unbounded_channel();
	TransportParts {
		sender: Box::new(PipeSender { writer }),
		receiver: Box::new(PipeReceiver { reader, message_tx }),
		message_rx,
	}
}

/// Connects to a daemon control socket.
#[cfg(unix)]
pub async fn connect_unix(path: impl AsRef<std::path::Path>) -> Result<TransportParts> {
	let stream = tokio::net::UnixStream::connect(path.as_ref()).await?;
	let (reader, writer) = stream.into_split();
	Ok(pipe_transport(writer, reader))
}
