use thiserror::Error;

/// Errors raised below the session layer.
///
/// A daemon answering with a failure status is not an error here; see
/// [`Reply`](crate::Reply).
#[derive(Debug, Error)]
pub enum Error {
	#[error("transport error: {0}")]
	Transport(String),

	#[error("connection closed before a response arrived")]
	ChannelClosed,

	#[error("protocol error: {0}")]
	Protocol(String),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Whether the error means the daemon link itself is gone.
	pub fn is_link_failure(&self) -> bool {
		matches!(self, Error::Transport(_) | Error::ChannelClosed | Error::Io(_))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
