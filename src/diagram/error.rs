use thiserror::Error;

/// Errors returned by diagram mutations and by CSV import as a whole.
///
/// Problems with individual CSV rows or fields never surface here; they are
/// collected as [`super::codec::ImportWarning`]s instead.
#[derive(Debug, Error)]
pub enum DiagramError {
	/// Node text was blank after trimming.
	#[error("node text cannot be empty")]
	EmptyText,

	/// No node has this id.
	#[error("node not found: {0}")]
	NotFound(String),

	/// An explicit id is already taken.
	#[error("a node with id {0} already exists")]
	DuplicateId(String),

	/// The connection is already present.
	#[error("connection {from} -> {to} already exists")]
	DuplicateEdge {
		/// Parent id.
		from: String,
		/// Child id.
		to: String,
	},

	/// One end of a connection is not a node.
	#[error("connection {from} -> {to} references a node that does not exist")]
	UnknownEndpoint {
		/// Parent id.
		from: String,
		/// Child id.
		to: String,
	},

	/// A node was connected to itself.
	#[error("node {0} cannot be connected to itself")]
	SelfLoop(String),

	/// A level name that is none of the four columns.
	#[error("unknown level: {0}")]
	UnknownLevel(String),

	/// The colour value is already in the palette.
	#[error("colour {0} is already in the palette")]
	DuplicateColour(String),

	/// No palette entry has this value.
	#[error("colour {0} is not in the palette")]
	ColourNotFound(String),

	/// A required CSV header is absent.
	#[error("CSV is missing the required column {0}")]
	MissingColumn(&'static str),

	/// The CSV reader or writer failed.
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),

	/// The palette could not be serialized.
	#[error("palette serialization failed: {0}")]
	Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DiagramError>;
