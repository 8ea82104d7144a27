//! Script discovery, parsing, and the load pipeline.

pub mod pipeline;
pub mod scanner;
pub mod script;

pub use pipeline::DocIndex;
pub use scanner::{scan_doc_root, ScriptRole, ScriptSource};
pub use script::{parse_script, ScriptFile};
