pub mod completions;
pub mod decode;
pub mod reconcile;
pub mod replay;
