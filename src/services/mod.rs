// Services: analysis pipeline and upload-control state, independent of HTTP.
pub mod analysis;
pub mod gemini;
pub mod normalizer;
pub mod parser;
pub mod presentation;
pub mod reference;
pub mod report;
pub mod sanitize;
pub mod upload;
