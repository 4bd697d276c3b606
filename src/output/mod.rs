//! Writer stage: XMLTV rendering and file publishing.

pub mod publish;
pub mod xmltv;

pub use publish::{PublishedFiles, gzip, publish};
pub use xmltv::XmltvRenderer;
