mod block;
mod book;
mod document;
mod entity;
mod errors;
mod fingerprint;
mod flow;
mod user;

pub use block::{Block, BlockPatch, BlockType};
pub use book::{Book, BookPatch};
pub use document::{ContentNode, DocState};
pub use entity::Entity;
pub use errors::DomainError;
pub use fingerprint::{ContentFingerprint, PlaceholderFingerprint, Sha256Fingerprint, PLACEHOLDER_HASH};
pub use flow::{DocumentEntry, Flow, FlowBlock, FlowBlockPatch, FlowDocument, FlowPatch};
pub use user::User;
