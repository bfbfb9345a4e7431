pub mod client;
pub mod payload;

pub use client::{CardService, HttpCardService, RemoteError};
pub use payload::{
    AuthResponse, CardListPayload, DeleteAck, PublicCardPayload, PublicCardRecord,
    RemoteCardRecord, SaveAck, SaveCardRequest,
};
