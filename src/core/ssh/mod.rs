mod client;

pub use client::{AuthMethod, RemoteRunner, RemoteSession, RemoteTarget, TransferResult};
