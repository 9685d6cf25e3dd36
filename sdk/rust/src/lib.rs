mod client;

pub use client::{ConsoleClient, SdkError};
