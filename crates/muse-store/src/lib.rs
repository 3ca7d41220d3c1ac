//! Durable store, admin export gate and backup boundary for the MUSE
//! survey engine.

mod admin;
mod backup;
mod store;

pub use admin::{export_gate, CredentialCheck, StaticPassphrase};
pub use backup::{backup_store, content_sha256, BackupWarning, InMemoryBackup, RemoteBackup};
pub use store::{export, read_table, CsvStore, Table};
