//! sqlite-vec registration.
//!
//! sqlite-vec is compiled into the binary and registered as an SQLite
//! auto-extension, so every connection opened afterwards (including the ones
//! sqlx opens for its pool) gets the `vec0` module and `vec_*` functions.

use std::sync::Once;

use libsqlite3_sys::{SQLITE_OK, sqlite3_auto_extension};
use sqlite_vec::sqlite3_vec_init;

static REGISTER: Once = Once::new();

/// Register sqlite-vec for all connections opened after this call.
///
/// Safe to call repeatedly; registration happens once per process.
pub fn register_sqlite_vec() {
    REGISTER.call_once(|| {
        // SAFETY: sqlite3_vec_init has the sqlite3 extension entry point ABI;
        // the transmute only restores its real signature.
        let rc = unsafe {
            sqlite3_auto_extension(Some(std::mem::transmute(sqlite3_vec_init as *const ())))
        };
        if rc == SQLITE_OK {
            tracing::debug!("sqlite-vec registered as auto-extension");
        } else {
            tracing::error!(rc, "failed to register sqlite-vec auto-extension");
        }
    });
}
