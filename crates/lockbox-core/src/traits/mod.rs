// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the vault core.
//!
//! Both use `#[async_trait]` for dynamic dispatch compatibility.

pub mod session;
pub mod store;

pub use session::SessionProvider;
pub use store::VaultItemStore;
