//! Operation assemblies.
//!
//! One public async function per service operation.  Each assembles its guard
//! chain from the shared implementations in [`crate::guards`], pairs it with
//! the operation's terminal stage, and runs against the injected store.

pub mod chats;
pub mod contacts;
