/// State management module
///
/// This module handles all application state, including:
/// - The scan session state machine and request fencing (session.rs)
/// - Shared data structures and derived presentation fields (data.rs)

pub mod data;
pub mod session;
