/// Remote recognition module
///
/// This module handles:
/// - Building the multipart upload for a label photo
/// - Classifying the four failure kinds of the recognition call
/// - Parsing the candidate list out of the response payload

pub mod client;
