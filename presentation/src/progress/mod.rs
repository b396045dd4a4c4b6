//! Loading indicator shown while a reply is pending

pub mod reporter;
