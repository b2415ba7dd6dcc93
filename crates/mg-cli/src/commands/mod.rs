//! CLI command implementations

pub(crate) mod common;
pub(crate) mod export;
pub(crate) mod import;
pub(crate) mod init;
pub(crate) mod lint;
pub(crate) mod ls;
pub(crate) mod new;
pub(crate) mod order;
pub(crate) mod validate;

#[cfg(test)]
pub(crate) mod test_support;
