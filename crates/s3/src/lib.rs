//! bx-s3: AWS S3 adapter for the bx bucket explorer
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod client;

pub use client::{ClientOptions, S3Client};
