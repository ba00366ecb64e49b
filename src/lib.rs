//! # tt_pack
//!
//! Packs a Tarantool environment into a distributable bundle.
//!
//! A [`PackRequest`] names the format and what goes into the bundle. The
//! [`Dispatcher`] checks the request for flags the chosen format ignores,
//! looks up a [`Packer`] in the [`PackerRegistry`] and runs it.
//!
//! ## Formats
//!
//! - **tgz**: compressed tarball of the environment
//! - **rpm**: RPM package installing into `/usr/share/tarantool/<name>`
//! - **deb**: Debian package with the same layout
//!
//! ## Usage
//!
//! ```bash
//! tt_pack tgz --all
//! tt_pack rpm --name myapp --version 1.0 --deps 'tarantool >= 2.10'
//! tt_pack deb --without-binaries
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod pack;

pub use config::PackConfig;
pub use dispatch::{DispatchFailure, DispatchOutcome, DispatchStage, Dispatcher};
pub use error::{DispatchError, Error, Result, UnsupportedFormatError};
pub use pack::{
    FormatValidator, PackContext, PackRequest, PackageFormat, PackedArtifact, Packer,
    PackerRegistry,
};
