//! Format compatibility checks for pack requests.
//!
//! All formats share one flag surface, but each honors only a subset of it.
//! Options that mean nothing for the selected format produce a
//! [`ValidationWarning`] and are otherwise ignored.

use crate::pack::request::{PackRequest, PackageFormat};
use std::fmt;

/// Advisory message about an option the selected format ignores.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationWarning {
    /// Command line flag the warning is about (e.g. `--deps`).
    pub option: &'static str,
    /// Format the request targets.
    pub format: PackageFormat,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let honored_by = if self.format.is_system_package() {
            "a tarball"
        } else {
            "RPM or DEB"
        };
        write!(
            f,
            "You specified the {} flag, but you are not packaging {}. Flag will be ignored",
            self.option, honored_by
        )
    }
}

/// Checks requests against the options their format honors.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatValidator;

impl FormatValidator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }

    /// Returns one warning per option the request's format ignores.
    ///
    /// Never fails; the caller proceeds with the request either way.
    pub fn validate(&self, request: &PackRequest) -> Vec<ValidationWarning> {
        let mut ignored = Vec::new();

        match request.format {
            PackageFormat::TarGz => {
                let opts = &request.rpm_deb_options;
                if !opts.explicit_dependencies.is_empty() {
                    ignored.push("--deps");
                }
                if opts.pre_inst_script_path.is_some() {
                    ignored.push("--preinst");
                }
                if opts.post_inst_script_path.is_some() {
                    ignored.push("--postinst");
                }
            }
            PackageFormat::Rpm | PackageFormat::Deb => {
                if request.archive_options.include_all {
                    ignored.push("--all");
                }
            }
        }

        ignored
            .into_iter()
            .map(|option| ValidationWarning {
                option,
                format: request.format,
            })
            .collect()
    }
}
