use hfsdisklib::Failure;

/// CLI argument error
pub(crate) const CLI_ARG_ERROR: i32 = 1;
/// Volume mount error
pub(crate) const MOUNT_ERR: i32 = 2;
/// Disk IO error
pub(crate) const IO_ERR: i32 = 3;
/// Path or resource fork path resolution error
pub(crate) const RESOLVE_ERR: i32 = 4;

/// Process exit status for a failed command
pub(crate) fn for_failure(failure: Failure) -> i32 {
  match failure {
    Failure::Usage => CLI_ARG_ERROR,
    Failure::Mount => MOUNT_ERR,
    Failure::Io => IO_ERR,
    Failure::Resolution => RESOLVE_ERR,
  }
}
