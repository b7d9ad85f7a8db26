//! Branch names and checkout targets

pub mod branch_name;
pub mod revision;

/// Names git refuses as branches: leading dot or slash, `/.`, `..`,
/// trailing slash, `.lock` suffix, `@{`, control characters and the
/// characters `*:?[\~^`
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Directory of branch refs, relative to the git dir
pub const HEADS_PREFIX: &str = "refs/heads/";
