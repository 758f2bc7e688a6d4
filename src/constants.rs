//! Constants for URI building and template syntax.

/// Opens a template placeholder.
pub const TEMPLATE_OPEN: char = '{';

/// Closes a template placeholder.
pub const TEMPLATE_CLOSE: char = '}';

/// Port value that clears an explicitly set port.
pub const PORT_UNSET: i32 = -1;

/// RFC 3986 `unreserved` characters other than ALPHA and DIGIT.
pub const UNRESERVED_MARKS: &str = "-._~";

/// RFC 3986 `sub-delims`.
pub const SUB_DELIMS: &str = "!$&'()*+,;=";

/// Escape written for a literal `{` that must not start a placeholder.
pub const ESCAPED_OPEN: &str = "%7B";

/// Escape written for a literal `}`.
pub const ESCAPED_CLOSE: &str = "%7D";
