/// Preview text shown in the conversation list after an image is sent
pub const IMAGE_PREVIEW_TEXT: &str = "Sent an image";

/// Maximum username length in bytes
pub const MAX_USERNAME_LEN: usize = 64;

/// Default maximum message length in characters
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 2_000;

/// Default maximum image size in bytes (5 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Default chrono format for the display time of a message, e.g. "3:07 PM"
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M %p";

/// Route prefix for user profile pages
pub const PROFILE_ROUTE_PREFIX: &str = "/profile/";

/// Review ratings are whole stars in this range
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
