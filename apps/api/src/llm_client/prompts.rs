// Cross-cutting prompt fragments shared by every generation call.

/// System prompt for listing generation.
pub const LISTING_SYSTEM: &str = "You write excellent property listings.";
