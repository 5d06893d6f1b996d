/// Key of the single persisted counter row.
pub const COUNTER_ID: &str = "visitors";

/// Upper bound on read-increment-write cycles before a contended increment
/// gives up. Every lost condition implies another writer committed, so the
/// loop cannot spin without system-wide progress.
pub const MAX_INCREMENT_ATTEMPTS: usize = 16;

pub const DEFAULT_PORT: u16 = 3000;

pub const ALLOWED_ORIGIN: &str = "*";
pub const ALLOWED_METHODS: &str = "GET, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
