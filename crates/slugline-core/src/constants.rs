/// Column holding the source text of a slug unless configured otherwise.
pub const DEFAULT_NAME_COLUMN: &str = "name";

/// Column holding the computed slug unless configured otherwise.
pub const DEFAULT_SLUG_COLUMN: &str = "slug";

/// Primary key column every slugged table carries.
pub const ID_COLUMN: &str = "id";

/// Suffix appended to a parent entity name to form its foreign key column.
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

/// First numeric suffix tried when a candidate slug collides.
pub const FIRST_COLLISION_SUFFIX: u32 = 2;

/// Upper bound on write attempts after storage-level slug conflicts.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 256;

/// Longest identifier `PostgreSQL` accepts without truncation.
pub const MAX_IDENTIFIER_LEN: usize = 63;
