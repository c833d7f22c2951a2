// doc constants
pub const DOC_ID: &str = "_id";
pub const DOC_CREATED: &str = "created";
pub const DOC_UPDATED: &str = "updated";
pub const DOC_MISSING: &str = "missing";

// reference constants
pub const REFERENCE_ID_SUFFIX: &str = "_id";
pub const REFERENCE_WILDCARD: &str = "*";
pub const COUNT_SUFFIX: &str = "_cnt";

/// Value a reference field takes when its target document no longer exists.
pub const NOT_FOUND: i64 = 404;

// view count constants
pub const DEFAULT_VIEW_COUNT_FIELD: &str = "vcnt";

// index constants
pub const ID_INDEX_NAME: &str = "_id_";
pub const INDEX_DIRECTION: &str = "1";
pub const INDEX_NAME_SEPARATOR: &str = "_";
pub const DUPLICATE_KEY_CODE: &str = "E11000";

// write constants
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 100;
