//! Application constants
//!
//! Centralized location for the wire-level values of the Lark/Feishu open
//! API and the retrieval defaults derived from them.

// Endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://open.feishu.cn";
pub const CHAT_LIST_PATH: &str = "/open-apis/im/v1/chats";
pub const MESSAGE_LIST_PATH: &str = "/open-apis/im/v1/messages";

// Request shaping
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 40; // message list allows ~50 QPS
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const CHAT_USER_ID_TYPE: &str = "open_id";
pub const MESSAGE_CONTAINER_ID_TYPE: &str = "chat";
pub const MESSAGE_SORT_ASCENDING: &str = "create_time_asc";

// Response status codes carried in the body's `code` field
pub const API_SUCCESS_CODE: i64 = 0;
pub const TOKEN_INVALID_CODE: i64 = 99_991_663;
pub const TOKEN_EXPIRED_CODE: i64 = 99_991_664;
pub const RATE_LIMITED_CODE: i64 = 99_991_672;

// Credential expiry hint (advisory only)
pub const CREDENTIAL_TTL_HINT_MS: i64 = 24 * 60 * 60 * 1000;
pub const CREDENTIAL_EXPIRY_BUFFER_MS: i64 = 5 * 60 * 1000;
