//! Shared constants describing the forum's markup and the request profile.

/// Default forum root. Endpoint paths below are relative to it.
pub const DEFAULT_BASE_URL: &str = "https://www.4d4y.com/forum";

/// Forum id of the "Discovery" board.
pub const DEFAULT_FORUM_ID: u32 = 2;

/// Login cookie lifetime sent with the login form (30 days).
pub const DEFAULT_COOKIE_TIME: u64 = 2_592_000;

/// User agent string matching the header profile below.
///
/// The forum serves different markup to unknown clients, so requests look
/// like a desktop Edge browser on macOS.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0";

/// Fixed browser header profile sent with every request (besides user-agent).
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("accept-language", "en-US,en;q=0.9,zh-CN;q=0.8,zh-TW;q=0.7,zh;q=0.6"),
    ("cache-control", "max-age=0"),
    ("priority", "u=0, i"),
    (
        "sec-ch-ua",
        "\"Microsoft Edge\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"macOS\""),
    ("sec-fetch-dest", "iframe"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
];

/// Promotional signatures appended by third-party forum apps.
pub const NOISE_STRINGS: &[&str] = &["D版有你更美丽～", "iOS fly ~", "论坛助手", "每日地板"];

/// The "back to top" icon that every post wraps in a link.
pub const BACK_ICON_URL: &str = "https://www.4d4y.com/forum/images/common/back.gif";

/// Present in the pagination bar when a further page exists.
pub const NEXT_PAGE_MARKER: &str = "class=\"next\"";

/// Shown in the login response for an authenticated user ("welcome back").
pub const LOGIN_SUCCESS_MARKER: &str = "欢迎您回来";

/// Name of the cookie the forum sets once a login succeeds.
pub const AUTH_COOKIE_NAME: &str = "cdb_auth";

/// Length of an MD5 hex digest.
pub const MD5_HEX_LEN: usize = 32;

pub const LOGIN_PAGE_PATH: &str = "logging.php?action=login";
pub const LOGIN_SUBMIT_PATH: &str = "logging.php?action=login&loginsubmit=yes&inajax=1";
