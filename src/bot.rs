//! Chat message classification.
//!
//! Every incoming text maps to exactly one [`Command`]; there is no state
//! carried between messages.

use regex::Regex;
use std::sync::LazyLock;

use crate::query::search;
use crate::store::SnapshotStore;

/// Rich-menu labels that the bot must not answer
pub const MENU_LABELS: [&str; 3] = ["依時間查詢賽事", "依地區查詢賽事", "依賽事名稱查詢"];

pub const KEYWORD_PROMPT: &str = "請在/後輸入搜尋關鍵字";
pub const SYSTEM_ERROR: &str = "系統發生錯誤，請稍後再試";

pub const HELP_TEXT: &str = "請使用以下方式搜尋：\n\
1️⃣. YYYYMM - 搜尋特定月份\n\
2️⃣. 1-5 - 搜尋特定地區\n\n\
地區代碼：\n\
1: 北部地區\n\
2: 中部地區\n\
3: 南部地區\n\
4: 東部地區\n\
5: 離島地區\n\
3️⃣. /關鍵字 - 搜尋賽事名稱\n";

static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("year-month pattern is valid"));
static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-5]$").expect("region pattern is valid"));

/// What to do with one incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Menu label echo; send nothing
    Ignore,
    /// `/` with no keyword
    KeywordPrompt,
    Keyword(String),
    /// Six digits, YYYYMM
    Date(String),
    /// Single digit 1-5
    Region(String),
    Help,
}

impl Command {
    pub fn classify(text: &str) -> Self {
        let text = text.trim();

        if MENU_LABELS.contains(&text) {
            return Command::Ignore;
        }

        if let Some(keyword) = text.strip_prefix('/') {
            return if keyword.is_empty() {
                Command::KeywordPrompt
            } else {
                Command::Keyword(keyword.to_string())
            };
        }

        if YEAR_MONTH_RE.is_match(text) {
            return Command::Date(text.to_string());
        }

        if REGION_RE.is_match(text) {
            return Command::Region(text.to_string());
        }

        Command::Help
    }

    /// Reply text for this command, or `None` when no reply is sent
    pub fn execute(&self, store: &SnapshotStore) -> Option<String> {
        let snapshot = store.current();
        let snapshot = snapshot.as_deref();

        let reply = match self {
            Command::Ignore => return None,
            Command::KeywordPrompt => KEYWORD_PROMPT.to_string(),
            Command::Keyword(keyword) => search(snapshot, "keyword", keyword),
            Command::Date(value) => search(snapshot, "date", value),
            Command::Region(value) => search(snapshot, "region", value),
            Command::Help => HELP_TEXT.to_string(),
        };

        Some(reply)
    }
}

/// Classify and answer one message
pub fn respond(store: &SnapshotStore, text: &str) -> Option<String> {
    Command::classify(text).execute(store)
}
