//! Route, environment, and framing constants to avoid hardcoding throughout
//! the codebase.

/// Backend route fragments, relative to the configured base URL.
pub mod routes {
    pub mod users {
        pub const REGISTER: &str = "/api/users/register/";
        pub const LOGIN: &str = "/api/users/login/";
        pub const ME: &str = "/api/users/me/";
    }

    pub mod files {
        pub const COLLECTION: &str = "/api/files/files/";

        pub fn detail(id: i64) -> String {
            format!("{COLLECTION}{id}/")
        }
    }

    pub mod scrapes {
        pub const COLLECTION: &str = "/api/scrapes/";

        pub fn detail(id: i64) -> String {
            format!("{COLLECTION}{id}/")
        }

        pub fn contents(id: i64) -> String {
            format!("{COLLECTION}{id}/contents/")
        }

        pub fn retry(id: i64) -> String {
            format!("{COLLECTION}{id}/retry/")
        }
    }

    pub mod chats {
        pub const COLLECTION: &str = "/api-chat/chats/";

        pub fn detail(id: i64) -> String {
            format!("{COLLECTION}{id}/")
        }

        pub fn messages(id: i64) -> String {
            format!("{COLLECTION}{id}/messages/")
        }

        pub fn messages_stream(id: i64) -> String {
            format!("{COLLECTION}{id}/messages/stream/")
        }
    }
}

/// Environment variable names recognized at startup.
pub mod env {
    pub const API_URL: &str = "RAGLINE_API_URL";
    pub const REQUEST_TIMEOUT_SECS: &str = "RAGLINE_REQUEST_TIMEOUT_SECS";
}

/// Wire framing of the chat streaming endpoint.
pub mod streaming {
    /// Records are separated by a blank line.
    pub const RECORD_SEPARATOR: &str = "\n\n";
    /// Every well-formed record starts with this prefix.
    pub const RECORD_PREFIX: &str = "data:";
}

/// Dot-folder layout under the user's home directory.
pub mod dot_dir {
    pub const DIR_NAME: &str = ".ragline";
    pub const CREDENTIALS_FILE: &str = "credentials.toml";
    pub const CONFIG_FILE: &str = "config.toml";
}

pub mod defaults {
    pub const BASE_URL: &str = "http://localhost:8000";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// How many trailing messages `chat open` renders before the prompt.
    pub const HISTORY_WINDOW: usize = 10;
    /// Config file searched in the working directory before the dot folder.
    pub const LOCAL_CONFIG_FILE: &str = "ragline.toml";
}
