//! Desktop browser fingerprints
//!
//! Product pages serve stripped-down or blocked markup to obvious bots, so
//! page fetches present as a current desktop browser.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// (major, full) Chrome versions
const CHROME_VERSIONS: &[(&str, &str)] = &[
    ("120", "120.0.0.0"),
    ("124", "124.0.0.0"),
    ("131", "131.0.0.0"),
];

const FIREFOX_VERSIONS: &[&str] = &["121.0", "128.0", "133.0"];

const ACCEPT_LANGUAGES: &[&str] = &["en-US,en;q=0.9", "en-GB,en;q=0.9", "en-IN,en;q=0.9"];

/// Browser profile with realistic fingerprint
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub sec_ch_ua: String,
}

/// Platform configurations
#[derive(Debug, Clone, Copy)]
enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    fn random() -> Self {
        let roll: f32 = rand::thread_rng().gen();
        // Windows 65%, macOS 20%, Linux 15%
        if roll < 0.65 {
            Platform::Windows
        } else if roll < 0.85 {
            Platform::MacOS
        } else {
            Platform::Linux
        }
    }

    fn os_string(self) -> &'static str {
        match self {
            Platform::MacOS => "Macintosh; Intel Mac OS X 10_15_7",
            Platform::Windows => "Windows NT 10.0; Win64; x64",
            Platform::Linux => "X11; Linux x86_64",
        }
    }
}

/// Generate a Chrome desktop profile
#[must_use]
pub fn chrome_profile() -> BrowserProfile {
    let mut rng = rand::thread_rng();
    let (major, full) = CHROME_VERSIONS.choose(&mut rng).copied().unwrap_or(("120", "120.0.0.0"));

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{full} Safari/537.36",
            Platform::random().os_string()
        ),
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
            .to_string(),
        accept_language: random_accept_language(),
        sec_ch_ua: format!("\"Google Chrome\";v=\"{major}\", \"Chromium\";v=\"{major}\", \"Not_A Brand\";v=\"24\""),
    }
}

/// Generate a Firefox desktop profile
#[must_use]
pub fn firefox_profile() -> BrowserProfile {
    let version = FIREFOX_VERSIONS.choose(&mut rand::thread_rng()).copied().unwrap_or("128.0");

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}; rv:{version}) Gecko/20100101 Firefox/{version}",
            Platform::random().os_string()
        ),
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
            .to_string(),
        accept_language: random_accept_language(),
        // Firefox doesn't send Sec-CH-UA headers
        sec_ch_ua: String::new(),
    }
}

/// Random profile, Chrome-weighted
#[must_use]
pub fn random_profile() -> BrowserProfile {
    if rand::thread_rng().gen_bool(0.8) {
        chrome_profile()
    } else {
        firefox_profile()
    }
}

fn random_accept_language() -> String {
    ACCEPT_LANGUAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9")
        .to_string()
}

impl BrowserProfile {
    /// Default request headers for this profile
    #[must_use]
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let mut insert = |name: HeaderName, value: &str| {
            if let Ok(v) = HeaderValue::from_str(value) {
                headers.insert(name, v);
            }
        };
        insert(USER_AGENT, &self.user_agent);
        insert(ACCEPT, &self.accept);
        insert(ACCEPT_LANGUAGE, &self.accept_language);
        if !self.sec_ch_ua.is_empty() {
            if let Ok(v) = HeaderValue::from_str(&self.sec_ch_ua) {
                headers.insert("sec-ch-ua", v);
            }
        }
        headers
    }
}
