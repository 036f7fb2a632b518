use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Labbot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Explanations are translated into Marathi unless asked otherwise.
pub const DEFAULT_TARGET_LANG: &str = "mr";
/// Sentences longer than this (chars) get a line break after them.
pub const DEFAULT_MAX_SENTENCE_LEN: usize = 180;
pub const DEFAULT_TRANSLATE_CHUNK_CHARS: usize = 800;
pub const DEFAULT_SPEECH_CHUNK_CHARS: usize = 220;

pub const TRANSLATE_TIMEOUT_SECS: u64 = 10;
pub const TTS_TIMEOUT_SECS: u64 = 15;
pub const MESSAGE_TIMEOUT_SECS: u64 = 15;
pub const MEDIA_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_OUTPUT_DIR: &str = "tts_outputs";
pub const DEFAULT_API_VERSION: &str = "v22.0";

const ENV_ACCESS_TOKEN: &str = "WHATSAPP_ACCESS_TOKEN";
const ENV_PHONE_NUMBER_ID: &str = "PHONE_NUMBER_ID";
const ENV_API_VERSION: &str = "API_VERSION";
const ENV_OUTPUT_DIR: &str = "LABBOT_OUTPUT_DIR";
const ENV_DUMP_DIR: &str = "LABBOT_DUMP_DIR";
const ENV_REFERENCE_DIR: &str = "LABBOT_REFERENCE_DIR";

/// Debug builds count as development.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "labbot=debug,labbot_lib=debug"
    } else {
        "labbot=info,labbot_lib=info"
    }
}

/// WhatsApp Cloud API credentials. Either may be missing; sending fails then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppSettings {
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub api_version: String,
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl WhatsAppSettings {
    pub fn is_configured(&self) -> bool {
        matches!(
            (&self.access_token, &self.phone_number_id),
            (Some(t), Some(id)) if !t.is_empty() && !id.is_empty()
        )
    }
}

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub whatsapp: WhatsAppSettings,
    /// Where synthesized audio is written.
    pub output_dir: PathBuf,
    /// Diagnostic dumps; `None` disables them.
    pub dump_dir: Option<PathBuf>,
    /// JSON reference tables; `None` uses the built-in ones.
    pub reference_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            whatsapp: WhatsAppSettings::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dump_dir: None,
            reference_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            whatsapp: WhatsAppSettings {
                access_token: get(ENV_ACCESS_TOKEN),
                phone_number_id: get(ENV_PHONE_NUMBER_ID),
                api_version: get(ENV_API_VERSION)
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            },
            output_dir: get(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            dump_dir: get(ENV_DUMP_DIR).map(PathBuf::from),
            reference_dir: get(ENV_REFERENCE_DIR).map(PathBuf::from),
        }
    }
}
