use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub openai: Option<OpenAiConfig>,
    pub ollama: Option<OllamaConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChatConfig {
    /// Reject unparseable numeric sampling parameters instead of passing them on.
    #[serde(default)]
    pub strict_params: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("database.path", "presets.db")?
            .set_default("llm.provider", "openai")?
            .set_default("llm.openai.api_base", "https://api.openai.com/v1")?
            .set_default("llm.openai.api_key", "${OPENAI_API_KEY}")?
            .set_default("llm.openai.default_model", "gpt-3.5-turbo")?
            .set_default("llm.ollama.base_url", "http://localhost:11434")?
            .set_default("llm.ollama.default_model", "llama3.2")?
            .set_default("chat.strict_params", false)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CHATRELAY").separator("__"));

        // Plain PORT wins over everything, matching common hosting setups.
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        app_config.server.host = expand_env(&app_config.server.host);
        app_config.database.path = expand_env(&app_config.database.path);

        if let Some(ref mut openai) = app_config.llm.openai {
            openai.api_key = expand_env(&openai.api_key);
            openai.api_base = expand_env(&openai.api_base);
        }
        if let Some(ref mut ollama) = app_config.llm.ollama {
            ollama.base_url = expand_env(&ollama.base_url);
        }

        Ok(app_config)
    }
}

/// Expands a whole-value `${VAR}` reference. Unset variables become empty.
pub fn expand_env(val: &str) -> String {
    match val.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).unwrap_or_default(),
        None => val.to_string(),
    }
}
