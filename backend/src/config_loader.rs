use serde_json::Value;
use shared::config::{
    merge_over_defaults, ConfigError, GameConfig, GameKind, MysteryEggConfig, PickAGiftConfig, PlinkoConfig,
    ScratchCardConfig, SlotMachineConfig, SpinWheelConfig,
};
use shared::prize::PrizeTable;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Current document for every game. Starts from the built-in defaults and
/// is swapped per game when a fetched document arrives.
#[derive(Debug, Clone, Default)]
pub struct GameConfigs {
    pub spin_wheel: SpinWheelConfig,
    pub pick_a_gift: PickAGiftConfig,
    pub scratch_card: ScratchCardConfig,
    pub plinko: PlinkoConfig,
    pub slot_machine: SlotMachineConfig,
    pub mystery_egg: MysteryEggConfig,
}

pub type SharedConfigs = Arc<RwLock<GameConfigs>>;

impl GameConfigs {
    pub fn document(&self, kind: GameKind) -> Result<Value, serde_json::Error> {
        match kind {
            GameKind::SpinWheel => serde_json::to_value(&self.spin_wheel),
            GameKind::PickAGift => serde_json::to_value(&self.pick_a_gift),
            GameKind::ScratchCard => serde_json::to_value(&self.scratch_card),
            GameKind::Plinko => serde_json::to_value(&self.plinko),
            GameKind::SlotMachine => serde_json::to_value(&self.slot_machine),
            GameKind::MysteryEgg => serde_json::to_value(&self.mystery_egg),
        }
    }

    pub fn prize_table(&self, kind: GameKind) -> PrizeTable {
        match kind {
            GameKind::SpinWheel => self.spin_wheel.prize_table(),
            GameKind::PickAGift => self.pick_a_gift.prize_table(),
            GameKind::ScratchCard => self.scratch_card.prize_table(),
            GameKind::Plinko => self.plinko.prize_table(),
            GameKind::SlotMachine => self.slot_machine.prize_table(),
            GameKind::MysteryEgg => self.mystery_egg.prize_table(),
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
    Json(serde_json::Error),
    Shape(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "read failed: {}", e),
            LoadError::Http(e) => write!(f, "request failed: {}", e),
            LoadError::Status(status) => write!(f, "server answered {}", status),
            LoadError::Json(e) => write!(f, "invalid JSON: {}", e),
            LoadError::Shape(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Http(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Shape(e)
    }
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

/// `<base>/<game>.json`, for both directories and URL prefixes.
pub fn document_locator(base: &str, kind: GameKind) -> String {
    format!("{}/{}", base.trim_end_matches('/'), kind.document_name())
}

async fn fetch_document(client: &reqwest::Client, locator: &str) -> Result<Value, LoadError> {
    if is_remote(locator) {
        let response = client.get(locator).send().await?;
        if !response.status().is_success() {
            return Err(LoadError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        let body = tokio::fs::read_to_string(locator).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn try_load<T: GameConfig>(client: &reqwest::Client, locator: &str, default: &T) -> Result<T, LoadError> {
    let fetched = fetch_document(client, locator).await?;
    Ok(merge_over_defaults(default, fetched)?)
}

/// Fetches and merges one document. Never fails: any problem is logged and
/// `default` comes back unchanged.
pub async fn load_config<T: GameConfig>(client: &reqwest::Client, locator: &str, default: &T) -> T {
    match try_load(client, locator, default).await {
        Ok(config) => {
            info!("Loaded {} configuration from {}", T::KIND, locator);
            config
        }
        Err(e) => {
            warn!("Using built-in {} configuration, {} could not be loaded: {}", T::KIND, locator, e);
            default.clone()
        }
    }
}

fn spawn_one<T, F>(client: &reqwest::Client, base: &str, configs: &SharedConfigs, slot: F)
where
    T: GameConfig + 'static,
    F: FnOnce(&mut GameConfigs) -> &mut T + Send + 'static,
{
    let client = client.clone();
    let configs = configs.clone();
    let locator = document_locator(base, T::KIND);
    tokio::spawn(async move {
        let loaded = load_config(&client, &locator, &T::default()).await;
        let mut guard = configs.write().await;
        *slot(&mut *guard) = loaded;
    });
}

/// Starts one background load per game. Requests are served from the
/// defaults until each load lands.
pub fn spawn_config_loads(client: &reqwest::Client, base: &str, configs: &SharedConfigs) {
    spawn_one(client, base, configs, |c: &mut GameConfigs| &mut c.spin_wheel);
    spawn_one(client, base, configs, |c: &mut GameConfigs| &mut c.pick_a_gift);
    spawn_one(client, base, configs, |c: &mut GameConfigs| &mut c.scratch_card);
    spawn_one(client, base, configs, |c: &mut GameConfigs| &mut c.plinko);
    spawn_one(client, base, configs, |c: &mut GameConfigs| &mut c.slot_machine);
    spawn_one(client, base, configs, |c: &mut GameConfigs| &mut c.mystery_egg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::json;
    use uuid::Uuid;

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("prizeplay-config-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_missing_file_returns_default() {
        let client = reqwest::Client::new();
        let dir = temp_dir();
        let locator = document_locator(dir.to_str().unwrap(), GameKind::SpinWheel);
        let loaded = load_config(&client, &locator, &SpinWheelConfig::default()).await;
        assert_eq!(loaded, SpinWheelConfig::default());
    }

    #[tokio::test]
    async fn test_bad_json_returns_default() {
        let client = reqwest::Client::new();
        let dir = temp_dir();
        let path = dir.join("plinko.json");
        std::fs::write(&path, "{\"prizes\": [").unwrap();
        let loaded = load_config(&client, path.to_str().unwrap(), &PlinkoConfig::default()).await;
        assert_eq!(loaded, PlinkoConfig::default());
    }

    #[tokio::test]
    async fn test_file_document_merges_over_defaults() {
        let client = reqwest::Client::new();
        let dir = temp_dir();
        let doc = json!({ "prizes": [{ "text": "Free Coffee", "value": "COFFEE" }, { "text": "Sticker" }] });
        std::fs::write(dir.join("pick-a-gift.json"), doc.to_string()).unwrap();

        let locator = document_locator(dir.to_str().unwrap(), GameKind::PickAGift);
        let loaded = load_config(&client, &locator, &PickAGiftConfig::default()).await;
        assert_eq!(loaded.prizes.len(), 2);
        assert_eq!(loaded.prizes.get(0).unwrap().label, "Free Coffee");
        assert_eq!(loaded.defaults, PickAGiftConfig::default().defaults);
    }

    #[tokio::test]
    async fn test_non_success_status_returns_default() {
        let base = serve(Router::new().route("/slot-machine.json", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))).await;
        let client = reqwest::Client::new();
        let locator = document_locator(&base, GameKind::SlotMachine);
        let loaded = load_config(&client, &locator, &SlotMachineConfig::default()).await;
        assert_eq!(loaded, SlotMachineConfig::default());
    }

    #[tokio::test]
    async fn test_remote_document_is_fetched() {
        let body = json!({ "segments": [{ "text": "A" }, { "text": "B" }, { "text": "C" }] }).to_string();
        let base = serve(Router::new().route("/spin-wheel.json", get(move || {
            let body = body.clone();
            async move { body }
        }))).await;
        let client = reqwest::Client::new();
        let locator = document_locator(&base, GameKind::SpinWheel);
        let loaded = load_config(&client, &locator, &SpinWheelConfig::default()).await;
        assert_eq!(loaded.segments.len(), 3);
    }

    #[tokio::test]
    async fn test_refused_connection_returns_default() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let locator = format!("http://{}/mystery-egg.json", addr);
        let loaded = load_config(&client, &locator, &MysteryEggConfig::default()).await;
        assert_eq!(loaded, MysteryEggConfig::default());
    }

    #[tokio::test]
    async fn test_spawned_loads_swap_in_documents() {
        let dir = temp_dir();
        std::fs::write(dir.join("scratch-card.json"), json!({ "prizes": [{ "text": "Only" }] }).to_string()).unwrap();
        let configs: SharedConfigs = Arc::new(RwLock::new(GameConfigs::default()));
        spawn_config_loads(&reqwest::Client::new(), dir.to_str().unwrap(), &configs);

        for _ in 0..50 {
            if configs.read().await.scratch_card.prizes.len() == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        let guard = configs.read().await;
        assert_eq!(guard.scratch_card.prizes.len(), 1);
        assert_eq!(guard.plinko, PlinkoConfig::default());
    }
}
