use sqlx::SqlitePool;
use std::path::PathBuf;

use rueso_backend::catalogs::glossary::GameFamily;
use rueso_backend::config::AppConfig;
use rueso_backend::search::FacetAllowList;

use crate::db;

/// Connections per catalog pool / Соединений на пул
const MAX_CONNECTIONS: u32 = 4;

/// One glossary family: its database and game allow-list / Семейство глоссария
pub struct GlossaryCatalog {
    pub pool: SqlitePool,
    pub games: FacetAllowList,
    pub db_path: PathBuf,
}

impl GlossaryCatalog {
    fn open(db_path: PathBuf, games: &[String]) -> Self {
        Self {
            pool: db::open_catalog(&db_path, MAX_CONNECTIONS),
            games: FacetAllowList::new(games),
            db_path,
        }
    }
}

/// Shared application state, immutable after startup / Состояние приложения
pub struct AppState {
    pub tes: GlossaryCatalog,
    pub fallout: GlossaryCatalog,
    pub library: SqlitePool,
    pub atx: SqlitePool,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let tes = GlossaryCatalog::open(config.get_glossary_tes_path(), &config.glossary.tes_games);
        let fallout = GlossaryCatalog::open(
            config.get_glossary_fallout_path(),
            &config.glossary.fallout_games,
        );
        tracing::info!(
            "Glossary allow-lists loaded: tes={}, fallout={}",
            tes.games.len(),
            fallout.games.len()
        );

        Self {
            tes,
            fallout,
            library: db::open_catalog(&config.get_library_path(), MAX_CONNECTIONS),
            atx: db::open_catalog(&config.get_atx_path(), MAX_CONNECTIONS),
        }
    }

    pub fn glossary(&self, family: GameFamily) -> &GlossaryCatalog {
        match family {
            GameFamily::Tes => &self.tes,
            GameFamily::Fallout => &self.fallout,
        }
    }
}
