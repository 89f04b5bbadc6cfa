use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use uuid::Uuid;

use crate::{config::Config, quiz::QuizState, recent::RecentLoansTicker, repository::HostedOfferStore};

pub struct AppState {
    pub config: Config,
    pub offers: HostedOfferStore,
    pub sessions: Mutex<HashMap<Uuid, QuizState>>,
    pub ticker: Mutex<RecentLoansTicker>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let config = Config::load();
        let offers = HostedOfferStore::new(&config);

        Arc::new(Self {
            config,
            offers,
            sessions: Mutex::new(HashMap::new()),
            ticker: Mutex::new(RecentLoansTicker::new()),
        })
    }
}
