use std::sync::Arc;

use crate::{mail::Mailer, model::ModelManager, payment::PaymentGateway, utils::uploads::MediaStore};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    media: MediaStore,
}

impl AppState {
    pub fn new(
        mm: ModelManager,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        media: MediaStore,
    ) -> Self {
        Self {
            mm,
            gateway,
            mailer,
            media,
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }
}
